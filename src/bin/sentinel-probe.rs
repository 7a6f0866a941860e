use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sentinel-probe")]
#[command(about = "Query a running node-sentinel verdict endpoint", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    timeout: u64,

    /// Print nothing, only set the exit code
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match probe(&cli).await {
        Ok((healthy, body)) => {
            if !cli.quiet {
                println!("{}", body);
            }
            if healthy {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn probe(cli: &Cli) -> Result<(bool, String), reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .build()?;
    let res = client.get(&cli.url).send().await?;
    let healthy = res.status() == reqwest::StatusCode::OK;
    let body = res.text().await?;
    Ok((healthy, body))
}
