//! JSON-RPC client for the node HTTP API.
//!
//! # Responsibilities
//! - `health.getLiveness` on `/ext/health`
//! - `info.isBootstrapped` and `info.peers` on `/ext/info`
//! - Map transport, RPC and decoding failures onto `ClientError`

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::client::{ClientError, NodeClient};
use crate::config::NodeConfig;
use crate::health::Partition;

const HEALTH_PATH: &str = "ext/health";
const INFO_PATH: &str = "ext/info";

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Serialize)]
struct NoParams {}

#[derive(Debug, Deserialize)]
struct LivenessReply {
    healthy: bool,
}

#[derive(Debug, Serialize)]
struct IsBootstrappedArgs<'a> {
    chain: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IsBootstrappedReply {
    is_bootstrapped: bool,
}

/// The node encodes integers as JSON strings in some API versions.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeersReply {
    num_peers: Count,
}

impl PeersReply {
    fn count(&self) -> Result<u64, ClientError> {
        match &self.num_peers {
            Count::Number(n) => Ok(*n),
            Count::Text(s) => s.parse().map_err(|_| {
                ClientError::InvalidResponse(format!("numPeers is not a number: {s}"))
            }),
        }
    }
}

/// Node client over HTTP JSON-RPC.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    health_url: Url,
    info_url: Url,
}

impl RpcClient {
    /// Create a client for the node described by `config`.
    pub fn new(config: &NodeConfig) -> Result<Self, ClientError> {
        let mut base = Url::parse(&config.endpoint)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            health_url: base.join(HEALTH_PATH)?,
            info_url: base.join(INFO_PATH)?,
        })
    }

    async fn call<P, R>(&self, url: &Url, method: &str, params: P) -> Result<R, ClientError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response: RpcResponse<R> = self
            .http
            .post(url.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        response
            .result
            .ok_or_else(|| ClientError::InvalidResponse(format!("{method} returned no result")))
    }
}

#[async_trait]
impl NodeClient for RpcClient {
    async fn is_healthy(&self) -> Result<bool, ClientError> {
        let reply: LivenessReply = self
            .call(&self.health_url, "health.getLiveness", NoParams {})
            .await?;
        Ok(reply.healthy)
    }

    async fn is_bootstrapped(&self, partition: &Partition) -> Result<bool, ClientError> {
        let reply: IsBootstrappedReply = self
            .call(
                &self.info_url,
                "info.isBootstrapped",
                IsBootstrappedArgs { chain: partition.as_str() },
            )
            .await?;
        Ok(reply.is_bootstrapped)
    }

    async fn peer_count(&self) -> Result<u64, ClientError> {
        let reply: PeersReply = self.call(&self.info_url, "info.peers", NoParams {}).await?;
        reply.count()
    }
}
