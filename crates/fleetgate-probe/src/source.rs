//! HTTP implementation of the [`StatusSource`] fetch contract.
//!
//! Performs an HTTP/1 GET against an instance's status endpoint and
//! decodes the JSON body into a [`StatusSnapshot`].

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use fleetgate_core::{FetchError, Instance, StatusSnapshot, StatusSource};

/// Wire format of a status endpoint body.
#[derive(Debug, Deserialize)]
struct StatusBody {
    state: String,
    #[serde(default)]
    components: BTreeMap<String, bool>,
}

/// HTTP/1 status source probing `http://{address}{endpoint}`.
#[derive(Debug, Clone)]
pub struct HttpStatusSource {
    endpoint: String,
    timeout: Duration,
}

impl HttpStatusSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            timeout,
        }
    }
}

impl Default for HttpStatusSource {
    fn default() -> Self {
        Self::new("/status", Duration::from_secs(2))
    }
}

impl StatusSource for HttpStatusSource {
    async fn fetch(&self, instance: &Instance) -> Result<StatusSnapshot, FetchError> {
        let address = instance.address.clone();
        let uri = format!("http://{address}{}", self.endpoint);

        let attempt = tokio::time::timeout(self.timeout, async {
            let stream = tokio::net::TcpStream::connect(&address)
                .await
                .map_err(|e| {
                    debug!(error = %e, %uri, "status probe connection failed");
                    FetchError::Connect(e.to_string())
                })?;

            let io = hyper_util::rt::TokioIo::new(stream);
            let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
                .await
                .map_err(|e| {
                    debug!(error = %e, %uri, "status probe handshake failed");
                    FetchError::Handshake(e.to_string())
                })?;

            // Drive the connection in the background.
            tokio::spawn(async move {
                let _ = conn.await;
            });

            let req = http::Request::builder()
                .method("GET")
                .uri(&uri)
                .header("host", &address)
                .header("user-agent", "fleetgate-probe/0.1")
                .body(http_body_util::Empty::<bytes::Bytes>::new())
                .map_err(|e| FetchError::Request(e.to_string()))?;

            let resp = sender.send_request(req).await.map_err(|e| {
                debug!(error = %e, %uri, "status probe request failed");
                FetchError::Request(e.to_string())
            })?;

            let status = resp.status();
            let body = read_body(resp).await?;
            Ok(decode_snapshot(status, &body, &uri))
        })
        .await;

        match attempt {
            Ok(result) => result,
            Err(_) => {
                debug!(%uri, "status probe timed out");
                Err(FetchError::Timeout(self.timeout))
            }
        }
    }
}

async fn read_body(
    resp: http::Response<hyper::body::Incoming>,
) -> Result<bytes::Bytes, FetchError> {
    use http_body_util::BodyExt;
    let collected = resp
        .into_body()
        .collect()
        .await
        .map_err(|e| FetchError::Body(e.to_string()))?;
    Ok(collected.to_bytes())
}

/// Build a snapshot from an HTTP response. The endpoint answered, so the
/// instance is reachable; a non-2xx or undecodable body degrades the
/// reported state rather than failing the fetch.
fn decode_snapshot(status: http::StatusCode, body: &[u8], uri: &str) -> StatusSnapshot {
    if !status.is_success() {
        debug!(status = %status, %uri, "status probe non-2xx");
        return StatusSnapshot::reachable(&format!("http-{}", status.as_u16()), BTreeMap::new());
    }

    match serde_json::from_slice::<StatusBody>(body) {
        Ok(parsed) => StatusSnapshot::reachable(&parsed.state, parsed.components),
        Err(e) => {
            debug!(error = %e, %uri, "status body undecodable");
            StatusSnapshot::reachable("unknown", BTreeMap::new())
        }
    }
}
