//! Peer gateway: neighbor discovery, gossip fan-out, chain pull.
//!
//! Grounded on `original_source/internal/network/neighbor.go` (`FindNeighbors`,
//! the regex-extracted IPv4 prefix plus inclusive port-range probing with a
//! 1 s connect timeout) and `original_source/internal/gateway/http_gateway.go`
//! (`NotifyNeighbors` fire-and-forget fan-out, `GetChains` per-neighbor
//! concurrent fetch pushed onto a channel as each completes). The Go source
//! reschedules its neighbor sync via `time.AfterFunc(10s, g.StartSyncNeighbors)`,
//! re-entering itself forever; here it is a plain `tokio::time::interval` loop,
//! the same non-recursive shape already used for the miner.
//!
//! `reqwest::Client` is used the way the teacher's `bitcoin-api/src/client.rs`
//! wraps it for its own peer-facing clients.

use std::future::Future;
use std::net::Ipv4Addr;
use std::sync::RwLock;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Method;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::core::block::Block;
use crate::web::models::ChainResponse;

const NEIGHBOR_SYNC_PERIOD: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

static IPV4_PATTERN: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
    regex::Regex::new(r"((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)")
        .expect("static pattern compiles")
});

/// The capability the Coordinator needs from a peer-networking layer: gossip
/// fan-out and chain pull. A trait rather than a concrete `HttpGateway` so the
/// Coordinator stays transport-agnostic (spec §9 Design Notes point 4).
pub trait Gateway: Send + Sync + 'static {
    /// Sends `payload` to every known neighbor, in parallel. Individual
    /// failures are logged, never surfaced to the caller.
    fn notify(&self, endpoint: &str, method: Method, payload: serde_json::Value) -> impl Future<Output = ()> + Send;

    /// Requests `/chain` from every neighbor concurrently. Resolves once every
    /// request has completed (success or failure); entries are in
    /// arrival-order, not neighbor-order.
    fn fetch_chains(&self) -> impl Future<Output = Vec<Vec<Block>>> + Send;

    fn neighbor_count(&self) -> usize;
}

/// HTTP/JSON peer gateway. Neighbors are discovered by probing an IPv4/port
/// range and replaced atomically on each sync tick.
pub struct HttpGateway {
    http: reqwest::Client,
    host: String,
    port: u16,
    ip_range: (u16, u16),
    port_range: (u16, u16),
    neighbors: RwLock<Vec<String>>,
}

impl HttpGateway {
    pub fn new(host: String, port: u16, ip_range: (u16, u16), port_range: (u16, u16)) -> Self {
        HttpGateway {
            http: reqwest::Client::new(),
            host,
            port,
            ip_range,
            port_range,
            neighbors: RwLock::new(Vec::new()),
        }
    }

    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn neighbors_snapshot(&self) -> Vec<String> {
        self.neighbors.read().map(|g| g.clone()).unwrap_or_default()
    }

    /// Spawns the periodic discovery loop. Never recurses or reschedules
    /// itself; one `tokio::time::interval` drives every tick for the life of
    /// the task.
    pub fn spawn_discovery_loop(self: std::sync::Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(NEIGHBOR_SYNC_PERIOD);
            loop {
                ticker.tick().await;
                let found = self.find_neighbors().await;
                debug!(count = found.len(), "gateway: neighbor discovery complete");
                if let Ok(mut guard) = self.neighbors.write() {
                    *guard = found;
                }
            }
        })
    }

    /// Probes every `(ip offset, port)` combination in range, in parallel,
    /// keeping those that accept a TCP connection within one second.
    async fn find_neighbors(&self) -> Vec<String> {
        let address = self.address();
        let Some(prefix) = extract_ipv4_prefix(&self.host) else {
            return Vec::new();
        };

        let mut probes = FuturesUnordered::new();
        let (ip_start, ip_end) = self.ip_range;
        let (port_start, port_end) = self.port_range;
        for port in port_start..=port_end {
            for offset in ip_start..=ip_end {
                let candidate_host = format!("{}{}", prefix.0, prefix.1 as u16 + offset);
                let candidate = format!("{}:{}", candidate_host, port);
                if candidate == address {
                    continue;
                }
                probes.push(async move {
                    match tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(&candidate)).await {
                        Ok(Ok(_)) => Some(candidate),
                        _ => None,
                    }
                });
            }
        }

        let mut found = Vec::new();
        while let Some(result) = probes.next().await {
            if let Some(host) = result {
                found.push(host);
            }
        }
        found
    }
}

impl Gateway for HttpGateway {
    async fn notify(&self, endpoint: &str, method: Method, payload: serde_json::Value) {
        let mut tasks = FuturesUnordered::new();
        for neighbor in self.neighbors_snapshot() {
            let http = self.http.clone();
            let url = format!("http://{}/{}", neighbor, endpoint);
            let method = method.clone();
            let payload = payload.clone();
            tasks.push(async move {
                let result = http.request(method, &url).json(&payload).send().await;
                if let Err(e) = result {
                    warn!(%neighbor, error = %e, "gateway: notify failed");
                }
            });
        }
        while tasks.next().await.is_some() {}
    }

    async fn fetch_chains(&self) -> Vec<Vec<Block>> {
        let mut tasks = FuturesUnordered::new();
        for neighbor in self.neighbors_snapshot() {
            let http = self.http.clone();
            let url = format!("http://{}/chain", neighbor);
            tasks.push(async move {
                match http.get(&url).send().await {
                    Ok(resp) => resp.json::<ChainResponse>().await.ok().map(|r| r.chain),
                    Err(e) => {
                        warn!(%neighbor, error = %e, "gateway: fetch_chains failed");
                        None
                    }
                }
            });
        }

        let mut chains = Vec::new();
        while let Some(result) = tasks.next().await {
            if let Some(chain) = result {
                chains.push(chain);
            }
        }
        chains
    }

    fn neighbor_count(&self) -> usize {
        self.neighbors_snapshot().len()
    }
}

/// Extracts the dotted-quad prefix (`"192.168.1."`) and trailing octet from a
/// host string, mirroring the Go source's regex-based extraction so a guessed
/// neighbor address is built by bumping the last octet.
fn extract_ipv4_prefix(host: &str) -> Option<(String, u8)> {
    let m = IPV4_PATTERN.find(host)?;
    let addr: Ipv4Addr = m.as_str().parse().ok()?;
    let octets = addr.octets();
    let prefix = format!("{}.{}.{}.", octets[0], octets[1], octets[2]);
    Some((prefix, octets[3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_ipv4_prefix_splits_prefix_and_last_octet() {
        let (prefix, last) = extract_ipv4_prefix("127.0.0.1").expect("match");
        assert_eq!(prefix, "127.0.0.");
        assert_eq!(last, 1);
    }

    #[test]
    fn extract_ipv4_prefix_rejects_non_ip_host() {
        assert!(extract_ipv4_prefix("not-an-ip").is_none());
    }

    #[tokio::test]
    async fn notify_and_fetch_chains_are_no_ops_with_no_neighbors() {
        let gateway = HttpGateway::new("127.0.0.1".into(), 5000, (1, 3), (5000, 5003));
        gateway.notify("transactions", Method::PUT, serde_json::json!({})).await;
        assert!(gateway.fetch_chains().await.is_empty());
        assert_eq!(gateway.neighbor_count(), 0);
    }
}
