//! Node configuration, built once in `main.rs` and passed by value into
//! `Coordinator::start`. The teacher keeps a process-global `GLOBAL_CONFIG`
//! (a `once_cell`-backed static); that pattern is deliberately not carried
//! over here, since it makes the coordinator untestable with more than one
//! configuration per process.

use crate::error::{NodeError, Result};

const DEFAULT_DIFFICULTY: usize = 5;
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_IP_RANGE: (u16, u16) = (1, 3);
const DEFAULT_PORT_RANGE: (u16, u16) = (5000, 5003);

pub const MINER_REWARD_SENDER: &str = "THE BLOCKCHAIN";

#[derive(Clone, Debug)]
pub struct Config {
    pub difficulty: usize,
    pub port: u16,
    pub host: String,
    pub node_address: String,
    pub miner_reward_sender: String,
    pub neighbor_ip_range: (u16, u16),
    pub neighbor_port_range: (u16, u16),
}

impl Config {
    pub fn new(host: String, port: u16, node_address: String) -> Result<Self> {
        let difficulty = match std::env::var("MINING_DIFFICULTY") {
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|e| NodeError::InvalidDifficulty(e.to_string()))?,
            Err(_) => DEFAULT_DIFFICULTY,
        };

        Ok(Config {
            difficulty,
            port,
            host,
            node_address,
            miner_reward_sender: MINER_REWARD_SENDER.to_string(),
            neighbor_ip_range: DEFAULT_IP_RANGE,
            neighbor_port_range: DEFAULT_PORT_RANGE,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            difficulty: DEFAULT_DIFFICULTY,
            port: DEFAULT_PORT,
            host: "127.0.0.1".to_string(),
            node_address: String::new(),
            miner_reward_sender: MINER_REWARD_SENDER.to_string(),
            neighbor_ip_range: DEFAULT_IP_RANGE,
            neighbor_port_range: DEFAULT_PORT_RANGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_ranges() {
        let config = Config::default();
        assert_eq!(config.difficulty, DEFAULT_DIFFICULTY);
        assert!(config.neighbor_ip_range.0 <= config.neighbor_ip_range.1);
        assert!(config.neighbor_port_range.0 <= config.neighbor_port_range.1);
    }
}
