//! Gateway configuration
//!
//! Defaults work out of the box on a LAN box; everything is overridable
//! through `CLUBSCORE_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// HTTP/WS bind address.
    pub bind: SocketAddr,
    /// Directory holding the journal.
    pub data_dir: PathBuf,
    /// mDNS instance name.
    pub instance_name: String,
    /// Whether to announce on the LAN.
    pub announce: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            data_dir: PathBuf::from("./data"),
            instance_name: "clubscore".to_string(),
            announce: true,
        }
    }
}

impl GatewayConfig {
    /// Build a config from the environment, falling back to defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind: std::env::var("CLUBSCORE_BIND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bind),
            data_dir: std::env::var("CLUBSCORE_DATA_DIR")
                .ok()
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            instance_name: std::env::var("CLUBSCORE_NAME").unwrap_or(defaults.instance_name),
            announce: std::env::var("CLUBSCORE_ANNOUNCE")
                .ok()
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(defaults.announce),
        }
    }

    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join("journal.bin")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.bind.port(), 8080);
        assert!(config.announce);
        assert!(config.journal_path().ends_with("journal.bin"));
    }
}
