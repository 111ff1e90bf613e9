use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::cli::ServeArgs;

/// Frontend dev servers allowed when no origin is configured.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
];

/// Origin value that opens the relay to any caller.
pub const ANY_ORIGIN: &str = "*";

/// Tuning of a single relay run.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    /// Percentage added per output part. The estimate is a heuristic,
    /// not tied to the real size of the document.
    pub progress_step: u32,
    /// Highest value a progress event may carry; `complete` alone means done.
    pub progress_cap: u32,
    /// Pause after each reasoning fragment, so a reader can follow along.
    pub thought_delay: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            progress_step: 2,
            progress_cap: 95,
            thought_delay: Duration::from_millis(40),
        }
    }
}

/// Everything `geniesite serve` needs.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub allowed_origins: Vec<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: Option<String>,
    pub relay: RelayConfig,
}

impl ServerConfig {
    pub fn from_args(args: &ServeArgs) -> Result<Self> {
        let ip: IpAddr = args
            .bind
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse()
            .with_context(|| format!("invalid bind address {}", args.bind))?;
        let bind_addr = SocketAddr::new(ip, args.port);

        Ok(Self {
            bind_addr,
            allowed_origins: parse_origins(&args.allowed_origins),
            api_key: args.api_key.clone().filter(|key| !key.trim().is_empty()),
            model: args.model.clone(),
            api_url: args.api_url.clone(),
            relay: RelayConfig {
                thought_delay: Duration::from_millis(args.thought_delay_ms),
                ..RelayConfig::default()
            },
        })
    }

    pub fn port(&self) -> u16 {
        self.bind_addr.port()
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == ANY_ORIGIN)
    }
}

/// Flatten comma separated origin lists, falling back to the local dev servers.
pub fn parse_origins(values: &[String]) -> Vec<String> {
    let origins: Vec<String> = values
        .iter()
        .flat_map(|value| value.split(','))
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

    if origins.is_empty() {
        DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect()
    } else {
        origins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn serve_args() -> ServeArgs {
        ServeArgs {
            port: 5000,
            bind: "0.0.0.0".to_string(),
            allowed_origins: Vec::new(),
            api_key: Some("   ".to_string()),
            model: "gemini-2.5-flash".to_string(),
            api_url: None,
            thought_delay_ms: 0,
        }
    }

    #[test]
    fn test_default_origins() {
        assert_eq!(parse_origins(&[]), DEFAULT_ALLOWED_ORIGINS.to_vec());
        assert_eq!(parse_origins(&[" , ".to_string()]).len(), 4);
    }

    #[test]
    fn test_origins_are_split_and_trimmed() {
        let origins = parse_origins(&[
            "https://genie.example.com/, https://www.genie.example.com".to_string(),
            "http://localhost:3000".to_string(),
        ]);
        assert_eq!(
            origins,
            vec![
                "https://genie.example.com",
                "https://www.genie.example.com",
                "http://localhost:3000",
            ]
        );
    }

    #[test]
    fn test_server_config_from_args() {
        let config = ServerConfig::from_args(&serve_args()).unwrap();
        assert_eq!(config.port(), 5000);
        assert_eq!(config.api_key, None);
        assert_eq!(config.relay.thought_delay, Duration::ZERO);
        assert_eq!(config.relay.progress_cap, 95);
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn test_wildcard_origin() {
        let mut args = serve_args();
        args.allowed_origins = vec!["*".to_string()];
        assert!(ServerConfig::from_args(&args).unwrap().allows_any_origin());
    }

    #[test]
    fn test_ipv6_bind_address() {
        let mut args = serve_args();
        args.bind = "::".to_string();
        let config = ServerConfig::from_args(&args).unwrap();
        assert!(config.bind_addr.is_ipv6());
        assert_eq!(config.port(), 5000);

        args.bind = "[::1]".to_string();
        let config = ServerConfig::from_args(&args).unwrap();
        assert_eq!(config.bind_addr.to_string(), "[::1]:5000");
    }

    #[test]
    fn test_invalid_bind_address() {
        let mut args = serve_args();
        args.bind = "not an address".to_string();
        assert!(ServerConfig::from_args(&args).is_err());
    }
}
