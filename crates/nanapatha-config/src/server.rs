use std::env;

/// Listener settings for the API and the Prometheus endpoint.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub metrics_port: u16,
    /// Apply pending migrations on startup.
    pub run_migrations: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_port(env::var("PORT").ok(), 3000),
            metrics_port: parse_port(env::var("METRICS_PORT").ok(), 9091),
            run_migrations: env::var("RUN_MIGRATIONS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn metrics_addr(&self) -> String {
        format!("{}:{}", self.host, self.metrics_port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            metrics_port: 9091,
            run_migrations: true,
        }
    }
}

fn parse_port(raw: Option<String>, default: u16) -> u16 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_falls_back_on_garbage() {
        assert_eq!(parse_port(Some("8080".into()), 3000), 8080);
        assert_eq!(parse_port(Some("http".into()), 3000), 3000);
        assert_eq!(parse_port(None, 9091), 9091);
    }

    #[test]
    fn test_addresses() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.metrics_addr(), "0.0.0.0:9091");
    }
}
