/// Server configuration
///
/// # Environment variables
///
/// All settings can be overridden through environment variables:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | PORT | 8080 | HTTP listen port |
/// | DATA_DIR | /var/lib/order-server | Data directory (database, logs) |
/// | ORDER_TABLE_NAME | orders | Order table name |
/// | BROKER_URLS | nats://localhost:4222 | Broker URLs (comma-separated) |
/// | LOG_LEVEL | info | Log level filter |
/// | LOG_DIR | (unset) | Optional directory for daily log files |
/// | ENVIRONMENT | development | Runtime environment |
/// | REQUEST_TIMEOUT_MS | 30000 | Request timeout (milliseconds) |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | Graceful shutdown timeout (milliseconds) |
///
/// # Example
///
/// ```ignore
/// PORT=9090 BROKER_URLS=nats://broker:4222 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API listen port
    pub http_port: u16,
    /// Data directory for the embedded database
    pub data_dir: String,
    /// Name of the order table
    pub order_table: String,
    /// Message broker URLs
    pub broker_urls: Vec<String>,
    /// Log level filter
    pub log_level: String,
    /// Optional log file directory
    pub log_dir: Option<String>,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Request timeout (milliseconds)
    pub request_timeout_ms: u64,
    /// Graceful shutdown timeout (milliseconds)
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Falls back to defaults for unset variables
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "/var/lib/order-server".into()),
            order_table: std::env::var("ORDER_TABLE_NAME").unwrap_or_else(|_| "orders".into()),
            broker_urls: std::env::var("BROKER_URLS")
                .map(|s| parse_broker_urls(&s))
                .unwrap_or_else(|_| vec!["nats://localhost:4222".into()]),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            shutdown_timeout_ms: std::env::var("SHUTDOWN_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
        }
    }

    /// Override selected settings
    ///
    /// Mostly used by tests
    pub fn with_overrides(data_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.data_dir = data_dir.into();
        config.http_port = http_port;
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_broker_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_broker_urls() {
        assert_eq!(
            parse_broker_urls("nats://a:4222, nats://b:4222"),
            vec!["nats://a:4222", "nats://b:4222"]
        );
        assert_eq!(parse_broker_urls("nats://a:4222,"), vec!["nats://a:4222"]);
    }

    #[test]
    fn test_with_overrides() {
        let config = Config::with_overrides("/tmp/orders-test", 9090);
        assert_eq!(config.data_dir, "/tmp/orders-test");
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.order_table, "orders");
    }
}
