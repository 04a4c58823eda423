use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub upstream_api_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub upstream_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            upstream_api_url: env::var("UPSTREAM_API_URL")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_addr_and_timeout() {
        let config = Config {
            upstream_api_url: "http://agro.local".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 9000,
            upstream_timeout_secs: 15,
        };

        assert_eq!(config.server_addr(), "127.0.0.1:9000");
        assert_eq!(config.upstream_timeout(), Duration::from_secs(15));
    }
}
