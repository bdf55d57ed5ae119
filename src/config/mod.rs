use std::env;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 3001;

pub struct Config {
    pub port: u16,
    /// Topic for price-change notifications. Unset disables publishing,
    /// like an unset topic ARN in the source deployment.
    pub price_change_topic: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            price_change_topic: env::var("PRICE_CHANGE_TOPIC")
                .ok()
                .filter(|value| !value.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_env() {
        env::remove_var("PORT");
        env::remove_var("PRICE_CHANGE_TOPIC");
        let config = Config::from_env();
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.price_change_topic.is_none());
    }
}
