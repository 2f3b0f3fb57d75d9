use std::env;

pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Clone, Debug)]
pub struct Config {
    pub bind: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: 24,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let bind = env::var("AISCHOOL_BIND").unwrap_or(defaults.bind);
        let jwt_secret = env::var("AISCHOOL_JWT_SECRET").unwrap_or(defaults.jwt_secret);
        let token_ttl_hours = env::var("AISCHOOL_TOKEN_TTL_HOURS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .filter(|hours: &i64| *hours > 0)
            .unwrap_or(defaults.token_ttl_hours);

        Self {
            bind,
            jwt_secret,
            token_ttl_hours,
        }
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}
