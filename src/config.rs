use std::env;

/// Settings for signing and verifying session tokens.
///
/// Access and refresh tokens are signed with independent secrets so that a
/// refresh token can never be replayed as an access token (or vice versa).
/// Lifetimes are expressed in seconds.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub bcrypt_cost: u32,
}

pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub auth: AuthConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            auth: AuthConfig::from_env(),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            access_secret: env::var("ACCESS_TOKEN_SECRET").expect("ACCESS_TOKEN_SECRET must be set"),
            refresh_secret: env::var("REFRESH_TOKEN_SECRET")
                .expect("REFRESH_TOKEN_SECRET must be set"),
            access_ttl_secs: env::var("ACCESS_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .expect("ACCESS_TOKEN_TTL_SECS must be a number"),
            refresh_ttl_secs: env::var("REFRESH_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "864000".to_string())
                .parse()
                .expect("REFRESH_TOKEN_TTL_SECS must be a number"),
            bcrypt_cost: env::var("BCRYPT_COST")
                .unwrap_or_else(|_| bcrypt::DEFAULT_COST.to_string())
                .parse()
                .expect("BCRYPT_COST must be a number"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required environment variables
        env::set_var("DATABASE_URL", "postgres://test");
        env::set_var("ACCESS_TOKEN_SECRET", "access-secret");
        env::set_var("REFRESH_TOKEN_SECRET", "refresh-secret");

        let config = Config::from_env();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.auth.access_secret, "access-secret");
        assert_eq!(config.auth.access_ttl_secs, 3600);
        assert_eq!(config.auth.refresh_ttl_secs, 864000);

        // Test custom values
        env::set_var("SERVER_PORT", "3000");
        env::set_var("SERVER_HOST", "0.0.0.0");
        env::set_var("ACCESS_TOKEN_TTL_SECS", "900");

        let config = Config::from_env();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.auth.access_ttl_secs, 900);
    }
}
