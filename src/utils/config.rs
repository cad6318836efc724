use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Outbound mail configuration
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Plain HTTP when true, HTTPS with `tls` otherwise
    pub development: bool,
    pub cors_origins: Vec<String>,
    pub max_content_length: u64,
    pub tls: TlsConfig,
    /// Base used for links sent to users; derived from host and port when unset
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    /// Apply migrations at startup
    pub sync: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    #[serde(skip_serializing)]
    pub secret: String,
    pub expiration_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub api_url: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub from: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let development = env_flag("DEVELOPMENT", true);

        let secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if development => {
                // Random secret for local runs; tokens die with the process
                use rand::Rng;
                let mut rng = rand::thread_rng();
                (0..32).map(|_| rng.gen::<u8>()).map(|b| format!("{:02x}", b)).collect()
            }
            _ => anyhow::bail!("JWT_SECRET is required in production"),
        };

        let port = env::var("PORT")
            .or_else(|_| env::var("FLASK_PORT"))
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid PORT value"))?;

        let config = Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
                development,
                cors_origins: env::var("CORS_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                max_content_length: env::var("MAX_CONTENT_LENGTH")
                    .unwrap_or_else(|_| "52428800".to_string()) // 50MB
                    .parse()
                    .unwrap_or(52_428_800),
                tls: TlsConfig {
                    cert_path: env::var("TLS_CERT_PATH")
                        .unwrap_or_else(|_| "./cert.crt".to_string())
                        .into(),
                    key_path: env::var("TLS_KEY_PATH")
                        .unwrap_or_else(|_| "./key.pem".to_string())
                        .into(),
                },
                public_base_url: env::var("PUBLIC_BASE_URL").ok().filter(|s| !s.is_empty()),
            },
            database: DatabaseConfig {
                url: env::var("DB_URL").unwrap_or_else(|_| "sqlite://homey.db".to_string()),
                sync: env_flag("SYNC", false),
            },
            jwt: JwtConfig {
                secret,
                expiration_minutes: env::var("TOKEN_TTL_MINUTES")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .unwrap_or(60),
            },
            mail: MailConfig {
                api_url: env::var("MAIL_API_URL").ok().filter(|s| !s.is_empty()),
                api_key: env::var("MAIL_API_KEY").ok().filter(|s| !s.is_empty()),
                from: env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@homey.app".to_string()),
            },
        };

        Ok(config)
    }

    /// Scheme, host and port that links in outgoing email point at
    pub fn public_base_url(&self) -> String {
        if let Some(base) = &self.server.public_base_url {
            return base.trim_end_matches('/').to_string();
        }
        let protocol = if self.server.development { "http" } else { "https" };
        format!("{}://{}:{}", protocol, self.server.host, self.server.port)
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|value| parse_flag(&value))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            server: ServerConfig {
                host: "localhost".to_string(),
                port: 8080,
                development: true,
                cors_origins: vec!["*".to_string()],
                max_content_length: 1024,
                tls: TlsConfig {
                    cert_path: "./cert.crt".into(),
                    key_path: "./key.pem".into(),
                },
                public_base_url: None,
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                sync: true,
            },
            jwt: JwtConfig {
                secret: "secret".to_string(),
                expiration_minutes: 60,
            },
            mail: MailConfig {
                api_url: None,
                api_key: None,
                from: "no-reply@homey.app".to_string(),
            },
        }
    }

    #[test]
    fn flags_accept_common_truthy_spellings() {
        assert!(parse_flag("true"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn base_url_follows_development_mode() {
        let mut config = sample();
        assert_eq!(config.public_base_url(), "http://localhost:8080");

        config.server.development = false;
        assert_eq!(config.public_base_url(), "https://localhost:8080");
    }

    #[test]
    fn explicit_base_url_wins() {
        let mut config = sample();
        config.server.public_base_url = Some("https://homey.example/".to_string());
        assert_eq!(config.public_base_url(), "https://homey.example");
    }

    #[test]
    fn secret_is_not_serialized() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("\"secret\""));
    }
}
