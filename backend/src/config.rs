use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    /// Externally reachable base URL, used for webhook callbacks
    pub public_url: String,
    pub postgres: PostgresAuth,
    pub mailer_lite: MailerLiteConfig,
}

/// Connection settings for the campaign database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresAuth {
    /// Full connection string; takes precedence over the discrete fields
    #[serde(skip)]
    pub url: Option<String>,
    pub host: String,
    #[serde(default = "default_pg_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_true")]
    pub enable_ssl: bool,
    #[serde(default)]
    pub reject_unauthorized: bool,
    /// PEM encoded CA certificate used to verify the server
    #[serde(default)]
    pub certificate: Option<String>,
}

fn default_pg_port() -> u16 {
    5432
}

fn default_true() -> bool {
    true
}

/// MailerLite API access for the newsletter triggers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerLiteConfig {
    pub api_key: String,
    pub base_url: String,
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let public_url = env::var("PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{}", server_addr))
            .trim_end_matches('/')
            .to_string();

        Ok(Config {
            server_addr,
            public_url,
            postgres: PostgresAuth::from_env()?,
            mailer_lite: MailerLiteConfig {
                api_key: env::var("MAILERLITE_API_KEY").unwrap_or_default(),
                base_url: env::var("MAILERLITE_BASE_URL")
                    .unwrap_or_else(|_| "https://connect.mailerlite.com/api".to_string()),
            },
        })
    }
}

impl PostgresAuth {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match env::var("PG_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("PG_PORT must be a port number, got {:?}", raw))?,
            Err(_) => default_pg_port(),
        };

        Ok(Self {
            url: env::var("DATABASE_URL").ok(),
            host: env::var("PG_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port,
            user: env::var("PG_USER").unwrap_or_else(|_| "saints".to_string()),
            password: env::var("PG_PASSWORD").unwrap_or_default(),
            database: env::var("PG_DATABASE").unwrap_or_else(|_| "saints".to_string()),
            enable_ssl: env_flag("PG_ENABLE_SSL", true),
            reject_unauthorized: env_flag("PG_REJECT_UNAUTHORIZED", false),
            certificate: env::var("PG_CERTIFICATE").ok().filter(|c| !c.trim().is_empty()),
        })
    }

    pub fn ssl_mode(&self) -> PgSslMode {
        match (self.enable_ssl, self.reject_unauthorized) {
            (false, _) => PgSslMode::Disable,
            (true, false) => PgSslMode::Require,
            (true, true) => PgSslMode::VerifyFull,
        }
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url);
        }

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(self.ssl_mode());

        if let Some(pem) = &self.certificate {
            options = options.ssl_root_cert_from_pem(pem.as_bytes().to_vec());
        }

        Ok(options)
    }
}

impl MailerLiteConfig {
    /// Check if MailerLite is properly configured
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.base_url.is_empty()
    }
}
