use url::Url;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 8000;

/// Runtime configuration sourced from the environment.
///
/// Both store parameters are optional: when either one is missing the
/// document store starts in its unavailable state instead of aborting startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Connection URL of the document store (`DATABASE_URL`).
    pub database_url: Option<String>,
    /// Logical database name inside the store (`DATABASE_NAME`).
    pub database_name: Option<String>,
    /// Listening port (`PORT`).
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        tracing::info!("Configuration loaded successfully");
        match config.redacted_database_url() {
            Some(url) => tracing::debug!("Database URL: {}", url),
            None => tracing::warn!("DATABASE_URL not set; document store will be unavailable"),
        }
        match config.database_name.as_deref() {
            Some(name) => tracing::debug!("Database name: {}", name),
            None => tracing::warn!("DATABASE_NAME not set; document store will be unavailable"),
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            database_name: non_empty("DATABASE_NAME"),
            port,
        })
    }

    /// The connection URL with any password stripped, for log output.
    ///
    /// Returns `None` when no URL is configured. A URL that does not parse is
    /// reported as `<unparseable>` rather than echoed back.
    pub fn redacted_database_url(&self) -> Option<String> {
        let raw = self.database_url.as_deref()?;
        let redacted = match Url::parse(raw) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("***"));
                }
                url.to_string()
            }
            Err(_) => "<unparseable>".to_string(),
        };
        Some(redacted)
    }
}
