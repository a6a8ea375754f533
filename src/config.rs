use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{bail, Context};
use tracing::{info, warn};

use crate::rakuten::{
    GatewaySettings, GatewaySettingsBuilder, DEFAULT_CATEGORY_LIST_URL,
    DEFAULT_CATEGORY_RANKING_URL,
};

pub struct Config {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub gateway: GatewaySettings,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let application_id = env::var("RAKUTEN_APP_ID").unwrap_or_default();
        if application_id.trim().is_empty() {
            bail!("RAKUTEN_APP_ID env not found, set the Rakuten application id");
        }

        let interval: u64 = try_load("RAKUTEN_REQUEST_INTERVAL_MS", "1500")?;
        let timeout: u64 = try_load("RAKUTEN_TIMEOUT_SECS", "10")?;

        let gateway = GatewaySettingsBuilder::default()
            .application_id(application_id.trim())
            .category_list_url(try_load::<String>(
                "RAKUTEN_CATEGORY_LIST_URL",
                DEFAULT_CATEGORY_LIST_URL,
            )?)
            .category_ranking_url(try_load::<String>(
                "RAKUTEN_CATEGORY_RANKING_URL",
                DEFAULT_CATEGORY_RANKING_URL,
            )?)
            .request_interval(Duration::from_millis(interval))
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("fail to build gateway settings")?;

        Ok(Self {
            host: try_load("HOST", "127.0.0.1")?,
            port: try_load("PORT", "8080")?,
            cors_origin: try_load("CORS_ORIGIN", "http://localhost:3000")?,
            gateway,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow::anyhow!("environment misconfigured, {key}={raw}: {e}")
    })
}
