// Layered service configuration: defaults, optional config.toml, then APP__* env vars.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventorySource {
    /// Bundled JSON array on disk.
    File,
    /// `GET {backend_url}/admin/vehicles/published`.
    Backend,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_address: String,
    pub inventory_source: InventorySource,
    pub inventory_path: String,
    // Base URL of the dealership backend (inventory + lead storage)
    pub backend_url: Option<String>,
    pub fuzzy_threshold: f64,
    pub session_capacity: usize,
    pub session_ttl_secs: u64,
    pub static_dir: String,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("inventory_source", "file")?
            .set_default("inventory_path", "data/vehicles.json")?
            .set_default("fuzzy_threshold", 0.35)?
            .set_default("session_capacity", 1000)?
            .set_default("session_ttl_secs", 1800)?
            .set_default("static_dir", "static")?
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            // Load from environment variables (e.g., APP__BACKEND_URL)
            .add_source(Environment::with_prefix("APP").prefix_separator("__").separator("__"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            anyhow::bail!(
                "fuzzy_threshold must lie in [0, 1], got {}",
                self.fuzzy_threshold
            );
        }
        if self.inventory_source == InventorySource::Backend && self.backend_url.is_none() {
            anyhow::bail!("inventory_source = \"backend\" requires backend_url");
        }
        Ok(())
    }
}

#[cfg(test)]
impl Settings {
    pub fn for_tests() -> Self {
        Settings {
            server_address: "127.0.0.1:0".to_string(),
            inventory_source: InventorySource::File,
            inventory_path: "data/vehicles.json".to_string(),
            backend_url: None,
            fuzzy_threshold: 0.35,
            session_capacity: 16,
            session_ttl_secs: 60,
            static_dir: "static".to_string(),
        }
    }
}
