// Inventory ingestion: bundled JSON file or the backend's published-vehicles endpoint

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tokio::time::{Duration, sleep};

use crate::config::{InventorySource, Settings};
use crate::models::{RawVehicle, Vehicle};

const MAX_RETRIES: u32 = 5;
const INITIAL_RETRY_DELAY_MS: u64 = 500;
const PUBLISHED_PATH: &str = "/admin/vehicles/published";

/// Loads and normalizes the catalog from the configured source.
pub async fn load(settings: &Settings, client: &Client) -> Result<Vec<Vehicle>> {
    let records = match settings.inventory_source {
        InventorySource::File => load_file(Path::new(&settings.inventory_path)).await?,
        InventorySource::Backend => {
            let base = settings
                .backend_url
                .as_deref()
                .context("backend_url is required for the backend inventory source")?;
            fetch_published(client, base).await?
        }
    };
    let catalog = normalize(records);
    tracing::info!("Catalog loaded with {} vehicles.", catalog.len());
    Ok(catalog)
}

async fn load_file(path: &Path) -> Result<Vec<RawVehicle>> {
    tracing::info!("Reading inventory from {}", path.display());
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read inventory file {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse inventory file {}", path.display()))?;
    decode_records(value)
}

// Fetches published vehicles with retries and exponential backoff.
// Client errors (4xx) mean a wrong URL or credentials and fail at once.
async fn fetch_published(client: &Client, base_url: &str) -> Result<Vec<RawVehicle>> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), PUBLISHED_PATH);
    let mut retry_delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS);

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            sleep(retry_delay).await;
            retry_delay *= 2;
        }
        tracing::debug!(attempt, url = %url, "Fetch attempt {}/{}", attempt + 1, MAX_RETRIES);

        match client.get(&url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_client_error() {
                    anyhow::bail!("Backend rejected inventory request {} with {}", url, status);
                }
                if let Err(e) = response.error_for_status_ref() {
                    tracing::warn!(attempt, status = %status, error = %e, "HTTP error fetching inventory. Retrying...");
                    continue;
                }
                match response.json::<Value>().await {
                    Ok(body) => return decode_records(body),
                    Err(e) => {
                        tracing::warn!(attempt, error = %e, "Inventory response was not JSON. Retrying...");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "Network error fetching inventory. Retrying...");
            }
        }
    }

    anyhow::bail!("Failed to fetch {} after {} attempts.", url, MAX_RETRIES)
}

/// Accepts a bare array or an object wrapping it under `vehicles` or `data`.
/// Records that don't deserialize are logged and skipped.
pub fn decode_records(body: Value) -> Result<Vec<RawVehicle>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("vehicles").or_else(|| map.remove("data")) {
            Some(Value::Array(items)) => items,
            _ => anyhow::bail!("Inventory object has no `vehicles` or `data` array"),
        },
        other => anyhow::bail!("Inventory must be a JSON array, got {}", json_kind(&other)),
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawVehicle>(item) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(index, error = %e, "Skipping undecodable vehicle record"),
        }
    }
    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Converts raw records, dropping malformed ones and duplicate ids (first wins).
pub fn normalize(records: Vec<RawVehicle>) -> Vec<Vehicle> {
    let mut seen_ids = HashSet::new();
    let mut catalog = Vec::with_capacity(records.len());
    for record in records {
        match Vehicle::try_from(record) {
            Ok(vehicle) => {
                if seen_ids.insert(vehicle.id.clone()) {
                    catalog.push(vehicle);
                } else {
                    tracing::warn!(id = %vehicle.id, "Skipping duplicate vehicle id");
                }
            }
            Err(e) => tracing::warn!("Rejected vehicle record: {}", e),
        }
    }
    catalog
}
