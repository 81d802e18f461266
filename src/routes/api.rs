// Handlers for the stateless inventory API

use axum::{
    extract::{Json as JsonExtract, Path, Query, State},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    error::{AppError, AppResult},
    inventory::{FilterState, InventoryView, SortKey, pipeline},
    models::{Vehicle, VehicleCard},
};

// --- Response Wrappers ---

/// Lead-capture prompt shown when a search comes back empty.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmptyStatePrompt {
    pub title: String,
    pub message: String,
    pub lead_kind: &'static str,
    pub submit_url: &'static str,
    pub search_query: Option<String>,
}

impl EmptyStatePrompt {
    pub fn for_query(query: &str) -> Self {
        let query = query.trim();
        EmptyStatePrompt {
            title: "We couldn't find your car".to_string(),
            message: "Tell us what you're looking for and our team will source it for you.".to_string(),
            lead_kind: "carRequest",
            submit_url: "/api/leads",
            search_query: (!query.is_empty()).then(|| query.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryResponse {
    #[serde(flatten)]
    pub view: InventoryView,
    pub empty_state: Option<EmptyStatePrompt>,
}

impl InventoryResponse {
    pub fn new(view: InventoryView, query: &str) -> Self {
        let empty_state = view.is_empty().then(|| EmptyStatePrompt::for_query(query));
        InventoryResponse { view, empty_state }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VehicleDetail {
    #[serde(flatten)]
    card: VehicleCard,
    drive_type: String,
    condition: String,
    seating: u32,
    color_exterior: String,
    color_interior: String,
    features: Vec<String>,
    engine: u32,
    horsepower: u32,
    images: Vec<String>,
}

impl From<&Vehicle> for VehicleDetail {
    fn from(v: &Vehicle) -> Self {
        VehicleDetail {
            card: VehicleCard::from(v),
            drive_type: v.drive_type.clone(),
            condition: v.condition.clone(),
            seating: v.seating,
            color_exterior: v.color_exterior.clone(),
            color_interior: v.color_interior.clone(),
            features: v.features.clone(),
            engine: v.engine,
            horsepower: v.horsepower,
            images: v.images.clone(),
        }
    }
}

// --- Request Structs ---

#[derive(Deserialize, Debug)]
pub struct InventoryParams {
    q: Option<String>,
    sort: Option<String>,
    // JSON-encoded FilterState
    filters: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    filters: Option<FilterState>,
    #[serde(default)]
    query: String,
    sort: Option<String>,
}

/// Unknown sort names leave the order untouched.
pub fn parse_sort(sort: Option<&str>) -> Option<SortKey> {
    let name = sort.map(str::trim).filter(|s| !s.is_empty())?;
    let key = SortKey::parse(name);
    if key.is_none() {
        tracing::debug!(sort = name, "Unrecognized sort key; keeping incoming order");
    }
    key
}

pub fn run_inventory(app_state: &AppState, filters: &FilterState, query: &str, sort: Option<SortKey>) -> InventoryResponse {
    let result = pipeline::run(&app_state.catalog, filters, query, sort, &app_state.matcher);
    let view = InventoryView::build(&result, filters.active_filter_count(&app_state.defaults));
    tracing::info!(total = view.total, match_kind = ?view.match_kind, "Inventory query served");
    InventoryResponse::new(view, query)
}

// --- API Handlers ---

pub async fn list_inventory(
    State(app_state): State<AppState>,
    Query(params): Query<InventoryParams>,
) -> AppResult<impl IntoResponse> {
    let filters = match params.filters.as_deref() {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str::<FilterState>(raw)
            .map_err(|e| AppError::BadRequest(format!("Invalid filters parameter: {}", e)))?,
        _ => (*app_state.defaults).clone(),
    };
    let query = params.q.unwrap_or_default();
    let sort = parse_sort(params.sort.as_deref());
    Ok(Json(run_inventory(&app_state, &filters, &query, sort)))
}

pub async fn search_inventory(
    State(app_state): State<AppState>,
    JsonExtract(request): JsonExtract<SearchRequest>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("Search request: {:?}", request);
    let filters = request.filters.unwrap_or_else(|| (*app_state.defaults).clone());
    let sort = parse_sort(request.sort.as_deref());
    Ok(Json(run_inventory(&app_state, &filters, &request.query, sort)))
}

pub async fn get_bounds(State(app_state): State<AppState>) -> impl IntoResponse {
    Json((*app_state.defaults).clone())
}

pub async fn get_vehicle(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    app_state
        .catalog
        .iter()
        .find(|v| v.slug == slug)
        .map(|v| Json(VehicleDetail::from(v)))
        .ok_or_else(|| AppError::NotFound(format!("No vehicle with slug '{}'", slug)))
}
