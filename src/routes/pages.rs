// Server-rendered inventory page

use askama::Template;
use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;
use std::collections::BTreeSet;

use super::{
    api::{parse_sort, run_inventory},
    leads::accept_lead,
};
use crate::{
    AppState,
    error::{AppError, AppResult},
    inventory::{MatchKind, SortKey},
    leads::{ContactDetails, LeadForm, LeadSubmission},
    models::VehicleCard,
};

struct SortOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

struct BrandOption {
    name: String,
    selected: bool,
}

#[derive(Template)]
#[template(path = "inventory.html")]
struct InventoryTemplate {
    query: String,
    cards: Vec<VehicleCard>,
    total: usize,
    fuzzy: bool,
    show_prompt: bool,
    prompt_title: String,
    prompt_message: String,
    requested: bool,
    brands: Vec<BrandOption>,
    sort_options: Vec<SortOption>,
}

#[derive(Deserialize, Debug, Default)]
pub struct PageParams {
    q: Option<String>,
    sort: Option<String>,
    brand: Option<String>,
    requested: Option<String>,
}

fn sort_label(key: SortKey) -> &'static str {
    match key {
        SortKey::Newest => "Newest first",
        SortKey::Oldest => "Oldest first",
        SortKey::PriceHigh => "Price: high to low",
        SortKey::PriceLow => "Price: low to high",
        SortKey::BrandAz => "Brand: A to Z",
        SortKey::BrandZa => "Brand: Z to A",
    }
}

pub async fn inventory_page(
    State(app_state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    let query = params.q.unwrap_or_default();
    let sort = parse_sort(params.sort.as_deref());
    let brand = params.brand.map(|b| b.trim().to_string()).filter(|b| !b.is_empty());

    let mut filters = (*app_state.defaults).clone();
    if let Some(brand) = &brand {
        filters.brand = vec![brand.clone()];
    }
    let response = run_inventory(&app_state, &filters, &query, sort);

    let brands: BTreeSet<&str> = app_state.catalog.iter().map(|v| v.brand.as_str()).collect();
    let template = InventoryTemplate {
        total: response.view.total,
        fuzzy: response.view.match_kind == MatchKind::Fuzzy,
        show_prompt: response.empty_state.is_some(),
        prompt_title: response.empty_state.as_ref().map(|p| p.title.clone()).unwrap_or_default(),
        prompt_message: response.empty_state.as_ref().map(|p| p.message.clone()).unwrap_or_default(),
        cards: response.view.vehicles,
        requested: params.requested.is_some(),
        brands: brands
            .into_iter()
            .map(|name| BrandOption {
                selected: brand.as_deref() == Some(name),
                name: name.to_string(),
            })
            .collect(),
        sort_options: SortKey::ALL
            .iter()
            .map(|key| SortOption {
                value: key.as_str(),
                label: sort_label(*key),
                selected: sort == Some(*key),
            })
            .collect(),
        query,
    };

    match template.render() {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            tracing::error!("Failed to render inventory template: {}", e);
            Err(AppError::InternalServerError(anyhow::Error::new(e)))
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct CarRequestForm {
    name: String,
    phone: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    budget: String,
    #[serde(default)]
    search_query: String,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Handles the empty-state form posted from the inventory page.
pub async fn submit_car_request(
    State(app_state): State<AppState>,
    Form(form): Form<CarRequestForm>,
) -> AppResult<Redirect> {
    let submission = LeadSubmission {
        contact: ContactDetails {
            name: form.name,
            phone: form.phone,
            email: non_empty(form.email),
        },
        form: LeadForm::CarRequest {
            brand: non_empty(form.brand),
            model: non_empty(form.model),
            budget: non_empty(form.budget),
            search_query: non_empty(form.search_query),
        },
    };
    let receipt = accept_lead(&app_state, submission).await?;
    tracing::info!("Car request {} accepted from inventory page", receipt.reference);
    Ok(Redirect::to("/inventory?requested=1"))
}
