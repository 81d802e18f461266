// Route definitions

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use serde_json::json;

use crate::AppState;

mod api;
mod finance;
mod leads;
mod pages;
mod sessions;

pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/inventory", get(api::list_inventory))
        .route("/inventory/search", post(api::search_inventory))
        .route("/inventory/bounds", get(api::get_bounds))
        .route("/inventory/:slug", get(api::get_vehicle))
        .route("/sessions", post(sessions::create_session))
        .route("/sessions/:id", get(sessions::get_session_view))
        .route("/sessions/:id/actions", post(sessions::apply_action))
        .route("/sessions/:id/events", get(sessions::session_events))
        .route("/finance/emi", post(finance::calculate_emi))
        .route("/leads", post(leads::submit_lead))
        .with_state(app_state.clone());

    Router::new()
        .route("/", get(|| async { Redirect::to("/inventory") }))
        .route("/inventory", get(pages::inventory_page))
        .route("/leads/car-request", post(pages::submit_car_request))
        .route("/healthz", get(health))
        .nest("/api", api_router)
        .with_state(app_state)
}

async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "vehicles": app_state.catalog.len() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Settings, models::fixtures};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(Settings::for_tests(), reqwest::Client::new(), fixtures::catalog());
        create_router(state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn ids(body: &Value) -> Vec<String> {
        body["vehicles"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn lists_whole_catalog_by_default() {
        let (status, body) = send(app(), get("/api/inventory")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 4);
        assert_eq!(body["matchKind"], "exact");
        assert_eq!(body["activeFilterCount"], 0);
        assert!(body["emptyState"].is_null());
    }

    #[tokio::test]
    async fn search_applies_filters_and_sort() {
        let request = post_json(
            "/api/inventory/search",
            json!({ "filters": { "bodyType": ["SUV"] }, "sort": "priceHigh" }),
        );
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec!["merc-1", "porsche-1", "audi-1"]);
        assert_eq!(body["activeFilterCount"], 1);
    }

    #[tokio::test]
    async fn query_string_filters_are_parsed() {
        let uri = "/api/inventory?q=bmw&filters=%7B%22brand%22%3A%5B%22BMW%22%5D%7D";
        let (status, body) = send(app(), get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec!["bmw-1"]);
    }

    #[tokio::test]
    async fn malformed_filters_are_a_bad_request() {
        let (status, body) = send(app(), get("/api/inventory?filters=not-json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("filters"));
    }

    #[tokio::test]
    async fn no_match_returns_empty_state_prompt() {
        let (status, body) = send(app(), get("/api/inventory?q=Beemer")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
        assert_eq!(body["matchKind"], "none");
        assert_eq!(body["emptyState"]["leadKind"], "carRequest");
        assert_eq!(body["emptyState"]["searchQuery"], "Beemer");
    }

    #[tokio::test]
    async fn misspelling_falls_back_to_fuzzy() {
        let (_, body) = send(app(), get("/api/inventory?q=Mercedez")).await;
        assert_eq!(body["matchKind"], "fuzzy");
        assert_eq!(ids(&body), vec!["merc-1"]);
    }

    #[tokio::test]
    async fn vehicle_detail_by_slug() {
        let slug = fixtures::audi_q5().slug;
        let (status, body) = send(app(), get(&format!("/api/inventory/{slug}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "audi-1");
        assert_eq!(body["price"], "₹45,00,000");

        let (status, _) = send(app(), get("/api/inventory/no-such-car")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bounds_reflect_catalog() {
        let (_, body) = send(app(), get("/api/inventory/bounds")).await;
        assert_eq!(body["yearMin"], 2019);
        assert_eq!(body["yearMax"], 2022);
    }

    #[tokio::test]
    async fn session_actions_update_the_view() {
        let app = app();
        let (status, created) = send(app.clone(), post_json("/api/sessions", json!({}))).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_u64().unwrap();

        let toggle = json!({ "type": "toggle", "field": "brand", "value": "Porsche" });
        let (status, view) = send(app.clone(), post_json(&format!("/api/sessions/{id}/actions"), toggle)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&view), vec!["porsche-1"]);
        assert_eq!(view["filters"]["brand"], json!(["Porsche"]));

        let clear = json!({ "type": "clearAll" });
        let (_, view) = send(app.clone(), post_json(&format!("/api/sessions/{id}/actions"), clear)).await;
        assert_eq!(view["total"], 4);
        assert_eq!(view["filters"], created["filters"]);

        let (_, sorted) = send(app, get(&format!("/api/sessions/{id}?sort=oldest"))).await;
        assert_eq!(ids(&sorted)[0], "porsche-1");
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (status, _) = send(app(), get("/api/sessions/4242")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn emi_endpoint_validates() {
        let ok = json!({ "price": 1200000, "annualRatePercent": 0.0, "tenureMonths": 12, "includeSchedule": false });
        let (status, body) = send(app(), post_json("/api/finance/emi", ok)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["monthlyInstallment"], 100000.0);

        let bad = json!({ "price": 1000, "downPayment": 1000, "annualRatePercent": 9.0, "tenureMonths": 12 });
        let (status, _) = send(app(), post_json("/api/finance/emi", bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn lead_submission_is_validated() {
        let lead = json!({ "kind": "carRequest", "name": "Kabir", "phone": "9811111111", "searchQuery": "Beemer" });
        let (status, body) = send(app(), post_json("/api/leads", lead)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["accepted"], true);
        assert_eq!(body["forwarded"], false);

        let bad = json!({ "kind": "contact", "name": "Kabir", "phone": "123", "message": "hi" });
        let (status, _) = send(app(), post_json("/api/leads", bad)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn viewing_request_needs_a_known_vehicle() {
        let lead = json!({
            "kind": "scheduleViewing",
            "name": "Ravi",
            "phone": "9123456789",
            "vehicleId": "no-such-car",
            "preferredDate": "2099-01-01"
        });
        let (status, body) = send(app(), post_json("/api/leads", lead)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("no-such-car"));
    }

    #[tokio::test]
    async fn car_request_form_redirects_back() {
        let request = Request::builder()
            .method("POST")
            .uri("/leads/car-request")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("name=Kabir&phone=9811111111&email=&brand=BMW&model=&budget=&search_query=Beemer"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/inventory?requested=1");
    }

    #[tokio::test]
    async fn inventory_page_renders_cards_or_prompt() {
        let response = app().oneshot(get("/inventory?brand=Audi")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
        assert!(html.contains("2020 Audi Q5"));
        assert!(!html.contains("2022 BMW 3 Series"));

        let response = app().oneshot(get("/inventory?q=Beemer")).await.unwrap();
        let html = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
        assert!(html.contains("find your car"));
    }

    #[tokio::test]
    async fn health_reports_catalog_size() {
        let (status, body) = send(app(), get("/healthz")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["vehicles"], 4);
    }
}
