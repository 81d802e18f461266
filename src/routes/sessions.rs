// Handlers for per-session filter stores

use axum::{
    extract::{Json as JsonExtract, Path, Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Json,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, sync::Arc};
use tokio::sync::broadcast::error::RecvError;

use super::api::{InventoryResponse, parse_sort};
use crate::{
    AppState,
    error::{AppError, AppResult},
    inventory::{FilterAction, FilterState, InventoryView},
    sessions::SessionId,
};

#[derive(Deserialize, Debug, Default)]
pub struct ViewParams {
    q: Option<String>,
    sort: Option<String>,
}

#[derive(Serialize)]
struct SessionCreated {
    id: SessionId,
    filters: FilterState,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView {
    id: SessionId,
    filters: FilterState,
    #[serde(flatten)]
    inventory: InventoryResponse,
}

fn session_not_found(id: SessionId) -> AppError {
    AppError::NotFound(format!("Session {} not found or expired", id))
}

fn session_view(id: SessionId, filters: Arc<FilterState>, view: Arc<InventoryView>, query: &str) -> SessionView {
    SessionView {
        id,
        filters: (*filters).clone(),
        inventory: InventoryResponse::new((*view).clone(), query),
    }
}

pub async fn create_session(State(app_state): State<AppState>) -> impl IntoResponse {
    let id = app_state.sessions.create(Arc::clone(&app_state.defaults)).await;
    (
        StatusCode::CREATED,
        Json(SessionCreated {
            id,
            filters: (*app_state.defaults).clone(),
        }),
    )
}

pub async fn get_session_view(
    State(app_state): State<AppState>,
    Path(id): Path<SessionId>,
    Query(params): Query<ViewParams>,
) -> AppResult<impl IntoResponse> {
    let query = params.q.unwrap_or_default();
    let sort = parse_sort(params.sort.as_deref());
    let (filters, view) = app_state
        .sessions
        .with_store(id, |store| {
            let view = store.view(&app_state.catalog, &query, sort, &app_state.matcher);
            (Arc::clone(store.state()), view)
        })
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(session_view(id, filters, view, &query)))
}

pub async fn apply_action(
    State(app_state): State<AppState>,
    Path(id): Path<SessionId>,
    Query(params): Query<ViewParams>,
    JsonExtract(action): JsonExtract<FilterAction>,
) -> AppResult<impl IntoResponse> {
    tracing::info!(session = id, ?action, "Applying filter action");
    let query = params.q.unwrap_or_default();
    let sort = parse_sort(params.sort.as_deref());
    let (filters, view) = app_state
        .sessions
        .with_store(id, |store| {
            store.apply(action);
            let view = store.view(&app_state.catalog, &query, sort, &app_state.matcher);
            (Arc::clone(store.state()), view)
        })
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(session_view(id, filters, view, &query)))
}

pub async fn session_events(
    State(app_state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let receiver = app_state
        .sessions
        .with_store(id, |store| store.subscribe())
        .await
        .ok_or_else(|| session_not_found(id))?;
    tracing::info!(session = id, "Event stream opened");

    let events = stream::unfold(receiver, move |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => match Event::default().event(event.name()).json_data(&event) {
                    Ok(sse) => return Some((Ok::<Event, Infallible>(sse), receiver)),
                    Err(e) => tracing::warn!(session = id, error = %e, "Failed to encode filter event"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(session = id, skipped, "Event stream lagged");
                }
                // Store dropped: session expired
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
