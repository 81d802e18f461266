// Lead submission endpoint

use axum::{
    extract::{Json as JsonExtract, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;

use crate::{
    AppState,
    error::{AppError, AppResult},
    leads::{self, LeadForm, LeadReceipt, LeadSubmission, ValidatedLead},
};

/// Validates, stamps and forwards one submission.
pub async fn accept_lead(app_state: &AppState, submission: LeadSubmission) -> AppResult<LeadReceipt> {
    let now = Utc::now();
    let submission = leads::validate(submission, now.date_naive())?;

    if let LeadForm::ScheduleViewing { vehicle_id, .. } = &submission.form {
        if !app_state.catalog.iter().any(|v| v.id == *vehicle_id) {
            return Err(AppError::Validation(format!("Unknown vehicle '{}'", vehicle_id)));
        }
    }

    let lead = ValidatedLead::stamp(submission, now);
    let backend_url = app_state.settings.backend_url.as_deref();
    match leads::forward(&app_state.http_client, backend_url, &lead).await {
        Ok(receipt) => Ok(receipt),
        Err(e) => {
            tracing::error!("Failed to forward lead {}: {}", lead.reference, e);
            Err(AppError::InternalServerError(e.context("Failed to forward lead")))
        }
    }
}

pub async fn submit_lead(
    State(app_state): State<AppState>,
    JsonExtract(submission): JsonExtract<LeadSubmission>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("API call: submit_lead kind={}", submission.form.kind());
    let receipt = accept_lead(&app_state, submission).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
