// EMI calculator endpoint

use axum::{extract::Json as JsonExtract, response::Json};

use crate::{
    error::AppResult,
    finance::{self, EmiBreakdown, EmiRequest},
};

pub async fn calculate_emi(JsonExtract(request): JsonExtract<EmiRequest>) -> AppResult<Json<EmiBreakdown>> {
    tracing::info!(
        price = request.price,
        down_payment = request.down_payment,
        rate = request.annual_rate_percent,
        months = request.tenure_months,
        "API call: calculate_emi"
    );
    let breakdown = finance::calculate(&request)?;
    Ok(Json(breakdown))
}
