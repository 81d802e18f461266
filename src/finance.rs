// EMI (equated monthly installment) calculator for the finance page

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_TENURE_MONTHS: u32 = 120;

#[derive(Debug, Error, PartialEq)]
pub enum FinanceError {
    #[error("vehicle price must be greater than zero")]
    ZeroPrice,
    #[error("down payment {down_payment} must be less than the price {price}")]
    DownPaymentTooLarge { down_payment: u64, price: u64 },
    #[error("tenure must be between 1 and 120 months, got {0}")]
    InvalidTenure(u32),
    #[error("annual interest rate must be a finite, non-negative percentage, got {0}")]
    InvalidRate(f64),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiRequest {
    pub price: u64,
    #[serde(default)]
    pub down_payment: u64,
    pub annual_rate_percent: f64,
    pub tenure_months: u32,
    #[serde(default = "default_true")]
    pub include_schedule: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub month: u32,
    pub installment: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmiBreakdown {
    pub loan_amount: u64,
    pub monthly_installment: f64,
    pub total_interest: f64,
    pub total_payable: f64,
    pub schedule: Vec<AmortizationRow>,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Standard reducing-balance EMI: `P·r·(1+r)^n / ((1+r)^n − 1)`, or `P/n`
/// when the rate is zero.
pub fn monthly_installment(principal: f64, annual_rate_percent: f64, months: u32) -> f64 {
    let n = f64::from(months);
    let r = annual_rate_percent / 12.0 / 100.0;
    // (1+r)^n - 1 via exp_m1 so tiny rates don't cancel to zero
    let growth_m1 = (n * r.ln_1p()).exp_m1();
    if r == 0.0 || growth_m1 <= 0.0 {
        return principal / n;
    }
    principal * r * (growth_m1 + 1.0) / growth_m1
}

pub fn calculate(request: &EmiRequest) -> Result<EmiBreakdown, FinanceError> {
    if request.price == 0 {
        return Err(FinanceError::ZeroPrice);
    }
    if request.down_payment >= request.price {
        return Err(FinanceError::DownPaymentTooLarge {
            down_payment: request.down_payment,
            price: request.price,
        });
    }
    if request.tenure_months == 0 || request.tenure_months > MAX_TENURE_MONTHS {
        return Err(FinanceError::InvalidTenure(request.tenure_months));
    }
    if !request.annual_rate_percent.is_finite() || request.annual_rate_percent < 0.0 {
        return Err(FinanceError::InvalidRate(request.annual_rate_percent));
    }

    let loan_amount = request.price - request.down_payment;
    let principal = loan_amount as f64;
    let emi = monthly_installment(principal, request.annual_rate_percent, request.tenure_months);
    let r = request.annual_rate_percent / 12.0 / 100.0;

    let mut schedule = Vec::new();
    let mut balance = principal;
    let mut total_paid = 0.0;
    for month in 1..=request.tenure_months {
        let interest = balance * r;
        // Last installment absorbs the floating-point remainder.
        let principal_part = if month == request.tenure_months {
            balance
        } else {
            emi - interest
        };
        let installment = principal_part + interest;
        balance -= principal_part;
        total_paid += installment;

        if request.include_schedule {
            schedule.push(AmortizationRow {
                month,
                installment: round2(installment),
                principal: round2(principal_part),
                interest: round2(interest),
                balance: round2(balance.max(0.0)),
            });
        }
    }

    Ok(EmiBreakdown {
        loan_amount,
        monthly_installment: round2(emi),
        total_interest: round2(total_paid - principal),
        total_payable: round2(total_paid),
        schedule,
    })
}
