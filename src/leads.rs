// Lead-capture forms: validation and hand-off to the dealership backend

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeadError {
    #[error("name is required")]
    MissingName,
    #[error("phone number {0:?} is not a valid 10-digit mobile number")]
    InvalidPhone(String),
    #[error("email address {0:?} is not valid")]
    InvalidEmail(String),
    #[error("email address is required for this form")]
    MissingEmail,
    #[error("field `{0}` is required")]
    MissingField(&'static str),
    #[error("year {0} is outside the accepted range")]
    InvalidYear(u32),
    #[error("preferred date {0} is in the past")]
    DateInPast(NaiveDate),
    #[error("`{0}` must be greater than zero")]
    NotPositive(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Form-specific fields, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LeadForm {
    #[serde(rename_all = "camelCase")]
    Contact { message: String },
    #[serde(rename_all = "camelCase")]
    SellYourCar {
        brand: String,
        model: String,
        year: u32,
        mileage: String,
        expected_price: Option<String>,
        city: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ScheduleViewing {
        vehicle_id: String,
        preferred_date: NaiveDate,
        preferred_time: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    FinanceApplication {
        vehicle_id: Option<String>,
        loan_amount: u64,
        tenure_months: u32,
        employment_type: String,
        monthly_income: u64,
    },
    // Empty-state "couldn't find your car" prompt
    #[serde(rename_all = "camelCase")]
    CarRequest {
        brand: Option<String>,
        model: Option<String>,
        budget: Option<String>,
        search_query: Option<String>,
    },
}

impl LeadForm {
    pub fn kind(&self) -> &'static str {
        match self {
            LeadForm::Contact { .. } => "contact",
            LeadForm::SellYourCar { .. } => "sellYourCar",
            LeadForm::ScheduleViewing { .. } => "scheduleViewing",
            LeadForm::FinanceApplication { .. } => "financeApplication",
            LeadForm::CarRequest { .. } => "carRequest",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    #[serde(flatten)]
    pub contact: ContactDetails,
    #[serde(flatten)]
    pub form: LeadForm,
}

/// A submission that passed validation, stamped for forwarding.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedLead {
    pub reference: String,
    pub received_at: DateTime<Utc>,
    #[serde(flatten)]
    pub submission: LeadSubmission,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeadReceipt {
    pub accepted: bool,
    pub reference: String,
    pub forwarded: bool,
    pub message: String,
}

/// Strips spaces, dashes and a leading `+91`/`0`, then requires ten digits
/// starting 6-9.
pub fn normalize_phone(raw: &str) -> Result<String, LeadError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let local = match digits.len() {
        12 if digits.starts_with("91") => &digits[2..],
        11 if digits.starts_with('0') => &digits[1..],
        _ => digits.as_str(),
    };
    let valid = local.len() == 10 && local.starts_with(['6', '7', '8', '9']);
    if valid && raw.chars().all(|c| c.is_ascii_digit() || " +-()".contains(c)) {
        Ok(local.to_string())
    } else {
        Err(LeadError::InvalidPhone(raw.to_string()))
    }
}

fn validate_email(raw: &str) -> Result<String, LeadError> {
    let email = raw.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email.to_lowercase())
    } else {
        Err(LeadError::InvalidEmail(raw.to_string()))
    }
}

fn require(value: &str, field: &'static str) -> Result<(), LeadError> {
    if value.trim().is_empty() {
        Err(LeadError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Checks and normalizes a submission. `today` bounds viewing dates and
/// registration years.
pub fn validate(mut submission: LeadSubmission, today: NaiveDate) -> Result<LeadSubmission, LeadError> {
    let name = submission.contact.name.trim().to_string();
    if name.is_empty() {
        return Err(LeadError::MissingName);
    }
    submission.contact.name = name;
    submission.contact.phone = normalize_phone(&submission.contact.phone)?;
    let email = match submission.contact.email.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(email) => Some(validate_email(email)?),
    };
    submission.contact.email = email;

    match &submission.form {
        LeadForm::Contact { message } => require(message, "message")?,
        LeadForm::SellYourCar {
            brand,
            model,
            year,
            mileage,
            ..
        } => {
            require(brand, "brand")?;
            require(model, "model")?;
            require(mileage, "mileage")?;
            let newest = u32::try_from(today.year()).unwrap_or(u32::MAX).saturating_add(1);
            if *year < 1950 || *year > newest {
                return Err(LeadError::InvalidYear(*year));
            }
        }
        LeadForm::ScheduleViewing {
            vehicle_id,
            preferred_date,
            ..
        } => {
            require(vehicle_id, "vehicleId")?;
            if *preferred_date < today {
                return Err(LeadError::DateInPast(*preferred_date));
            }
        }
        LeadForm::FinanceApplication {
            loan_amount,
            tenure_months,
            employment_type,
            monthly_income,
            ..
        } => {
            if submission.contact.email.is_none() {
                return Err(LeadError::MissingEmail);
            }
            require(employment_type, "employmentType")?;
            if *loan_amount == 0 {
                return Err(LeadError::NotPositive("loanAmount"));
            }
            if *tenure_months == 0 {
                return Err(LeadError::NotPositive("tenureMonths"));
            }
            if *monthly_income == 0 {
                return Err(LeadError::NotPositive("monthlyIncome"));
            }
        }
        LeadForm::CarRequest { .. } => {}
    }

    Ok(submission)
}

impl ValidatedLead {
    pub fn stamp(submission: LeadSubmission, received_at: DateTime<Utc>) -> Self {
        let reference = format!(
            "LD-{}-{}",
            received_at.format("%Y%m%d%H%M%S%3f"),
            submission.form.kind()
        );
        ValidatedLead {
            reference,
            received_at,
            submission,
        }
    }
}

/// Sends the lead to `{backend_url}/leads`. Without a backend the lead is
/// only logged.
pub async fn forward(client: &Client, backend_url: Option<&str>, lead: &ValidatedLead) -> Result<LeadReceipt> {
    let Some(base) = backend_url else {
        tracing::info!(
            reference = %lead.reference,
            kind = lead.submission.form.kind(),
            "No backend configured; lead logged only"
        );
        return Ok(LeadReceipt {
            accepted: true,
            reference: lead.reference.clone(),
            forwarded: false,
            message: "Thanks! Our team will get in touch shortly.".to_string(),
        });
    };

    let url = format!("{}/leads", base.trim_end_matches('/'));
    client
        .post(&url)
        .json(lead)
        .send()
        .await
        .with_context(|| format!("Failed to send lead {} to {}", lead.reference, url))?
        .error_for_status()
        .with_context(|| format!("Backend rejected lead {}", lead.reference))?;

    tracing::info!(reference = %lead.reference, kind = lead.submission.form.kind(), "Lead forwarded to backend");
    Ok(LeadReceipt {
        accepted: true,
        reference: lead.reference.clone(),
        forwarded: true,
        message: "Thanks! Our team will get in touch shortly.".to_string(),
    })
}
