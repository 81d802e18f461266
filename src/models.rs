// Vehicle records: the raw wire shape, the normalized catalog shape, and the card sent to browsers

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A price or mileage as it arrives on the wire: either a display string
/// (`"₹35,00,000"`, `"12,500 km"`) or a bare number from the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DisplayNumber {
    Number(u64),
    // Some backends serialize amounts as `3500000.0`
    Float(f64),
    Text(String),
}

impl DisplayNumber {
    /// Keeps only the ASCII digits. `None` when there are none.
    fn canonical(&self) -> Option<u64> {
        match self {
            DisplayNumber::Number(n) => Some(*n),
            DisplayNumber::Float(f) if f.is_finite() && *f >= 0.0 && *f < u64::MAX as f64 => Some(f.round() as u64),
            DisplayNumber::Float(_) => None,
            DisplayNumber::Text(s) => parse_display_digits(s),
        }
    }
}

impl fmt::Display for DisplayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayNumber::Number(n) => write!(f, "{}", n),
            DisplayNumber::Float(x) => write!(f, "{}", x),
            DisplayNumber::Text(s) => f.write_str(s),
        }
    }
}

/// Strips currency symbols, separators and unit suffixes, then parses the digits.
pub fn parse_display_digits(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Vehicle price in whole rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(u64);

impl Price {
    pub fn new(rupees: u64) -> Self {
        Price(rupees)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Indian digit grouping: `₹35,00,000`.
    pub fn display(self) -> String {
        let digits = self.0.to_string();
        if digits.len() <= 3 {
            return format!("₹{}", digits);
        }
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            groups.push(&head[end - 2..end]);
            end -= 2;
        }
        groups.push(&head[..end]);
        groups.reverse();
        format!("₹{},{}", groups.join(","), tail)
    }
}

/// Odometer reading in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Odometer(u64);

impl Odometer {
    pub fn new(km: u64) -> Self {
        Odometer(km)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn display(self) -> String {
        let digits = self.0.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out.push_str(" km");
        out
    }
}

// Vehicle record as published by the backend / bundled data file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVehicle {
    pub id: String,
    pub slug: Option<String>,
    pub brand: String,
    pub model: String,
    pub variant: Option<String>,
    pub body_type: Option<String>,
    pub drive_type: Option<String>,
    pub condition: Option<String>,
    pub ownership: Option<String>,
    pub price: DisplayNumber,
    pub year: Option<u32>,
    pub mileage: DisplayNumber,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub seating: Option<u32>,
    pub color_exterior: Option<String>,
    pub color_interior: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub engine: Option<u32>, // displacement, cc
    pub horsepower: Option<u32>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("vehicle {id}: price {raw:?} has no digits")]
    MalformedPrice { id: String, raw: String },
    #[error("vehicle {id}: mileage {raw:?} has no digits")]
    MalformedMileage { id: String, raw: String },
    #[error("vehicle {id}: missing required field `{field}`")]
    MissingField { id: String, field: &'static str },
}

/// A normalized, read-only catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    pub id: String,
    pub slug: String,
    pub brand: String,
    pub model: String,
    pub variant: String,
    pub body_type: String,
    pub drive_type: String,
    pub condition: String,
    pub ownership: String,
    pub price: Price,
    pub year: u32,
    pub mileage: Odometer,
    pub fuel_type: String,
    pub transmission: String,
    pub seating: u32,
    pub color_exterior: String,
    pub color_interior: String,
    pub features: Vec<String>,
    pub engine: u32,
    pub horsepower: u32,
    pub images: Vec<String>,
}

impl TryFrom<RawVehicle> for Vehicle {
    type Error = RecordError;

    fn try_from(raw: RawVehicle) -> Result<Self, Self::Error> {
        let missing = |field: &'static str| RecordError::MissingField {
            id: raw.id.clone(),
            field,
        };

        let price = raw
            .price
            .canonical()
            .map(Price::new)
            .ok_or_else(|| RecordError::MalformedPrice {
                id: raw.id.clone(),
                raw: raw.price.to_string(),
            })?;
        let mileage = raw
            .mileage
            .canonical()
            .map(Odometer::new)
            .ok_or_else(|| RecordError::MalformedMileage {
                id: raw.id.clone(),
                raw: raw.mileage.to_string(),
            })?;
        let year = raw.year.ok_or_else(|| missing("year"))?;
        let seating = raw.seating.ok_or_else(|| missing("seating"))?;
        let engine = raw.engine.ok_or_else(|| missing("engine"))?;
        let horsepower = raw.horsepower.ok_or_else(|| missing("horsepower"))?;

        let slug = raw
            .slug
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| slugify(&[&raw.brand, &raw.model, &year.to_string(), &raw.id]));

        Ok(Vehicle {
            id: raw.id,
            slug,
            brand: raw.brand,
            model: raw.model,
            variant: raw.variant.unwrap_or_default(),
            body_type: raw.body_type.unwrap_or_default(),
            drive_type: raw.drive_type.unwrap_or_default(),
            condition: raw.condition.unwrap_or_default(),
            ownership: raw.ownership.unwrap_or_default(),
            price,
            year,
            mileage,
            fuel_type: raw.fuel_type.unwrap_or_default(),
            transmission: raw.transmission.unwrap_or_default(),
            seating,
            color_exterior: raw.color_exterior.unwrap_or_default(),
            color_interior: raw.color_interior.unwrap_or_default(),
            features: raw.features,
            engine,
            horsepower,
            images: raw.images,
        })
    }
}

fn slugify(parts: &[&str]) -> String {
    let joined = parts.join(" ").to_lowercase();
    joined
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

impl Vehicle {
    pub fn title(&self) -> String {
        if self.variant.is_empty() {
            format!("{} {} {}", self.year, self.brand, self.model)
        } else {
            format!("{} {} {} {}", self.year, self.brand, self.model, self.variant)
        }
    }
}

// Result card sent to the browser
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleCard {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub brand: String,
    pub model: String,
    pub variant: String,
    pub year: u32,
    pub price: String,
    pub price_value: u64,
    pub mileage: String,
    pub mileage_value: u64,
    pub fuel_type: String,
    pub transmission: String,
    pub body_type: String,
    pub ownership: String,
    pub image: Option<String>,
}

impl From<&Vehicle> for VehicleCard {
    fn from(v: &Vehicle) -> Self {
        VehicleCard {
            id: v.id.clone(),
            slug: v.slug.clone(),
            title: v.title(),
            brand: v.brand.clone(),
            model: v.model.clone(),
            variant: v.variant.clone(),
            year: v.year,
            price: v.price.display(),
            price_value: v.price.value(),
            mileage: v.mileage.display(),
            mileage_value: v.mileage.value(),
            fuel_type: v.fuel_type.clone(),
            transmission: v.transmission.clone(),
            body_type: v.body_type.clone(),
            ownership: v.ownership.clone(),
            image: v.images.first().cloned(),
        }
    }
}
