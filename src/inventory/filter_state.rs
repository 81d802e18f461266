// Filter selections and the reducer producing a fresh state per interaction.
// Shared states are never mutated; callers hold them behind Arc so memoization keys on identity.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::models::Vehicle;

/// Every active filter selection. Empty lists and `None` scalars are
/// pass-through; ranges are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub brand: Vec<String>,
    pub model: Vec<String>,
    pub fuel_type: Vec<String>,
    pub transmission: Vec<String>,
    pub ownership: Vec<String>,
    pub body_type: Vec<String>,
    pub drive_type: Vec<String>,
    pub seating_capacity: Vec<String>,
    pub features: Vec<String>,

    pub price_min: u64,
    pub price_max: u64,
    pub year_min: u64,
    pub year_max: u64,
    pub mileage_min: u64,
    pub mileage_max: u64,
    pub engine_min: u64,
    pub engine_max: u64,
    pub horsepower_min: u64,
    pub horsepower_max: u64,

    pub color_exterior: Option<String>,
    pub color_interior: Option<String>,
    pub condition: Option<String>,
}

// Unbounded ranges: the identity filter for any catalog.
impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            brand: Vec::new(),
            model: Vec::new(),
            fuel_type: Vec::new(),
            transmission: Vec::new(),
            ownership: Vec::new(),
            body_type: Vec::new(),
            drive_type: Vec::new(),
            seating_capacity: Vec::new(),
            features: Vec::new(),
            price_min: 0,
            price_max: u64::MAX,
            year_min: 0,
            year_max: u64::MAX,
            mileage_min: 0,
            mileage_max: u64::MAX,
            engine_min: 0,
            engine_max: u64::MAX,
            horsepower_min: 0,
            horsepower_max: u64::MAX,
            color_exterior: None,
            color_interior: None,
            condition: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MultiField {
    Brand,
    Model,
    FuelType,
    Transmission,
    Ownership,
    BodyType,
    DriveType,
    SeatingCapacity,
    Features,
}

impl MultiField {
    pub const ALL: [MultiField; 9] = [
        MultiField::Brand,
        MultiField::Model,
        MultiField::FuelType,
        MultiField::Transmission,
        MultiField::Ownership,
        MultiField::BodyType,
        MultiField::DriveType,
        MultiField::SeatingCapacity,
        MultiField::Features,
    ];

    /// The single-valued vehicle attribute this field selects on.
    /// `Features` is set-valued and has no single attribute.
    pub fn attribute(self, vehicle: &Vehicle) -> Option<Cow<'_, str>> {
        let value = match self {
            MultiField::Brand => Cow::Borrowed(vehicle.brand.as_str()),
            MultiField::Model => Cow::Borrowed(vehicle.model.as_str()),
            MultiField::FuelType => Cow::Borrowed(vehicle.fuel_type.as_str()),
            MultiField::Transmission => Cow::Borrowed(vehicle.transmission.as_str()),
            MultiField::Ownership => Cow::Borrowed(vehicle.ownership.as_str()),
            MultiField::BodyType => Cow::Borrowed(vehicle.body_type.as_str()),
            MultiField::DriveType => Cow::Borrowed(vehicle.drive_type.as_str()),
            MultiField::SeatingCapacity => Cow::Owned(vehicle.seating.to_string()),
            MultiField::Features => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeField {
    Price,
    Year,
    Mileage,
    Engine,
    Horsepower,
}

impl RangeField {
    pub const ALL: [RangeField; 5] = [
        RangeField::Price,
        RangeField::Year,
        RangeField::Mileage,
        RangeField::Engine,
        RangeField::Horsepower,
    ];

    pub fn attribute(self, vehicle: &Vehicle) -> u64 {
        match self {
            RangeField::Price => vehicle.price.value(),
            RangeField::Year => u64::from(vehicle.year),
            RangeField::Mileage => vehicle.mileage.value(),
            RangeField::Engine => u64::from(vehicle.engine),
            RangeField::Horsepower => u64::from(vehicle.horsepower),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bound {
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarField {
    ColorExterior,
    ColorInterior,
    Condition,
}

impl ScalarField {
    pub const ALL: [ScalarField; 3] = [
        ScalarField::ColorExterior,
        ScalarField::ColorInterior,
        ScalarField::Condition,
    ];

    pub fn attribute(self, vehicle: &Vehicle) -> &str {
        match self {
            ScalarField::ColorExterior => &vehicle.color_exterior,
            ScalarField::ColorInterior => &vehicle.color_interior,
            ScalarField::Condition => &vehicle.condition,
        }
    }
}

/// One user interaction with the filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FilterAction {
    /// Add the value to a multi-select field, or remove it if already present.
    Toggle { field: MultiField, value: String },
    SetRange {
        field: RangeField,
        bound: Bound,
        value: u64,
    },
    SetScalar {
        field: ScalarField,
        value: Option<String>,
    },
    ClearAll,
}

impl FilterState {
    /// Defaults spanning the full data range of `vehicles`.
    /// An empty catalog yields unbounded ranges.
    pub fn defaults_for(vehicles: &[Vehicle]) -> Self {
        let mut state = FilterState::default();
        if vehicles.is_empty() {
            return state;
        }
        for field in RangeField::ALL {
            let (min, max) = vehicles
                .iter()
                .map(|v| field.attribute(v))
                .fold((u64::MAX, u64::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
            state.set_range(field, Bound::Min, min);
            state.set_range(field, Bound::Max, max);
        }
        state
    }

    pub fn multi(&self, field: MultiField) -> &[String] {
        match field {
            MultiField::Brand => &self.brand,
            MultiField::Model => &self.model,
            MultiField::FuelType => &self.fuel_type,
            MultiField::Transmission => &self.transmission,
            MultiField::Ownership => &self.ownership,
            MultiField::BodyType => &self.body_type,
            MultiField::DriveType => &self.drive_type,
            MultiField::SeatingCapacity => &self.seating_capacity,
            MultiField::Features => &self.features,
        }
    }

    fn multi_mut(&mut self, field: MultiField) -> &mut Vec<String> {
        match field {
            MultiField::Brand => &mut self.brand,
            MultiField::Model => &mut self.model,
            MultiField::FuelType => &mut self.fuel_type,
            MultiField::Transmission => &mut self.transmission,
            MultiField::Ownership => &mut self.ownership,
            MultiField::BodyType => &mut self.body_type,
            MultiField::DriveType => &mut self.drive_type,
            MultiField::SeatingCapacity => &mut self.seating_capacity,
            MultiField::Features => &mut self.features,
        }
    }

    /// Inclusive `(min, max)` for a range field.
    pub fn range(&self, field: RangeField) -> (u64, u64) {
        match field {
            RangeField::Price => (self.price_min, self.price_max),
            RangeField::Year => (self.year_min, self.year_max),
            RangeField::Mileage => (self.mileage_min, self.mileage_max),
            RangeField::Engine => (self.engine_min, self.engine_max),
            RangeField::Horsepower => (self.horsepower_min, self.horsepower_max),
        }
    }

    fn set_range(&mut self, field: RangeField, bound: Bound, value: u64) {
        let slot = match (field, bound) {
            (RangeField::Price, Bound::Min) => &mut self.price_min,
            (RangeField::Price, Bound::Max) => &mut self.price_max,
            (RangeField::Year, Bound::Min) => &mut self.year_min,
            (RangeField::Year, Bound::Max) => &mut self.year_max,
            (RangeField::Mileage, Bound::Min) => &mut self.mileage_min,
            (RangeField::Mileage, Bound::Max) => &mut self.mileage_max,
            (RangeField::Engine, Bound::Min) => &mut self.engine_min,
            (RangeField::Engine, Bound::Max) => &mut self.engine_max,
            (RangeField::Horsepower, Bound::Min) => &mut self.horsepower_min,
            (RangeField::Horsepower, Bound::Max) => &mut self.horsepower_max,
        };
        *slot = value;
    }

    pub fn scalar(&self, field: ScalarField) -> Option<&str> {
        match field {
            ScalarField::ColorExterior => self.color_exterior.as_deref(),
            ScalarField::ColorInterior => self.color_interior.as_deref(),
            ScalarField::Condition => self.condition.as_deref(),
        }
    }

    fn scalar_mut(&mut self, field: ScalarField) -> &mut Option<String> {
        match field {
            ScalarField::ColorExterior => &mut self.color_exterior,
            ScalarField::ColorInterior => &mut self.color_interior,
            ScalarField::Condition => &mut self.condition,
        }
    }

    /// Badge count: one per selected multi-select value, one per range
    /// narrowed inside `defaults`, one per set scalar.
    pub fn active_filter_count(&self, defaults: &FilterState) -> usize {
        let selected: usize = MultiField::ALL.iter().map(|f| self.multi(*f).len()).sum();
        let narrowed = RangeField::ALL
            .iter()
            .filter(|f| {
                let (min, max) = self.range(**f);
                let (default_min, default_max) = defaults.range(**f);
                min > default_min || max < default_max
            })
            .count();
        let scalars = ScalarField::ALL
            .iter()
            .filter(|f| self.scalar(**f).is_some())
            .count();
        selected + narrowed + scalars
    }
}

/// Applies one action to `state`, returning a fresh state. `defaults` is the
/// state restored by [`FilterAction::ClearAll`].
pub fn reduce(state: &FilterState, action: FilterAction, defaults: &FilterState) -> FilterState {
    match action {
        FilterAction::ClearAll => defaults.clone(),
        FilterAction::Toggle { field, value } => {
            let mut next = state.clone();
            let values = next.multi_mut(field);
            if let Some(pos) = values.iter().position(|v| *v == value) {
                values.remove(pos);
            } else {
                values.push(value);
            }
            next
        }
        FilterAction::SetRange {
            field,
            bound,
            value,
        } => {
            let mut next = state.clone();
            next.set_range(field, bound, value);
            next
        }
        FilterAction::SetScalar { field, value } => {
            let mut next = state.clone();
            *next.scalar_mut(field) = value;
            next
        }
    }
}
