// Exact-match pass: a vehicle survives only if every active predicate holds.

use crate::inventory::filter_state::{FilterState, MultiField, RangeField, ScalarField};
use crate::models::Vehicle;

/// One constraint derived from a [`FilterState`] or the search text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate<'s> {
    OneOf {
        field: MultiField,
        values: &'s [String],
    },
    // Vehicle must carry every listed feature
    AllFeatures(&'s [String]),
    InRange {
        field: RangeField,
        min: u64,
        max: u64,
    },
    Equals {
        field: ScalarField,
        value: &'s str,
    },
    // Lowercased needle
    Text(String),
}

impl Predicate<'_> {
    pub fn holds(&self, vehicle: &Vehicle) -> bool {
        match self {
            Predicate::OneOf { field, values } => match field.attribute(vehicle) {
                Some(attr) => values.iter().any(|v| *v == attr),
                None => false,
            },
            Predicate::AllFeatures(wanted) => wanted
                .iter()
                .all(|feature| vehicle.features.iter().any(|f| f == feature)),
            Predicate::InRange { field, min, max } => {
                let value = field.attribute(vehicle);
                *min <= value && value <= *max
            }
            Predicate::Equals { field, value } => field.attribute(vehicle) == *value,
            Predicate::Text(needle) => search_haystack(vehicle).contains(needle.as_str()),
        }
    }
}

/// Brand, model, year, fuel type and transmission joined for substring search.
pub fn search_haystack(vehicle: &Vehicle) -> String {
    format!(
        "{} {} {} {} {}",
        vehicle.brand, vehicle.model, vehicle.year, vehicle.fuel_type, vehicle.transmission
    )
    .to_lowercase()
}

/// Collects the predicates that constrain the result. Ranges always apply;
/// empty selections and blank text are skipped.
pub fn active_predicates<'s>(state: &'s FilterState, query: &str) -> Vec<Predicate<'s>> {
    let mut predicates = Vec::new();

    for field in MultiField::ALL {
        let values = state.multi(field);
        if values.is_empty() {
            continue;
        }
        if field == MultiField::Features {
            predicates.push(Predicate::AllFeatures(values));
        } else {
            predicates.push(Predicate::OneOf { field, values });
        }
    }

    for field in RangeField::ALL {
        let (min, max) = state.range(field);
        predicates.push(Predicate::InRange { field, min, max });
    }

    for field in ScalarField::ALL {
        if let Some(value) = state.scalar(field) {
            predicates.push(Predicate::Equals { field, value });
        }
    }

    let query = query.trim();
    if !query.is_empty() {
        predicates.push(Predicate::Text(query.to_lowercase()));
    }

    predicates
}

/// Vehicles satisfying every active predicate, in catalog order.
pub fn filter_exact<'a>(vehicles: &'a [Vehicle], state: &FilterState, query: &str) -> Vec<&'a Vehicle> {
    let predicates = active_predicates(state, query);
    vehicles
        .iter()
        .filter(|v| predicates.iter().all(|p| p.holds(v)))
        .collect()
}
