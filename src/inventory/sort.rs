// Result ordering

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::Vehicle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "oldest")]
    Oldest,
    #[serde(rename = "priceHigh")]
    PriceHigh,
    #[serde(rename = "priceLow")]
    PriceLow,
    #[serde(rename = "brandAZ")]
    BrandAz,
    #[serde(rename = "brandZA")]
    BrandZa,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::PriceHigh,
        SortKey::PriceLow,
        SortKey::BrandAz,
        SortKey::BrandZa,
    ];

    /// Wire name as sent by the sort dropdown. Unknown names yield `None`,
    /// which leaves the list in its incoming order.
    pub fn parse(name: &str) -> Option<SortKey> {
        match name {
            "newest" => Some(SortKey::Newest),
            "oldest" => Some(SortKey::Oldest),
            "priceHigh" => Some(SortKey::PriceHigh),
            "priceLow" => Some(SortKey::PriceLow),
            "brandAZ" => Some(SortKey::BrandAz),
            "brandZA" => Some(SortKey::BrandZa),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::PriceHigh => "priceHigh",
            SortKey::PriceLow => "priceLow",
            SortKey::BrandAz => "brandAZ",
            SortKey::BrandZa => "brandZA",
        }
    }

    pub fn compare(self, a: &Vehicle, b: &Vehicle) -> Ordering {
        match self {
            SortKey::Newest => b.year.cmp(&a.year),
            SortKey::Oldest => a.year.cmp(&b.year),
            SortKey::PriceHigh => b.price.cmp(&a.price),
            SortKey::PriceLow => a.price.cmp(&b.price),
            SortKey::BrandAz => compare_brand(a, b),
            SortKey::BrandZa => compare_brand(b, a),
        }
    }
}

fn compare_brand(a: &Vehicle, b: &Vehicle) -> Ordering {
    a.brand.to_lowercase().cmp(&b.brand.to_lowercase())
}

/// Stable in-place sort; `None` is a no-op.
pub fn sort_vehicles(vehicles: &mut [&Vehicle], key: Option<SortKey>) {
    if let Some(key) = key {
        vehicles.sort_by(|a, b| key.compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;
    use proptest::prelude::*;

    fn ids(vehicles: &[&Vehicle]) -> Vec<String> {
        vehicles.iter().map(|v| v.id.clone()).collect()
    }

    #[test]
    fn price_high_puts_audi_before_bmw() {
        let catalog = vec![fixtures::bmw_3_series(), fixtures::audi_q5()];
        let mut list: Vec<&Vehicle> = catalog.iter().collect();
        sort_vehicles(&mut list, SortKey::parse("priceHigh"));
        assert_eq!(ids(&list), vec!["audi-1", "bmw-1"]);
    }

    #[test]
    fn comparator_table() {
        let catalog = fixtures::catalog();
        let cases = [
            ("newest", vec!["bmw-1", "merc-1", "audi-1", "porsche-1"]),
            ("oldest", vec!["porsche-1", "audi-1", "merc-1", "bmw-1"]),
            ("priceLow", vec!["bmw-1", "audi-1", "porsche-1", "merc-1"]),
            ("priceHigh", vec!["merc-1", "porsche-1", "audi-1", "bmw-1"]),
            ("brandAZ", vec!["audi-1", "bmw-1", "merc-1", "porsche-1"]),
            ("brandZA", vec!["porsche-1", "merc-1", "bmw-1", "audi-1"]),
        ];
        for (name, expected) in cases {
            let mut list: Vec<&Vehicle> = catalog.iter().collect();
            sort_vehicles(&mut list, SortKey::parse(name));
            assert_eq!(ids(&list), expected, "sort key {name}");
        }
    }

    #[test]
    fn unknown_key_is_a_no_op() {
        let catalog = fixtures::catalog();
        let mut list: Vec<&Vehicle> = catalog.iter().collect();
        sort_vehicles(&mut list, SortKey::parse("mileageLow"));
        assert_eq!(ids(&list), vec!["bmw-1", "audi-1", "merc-1", "porsche-1"]);
    }

    #[test]
    fn equal_keys_keep_incoming_order() {
        let catalog = vec![
            fixtures::vehicle("first", "BMW", "X1", 2021, 10),
            fixtures::vehicle("second", "BMW", "X3", 2021, 20),
            fixtures::vehicle("third", "Audi", "A6", 2021, 30),
        ];
        let mut list: Vec<&Vehicle> = catalog.iter().collect();
        sort_vehicles(&mut list, Some(SortKey::Newest));
        assert_eq!(ids(&list), vec!["first", "second", "third"]);

        sort_vehicles(&mut list, Some(SortKey::BrandAz));
        assert_eq!(ids(&list), vec!["third", "first", "second"]);
    }

    #[test]
    fn wire_names_round_trip_through_parse() {
        for key in SortKey::ALL {
            assert_eq!(SortKey::parse(key.as_str()), Some(key));
        }
    }

    fn arb_catalog() -> impl Strategy<Value = Vec<Vehicle>> {
        let brands = prop::sample::select(vec!["BMW", "Audi", "Porsche", "Jaguar"]);
        prop::collection::vec((brands, 2015u32..2024, 1u64..10_000_000), 0..12).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (brand, year, price))| fixtures::vehicle(&format!("v{i}"), brand, "Model", year, price))
                .collect()
        })
    }

    proptest! {
        /// Property: sorting is a permutation of its input.
        #[test]
        fn sort_is_a_permutation(catalog in arb_catalog(), key in prop::sample::select(SortKey::ALL.to_vec())) {
            let mut list: Vec<&Vehicle> = catalog.iter().collect();
            sort_vehicles(&mut list, Some(key));

            let mut before: Vec<String> = catalog.iter().map(|v| v.id.clone()).collect();
            let mut after = ids(&list);
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        }

        /// Property: sorting an already sorted list changes nothing.
        #[test]
        fn sort_is_idempotent(catalog in arb_catalog(), key in prop::sample::select(SortKey::ALL.to_vec())) {
            let mut once: Vec<&Vehicle> = catalog.iter().collect();
            sort_vehicles(&mut once, Some(key));
            let mut twice = once.clone();
            sort_vehicles(&mut twice, Some(key));
            prop_assert_eq!(ids(&once), ids(&twice));
        }
    }
}
