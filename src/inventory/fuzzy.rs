// Approximate brand/model matching for when the exact pass finds nothing.
// Score: fewest edits turning the query into some substring of the field, over query length.

use crate::models::Vehicle;

pub const DEFAULT_THRESHOLD: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatcher {
    threshold: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        FuzzyMatcher::new(DEFAULT_THRESHOLD)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FuzzyHit<'a> {
    pub vehicle: &'a Vehicle,
    pub score: f64,
}

impl FuzzyMatcher {
    pub fn new(threshold: f64) -> Self {
        FuzzyMatcher {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Best (lowest) score of `query` against the vehicle's brand and model.
    pub fn score(&self, vehicle: &Vehicle, query: &str) -> f64 {
        let pattern: Vec<char> = query.trim().to_lowercase().chars().collect();
        substring_distance(&pattern, &vehicle.brand).min(substring_distance(&pattern, &vehicle.model))
    }

    /// Vehicles within the threshold, best match first. Equal scores keep
    /// catalog order.
    pub fn search<'a>(&self, vehicles: &'a [Vehicle], query: &str) -> Vec<FuzzyHit<'a>> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let mut hits: Vec<FuzzyHit<'a>> = vehicles
            .iter()
            .map(|vehicle| FuzzyHit {
                vehicle,
                score: self.score(vehicle, query),
            })
            .filter(|hit| hit.score <= self.threshold)
            .collect();
        hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        hits
    }
}

/// Normalized semi-global edit distance of `pattern` against any substring of `text`.
fn substring_distance(pattern: &[char], text: &str) -> f64 {
    if pattern.is_empty() {
        return 0.0;
    }
    let text: Vec<char> = text.to_lowercase().chars().collect();

    // Row 0 is all zeros: the match may start anywhere in the text.
    let mut prev = vec![0usize; text.len() + 1];
    let mut cur = vec![0usize; text.len() + 1];

    for (i, p) in pattern.iter().enumerate() {
        cur[0] = i + 1;
        for (j, t) in text.iter().enumerate() {
            let cost = if p == t { 0 } else { 1 };
            cur[j + 1] = (prev[j + 1] + 1).min(cur[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    // ...and may end anywhere.
    let edits = prev.iter().copied().min().unwrap_or(pattern.len());
    (edits as f64 / pattern.len() as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn exact_substring_scores_zero_anywhere_in_field() {
        assert_eq!(substring_distance(&chars("benz"), "Mercedes-Benz"), 0.0);
        assert_eq!(substring_distance(&chars("merc"), "Mercedes-Benz"), 0.0);
    }

    #[test]
    fn single_typo_scores_one_over_length() {
        let score = substring_distance(&chars("mercedez"), "Mercedes-Benz");
        assert!((score - 0.125).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn unrelated_text_scores_high() {
        assert!(substring_distance(&chars("beemer"), "BMW") > DEFAULT_THRESHOLD);
        assert!(substring_distance(&chars("tesla"), "Porsche") > DEFAULT_THRESHOLD);
    }

    #[test]
    fn misspelled_brand_surfaces_vehicle() {
        let catalog = fixtures::catalog();
        let hits = FuzzyMatcher::default().search(&catalog, "Mercedez");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].vehicle.id, "merc-1");
    }

    #[test]
    fn nickname_outside_threshold_finds_nothing() {
        let catalog = fixtures::catalog();
        assert!(FuzzyMatcher::default().search(&catalog, "Beemer").is_empty());
    }

    #[test]
    fn matches_model_as_well_as_brand() {
        let catalog = fixtures::catalog();
        let hits = FuzzyMatcher::default().search(&catalog, "Makan");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].vehicle.id, "porsche-1");
    }

    #[test]
    fn orders_by_ascending_distance() {
        let close = fixtures::vehicle("a", "Audi", "Q7", 2021, 1);
        let exact = fixtures::vehicle("b", "Audi", "A4", 2021, 1);
        let catalog = vec![close, exact];
        let hits = FuzzyMatcher::new(0.5).search(&catalog, "A4");
        let ids: Vec<&str> = hits.iter().map(|h| h.vehicle.id.as_str()).collect();
        // Both brands contain "a"; "A4" is exact on model.
        assert_eq!(ids, vec!["b", "a"]);
        assert!(hits[0].score <= hits[1].score);
    }

    #[test]
    fn blank_query_matches_nothing() {
        let catalog = fixtures::catalog();
        assert!(FuzzyMatcher::default().search(&catalog, "   ").is_empty());
    }
}
