// Exact filter, fuzzy fallback, sort, and a single-entry memo over them

use serde::Serialize;
use std::sync::Arc;

use crate::inventory::{
    exact::filter_exact,
    filter_state::FilterState,
    fuzzy::FuzzyMatcher,
    sort::{SortKey, sort_vehicles},
};
use crate::models::{Vehicle, VehicleCard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    None,
}

#[derive(Debug)]
pub struct PipelineResult<'a> {
    pub vehicles: Vec<&'a Vehicle>,
    pub match_kind: MatchKind,
}

/// Runs the full pipeline. The fuzzy pass ignores `state` and only fires when
/// the exact pass is empty and `query` is not blank.
pub fn run<'a>(
    vehicles: &'a [Vehicle],
    state: &FilterState,
    query: &str,
    sort: Option<SortKey>,
    matcher: &FuzzyMatcher,
) -> PipelineResult<'a> {
    let query = query.trim();
    let mut matched = filter_exact(vehicles, state, query);
    let mut match_kind = MatchKind::Exact;
    tracing::debug!(exact = matched.len(), query, "exact pass");

    if matched.is_empty() {
        match_kind = MatchKind::None;
        if !query.is_empty() {
            matched = matcher
                .search(vehicles, query)
                .into_iter()
                .map(|hit| hit.vehicle)
                .collect();
            tracing::debug!(fuzzy = matched.len(), query, "fuzzy fallback");
            if !matched.is_empty() {
                match_kind = MatchKind::Fuzzy;
            }
        }
    }

    sort_vehicles(&mut matched, sort);
    PipelineResult {
        vehicles: matched,
        match_kind,
    }
}

/// Owned, presentation-ready result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryView {
    pub vehicles: Vec<VehicleCard>,
    pub total: usize,
    pub match_kind: MatchKind,
    pub active_filter_count: usize,
}

impl InventoryView {
    pub fn build(result: &PipelineResult<'_>, active_filter_count: usize) -> Self {
        let vehicles: Vec<VehicleCard> = result.vehicles.iter().map(|v| VehicleCard::from(*v)).collect();
        InventoryView {
            total: vehicles.len(),
            vehicles,
            match_kind: result.match_kind,
            active_filter_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

struct MemoKey {
    catalog: Arc<Vec<Vehicle>>,
    state: Arc<FilterState>,
    query: String,
    sort: Option<SortKey>,
}

impl MemoKey {
    fn matches(&self, catalog: &Arc<Vec<Vehicle>>, state: &Arc<FilterState>, query: &str, sort: Option<SortKey>) -> bool {
        Arc::ptr_eq(&self.catalog, catalog) && Arc::ptr_eq(&self.state, state) && self.query == query && self.sort == sort
    }
}

/// Caches the last view, keyed on catalog and state identity plus query and sort.
#[derive(Default)]
pub struct MemoizedPipeline {
    last: Option<(MemoKey, Arc<InventoryView>)>,
}

impl MemoizedPipeline {
    pub fn view(
        &mut self,
        catalog: &Arc<Vec<Vehicle>>,
        state: &Arc<FilterState>,
        defaults: &FilterState,
        query: &str,
        sort: Option<SortKey>,
        matcher: &FuzzyMatcher,
    ) -> Arc<InventoryView> {
        let query = query.trim();
        if let Some((key, view)) = &self.last {
            if key.matches(catalog, state, query, sort) {
                return Arc::clone(view);
            }
        }

        let result = run(catalog, state, query, sort, matcher);
        let view = Arc::new(InventoryView::build(&result, state.active_filter_count(defaults)));
        self.last = Some((
            MemoKey {
                catalog: Arc::clone(catalog),
                state: Arc::clone(state),
                query: query.to_string(),
                sort,
            },
            Arc::clone(&view),
        ));
        view
    }
}
