// Per-browser-session filter stores and their typed change notifications

use cached::{Cached, TimedSizedCache};
use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::{Mutex, broadcast};

use crate::inventory::{
    FilterAction, FilterState, FuzzyMatcher, InventoryView, MemoizedPipeline, SortKey,
    filter_state::MultiField, reduce,
};
use crate::models::Vehicle;

const EVENT_BUFFER: usize = 64;

/// Change notification scoped to one session's filter store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FilterEvent {
    #[serde(rename_all = "camelCase")]
    BrandSelected { brand: String },
    #[serde(rename_all = "camelCase")]
    BrandDeselected { brand: String },
    #[serde(rename_all = "camelCase")]
    Changed { active_filter_count: usize },
    Cleared,
}

impl FilterEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            FilterEvent::BrandSelected { .. } => "brandSelected",
            FilterEvent::BrandDeselected { .. } => "brandDeselected",
            FilterEvent::Changed { .. } => "changed",
            FilterEvent::Cleared => "cleared",
        }
    }
}

/// Owns one session's current [`FilterState`] and publishes a [`FilterEvent`]
/// for every action applied to it.
pub struct FilterStore {
    defaults: Arc<FilterState>,
    state: Arc<FilterState>,
    memo: MemoizedPipeline,
    events: broadcast::Sender<FilterEvent>,
}

impl FilterStore {
    pub fn new(defaults: Arc<FilterState>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        FilterStore {
            state: Arc::clone(&defaults),
            defaults,
            memo: MemoizedPipeline::default(),
            events,
        }
    }

    pub fn state(&self) -> &Arc<FilterState> {
        &self.state
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FilterEvent> {
        self.events.subscribe()
    }

    pub fn apply(&mut self, action: FilterAction) {
        let brand_toggle = match &action {
            FilterAction::Toggle {
                field: MultiField::Brand,
                value,
            } => Some(value.clone()),
            _ => None,
        };
        let cleared = matches!(action, FilterAction::ClearAll);

        let next = Arc::new(reduce(&self.state, action, &self.defaults));
        self.state = next;

        if let Some(brand) = brand_toggle {
            let event = if self.state.brand.contains(&brand) {
                FilterEvent::BrandSelected { brand }
            } else {
                FilterEvent::BrandDeselected { brand }
            };
            self.publish(event);
        }
        if cleared {
            self.publish(FilterEvent::Cleared);
        }
        self.publish(FilterEvent::Changed {
            active_filter_count: self.state.active_filter_count(&self.defaults),
        });
    }

    pub fn view(
        &mut self,
        catalog: &Arc<Vec<Vehicle>>,
        query: &str,
        sort: Option<SortKey>,
        matcher: &FuzzyMatcher,
    ) -> Arc<InventoryView> {
        self.memo
            .view(catalog, &self.state, &self.defaults, query, sort, matcher)
    }

    fn publish(&self, event: FilterEvent) {
        // No subscribers is the common case
        let _ = self.events.send(event);
    }
}

pub type SessionId = u64;

/// Expiring map of session id to [`FilterStore`].
pub struct SessionStore {
    sessions: Mutex<TimedSizedCache<SessionId, FilterStore>>,
    next_id: AtomicU64,
}

impl SessionStore {
    pub fn new(capacity: usize, ttl_secs: u64) -> Self {
        SessionStore {
            sessions: Mutex::new(TimedSizedCache::with_size_and_lifespan_and_refresh(
                capacity.max(1),
                ttl_secs,
                true,
            )),
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn create(&self, defaults: Arc<FilterState>) -> SessionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut sessions = self.sessions.lock().await;
        sessions.flush();
        sessions.cache_set(id, FilterStore::new(defaults));
        tracing::info!(session = id, live = sessions.cache_size(), "session created");
        id
    }

    /// Runs `f` against the session's store. `None` if the session is unknown or expired.
    pub async fn with_store<R>(&self, id: SessionId, f: impl FnOnce(&mut FilterStore) -> R) -> Option<R> {
        let mut sessions = self.sessions.lock().await;
        // Expired stores must drop so their event channels close
        sessions.flush();
        sessions.cache_get_mut(&id).map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::filter_state::{Bound, RangeField};
    use crate::models::fixtures;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn store() -> (Arc<Vec<Vehicle>>, FilterStore) {
        let catalog = Arc::new(fixtures::catalog());
        let defaults = Arc::new(FilterState::defaults_for(&catalog));
        (catalog, FilterStore::new(defaults))
    }

    fn toggle_brand(brand: &str) -> FilterAction {
        FilterAction::Toggle {
            field: MultiField::Brand,
            value: brand.to_string(),
        }
    }

    #[test]
    fn brand_toggles_publish_typed_events() {
        let (_, mut store) = store();
        let mut rx = store.subscribe();

        store.apply(toggle_brand("BMW"));
        store.apply(toggle_brand("BMW"));

        let received: Vec<FilterEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(
            received,
            vec![
                FilterEvent::BrandSelected { brand: "BMW".to_string() },
                FilterEvent::Changed { active_filter_count: 1 },
                FilterEvent::BrandDeselected { brand: "BMW".to_string() },
                FilterEvent::Changed { active_filter_count: 0 },
            ]
        );
    }

    #[test]
    fn clear_all_resets_and_announces() {
        let (_, mut store) = store();
        store.apply(FilterAction::SetRange {
            field: RangeField::Year,
            bound: Bound::Min,
            value: 2021,
        });
        let mut rx = store.subscribe();
        store.apply(FilterAction::ClearAll);

        assert_eq!(**store.state(), *store.defaults);
        assert_eq!(rx.try_recv().ok(), Some(FilterEvent::Cleared));
    }

    #[test]
    fn view_is_memoized_until_state_changes() {
        let (catalog, mut store) = store();
        let matcher = FuzzyMatcher::default();

        let first = store.view(&catalog, "", None, &matcher);
        let again = store.view(&catalog, "", None, &matcher);
        assert!(Arc::ptr_eq(&first, &again));

        store.apply(toggle_brand("Audi"));
        let filtered = store.view(&catalog, "", None, &matcher);
        assert_eq!(filtered.total, 1);
        assert_eq!(filtered.active_filter_count, 1);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let catalog = fixtures::catalog();
        let defaults = Arc::new(FilterState::defaults_for(&catalog));
        let sessions = SessionStore::new(8, 60);

        let a = sessions.create(Arc::clone(&defaults)).await;
        let b = sessions.create(Arc::clone(&defaults)).await;
        assert_ne!(a, b);

        sessions.with_store(a, |s| s.apply(toggle_brand("BMW"))).await.unwrap();
        let brands_b = sessions.with_store(b, |s| s.state().brand.clone()).await.unwrap();
        assert!(brands_b.is_empty());

        assert!(sessions.with_store(999, |_| ()).await.is_none());
    }

    #[tokio::test]
    async fn expired_session_closes_its_event_stream() {
        let defaults = Arc::new(FilterState::defaults_for(&fixtures::catalog()));
        let sessions = SessionStore::new(100, 1);

        let a = sessions.create(Arc::clone(&defaults)).await;
        let mut rx = sessions.with_store(a, |s| s.subscribe()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(2200)).await;
        for _ in 0..5 {
            sessions.create(Arc::clone(&defaults)).await;
        }

        let next = tokio::time::timeout(Duration::from_millis(300), rx.recv())
            .await
            .expect("receiver should not hang once the session expired");
        assert_eq!(next, Err(broadcast::error::RecvError::Closed));
        assert!(sessions.with_store(a, |_| ()).await.is_none());
    }
}
