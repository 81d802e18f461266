// Inventory filter, fuzzy fallback and sort. Pure and synchronous; the HTTP layer owns state

pub mod exact;
pub mod filter_state;
pub mod fuzzy;
pub mod pipeline;
pub mod sort;

pub use filter_state::{FilterAction, FilterState, reduce};
pub use fuzzy::FuzzyMatcher;
pub use pipeline::{InventoryView, MatchKind, MemoizedPipeline};
pub use sort::SortKey;
