//! dashkit core library.
//!
//! Two pieces of dashboard behavior that are worth more than markup:
//! - [`dates`]: turn heterogeneous date text into `DD-MM-YYYY` without ever failing.
//! - [`filters`]: single-value filter stores that hydrate from durable storage
//!   exactly once and mirror every change back to it.
//!
//! Everything is synchronous and meant for a single UI thread.

pub mod dates;
pub mod errors;
pub mod filters;
pub mod keys;
pub mod scope;
pub mod storage;

pub use dates::{NOT_AVAILABLE, normalize};
pub use errors::*;
pub use filters::{
    Clock, FilterDomain, FilterOption, FilterPhase, FilterStore, FilterView, FixedClock, MonthFilter,
    Persistence, SystemClock, ValueSource, YearFilter,
};
pub use keys::KeyContext;
pub use scope::{DashboardFilters, MountReport};
pub use storage::{FileStorage, MemoryStorage, StorageProvider};
