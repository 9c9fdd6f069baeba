//! Persisted single-value filters.
//!
//! A filter is a [`FilterDomain`] (key, enumerated options, default rule)
//! plus a [`FilterStore`] that hydrates its value from a
//! [`StorageProvider`](crate::storage::StorageProvider) once and mirrors every
//! change back to it.

mod clock;
mod domain;
mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{FilterDomain, FilterOption, MonthFilter, YearFilter};
pub use store::{FilterPhase, FilterStore, FilterView, Persistence, ValueSource};
