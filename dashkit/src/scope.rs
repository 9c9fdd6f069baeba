//! Composition root for a dashboard session's filters.

use crate::filters::{
    Clock, FilterStore, FilterView, MonthFilter, SystemClock, ValueSource, YearFilter,
};
use crate::keys::KeyContext;
use crate::storage::StorageProvider;

/// Outcome of [`DashboardFilters::mount`] per filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountReport {
    pub month: ValueSource,
    pub year: ValueSource,
}

/// The month and year stores of one dashboard session, sharing one storage
/// provider and clock. Build it once and hand out references.
pub struct DashboardFilters<S, C = SystemClock> {
    month: FilterStore<MonthFilter, S, C>,
    year: FilterStore<YearFilter, S, C>,
}

impl<S> DashboardFilters<S, SystemClock>
where
    S: StorageProvider + Clone,
{
    pub fn new(storage: S, years: YearFilter) -> Self {
        Self::with_clock(storage, SystemClock, years)
    }
}

impl<S, C> DashboardFilters<S, C>
where
    S: StorageProvider + Clone,
    C: Clock + Clone,
{
    pub fn with_clock(storage: S, clock: C, years: YearFilter) -> Self {
        Self {
            month: FilterStore::with_clock(MonthFilter::new(), storage.clone(), clock.clone()),
            year: FilterStore::with_clock(years, storage, clock),
        }
    }

    pub fn with_keys(self, keys: &KeyContext) -> Self {
        Self {
            month: self.month.with_keys(keys),
            year: self.year.with_keys(keys),
        }
    }

    /// Hydrates every filter. Call from the point where storage is reachable.
    pub fn mount(&self) -> MountReport {
        MountReport {
            month: self.month.hydrate(),
            year: self.year.hydrate(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.month.is_ready() && self.year.is_ready()
    }

    pub fn month(&self) -> &FilterStore<MonthFilter, S, C> {
        &self.month
    }

    pub fn year(&self) -> &FilterStore<YearFilter, S, C> {
        &self.year
    }

    pub fn views(&self) -> Vec<FilterView> {
        vec![self.month.view(), self.year.view()]
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::filters::FixedClock;
    use crate::storage::MemoryStorage;

    #[test]
    fn mount_hydrates_both_filters_from_one_storage() {
        let storage = MemoryStorage::with_entries([("selectedYear", "2022")]);
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());
        let filters = DashboardFilters::with_clock(&storage, clock, YearFilter::new(2020, 2024));

        assert!(!filters.is_ready());
        assert!(filters.views().iter().all(|view| view.value.is_none()));

        let report = filters.mount();
        assert_eq!(
            report,
            MountReport {
                month: ValueSource::Defaulted,
                year: ValueSource::Stored,
            }
        );
        assert!(filters.is_ready());
        assert_eq!(filters.month().current_value().as_deref(), Some("6"));
        assert_eq!(filters.year().current_value().as_deref(), Some("2022"));
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn second_mount_is_a_no_op() {
        let storage = MemoryStorage::new();
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());
        let filters = DashboardFilters::with_clock(&storage, clock, YearFilter::new(2020, 2024))
            .with_keys(&KeyContext::new("ops"));

        filters.mount();
        let report = filters.mount();
        assert_eq!(report.month, ValueSource::AlreadyReady);
        assert_eq!(report.year, ValueSource::AlreadyReady);
        assert_eq!(storage.get("ops:selectedYear").unwrap().as_deref(), Some("2024"));
    }
}
