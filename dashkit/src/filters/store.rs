use std::cell::RefCell;

use serde::Serialize;

use super::clock::{Clock, SystemClock};
use super::domain::{FilterDomain, FilterOption};
use crate::errors::FilterError;
use crate::keys::KeyContext;
use crate::storage::StorageProvider;

/// Observable lifecycle of a [`FilterStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPhase {
    /// Storage has not been consulted; no value is available.
    Uninitialized,
    /// Storage is being read. Only observable from inside a provider call.
    Hydrating,
    /// A value is present and writes are accepted.
    Ready,
}

/// Where the value adopted by [`FilterStore::hydrate`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Stored,
    Defaulted,
    /// Hydration had already run; nothing changed.
    AlreadyReady,
}

/// Whether a value reached durable storage.
///
/// The in-memory value is authoritative either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    Persisted,
    MemoryOnly,
}

/// What a selector binding reads: the current token (if any) and the options.
///
/// `value` is `None` before hydration. Bindings must render no selection in
/// that case rather than guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterView {
    pub key: String,
    pub value: Option<String>,
    pub options: Vec<FilterOption>,
}

#[derive(Debug)]
enum State {
    Uninitialized,
    Hydrating,
    Ready(String),
}

/// Owns one filter value, hydrates it once from storage and mirrors every
/// change back to storage.
///
/// The store is meant for a single UI thread: it uses `RefCell` and is shared
/// between consumers by reference (`&FilterStore` or `Rc<FilterStore>`).
/// [`hydrate`](Self::hydrate) must only be called once the scope can reach
/// durable storage, never during a pre-render pass; until then
/// [`current_value`](Self::current_value) stays `None` so both renders agree.
pub struct FilterStore<D, S, C = SystemClock> {
    domain: D,
    storage: S,
    clock: C,
    storage_key: String,
    state: RefCell<State>,
}

impl<D, S> FilterStore<D, S, SystemClock>
where
    D: FilterDomain,
    S: StorageProvider,
{
    pub fn new(domain: D, storage: S) -> Self {
        Self::with_clock(domain, storage, SystemClock)
    }
}

impl<D, S, C> FilterStore<D, S, C>
where
    D: FilterDomain,
    S: StorageProvider,
    C: Clock,
{
    pub fn with_clock(domain: D, storage: S, clock: C) -> Self {
        let storage_key = domain.key().to_string();
        Self {
            domain,
            storage,
            clock,
            storage_key,
            state: RefCell::new(State::Uninitialized),
        }
    }

    /// Stores the value under a namespaced key.
    ///
    /// Meant to be called before hydrating. On a ready store the current value
    /// is written again under the new key so it is not left behind.
    pub fn with_keys(mut self, keys: &KeyContext) -> Self {
        let storage_key = keys.filter(self.domain.key());
        if storage_key == self.storage_key {
            return self;
        }
        log::debug!("filter '{}' now stored under '{storage_key}'", self.storage_key);
        self.storage_key = storage_key;
        if let Some(value) = self.current_value() {
            self.persist(&value);
        }
        self
    }

    pub fn key(&self) -> &str {
        self.domain.key()
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn options(&self) -> &[FilterOption] {
        self.domain.options()
    }

    pub fn phase(&self) -> FilterPhase {
        match &*self.state.borrow() {
            State::Uninitialized => FilterPhase::Uninitialized,
            State::Hydrating => FilterPhase::Hydrating,
            State::Ready(_) => FilterPhase::Ready,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == FilterPhase::Ready
    }

    /// Moves the store from `Uninitialized` to `Ready`. Runs at most once.
    ///
    /// A stored token the domain accepts wins; otherwise the domain default
    /// for today is used. Either way the adopted value is written back so it
    /// is durable from the first ready moment. Storage failures are logged
    /// and never abort hydration.
    pub fn hydrate(&self) -> ValueSource {
        {
            let mut state = self.state.borrow_mut();
            if !matches!(*state, State::Uninitialized) {
                return ValueSource::AlreadyReady;
            }
            *state = State::Hydrating;
        }

        let (value, source) = match self.storage.get(&self.storage_key) {
            Ok(Some(stored)) if self.domain.accepts(&stored) => (stored, ValueSource::Stored),
            Ok(Some(stored)) => {
                log::warn!(
                    "ignoring stored value {stored:?} for filter '{}': not a known option",
                    self.domain.key()
                );
                (self.default_value(), ValueSource::Defaulted)
            }
            Ok(None) => (self.default_value(), ValueSource::Defaulted),
            Err(err) => {
                log::warn!("could not read filter '{}' from storage: {err}", self.storage_key);
                (self.default_value(), ValueSource::Defaulted)
            }
        };

        log::debug!("filter '{}' hydrated to {value:?} ({source:?})", self.domain.key());
        self.persist(&value);
        *self.state.borrow_mut() = State::Ready(value);
        source
    }

    /// The adopted token, or `None` until hydration completes.
    pub fn current_value(&self) -> Option<String> {
        match &*self.state.borrow() {
            State::Ready(value) => Some(value.clone()),
            State::Uninitialized | State::Hydrating => None,
        }
    }

    /// Display label of the current token.
    pub fn selected_label(&self) -> Option<String> {
        let value = self.current_value()?;
        self.domain.label_for(&value).map(str::to_string)
    }

    /// Replaces the value and mirrors it to storage.
    ///
    /// Calls made before hydration are rejected with
    /// [`FilterError::NotHydrated`]; they are not queued. The in-memory update
    /// happens first and is kept even if the storage write fails.
    pub fn set_value(&self, value: impl Into<String>) -> Result<Persistence, FilterError> {
        let value = value.into();
        {
            let mut state = self.state.borrow_mut();
            let State::Ready(current) = &mut *state else {
                return Err(FilterError::NotHydrated {
                    key: self.domain.key().to_string(),
                });
            };
            if !self.domain.accepts(&value) {
                return Err(FilterError::InvalidValue {
                    key: self.domain.key().to_string(),
                    value,
                });
            }
            current.clone_from(&value);
        }
        Ok(self.persist(&value))
    }

    pub fn view(&self) -> FilterView {
        FilterView {
            key: self.domain.key().to_string(),
            value: self.current_value(),
            options: self.domain.options().to_vec(),
        }
    }

    fn default_value(&self) -> String {
        self.domain.default_value(self.clock.today())
    }

    fn persist(&self, value: &str) -> Persistence {
        match self.storage.set(&self.storage_key, value) {
            Ok(()) => Persistence::Persisted,
            Err(err) => {
                log::warn!("could not persist filter '{}': {err}", self.storage_key);
                Persistence::MemoryOnly
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use chrono::NaiveDate;

    use super::*;
    use crate::errors::{StorageError, StorageResult};
    use crate::filters::{FixedClock, MonthFilter, YearFilter};
    use crate::storage::MemoryStorage;

    fn june() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    /// Wraps a memory store and fails reads and/or writes on demand.
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_reads: Cell<bool>,
        fail_writes: Cell<bool>,
    }

    impl StorageProvider for FlakyStorage {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            if self.fail_reads.get() {
                return Err(StorageError::Denied { key: key.to_string() });
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            if self.fail_writes.get() {
                return Err(StorageError::QuotaExceeded { key: key.to_string() });
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn empty_storage_hydrates_to_current_month_and_persists_it() {
        let storage = MemoryStorage::new();
        let store = FilterStore::with_clock(MonthFilter::new(), &storage, june());

        assert_eq!(store.phase(), FilterPhase::Uninitialized);
        assert_eq!(store.current_value(), None);
        assert!(storage.is_empty());

        assert_eq!(store.hydrate(), ValueSource::Defaulted);
        assert_eq!(store.phase(), FilterPhase::Ready);
        assert_eq!(store.current_value().as_deref(), Some("6"));
        assert_eq!(storage.get("selectedMonth").unwrap().as_deref(), Some("6"));
    }

    #[test]
    fn stored_value_wins_over_default() {
        let storage = MemoryStorage::with_entries([("selectedMonth", "11")]);
        let store = FilterStore::with_clock(MonthFilter::new(), &storage, june());

        assert_eq!(store.hydrate(), ValueSource::Stored);
        assert_eq!(store.current_value().as_deref(), Some("11"));
        assert_eq!(store.selected_label().as_deref(), Some("November"));
    }

    #[test]
    fn unknown_stored_token_falls_back_to_default() {
        let storage = MemoryStorage::with_entries([("selectedMonth", "13")]);
        let store = FilterStore::with_clock(MonthFilter::new(), &storage, june());

        assert_eq!(store.hydrate(), ValueSource::Defaulted);
        assert_eq!(store.current_value().as_deref(), Some("6"));
        assert_eq!(storage.get("selectedMonth").unwrap().as_deref(), Some("6"));
    }

    #[test]
    fn hydration_fires_once() {
        let storage = MemoryStorage::new();
        let store = FilterStore::with_clock(MonthFilter::new(), &storage, june());
        store.hydrate();
        store.set_value("2").unwrap();

        storage.set("selectedMonth", "9").unwrap();
        assert_eq!(store.hydrate(), ValueSource::AlreadyReady);
        assert_eq!(store.current_value().as_deref(), Some("2"));
    }

    #[test]
    fn read_failure_degrades_to_default() {
        let storage = FlakyStorage::default();
        storage.inner.set("selectedMonth", "11").unwrap();
        storage.fail_reads.set(true);
        let store = FilterStore::with_clock(MonthFilter::new(), &storage, june());

        assert_eq!(store.hydrate(), ValueSource::Defaulted);
        assert_eq!(store.current_value().as_deref(), Some("6"));
        assert_eq!(storage.inner.get("selectedMonth").unwrap().as_deref(), Some("6"));
    }

    #[test]
    fn hydration_survives_write_failure() {
        let storage = FlakyStorage::default();
        storage.fail_writes.set(true);
        let store = FilterStore::with_clock(MonthFilter::new(), &storage, june());

        assert_eq!(store.hydrate(), ValueSource::Defaulted);
        assert_eq!(store.current_value().as_deref(), Some("6"));
        assert!(storage.inner.is_empty());
    }

    #[test]
    fn set_value_updates_memory_then_storage() {
        let storage = MemoryStorage::new();
        let store = FilterStore::with_clock(MonthFilter::new(), &storage, june());
        store.hydrate();

        assert_eq!(store.set_value("3"), Ok(Persistence::Persisted));
        assert_eq!(store.current_value().as_deref(), Some("3"));
        assert_eq!(storage.get("selectedMonth").unwrap().as_deref(), Some("3"));
    }

    #[test]
    fn failed_write_keeps_the_new_value() {
        let storage = FlakyStorage::default();
        let store = FilterStore::with_clock(MonthFilter::new(), &storage, june());
        store.hydrate();

        storage.fail_writes.set(true);
        assert_eq!(store.set_value("3"), Ok(Persistence::MemoryOnly));
        assert_eq!(store.current_value().as_deref(), Some("3"));
        assert_eq!(storage.inner.get("selectedMonth").unwrap().as_deref(), Some("6"));
    }

    #[test]
    fn writes_before_hydration_are_rejected() {
        let storage = MemoryStorage::new();
        let store = FilterStore::with_clock(MonthFilter::new(), &storage, june());

        assert_eq!(
            store.set_value("3"),
            Err(FilterError::NotHydrated {
                key: "selectedMonth".to_string()
            })
        );
        assert_eq!(store.current_value(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn invalid_tokens_are_rejected() {
        let storage = MemoryStorage::new();
        let store = FilterStore::with_clock(MonthFilter::new(), &storage, june());
        store.hydrate();

        let err = store.set_value("0").unwrap_err();
        assert!(matches!(err, FilterError::InvalidValue { ref value, .. } if value == "0"));
        assert_eq!(store.current_value().as_deref(), Some("6"));
    }

    #[test]
    fn consumers_sharing_a_store_see_the_same_value() {
        let storage = MemoryStorage::new();
        let store = Rc::new(FilterStore::with_clock(MonthFilter::new(), &storage, june()));
        let header = Rc::clone(&store);
        let sidebar = Rc::clone(&store);

        store.hydrate();
        header.set_value("8").unwrap();
        assert_eq!(sidebar.current_value().as_deref(), Some("8"));
    }

    #[test]
    fn view_hides_value_until_ready() {
        let storage = MemoryStorage::new();
        let store = FilterStore::with_clock(YearFilter::new(2020, 2024), &storage, june());

        let before = store.view();
        assert_eq!(before.value, None);
        assert_eq!(before.options.len(), 5);

        store.hydrate();
        let after = store.view();
        assert_eq!(after.key, "selectedYear");
        assert_eq!(after.value.as_deref(), Some("2024"));
    }

    #[test]
    fn namespaced_keys() {
        let storage = MemoryStorage::new();
        let store =
            FilterStore::with_clock(MonthFilter::new(), &storage, june()).with_keys(&KeyContext::new("sales"));
        store.hydrate();

        assert_eq!(store.storage_key(), "sales:selectedMonth");
        assert_eq!(storage.get("sales:selectedMonth").unwrap().as_deref(), Some("6"));
        assert_eq!(storage.get("selectedMonth").unwrap(), None);
    }

    #[test]
    fn rekeying_a_ready_store_carries_the_value_over() {
        let storage = MemoryStorage::new();
        let store = FilterStore::with_clock(MonthFilter::new(), &storage, june());
        store.hydrate();
        assert_eq!(store.set_value("9"), Ok(Persistence::Persisted));

        let store = store.with_keys(&KeyContext::new("sales"));

        assert!(store.is_ready());
        assert_eq!(store.current_value().as_deref(), Some("9"));
        assert_eq!(storage.get("sales:selectedMonth").unwrap().as_deref(), Some("9"));
        assert_eq!(store.set_value("10"), Ok(Persistence::Persisted));
        assert_eq!(storage.get("sales:selectedMonth").unwrap().as_deref(), Some("10"));
    }

    #[test]
    fn rekeying_before_hydration_writes_nothing() {
        let storage = MemoryStorage::new();
        let store =
            FilterStore::with_clock(MonthFilter::new(), &storage, june()).with_keys(&KeyContext::new("sales"));
        assert!(storage.is_empty());
        assert_eq!(store.phase(), FilterPhase::Uninitialized);
    }
}
