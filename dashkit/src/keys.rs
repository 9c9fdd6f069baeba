/// Builds storage keys for filter values.
///
/// Without a namespace the filter key is used as-is, so a month filter lives
/// under `selectedMonth`. With one, keys take the form `namespace:selectedMonth`
/// and several dashboards can share a single backing store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyContext {
    namespace: Option<String>,
}

impl KeyContext {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            namespace: (!namespace.trim().is_empty()).then_some(namespace),
        }
    }

    pub fn bare() -> Self {
        Self::default()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn filter(&self, filter_key: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}:{filter_key}"),
            None => filter_key.to_string(),
        }
    }
}
