use chrono::{Datelike, Month, NaiveDate};
use serde::Serialize;

/// One selectable entry of a filter: the stored token and its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub token: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(token: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            label: label.into(),
        }
    }
}

/// The fixed vocabulary of one logical filter.
///
/// Options are defined by the domain and never change at runtime.
pub trait FilterDomain {
    /// Stable identifier, also the unprefixed storage key.
    fn key(&self) -> &str;

    /// Enumerated options in display order.
    fn options(&self) -> &[FilterOption];

    /// Value adopted when storage holds nothing usable.
    fn default_value(&self, today: NaiveDate) -> String;

    fn accepts(&self, token: &str) -> bool {
        self.options().iter().any(|option| option.token == token)
    }

    fn label_for(&self, token: &str) -> Option<&str> {
        self.options()
            .iter()
            .find(|option| option.token == token)
            .map(|option| option.label.as_str())
    }
}

/// Calendar month selector: tokens `"1"` to `"12"`.
#[derive(Debug, Clone)]
pub struct MonthFilter {
    options: Vec<FilterOption>,
}

impl MonthFilter {
    pub const KEY: &'static str = "selectedMonth";

    pub fn new() -> Self {
        let options = (1u8..=12)
            .filter_map(|number| Month::try_from(number).ok().map(|month| (number, month)))
            .map(|(number, month)| FilterOption::new(number.to_string(), month.name()))
            .collect();
        Self { options }
    }
}

impl Default for MonthFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterDomain for MonthFilter {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn options(&self) -> &[FilterOption] {
        &self.options
    }

    fn default_value(&self, today: NaiveDate) -> String {
        today.month().to_string()
    }
}

/// Year selector over an inclusive, ascending range.
#[derive(Debug, Clone)]
pub struct YearFilter {
    first: i32,
    last: i32,
    options: Vec<FilterOption>,
}

impl YearFilter {
    pub const KEY: &'static str = "selectedYear";

    pub fn new(first: i32, last: i32) -> Self {
        let (first, last) = if first <= last { (first, last) } else { (last, first) };
        let options = (first..=last)
            .map(|year| FilterOption::new(year.to_string(), year.to_string()))
            .collect();
        Self { first, last, options }
    }

    /// The `count` years ending with the year of `today`.
    pub fn trailing(today: NaiveDate, count: u16) -> Self {
        let last = today.year();
        let span = i32::from(count.max(1)) - 1;
        Self::new(last - span, last)
    }

    pub fn first(&self) -> i32 {
        self.first
    }

    pub fn last(&self) -> i32 {
        self.last
    }
}

impl FilterDomain for YearFilter {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn options(&self) -> &[FilterOption] {
        &self.options
    }

    fn default_value(&self, today: NaiveDate) -> String {
        today.year().clamp(self.first, self.last).to_string()
    }
}
