use std::path::Path;

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use colored::Colorize;
use comfy_table::Cell;
use serde::Serialize;

use dashkit::{
    Clock, DashboardFilters, FileStorage, FilterDomain, FilterOption, FilterStore, Persistence,
    StorageProvider, SystemClock, ValueSource, YearFilter,
};

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::theme::{ICONS, THEME};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Inspect",
        commands: &[
            "dashkit filter show                   # Month and year with their options",
            "dashkit filter show month --output json",
        ],
    },
    ExampleGroup {
        title: "Change",
        commands: &[
            "dashkit filter set month 3            # Persist March",
            "dashkit filter set year 2023 --storage /tmp/filters.json",
        ],
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FilterName {
    Month,
    Year,
}

#[derive(Subcommand)]
pub enum FilterCommands {
    /// Hydrate the filters and show their values and options
    #[command(name = "show")]
    Show {
        /// Filter to show (optional, shows all if omitted)
        filter: Option<FilterName>,
    },

    /// Hydrate a filter, then persist a new value
    #[command(name = "set")]
    Set {
        /// Filter to change
        filter: FilterName,

        /// Option token, e.g. 3 for March or 2023
        value: String,
    },
}

#[derive(Debug, Serialize)]
struct FilterEntry {
    key: String,
    storage_key: String,
    value: Option<String>,
    label: Option<String>,
    source: &'static str,
    options: Vec<FilterOption>,
}

#[derive(Debug, Serialize)]
struct FilterReport {
    storage: String,
    filters: Vec<FilterEntry>,
}

impl TableDisplay for FilterReport {
    fn to_table(&self, manager: &OutputManager) -> comfy_table::Table {
        let mut table = manager.create_table();
        manager.add_table_header(&mut table, &["Filter", "Value", "Label", "Source", "Options"]);
        for entry in &self.filters {
            let options = entry
                .options
                .iter()
                .map(|option| {
                    if entry.value.as_deref() == Some(option.token.as_str()) {
                        let marked = format!("{}{}", ICONS.selected, option.token);
                        if manager.options.no_color {
                            marked
                        } else {
                            marked.color(THEME.highlight).to_string()
                        }
                    } else {
                        option.token.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            table.add_row(vec![
                Cell::new(&entry.key),
                Cell::new(entry.value.as_deref().unwrap_or("-")),
                Cell::new(entry.label.as_deref().unwrap_or("-")),
                Cell::new(entry.source),
                Cell::new(options),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.filters
            .iter()
            .map(|entry| format!("{}={}", entry.key, entry.value.as_deref().unwrap_or("")))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn source_name(source: ValueSource) -> &'static str {
    match source {
        ValueSource::Stored => "stored",
        ValueSource::Defaulted => "default",
        ValueSource::AlreadyReady => "memory",
    }
}

fn entry<D, S, C>(store: &FilterStore<D, S, C>, source: ValueSource) -> FilterEntry
where
    D: FilterDomain,
    S: StorageProvider,
    C: Clock,
{
    let view = store.view();
    FilterEntry {
        key: view.key,
        storage_key: store.storage_key().to_string(),
        value: view.value,
        label: store.selected_label(),
        source: source_name(source),
        options: view.options,
    }
}

pub fn handle_filter_commands(
    command: FilterCommands,
    storage_override: Option<&Path>,
    output: &OutputManager,
) -> Result<()> {
    let ctx = ProjectContext::find()?;
    if !ctx.is_initialized() {
        output.info("No .dashkit/config.toml found; using defaults.");
    }

    let storage = ctx.storage(storage_override)?;
    let years = YearFilter::trailing(SystemClock.today(), ctx.settings().filters.year_span);
    let filters = DashboardFilters::new(&storage, years).with_keys(&ctx.keys());
    let report = filters.mount();

    match command {
        FilterCommands::Show { filter } => {
            let mut entries = Vec::new();
            if filter != Some(FilterName::Year) {
                entries.push(entry(filters.month(), report.month));
            }
            if filter != Some(FilterName::Month) {
                entries.push(entry(filters.year(), report.year));
            }
            output.heading("Filters");
            output.display(&FilterReport {
                storage: storage.path().display().to_string(),
                filters: entries,
            })?;
        }
        FilterCommands::Set { filter, value } => {
            let persistence = match filter {
                FilterName::Month => set(filters.month(), &value)?,
                FilterName::Year => set(filters.year(), &value)?,
            };
            report_write(&storage, persistence, output);
        }
    }

    Ok(())
}

fn set<D, S, C>(store: &FilterStore<D, S, C>, value: &str) -> Result<Persistence>
where
    D: FilterDomain,
    S: StorageProvider,
    C: Clock,
{
    store.set_value(value).with_context(|| {
        let tokens: Vec<&str> = store.options().iter().map(|option| option.token.as_str()).collect();
        format!("Valid options: {}", tokens.join(", "))
    })
}

fn report_write(storage: &FileStorage, persistence: Persistence, output: &OutputManager) {
    match persistence {
        Persistence::Persisted => {
            output.success(&format!("Saved to {}", storage.path().display()));
        }
        Persistence::MemoryOnly => {
            output.warning(&format!(
                "Could not write {}; the change was not persisted",
                storage.path().display()
            ));
        }
    }
}
