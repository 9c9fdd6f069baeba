use std::io::BufRead;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Cell;
use serde::Serialize;

use dashkit::dates::{self, classify};

use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Normalize Dates",
        commands: &[
            "dashkit normalize 2024-06-07 07/06/2024       # Both print 07-06-2024",
            "dashkit normalize \"June 7, 2024\"              # Free-form text",
        ],
    },
    ExampleGroup {
        title: "Batch",
        commands: &["cut -d, -f3 export.csv | dashkit normalize --output compact"],
    },
];

#[derive(Args)]
pub struct NormalizeArgs {
    /// Date texts to normalize; lines are read from stdin when none are given
    inputs: Vec<String>,
}

#[derive(Debug, Serialize)]
struct NormalizedDate {
    input: String,
    shape: Option<&'static str>,
    output: String,
    parsed: bool,
}

#[derive(Debug, Serialize)]
struct NormalizeReport {
    dates: Vec<NormalizedDate>,
}

impl NormalizeReport {
    fn build(inputs: Vec<String>) -> Self {
        let rows = inputs
            .into_iter()
            .map(|input| {
                let output = dates::normalize(Some(&input));
                let (shape, parsed) = if input.is_empty() {
                    (None, false)
                } else {
                    (Some(classify(&input).as_str()), dates::parse_date(&input).is_some())
                };
                NormalizedDate {
                    input,
                    shape,
                    output,
                    parsed,
                }
            })
            .collect();
        Self { dates: rows }
    }
}

impl TableDisplay for NormalizeReport {
    fn to_table(&self, manager: &OutputManager) -> comfy_table::Table {
        let mut table = manager.create_table();
        manager.add_table_header(&mut table, &["Input", "Shape", "Output"]);
        for date in &self.dates {
            table.add_row(vec![
                Cell::new(&date.input),
                Cell::new(date.shape.unwrap_or("-")),
                Cell::new(&date.output),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.dates
            .iter()
            .map(|date| date.output.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn handle_normalize(args: NormalizeArgs, output: &OutputManager) -> Result<()> {
    let inputs = if args.inputs.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read dates from stdin")?
    } else {
        args.inputs
    };

    let report = NormalizeReport::build(inputs);
    let unparsed = report.dates.iter().filter(|date| !date.parsed).count();
    output.display(&report)?;
    if unparsed > 0 {
        output.info(&format!("{unparsed} value(s) passed through unchanged"));
    }
    Ok(())
}
