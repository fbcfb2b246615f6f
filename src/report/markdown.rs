// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Markdown rendering of a finished run.

use crate::{
    consolidate::Side,
    report::ReportTable,
    source::fixture::FixtureRecord,
    status::{
        unmatched::{Unmatched, UnmatchedItem},
        ReportRow,
    },
};

use std::fmt::{Display, Formatter, Result as FmtResult, Write};

/// Section heading of rows without a primary category name.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Markdown view over report, unmatched lists, and displayed fixtures.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownReport<'run> {
    pub title: &'run str,
    pub report: &'run ReportTable,
    pub unmatched: &'run Unmatched,
    pub fixtures: &'run [FixtureRecord],
}

impl Display for MarkdownReport<'_> {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        writeln!(fmt, "# {}", self.title)?;
        writeln!(fmt)?;

        let counts = self
            .report
            .state_counts()
            .iter()
            .map(|(state, count)| format!("{state}: {count}"))
            .collect::<Vec<_>>();
        writeln!(fmt, "{} items ({})", self.report.len(), counts.join(", "))?;

        let mut section: Option<&str> = None;
        for row in &self.report.rows {
            let heading = row.item.cat_1_name().unwrap_or(UNCATEGORIZED);
            if section != Some(heading) {
                section = Some(heading);
                writeln!(fmt)?;
                writeln!(fmt, "## {heading}")?;
                writeln!(fmt)?;
                writeln!(
                    fmt,
                    "| item | type | state | match | alert | repo | home | scope | comment |"
                )?;
                writeln!(fmt, "|---|---|---|---|---|---|---|---|---|")?;
            }

            write_report_row(fmt, row)?;
        }

        write_unmatched(
            fmt,
            "Home items not in config",
            &self.unmatched.home_not_in_config,
        )?;
        write_unmatched(
            fmt,
            "Config items not in home",
            &self.unmatched.config_not_in_home,
        )?;

        if !self.fixtures.is_empty() {
            writeln!(fmt)?;
            writeln!(fmt, "## Test fixtures")?;
            writeln!(fmt)?;
            writeln!(
                fmt,
                "| id | item | scope | type | enabled | suppress unmatched | suppress alert | expected state | notes |"
            )?;
            writeln!(fmt, "|---|---|---|---|---|---|---|---|---|")?;
            for fixture in self.fixtures {
                writeln!(
                    fmt,
                    "| {} | {} | {} | {} | {} | {} | {} | {} | {} |",
                    cell(fixture.fixture_id.as_deref()),
                    code(fixture.item_name.as_deref()),
                    cell(fixture.scope.as_deref()),
                    cell(fixture.fixture_type.as_deref()),
                    fixture.enabled,
                    fixture.suppress_unmatched,
                    fixture.suppress_alert,
                    cell(fixture.expected_state.as_deref()),
                    cell(fixture.notes.as_deref()),
                )?;
            }
        }

        Ok(())
    }
}

fn write_report_row(fmt: &mut Formatter<'_>, row: &ReportRow) -> FmtResult {
    let item = &row.item;
    let item_type = item.item_type.map(|kind| kind.to_string());
    let scope = item.scope().map(|scope| scope.to_string());

    writeln!(
        fmt,
        "| {} | {} | {} | {} | {} | {} | {} | {} | {} |",
        code(Some(row.name())),
        cell(item_type.as_deref()),
        row.dot_state,
        row.matching.symbol(),
        cell(row.alert.as_deref()),
        code(item.name_on(Side::Repo)),
        code(item.name_on(Side::Home)),
        cell(scope.as_deref()),
        cell(item.comment()),
    )
}

fn write_unmatched(fmt: &mut Formatter<'_>, heading: &str, items: &[UnmatchedItem]) -> FmtResult {
    writeln!(fmt)?;
    writeln!(fmt, "## {heading}")?;
    writeln!(fmt)?;

    if items.is_empty() {
        return writeln!(fmt, "None.");
    }

    for item in items {
        let mut line = format!("- `{}`", item.name);
        if let Some(item_type) = item.item_type {
            write!(line, " ({item_type})")?;
        }
        if let Some(comment) = &item.comment {
            write!(line, ": {comment}")?;
        }
        writeln!(fmt, "{line}")?;
    }

    Ok(())
}

fn cell(value: Option<&str>) -> String {
    value.map(|text| text.replace('|', "\\|")).unwrap_or_default()
}

fn code(value: Option<&str>) -> String {
    value
        .map(|text| format!("`{}`", text.replace('|', "\\|")))
        .unwrap_or_default()
}
