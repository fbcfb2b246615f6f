// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Test fixture overrides.
//!
//! Enabled fixtures adjust the report without ever touching the sources. The
//! global [`FixtureMode`] decides how:
//!
//! - __Hide__ (default): report rows of enabled fixtures are dropped, and
//!   enabled fixtures never show up in the unmatched lists.
//! - __Show__: report rows stay, but fixtures flagged to suppress alerts have
//!   their alert cleared. The fixture list itself is handed to the renderer,
//!   and expected dot states are checked against the derived ones.
//!
//! Fixtures flagged to suppress unmatched items are removed from both
//! unmatched lists in either mode.

use crate::{
    source::{
        fixture::{FixtureFlags, FixtureRecord, FixtureSet},
        parse_flag,
    },
    status::{DotState, ReportRow},
};

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Environment variable selecting [`FixtureMode::Show`].
pub const SHOW_FIXTURES_ENV: &str = "DOTREP_SHOW_TEST_FIXTURES";

/// How enabled fixtures appear in the report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FixtureMode {
    #[default]
    Hide,
    Show,
}

impl FixtureMode {
    /// Read mode from [`SHOW_FIXTURES_ENV`].
    ///
    /// Anything but a truthy token selects [`FixtureMode::Hide`].
    pub fn from_env() -> Self {
        let value = std::env::var(SHOW_FIXTURES_ENV).ok();
        if parse_flag(value.as_deref()) {
            Self::Show
        } else {
            Self::Hide
        }
    }
}

/// Expected dot state that the report disagrees with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMismatch {
    pub item_name: String,
    pub expected: DotState,
    pub actual: DotState,
}

/// Fixture overrides resolved for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixtureOverrides {
    mode: FixtureMode,
    enabled: BTreeSet<String>,
    flags: BTreeMap<String, FixtureFlags>,
    records: Vec<FixtureRecord>,
}

impl FixtureOverrides {
    pub fn new(fixtures: &FixtureSet, mode: FixtureMode) -> Self {
        Self {
            mode,
            enabled: fixtures.enabled_names(),
            flags: fixtures.flags(),
            records: fixtures.records().to_vec(),
        }
    }

    pub fn mode(&self) -> FixtureMode {
        self.mode
    }

    /// Check if an item must be left out of the unmatched lists.
    pub fn suppresses_unmatched(&self, name: &str) -> bool {
        let hidden = self.mode == FixtureMode::Hide && self.enabled.contains(name);
        let flagged = self
            .flags
            .get(name)
            .is_some_and(|flags| flags.suppress_unmatched);

        hidden || flagged
    }

    /// Apply overrides to derived report rows.
    pub fn apply(&self, mut rows: Vec<ReportRow>) -> Vec<ReportRow> {
        match self.mode {
            FixtureMode::Hide => {
                let before = rows.len();
                rows.retain(|row| !self.enabled.contains(row.name()));
                debug!("hid {} fixture rows", before - rows.len());
            }
            FixtureMode::Show => {
                for row in rows.iter_mut() {
                    let suppress = self
                        .flags
                        .get(row.name())
                        .is_some_and(|flags| flags.suppress_alert);
                    if suppress {
                        row.alert = None;
                    }
                }
            }
        }

        rows
    }

    /// Fixtures to display alongside the report.
    ///
    /// Empty unless fixtures are shown.
    pub fn displayed(&self) -> &[FixtureRecord] {
        match self.mode {
            FixtureMode::Hide => &[],
            FixtureMode::Show => &self.records,
        }
    }

    /// Compare expected dot states of enabled fixtures against report rows.
    ///
    /// Only checked when fixtures are shown. Every mismatch is logged as a
    /// warning. Fixtures without a row, or with an unknown state token, are
    /// skipped.
    pub fn check_expected_states(&self, rows: &[ReportRow]) -> Vec<StateMismatch> {
        if self.mode == FixtureMode::Hide {
            return Vec::new();
        }

        let mut mismatches = Vec::new();
        for record in self.records.iter().filter(|record| record.enabled) {
            let (Some(name), Some(token)) = (&record.item_name, &record.expected_state) else {
                continue;
            };

            let expected = match token.parse::<DotState>() {
                Ok(expected) => expected,
                Err(error) => {
                    warn!("fixture {name:?}: {error}");
                    continue;
                }
            };

            let Some(row) = rows.iter().find(|row| row.name() == name) else {
                continue;
            };

            if row.dot_state != expected {
                warn!(
                    "fixture {name:?} expected dot state {expected}, but report has {}",
                    row.dot_state
                );
                mismatches.push(StateMismatch {
                    item_name: name.clone(),
                    expected,
                    actual: row.dot_state,
                });
            }
        }

        mismatches
    }
}
