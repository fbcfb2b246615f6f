// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Test fixture override extraction.
//!
//! Test fixtures are dummy dotfiles the user keeps around to exercise the
//! report. A fixture file lists them along with flags that control how the
//! report should treat each one. The fixture file is optional.

use crate::source::{normalize_token, parse_flag};

use serde::Deserialize;
use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// One fixture override.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixtureRecord {
    pub fixture_id: Option<String>,

    /// Identity of the item this fixture applies to.
    pub item_name: Option<String>,
    pub scope: Option<String>,
    pub fixture_type: Option<String>,
    pub enabled: bool,

    /// Remove item from both unmatched lists.
    pub suppress_unmatched: bool,

    /// Clear alert of the item's report row.
    pub suppress_alert: bool,

    /// Dot state the item is expected to end up in.
    pub expected_state: Option<String>,
    pub notes: Option<String>,
}

/// Combined suppression flags of all enabled fixtures for one item.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixtureFlags {
    pub suppress_unmatched: bool,
    pub suppress_alert: bool,
}

/// Full set of fixture overrides for a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixtureSet {
    records: Vec<FixtureRecord>,
}

impl FixtureSet {
    pub fn new(records: impl IntoIterator<Item = FixtureRecord>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Load fixture set from CSV file.
    ///
    /// Missing file yields an empty set.
    ///
    /// # Errors
    ///
    /// - Return [`FixtureError::Open`] if the file exists, but cannot be
    ///   opened.
    /// - Return [`FixtureError::Csv`] if a row is malformed.
    #[instrument(skip(path), level = "debug")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("no fixture file at {}", path.display());
            return Ok(Self::default());
        }

        let file = File::open(path).map_err(|err| FixtureError::Open {
            source: err,
            path: path.to_path_buf(),
        })?;

        parse_fixtures(file)
    }

    pub fn records(&self) -> &[FixtureRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Item names of all enabled fixtures.
    pub fn enabled_names(&self) -> BTreeSet<String> {
        self.enabled()
            .filter_map(|record| record.item_name.clone())
            .collect()
    }

    /// Suppression flags per item name, OR-combined across enabled fixtures.
    pub fn flags(&self) -> BTreeMap<String, FixtureFlags> {
        let mut flags: BTreeMap<String, FixtureFlags> = BTreeMap::new();
        for record in self.enabled() {
            let Some(name) = &record.item_name else {
                continue;
            };

            let entry = flags.entry(name.clone()).or_default();
            entry.suppress_unmatched |= record.suppress_unmatched;
            entry.suppress_alert |= record.suppress_alert;
        }

        flags
    }

    fn enabled(&self) -> impl Iterator<Item = &FixtureRecord> {
        self.records.iter().filter(|record| record.enabled)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFixtureRow {
    fixture_id: Option<String>,
    item_name: Option<String>,
    scope: Option<String>,
    fixture_type: Option<String>,
    enabled: Option<String>,
    suppress_unmatched: Option<String>,
    suppress_alert: Option<String>,
    expected_state: Option<String>,
    notes: Option<String>,
}

/// Parse fixture set from CSV data.
///
/// # Errors
///
/// - Return [`FixtureError::Csv`] if a row is malformed.
pub fn parse_fixtures(reader: impl Read) -> Result<FixtureSet> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in reader.deserialize::<RawFixtureRow>() {
        let row = row?;
        records.push(FixtureRecord {
            fixture_id: text(row.fixture_id),
            item_name: text(row.item_name),
            scope: text(row.scope),
            fixture_type: text(row.fixture_type),
            enabled: parse_flag(row.enabled.as_deref()),
            suppress_unmatched: parse_flag(row.suppress_unmatched.as_deref()),
            suppress_alert: parse_flag(row.suppress_alert.as_deref()),
            expected_state: normalize_token(row.expected_state.as_deref()),
            notes: text(row.notes),
        });
    }

    Ok(FixtureSet { records })
}

// Free text keeps "none" as a literal value.
fn text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Fixture extraction error types.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// Fixture file exists, but cannot be opened.
    #[error("failed to open fixture file at {:?}", path.display())]
    Open {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Fixture row is malformed.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Friendly result alias :3
type Result<T, E = FixtureError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    const FIXTURES: &str = indoc! {r#"
        fixture_id,item_name,scope,fixture_type,enabled,suppress_unmatched,suppress_alert,expected_state,notes
        fx-01,.dotrep_test_a,public,file,yes,true,,Synced,synced file
        fx-02,.dotrep_test_a,public,file,ON,,1,,second opinion
        fx-03,.dotrep_test_b,private,folder,no,yes,yes,Local,
        fx-04,,public,file,yes,yes,yes,,orphan
    "#};

    #[test]
    fn parse_fixture_rows() -> anyhow::Result<()> {
        let set = parse_fixtures(FIXTURES.as_bytes())?;

        assert_eq!(set.records().len(), 4);
        assert_eq!(
            set.records()[0],
            FixtureRecord {
                fixture_id: Some("fx-01".into()),
                item_name: Some(".dotrep_test_a".into()),
                scope: Some("public".into()),
                fixture_type: Some("file".into()),
                enabled: true,
                suppress_unmatched: true,
                suppress_alert: false,
                expected_state: Some("Synced".into()),
                notes: Some("synced file".into()),
            }
        );

        Ok(())
    }

    #[test]
    fn enabled_flags_are_combined_per_item() -> anyhow::Result<()> {
        let set = parse_fixtures(FIXTURES.as_bytes())?;

        let names = set.enabled_names();
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec![".dotrep_test_a".to_string()]);

        let flags = set.flags();
        assert_eq!(flags.len(), 1);
        assert_eq!(
            flags[".dotrep_test_a"],
            FixtureFlags {
                suppress_unmatched: true,
                suppress_alert: true,
            }
        );

        Ok(())
    }

    #[test]
    fn missing_columns_are_absent() -> anyhow::Result<()> {
        let set = parse_fixtures("item_name,enabled\n.foo,y\n".as_bytes())?;
        assert_eq!(
            set.records(),
            &[FixtureRecord {
                item_name: Some(".foo".into()),
                enabled: true,
                ..Default::default()
            }]
        );

        Ok(())
    }

    #[sealed_test]
    fn missing_fixture_file_is_empty() -> anyhow::Result<()> {
        let set = FixtureSet::load("data/test_fixtures.csv")?;
        assert!(set.is_empty());
        Ok(())
    }
}
