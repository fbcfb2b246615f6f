// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Config index extraction.
//!
//! The config index is a CSV file written by the user. Each row declares one
//! dotfile: its repository side and home side names and types, the scope it
//! belongs to, a structural hint, category information for grouping, a
//! comment, and whether it should be shown at all. The position of a row in
//! the file is its original sort position unless a `sort_orig` column says
//! otherwise.

use crate::source::{
    normalize_token, parse_flag, DotStruc, ItemType, Scope, UniqueId, UniqueIds,
};

use serde::Deserialize;
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{instrument, warn};

/// One declared row of the config index.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    pub name_rp: Option<String>,
    pub type_rp: Option<ItemType>,
    pub name_hm: Option<String>,
    pub type_hm: Option<ItemType>,
    pub scope: Option<Scope>,
    pub dot_struc: Option<DotStruc>,

    /// Primary category key, e.g., "01".
    pub cat_1: Option<String>,

    /// Display name of primary category.
    pub cat_1_name: Option<String>,

    /// Secondary category key.
    pub cat_2: Option<String>,
    pub comment: Option<String>,

    /// Hide row from filtered reports.
    pub no_show: bool,

    /// Original position declared by the user.
    pub sort_orig: i64,
    pub unique_id: UniqueId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawIndexRow {
    item_name_rp: Option<String>,
    item_type_rp: Option<String>,
    item_name_hm: Option<String>,
    item_type_hm: Option<String>,
    repo_scope: Option<String>,
    dot_struc: Option<String>,
    cat_1: Option<String>,
    cat_1_name: Option<String>,
    cat_2: Option<String>,
    comment: Option<String>,
    no_show: Option<String>,
    sort_orig: Option<String>,
}

/// Load config index file.
#[derive(Debug, Clone)]
pub struct IndexLoad {
    path: PathBuf,
}

impl IndexLoad {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Extract config index records.
    ///
    /// # Errors
    ///
    /// - Return [`IndexError::Open`] if the index cannot be opened.
    /// - Return [`IndexError::Csv`] if a row is malformed.
    #[instrument(skip(self, ids), level = "debug")]
    pub fn extract(&self, ids: &mut UniqueIds) -> Result<Vec<IndexRecord>> {
        let file = File::open(&self.path).map_err(|err| IndexError::Open {
            source: err,
            path: self.path.clone(),
        })?;

        parse_index(file, ids)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse config index records from CSV data.
///
/// Unknown type, scope, or structural tokens are logged and treated as
/// absent.
///
/// # Errors
///
/// - Return [`IndexError::Csv`] if a row is malformed.
pub fn parse_index(reader: impl Read, ids: &mut UniqueIds) -> Result<Vec<IndexRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (position, row) in reader.deserialize::<RawIndexRow>().enumerate() {
        let row = row?;
        let sort_orig = match normalize_token(row.sort_orig.as_deref()) {
            Some(value) => value.parse::<i64>().unwrap_or_else(|_| {
                warn!("invalid sort_orig {value:?} in row {position}, using row position");
                position as i64
            }),
            None => position as i64,
        };

        records.push(IndexRecord {
            name_rp: normalize_token(row.item_name_rp.as_deref()),
            type_rp: parse_token(row.item_type_rp.as_deref()),
            name_hm: normalize_token(row.item_name_hm.as_deref()),
            type_hm: parse_token(row.item_type_hm.as_deref()),
            scope: parse_token(row.repo_scope.as_deref()),
            dot_struc: parse_token(row.dot_struc.as_deref()),
            cat_1: normalize_token(row.cat_1.as_deref()),
            cat_1_name: normalize_token(row.cat_1_name.as_deref()),
            cat_2: normalize_token(row.cat_2.as_deref()),
            comment: normalize_token(row.comment.as_deref()),
            no_show: parse_flag(row.no_show.as_deref()),
            sort_orig,
            unique_id: ids.issue(),
        });
    }

    Ok(records)
}

fn parse_token<T>(value: Option<&str>) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let token = normalize_token(value)?;
    match token.parse() {
        Ok(value) => Some(value),
        Err(error) => {
            warn!("{error}, treating as absent");
            None
        }
    }
}

/// Config index extraction error types.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Config index cannot be opened.
    #[error("failed to open config index at {:?}", path.display())]
    Open {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Config index row is malformed.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Friendly result alias :3
type Result<T, E = IndexError> = std::result::Result<T, E>;
