// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Home directory extraction.

use crate::source::{scan_dot_entries, ItemType, UniqueId, UniqueIds};

use std::path::PathBuf;
use tracing::{debug, instrument};

/// Top-level dot entry of the home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeRecord {
    pub name: String,
    pub item_type: ItemType,
    pub unique_id: UniqueId,
}

/// Scan home directory for dot entries.
#[derive(Debug, Clone)]
pub struct HomeScan {
    path: PathBuf,
    exclude: Vec<String>,
}

impl HomeScan {
    pub fn new(
        path: impl Into<PathBuf>,
        exclude: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            path: path.into(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Extract home records.
    ///
    /// # Errors
    ///
    /// - Return [`HomeError::MissingHome`] if the home directory is missing.
    /// - Return [`HomeError::Walk`] if the home directory cannot be listed.
    #[instrument(skip(self, ids), level = "debug")]
    pub fn extract(&self, ids: &mut UniqueIds) -> Result<Vec<HomeRecord>> {
        if !self.path.is_dir() {
            return Err(HomeError::MissingHome {
                path: self.path.clone(),
            });
        }

        let records = scan_dot_entries(&self.path, &self.exclude)?
            .into_iter()
            .map(|entry| HomeRecord {
                name: entry.name,
                item_type: entry.item_type,
                unique_id: ids.issue(),
            })
            .collect::<Vec<_>>();
        debug!("found {} home entries", records.len());

        Ok(records)
    }
}

/// Home extraction error types.
#[derive(Debug, thiserror::Error)]
pub enum HomeError {
    /// Home directory does not exist.
    #[error("home directory {:?} does not exist", path.display())]
    MissingHome { path: PathBuf },

    /// Home directory cannot be listed.
    #[error(transparent)]
    Walk(#[from] ignore::Error),
}

/// Friendly result alias :3
type Result<T, E = HomeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test]
    fn extract_home_records() -> anyhow::Result<()> {
        std::fs::create_dir_all("home/.ssh")?;
        std::fs::write("home/.zprofile", "")?;
        std::fs::write("home/.DS_Store", "")?;
        std::fs::write("home/notes.txt", "")?;

        let mut ids = UniqueIds::new();
        ids.issue();
        let result = HomeScan::new("home", [".DS_Store"]).extract(&mut ids)?;
        let expect = vec![
            HomeRecord {
                name: ".ssh".into(),
                item_type: ItemType::Folder,
                unique_id: 1,
            },
            HomeRecord {
                name: ".zprofile".into(),
                item_type: ItemType::File,
                unique_id: 2,
            },
        ];
        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test]
    fn extract_fails_on_missing_home() {
        let result = HomeScan::new("nowhere", Vec::<String>::new()).extract(&mut UniqueIds::new());
        assert!(matches!(result, Err(HomeError::MissingHome { .. })));
    }
}
