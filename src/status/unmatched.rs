// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Unmatched item detection.
//!
//! Compares the raw home listing against every name the config index
//! declares, on either side. Unlike per-row alerts, this is a plain set
//! difference over names, computed straight from the sources.

use crate::{
    source::{home::HomeRecord, index::IndexRecord, ItemType},
    status::overrides::FixtureOverrides,
};

use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Placeholder name the config index uses for "no item on this side".
pub const NONE_SENTINEL: &str = "none";

/// Item found on only one side of the comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedItem {
    pub name: String,
    pub item_type: Option<ItemType>,
    pub comment: Option<String>,
}

/// Both unmatched lists, each sorted by name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Unmatched {
    /// In home, but declared nowhere in the config index.
    pub home_not_in_config: Vec<UnmatchedItem>,

    /// Declared in the config index, but not in home.
    pub config_not_in_home: Vec<UnmatchedItem>,
}

impl Unmatched {
    pub fn is_empty(&self) -> bool {
        self.home_not_in_config.is_empty() && self.config_not_in_home.is_empty()
    }
}

/// Find items present on only one side of home and config index.
#[instrument(skip(home, index, overrides), level = "debug")]
pub fn find_unmatched(
    home: &[HomeRecord],
    index: &[IndexRecord],
    overrides: &FixtureOverrides,
) -> Unmatched {
    let home_names = home
        .iter()
        .map(|record| record.name.as_str())
        .collect::<BTreeSet<_>>();
    let config_names = index
        .iter()
        .flat_map(|record| [record.name_rp.as_deref(), record.name_hm.as_deref()])
        .flatten()
        .filter(|name| *name != NONE_SENTINEL)
        .collect::<BTreeSet<_>>();

    let kept = |name: &&str| {
        let suppressed = overrides.suppresses_unmatched(name);
        if suppressed {
            debug!("fixture suppresses unmatched item {name:?}");
        }
        !suppressed
    };

    let home_not_in_config = home_names
        .difference(&config_names)
        .copied()
        .filter(kept)
        .map(|name| UnmatchedItem {
            name: name.to_string(),
            item_type: Some(
                home.iter()
                    .find(|record| record.name == name)
                    .map(|record| record.item_type)
                    .unwrap_or(ItemType::File),
            ),
            comment: None,
        })
        .collect();

    let config_not_in_home = config_names
        .difference(&home_names)
        .copied()
        .filter(kept)
        .filter_map(|name| config_item(name, index))
        .collect();

    Unmatched {
        home_not_in_config,
        config_not_in_home,
    }
}

// INVARIANT: The first index record declaring the name describes it.
fn config_item(name: &str, index: &[IndexRecord]) -> Option<UnmatchedItem> {
    let record = index.iter().find(|record| {
        record.name_rp.as_deref() == Some(name) || record.name_hm.as_deref() == Some(name)
    })?;

    let item_type = if record.name_hm.as_deref() == Some(name) {
        record.type_hm
    } else {
        record.type_rp
    };

    Some(UnmatchedItem {
        name: name.to_string(),
        item_type,
        comment: record.comment.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        source::fixture::{FixtureRecord, FixtureSet},
        status::overrides::FixtureMode,
    };
    use pretty_assertions::assert_eq;

    fn home(names: &[(&str, ItemType)]) -> Vec<HomeRecord> {
        names
            .iter()
            .enumerate()
            .map(|(id, (name, item_type))| HomeRecord {
                name: name.to_string(),
                item_type: *item_type,
                unique_id: id as u64,
            })
            .collect()
    }

    fn index() -> Vec<IndexRecord> {
        vec![
            IndexRecord {
                name_rp: Some("B".into()),
                name_hm: Some(NONE_SENTINEL.into()),
                type_rp: Some(ItemType::File),
                ..Default::default()
            },
            IndexRecord {
                name_hm: Some("C".into()),
                type_hm: Some(ItemType::FolderSym),
                ..Default::default()
            },
            IndexRecord {
                name_rp: Some("D_rp".into()),
                type_rp: Some(ItemType::Folder),
                name_hm: Some("D".into()),
                type_hm: Some(ItemType::FolderSym),
                comment: Some("editor state".into()),
                ..Default::default()
            },
        ]
    }

    fn names(items: &[UnmatchedItem]) -> Vec<&str> {
        items.iter().map(|item| item.name.as_str()).collect()
    }

    #[test]
    fn set_difference_excludes_none_sentinel() {
        let home = home(&[
            ("A", ItemType::Folder),
            ("B", ItemType::File),
            ("C", ItemType::FolderSym),
            ("D_rp", ItemType::Folder),
        ]);
        let result = find_unmatched(&home, &index(), &FixtureOverrides::default());

        assert_eq!(
            result.home_not_in_config,
            vec![UnmatchedItem {
                name: "A".into(),
                item_type: Some(ItemType::Folder),
                comment: None,
            }]
        );
        assert_eq!(
            result.config_not_in_home,
            vec![UnmatchedItem {
                name: "D".into(),
                item_type: Some(ItemType::FolderSym),
                comment: Some("editor state".into()),
            }]
        );
    }

    #[test]
    fn config_item_takes_repo_side_type_for_repo_name() {
        let result = find_unmatched(&[], &index(), &FixtureOverrides::default());

        assert_eq!(names(&result.config_not_in_home), vec!["B", "C", "D", "D_rp"]);
        assert_eq!(result.config_not_in_home[0].item_type, Some(ItemType::File));
        assert_eq!(result.config_not_in_home[3].item_type, Some(ItemType::Folder));
        assert_eq!(result.config_not_in_home[3].comment, Some("editor state".into()));
    }

    #[test]
    fn enabled_fixture_suppresses_unmatched() {
        let fixtures = FixtureSet::new([
            FixtureRecord {
                item_name: Some("A".into()),
                enabled: true,
                suppress_unmatched: true,
                ..Default::default()
            },
            FixtureRecord {
                item_name: Some("D".into()),
                enabled: true,
                suppress_unmatched: true,
                ..Default::default()
            },
        ]);
        let overrides = FixtureOverrides::new(&fixtures, FixtureMode::Show);
        let home = home(&[("A", ItemType::File), ("E", ItemType::File)]);
        let result = find_unmatched(&home, &index(), &overrides);

        assert_eq!(names(&result.home_not_in_config), vec!["E"]);
        assert_eq!(names(&result.config_not_in_home), vec!["B", "C", "D_rp"]);
    }

    #[test]
    fn hidden_fixture_leaves_unmatched_lists() {
        let fixtures = FixtureSet::new([FixtureRecord {
            item_name: Some("E".into()),
            enabled: true,
            ..Default::default()
        }]);
        let home = home(&[("E", ItemType::File)]);

        let hidden = FixtureOverrides::new(&fixtures, FixtureMode::Hide);
        let hidden = find_unmatched(&home, &[], &hidden);
        assert!(hidden.is_empty());

        let shown = FixtureOverrides::new(&fixtures, FixtureMode::Show);
        let shown = find_unmatched(&home, &[], &shown);
        assert_eq!(names(&shown.home_not_in_config), vec!["E"]);
    }
}
