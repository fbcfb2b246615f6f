// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Cross-source consolidation.
//!
//! After the merge, a row may carry conflicting or missing information from
//! each source. Consolidated fields are resolved through fixed priority
//! tables: scan the sources in order, and take the first value that is
//! actually defined. Missing sources simply leave holes that the scan skips
//! over.
//!
//! Consolidation produces the __main table__, i.e., every merged row with its
//! consolidated item type and original sort key, sorted by that sort key.

use crate::{
    merge::{identity::Identity, MergedRow, MergedTable},
    source::{
        home::HomeRecord, index::IndexRecord, manifest::ManifestRecord, repo::RepoRecord,
        DotStruc, ItemKind, ItemType, Scope, UniqueId,
    },
};

use tracing::instrument;

/// Sort key of rows the config index never positioned.
pub const NO_ORIGINAL_ORDER: i64 = -1;

/// Take first defined value across sources in priority order.
pub fn first_defined<S, T>(priority: &[S], read: impl Fn(S) -> Option<T>) -> Option<T>
where
    S: Copy,
{
    priority.iter().copied().find_map(read)
}

/// Source of a per-row item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSource {
    /// Working type seeded by the merge.
    Consolidated,
    Repo,
    Home,
    IndexRepo,
    IndexHome,
    ManifestRepo,
    ManifestHome,
}

/// Priority of item type sources, highest first.
pub const TYPE_PRIORITY: [TypeSource; 7] = [
    TypeSource::Consolidated,
    TypeSource::Repo,
    TypeSource::Home,
    TypeSource::IndexRepo,
    TypeSource::IndexHome,
    TypeSource::ManifestRepo,
    TypeSource::ManifestHome,
];

impl TypeSource {
    pub fn read(self, row: &MergedRow) -> Option<ItemType> {
        match self {
            Self::Consolidated => row.seed_type,
            Self::Repo => row.repo.as_ref().map(|repo| repo.item_type),
            Self::Home => row.home.as_ref().map(|home| home.item_type),
            Self::IndexRepo => row.index.as_ref().and_then(|index| index.type_rp),
            Self::IndexHome => row.index.as_ref().and_then(|index| index.type_hm),
            Self::ManifestRepo => row.manifest.as_ref().and_then(|manifest| manifest.type_rp),
            Self::ManifestHome => row.manifest.as_ref().and_then(|manifest| manifest.type_hm),
        }
    }
}

/// Resolve consolidated item type of a merged row.
///
/// Symlink and alias variants are normalized to their base kind.
pub fn consolidate_item_type(row: &MergedRow) -> Option<ItemKind> {
    first_defined(&TYPE_PRIORITY, |source| source.read(row)).map(ItemType::base)
}

/// Side of the repository to home relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Repo,
    Home,
}

/// Source of a per-side name or type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideSource {
    Scan,
    Index,
    Manifest,
}

/// Priority of per-side sources, highest first.
pub const SIDE_PRIORITY: [SideSource; 3] =
    [SideSource::Scan, SideSource::Index, SideSource::Manifest];

/// Consolidated record of one logical item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub identity: Identity,
    pub item_type: Option<ItemKind>,
    pub unique_id: UniqueId,

    /// Original sort position, or [`NO_ORIGINAL_ORDER`].
    pub sort_orig: i64,
    pub repo: Option<RepoRecord>,
    pub home: Option<HomeRecord>,
    pub manifest: Option<ManifestRecord>,
    pub index: Option<IndexRecord>,
}

impl ItemRecord {
    /// Tracked by version control.
    ///
    /// Only meaningful for items found in the repository.
    pub fn git_rp(&self) -> Option<bool> {
        self.repo.as_ref().map(|repo| repo.tracked)
    }

    /// Structural hint declared by the config index.
    pub fn dot_struc(&self) -> Option<DotStruc> {
        self.index.as_ref().and_then(|index| index.dot_struc)
    }

    /// Scope of the item.
    ///
    /// Config index declaration wins over the repository root the item was
    /// found in.
    pub fn scope(&self) -> Option<Scope> {
        self.index
            .as_ref()
            .and_then(|index| index.scope)
            .or(self.repo.as_ref().map(|repo| repo.scope))
    }

    pub fn name_on(&self, side: Side) -> Option<&str> {
        first_defined(&SIDE_PRIORITY, |source| self.side_name(source, side))
    }

    pub fn type_on(&self, side: Side) -> Option<ItemType> {
        first_defined(&SIDE_PRIORITY, |source| self.side_type(source, side))
    }

    pub fn cat_1(&self) -> Option<&str> {
        self.index.as_ref().and_then(|index| index.cat_1.as_deref())
    }

    pub fn cat_1_name(&self) -> Option<&str> {
        self.index.as_ref().and_then(|index| index.cat_1_name.as_deref())
    }

    pub fn cat_2(&self) -> Option<&str> {
        self.index.as_ref().and_then(|index| index.cat_2.as_deref())
    }

    pub fn comment(&self) -> Option<&str> {
        self.index.as_ref().and_then(|index| index.comment.as_deref())
    }

    pub fn no_show(&self) -> bool {
        self.index.as_ref().is_some_and(|index| index.no_show)
    }

    fn side_name(&self, source: SideSource, side: Side) -> Option<&str> {
        match (source, side) {
            (SideSource::Scan, Side::Repo) => self.repo.as_ref().map(|repo| repo.name.as_str()),
            (SideSource::Scan, Side::Home) => self.home.as_ref().map(|home| home.name.as_str()),
            (SideSource::Index, Side::Repo) => self.index.as_ref()?.name_rp.as_deref(),
            (SideSource::Index, Side::Home) => self.index.as_ref()?.name_hm.as_deref(),
            (SideSource::Manifest, Side::Repo) => self.manifest.as_ref()?.name_rp.as_deref(),
            (SideSource::Manifest, Side::Home) => self.manifest.as_ref()?.name_hm.as_deref(),
        }
    }

    fn side_type(&self, source: SideSource, side: Side) -> Option<ItemType> {
        match (source, side) {
            (SideSource::Scan, Side::Repo) => self.repo.as_ref().map(|repo| repo.item_type),
            (SideSource::Scan, Side::Home) => self.home.as_ref().map(|home| home.item_type),
            (SideSource::Index, Side::Repo) => self.index.as_ref()?.type_rp,
            (SideSource::Index, Side::Home) => self.index.as_ref()?.type_hm,
            (SideSource::Manifest, Side::Repo) => self.manifest.as_ref()?.type_rp,
            (SideSource::Manifest, Side::Home) => self.manifest.as_ref()?.type_hm,
        }
    }
}

/// Consolidated table of all logical items.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MainTable {
    pub rows: Vec<ItemRecord>,
}

impl MainTable {
    pub fn find(&self, name: &str) -> Option<&ItemRecord> {
        self.rows.iter().find(|row| row.identity.matches(name))
    }
}

/// Consolidate merged rows into the main table.
///
/// Rows are ordered by original sort position. Ties, e.g., rows the config
/// index never mentions, are ordered by identity.
#[instrument(skip(merged), level = "debug")]
pub fn consolidate(merged: MergedTable) -> MainTable {
    let mut rows = merged
        .rows
        .into_iter()
        .map(|row| {
            let item_type = consolidate_item_type(&row);
            let sort_orig = row
                .index
                .as_ref()
                .map(|index| index.sort_orig)
                .unwrap_or(NO_ORIGINAL_ORDER);

            ItemRecord {
                identity: row.identity,
                item_type,
                unique_id: row.unique_id,
                sort_orig,
                repo: row.repo,
                home: row.home,
                manifest: row.manifest,
                index: row.index,
            }
        })
        .collect::<Vec<_>>();

    rows.sort_by(|a, b| {
        a.sort_orig
            .cmp(&b.sort_orig)
            .then_with(|| a.identity.cmp(&b.identity))
    });

    MainTable { rows }
}
