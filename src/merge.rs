// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Multi-source merge engine.
//!
//! Merges the four normalized record sets into one table holding exactly one
//! row per logical item. The merge is an ordered chain of __full outer
//! joins__:
//!
//! 1. Repository records form the base of the table.
//! 2. Home records are joined on their name.
//! 3. Manifest records are joined on their repository side name __or__
//!    their home side name.
//! 4. Config index records are joined the same way as manifest records.
//!
//! No record is ever discarded for lack of a match. A record that matches no
//! existing row starts a new row of its own, leaving the slots of all other
//! sources empty.
//!
//! # Bridging Rows
//!
//! A dual-named record can match two different rows at once, e.g., the config
//! index declaring that repository item ".zshrc_mac" is what home knows as
//! ".zshrc". When both rows hold disjoint sources, they are fused into the
//! row found through the repository side name. Otherwise, both rows are left
//! alone.
//!
//! # Placement
//!
//! A record joins the first row, found through its primary name and then its
//! other names, whose slot for that source is still free. When every such
//! row is taken, the record starts a new row under the first of its names
//! that is not yet the identity of a row. Only a record all of whose names
//! already own rows with that slot filled is a duplicate declaration, and
//! the first declaration wins.
//!
//! Every name a record carries becomes an alias of the row it landed in
//! unless the name already resolves elsewhere.

pub mod identity;

use crate::{
    merge::identity::{Identity, JoinKeys},
    source::{
        home::HomeRecord, index::IndexRecord, manifest::ManifestRecord, repo::RepoRecord,
        ItemType, UniqueId,
    },
};

use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Normalized record sets of all four sources.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Sources {
    pub repo: Vec<RepoRecord>,
    pub home: Vec<HomeRecord>,
    pub manifest: Vec<ManifestRecord>,
    pub index: Vec<IndexRecord>,
}

/// One logical item after the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRow {
    pub identity: Identity,

    /// Working type seeded from the base repository record.
    pub seed_type: Option<ItemType>,

    /// Identifier of the record that started this row.
    pub unique_id: UniqueId,
    pub repo: Option<RepoRecord>,
    pub home: Option<HomeRecord>,
    pub manifest: Option<ManifestRecord>,
    pub index: Option<IndexRecord>,
}

impl MergedRow {
    fn new(identity: Identity, unique_id: UniqueId) -> Self {
        Self {
            identity,
            seed_type: None,
            unique_id,
            repo: None,
            home: None,
            manifest: None,
            index: None,
        }
    }

    /// Check that two rows hold disjoint sources.
    fn fits(&self, other: &Self) -> bool {
        !(self.repo.is_some() && other.repo.is_some()
            || self.home.is_some() && other.home.is_some()
            || self.manifest.is_some() && other.manifest.is_some()
            || self.index.is_some() && other.index.is_some())
    }

    fn absorb(&mut self, other: Self) {
        self.repo = self.repo.take().or(other.repo);
        self.home = self.home.take().or(other.home);
        self.manifest = self.manifest.take().or(other.manifest);
        self.index = self.index.take().or(other.index);
    }
}

/// Result of merging all sources.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergedTable {
    pub rows: Vec<MergedRow>,
}

impl MergedTable {
    /// Find row by its identity.
    pub fn find(&self, name: &str) -> Option<&MergedRow> {
        self.rows.iter().find(|row| row.identity.matches(name))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Merge all sources into one row per logical item.
///
/// Repository names are expected to be unique already, i.e., scope
/// collisions were rejected during extraction.
#[instrument(skip(sources), level = "debug")]
pub fn merge_sources(sources: Sources) -> MergedTable {
    let mut join = OuterJoin::default();
    for record in sources.repo {
        join.attach(record);
    }
    for record in sources.home {
        join.attach(record);
    }
    for record in sources.manifest {
        join.attach(record);
    }
    for record in sources.index {
        join.attach(record);
    }

    let table = join.finish();
    debug!("merged sources into {} rows", table.len());

    table
}

/// Record that owns one slot of a merged row.
trait Slotted: JoinKeys + Sized {
    const SOURCE: &'static str;

    fn slot(row: &mut MergedRow) -> &mut Option<Self>;
    fn occupied(row: &MergedRow) -> bool;
    fn unique_id(&self) -> UniqueId;
}

impl Slotted for RepoRecord {
    const SOURCE: &'static str = "repo";

    fn slot(row: &mut MergedRow) -> &mut Option<Self> {
        &mut row.repo
    }

    fn occupied(row: &MergedRow) -> bool {
        row.repo.is_some()
    }

    fn unique_id(&self) -> UniqueId {
        self.unique_id
    }
}

impl Slotted for HomeRecord {
    const SOURCE: &'static str = "home";

    fn slot(row: &mut MergedRow) -> &mut Option<Self> {
        &mut row.home
    }

    fn occupied(row: &MergedRow) -> bool {
        row.home.is_some()
    }

    fn unique_id(&self) -> UniqueId {
        self.unique_id
    }
}

impl Slotted for ManifestRecord {
    const SOURCE: &'static str = "manifest";

    fn slot(row: &mut MergedRow) -> &mut Option<Self> {
        &mut row.manifest
    }

    fn occupied(row: &MergedRow) -> bool {
        row.manifest.is_some()
    }

    fn unique_id(&self) -> UniqueId {
        self.unique_id
    }
}

impl Slotted for IndexRecord {
    const SOURCE: &'static str = "index";

    fn slot(row: &mut MergedRow) -> &mut Option<Self> {
        &mut row.index
    }

    fn occupied(row: &MergedRow) -> bool {
        row.index.is_some()
    }

    fn unique_id(&self) -> UniqueId {
        self.unique_id
    }
}

/// Working state of the join chain.
///
/// Fused rows leave a hole behind, so positions stay valid until the table
/// is finished.
#[derive(Debug, Default)]
struct OuterJoin {
    rows: Vec<Option<MergedRow>>,
    positions: HashMap<Identity, usize>,
}

impl OuterJoin {
    fn position(&self, key: Option<&str>) -> Option<usize> {
        self.positions.get(key?).copied()
    }

    /// Check if a name is the identity of a live row.
    fn is_identity(&self, key: &str) -> bool {
        self.positions
            .get(key)
            .and_then(|position| self.rows[*position].as_ref())
            .is_some_and(|row| row.identity.matches(key))
    }

    fn attach<R: Slotted>(&mut self, record: R) {
        if let (Some(repo), Some(home)) = (
            self.position(record.repo_key()),
            self.position(record.home_key()),
        ) {
            if repo != home {
                self.fuse(repo, home);
            }
        }

        // INVARIANT: Primary name is tried first, and a record only joins a
        // row whose slot for its source is still free.
        let keys = [record.primary_key(), record.repo_key(), record.home_key()];
        let joined = keys.into_iter().flatten().find_map(|key| {
            let position = self.position(Some(key))?;
            let row = self.rows[position].as_ref()?;
            (!R::occupied(row)).then_some(position)
        });

        let position = match joined {
            Some(position) => position,
            None => {
                let fresh = keys
                    .into_iter()
                    .flatten()
                    .find(|key| !self.is_identity(key))
                    .map(ToOwned::to_owned);
                let Some(key) = fresh else {
                    match record.primary_key() {
                        Some(key) => warn!(
                            "duplicate {} record for {key:?}, keeping first declaration",
                            R::SOURCE
                        ),
                        None => warn!(
                            "skip {} record {} without any name",
                            R::SOURCE,
                            record.unique_id()
                        ),
                    }
                    return;
                };

                let identity = Identity::new(key);
                self.rows
                    .push(Some(MergedRow::new(identity.clone(), record.unique_id())));
                let position = self.rows.len() - 1;
                self.positions.insert(identity, position);
                position
            }
        };

        // INVARIANT: Every name of a record resolves to some row.
        for key in [record.repo_key(), record.home_key()].into_iter().flatten() {
            self.positions
                .entry(Identity::new(key))
                .or_insert(position);
        }

        if let Some(row) = self.rows[position].as_mut() {
            *R::slot(row) = Some(record);
        }
    }

    /// Fuse row `other` into row `keep` if their sources are disjoint.
    fn fuse(&mut self, keep: usize, other: usize) {
        let fits = match (&self.rows[keep], &self.rows[other]) {
            (Some(kept), Some(absorbed)) => kept.fits(absorbed),
            _ => false,
        };
        if !fits {
            return;
        }

        let Some(absorbed) = self.rows[other].take() else {
            return;
        };

        debug!("fuse row {:?} into another row", absorbed.identity.as_str());
        for position in self.positions.values_mut() {
            if *position == other {
                *position = keep;
            }
        }

        if let Some(kept) = self.rows[keep].as_mut() {
            kept.absorb(absorbed);
        }
    }

    fn finish(self) -> MergedTable {
        let rows = self
            .rows
            .into_iter()
            .flatten()
            .map(|mut row| {
                row.seed_type = row.repo.as_ref().map(|repo| repo.item_type);
                row
            })
            .collect();

        MergedTable { rows }
    }
}
