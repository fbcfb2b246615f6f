// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Full domain match detection.
//!
//! Compares what the sources actually report about an item against what the
//! config index expects:
//!
//! - __Status match__ holds when the item is indexed, exists somewhere on
//!   disk, and the structure observed on disk agrees with the declared
//!   structural hint, if there is one. Being in repository and home observes
//!   as `rp>hm`, repository only as `rp`, home only as `hm`.
//! - __Consolidation match__ holds when every source that reports a type
//!   agrees on the base kind.
//!
//! Anything that breaks these expectations raises an [`Alert`].

use crate::{
    consolidate::ItemRecord,
    source::{DotStruc, ItemKind, ItemType},
};

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Which sources report an item.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DomainPresence {
    pub repo: bool,
    pub home: bool,
    pub manifest: bool,
    pub index: bool,
}

impl DomainPresence {
    pub fn of(item: &ItemRecord) -> Self {
        Self {
            repo: item.repo.is_some(),
            home: item.home.is_some(),
            manifest: item.manifest.is_some(),
            index: item.index.is_some(),
        }
    }

    /// Structure observed on disk.
    pub fn observed_struc(&self) -> Option<DotStruc> {
        match (self.repo, self.home) {
            (true, true) => Some(DotStruc::RepoToHome),
            (true, false) => Some(DotStruc::Repo),
            (false, true) => Some(DotStruc::Home),
            (false, false) => None,
        }
    }
}

impl Display for DomainPresence {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(
            fmt,
            "rp:{} hm:{} db:{} cf:{}",
            u8::from(self.repo),
            u8::from(self.home),
            u8::from(self.manifest),
            u8::from(self.index)
        )
    }
}

/// Base kinds reported per source.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TypeConsistency {
    kinds: Vec<(&'static str, ItemKind)>,
}

impl TypeConsistency {
    pub fn of(item: &ItemRecord) -> Self {
        let index = item.index.as_ref();
        let manifest = item.manifest.as_ref();
        let reported: [(&'static str, Option<ItemType>); 6] = [
            ("rp", item.repo.as_ref().map(|repo| repo.item_type)),
            ("hm", item.home.as_ref().map(|home| home.item_type)),
            ("rp_cf", index.and_then(|index| index.type_rp)),
            ("hm_cf", index.and_then(|index| index.type_hm)),
            ("rp_db", manifest.and_then(|manifest| manifest.type_rp)),
            ("hm_db", manifest.and_then(|manifest| manifest.type_hm)),
        ];

        Self {
            kinds: reported
                .into_iter()
                .filter_map(|(label, item_type)| {
                    item_type.map(|item_type| (label, item_type.base()))
                })
                .collect(),
        }
    }

    /// All reported kinds agree. Vacuously true without any report.
    pub fn is_consistent(&self) -> bool {
        self.kinds
            .first()
            .is_none_or(|(_, first)| self.kinds.iter().all(|(_, kind)| kind == first))
    }
}

impl Display for TypeConsistency {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let entries = self
            .kinds
            .iter()
            .map(|(label, kind)| format!("{label}:{kind}"))
            .collect::<Vec<_>>();
        fmt.write_str(&entries.join(" "))
    }
}

/// Expectation broken by an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    /// Exists in repository or home, but the config index never declares it.
    NotIndexed,

    /// Declared by the config index, but absent from repository and home.
    Missing,

    /// Sources disagree on the item's kind.
    TypeMismatch,

    /// Observed structure contradicts the declared structural hint.
    StructureMismatch,
}

impl Display for Alert {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NotIndexed => fmt.write_str("not indexed"),
            Self::Missing => fmt.write_str("missing"),
            Self::TypeMismatch => fmt.write_str("type mismatch"),
            Self::StructureMismatch => fmt.write_str("structure mismatch"),
        }
    }
}

/// Match results of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReport {
    pub presence: DomainPresence,
    pub consistency: TypeConsistency,
    pub status_result: bool,
    pub consol_result: bool,
    pub alerts: Vec<Alert>,
}

impl MatchReport {
    /// Single symbol summarizing both match results.
    pub fn symbol(&self) -> &'static str {
        if self.status_result && self.consol_result {
            "✓"
        } else {
            "✗"
        }
    }

    /// Alerts joined into one line, absent without alerts.
    pub fn alert_text(&self) -> Option<String> {
        if self.alerts.is_empty() {
            return None;
        }

        Some(
            self.alerts
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Detect full domain match of one item.
pub fn detect_match(item: &ItemRecord) -> MatchReport {
    let presence = DomainPresence::of(item);
    let consistency = TypeConsistency::of(item);
    let observed = presence.observed_struc();
    let declared = item.dot_struc();

    let status_result = presence.index
        && observed.is_some()
        && declared.is_none_or(|declared| Some(declared) == observed);
    let consol_result = consistency.is_consistent();

    let mut alerts = Vec::new();
    if !presence.index && (presence.repo || presence.home) {
        alerts.push(Alert::NotIndexed);
    }
    if presence.index && !presence.repo && !presence.home {
        alerts.push(Alert::Missing);
    }
    if !consol_result {
        alerts.push(Alert::TypeMismatch);
    }
    if let (Some(declared), Some(observed)) = (declared, observed) {
        if declared != observed {
            alerts.push(Alert::StructureMismatch);
        }
    }

    MatchReport {
        presence,
        consistency,
        status_result,
        consol_result,
        alerts,
    }
}
