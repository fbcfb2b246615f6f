// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Table schemas.
//!
//! Two tables leave the engine: the __full table__ holding every source field
//! of every item, and the __report table__ holding derived status fields for
//! presentation. Both are declared here as column enums whose variant order
//! is the export column order.
//!
//! Cells are rendered as text. An absent cell is filled with the column's
//! default at render time, so absence stays meaningful inside the engine and
//! only turns into a placeholder on its way out.

use crate::{
    consolidate::{ItemRecord, Side},
    source::{ItemType, UniqueId},
    status::ReportRow,
};

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Semantic kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Flag,
    Integer,
}

impl ColumnKind {
    /// Placeholder of an absent cell.
    pub fn default_value(self) -> &'static str {
        match self {
            Self::Text => "",
            Self::Flag => "false",
            Self::Integer => "-1",
        }
    }
}

/// Column of an exported table.
pub trait Column: Copy + Sized + 'static {
    /// Every column in export order.
    fn all() -> &'static [Self];
    fn name(self) -> &'static str;
    fn kind(self) -> ColumnKind;

    fn default_value(self) -> &'static str {
        self.kind().default_value()
    }
}

/// Table row addressable by column.
pub trait Row<C: Column> {
    /// Raw value of a cell, absent if no source supplied one.
    fn cell(&self, column: C) -> Option<String>;

    /// Cell value with absence filled by the column default.
    fn render(&self, column: C) -> String {
        self.cell(column)
            .unwrap_or_else(|| column.default_value().to_string())
    }

    /// Every cell in export order.
    fn record(&self) -> Vec<String> {
        C::all().iter().map(|column| self.render(*column)).collect()
    }
}

/// Header names in export order.
pub fn header<C: Column>() -> Vec<&'static str> {
    C::all().iter().map(|column| column.name()).collect()
}

/// Column of the full table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainColumn {
    ItemName,
    ItemType,
    UniqueId,
    ItemNameRp,
    ItemTypeRp,
    RepoScopeRp,
    GitRp,
    ItemNameHm,
    ItemTypeHm,
    ItemNameHmDb,
    ItemTypeHmDb,
    ItemNameRpDb,
    ItemTypeRpDb,
    RepoScopeDb,
    ItemNameRpCf,
    ItemTypeRpCf,
    ItemNameHmCf,
    ItemTypeHmCf,
    RepoScopeCf,
    DotStrucCf,
    Cat1Cf,
    Cat1NameCf,
    Cat2Cf,
    CommentCf,
    NoShowCf,
    SortOrig,
    UniqueIdRp,
    UniqueIdDb,
    UniqueIdHm,
    UniqueIdCf,
}

impl MainColumn {
    pub const ALL: [MainColumn; 30] = [
        Self::ItemName,
        Self::ItemType,
        Self::UniqueId,
        Self::ItemNameRp,
        Self::ItemTypeRp,
        Self::RepoScopeRp,
        Self::GitRp,
        Self::ItemNameHm,
        Self::ItemTypeHm,
        Self::ItemNameHmDb,
        Self::ItemTypeHmDb,
        Self::ItemNameRpDb,
        Self::ItemTypeRpDb,
        Self::RepoScopeDb,
        Self::ItemNameRpCf,
        Self::ItemTypeRpCf,
        Self::ItemNameHmCf,
        Self::ItemTypeHmCf,
        Self::RepoScopeCf,
        Self::DotStrucCf,
        Self::Cat1Cf,
        Self::Cat1NameCf,
        Self::Cat2Cf,
        Self::CommentCf,
        Self::NoShowCf,
        Self::SortOrig,
        Self::UniqueIdRp,
        Self::UniqueIdDb,
        Self::UniqueIdHm,
        Self::UniqueIdCf,
    ];
}

impl Column for MainColumn {
    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn name(self) -> &'static str {
        match self {
            Self::ItemName => "item_name",
            Self::ItemType => "item_type",
            Self::UniqueId => "unique_id",
            Self::ItemNameRp => "item_name_rp",
            Self::ItemTypeRp => "item_type_rp",
            Self::RepoScopeRp => "repo_scope_rp",
            Self::GitRp => "git_rp",
            Self::ItemNameHm => "item_name_hm",
            Self::ItemTypeHm => "item_type_hm",
            Self::ItemNameHmDb => "item_name_hm_db",
            Self::ItemTypeHmDb => "item_type_hm_db",
            Self::ItemNameRpDb => "item_name_rp_db",
            Self::ItemTypeRpDb => "item_type_rp_db",
            Self::RepoScopeDb => "repo_scope_db",
            Self::ItemNameRpCf => "item_name_rp_cf",
            Self::ItemTypeRpCf => "item_type_rp_cf",
            Self::ItemNameHmCf => "item_name_hm_cf",
            Self::ItemTypeHmCf => "item_type_hm_cf",
            Self::RepoScopeCf => "repo_scope_cf",
            Self::DotStrucCf => "dot_struc_cf",
            Self::Cat1Cf => "cat_1_cf",
            Self::Cat1NameCf => "cat_1_name_cf",
            Self::Cat2Cf => "cat_2_cf",
            Self::CommentCf => "comment_cf",
            Self::NoShowCf => "no_show_cf",
            Self::SortOrig => "sort_orig",
            Self::UniqueIdRp => "unique_id_rp",
            Self::UniqueIdDb => "unique_id_db",
            Self::UniqueIdHm => "unique_id_hm",
            Self::UniqueIdCf => "unique_id_cf",
        }
    }

    fn kind(self) -> ColumnKind {
        match self {
            Self::GitRp | Self::NoShowCf => ColumnKind::Flag,
            Self::UniqueId
            | Self::SortOrig
            | Self::UniqueIdRp
            | Self::UniqueIdDb
            | Self::UniqueIdHm
            | Self::UniqueIdCf => ColumnKind::Integer,
            _ => ColumnKind::Text,
        }
    }
}

impl Display for MainColumn {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.name())
    }
}

fn text(value: Option<&str>) -> Option<String> {
    value.map(ToString::to_string)
}

fn type_text(value: Option<ItemType>) -> Option<String> {
    value.map(|item_type| item_type.to_string())
}

fn id_text(value: Option<UniqueId>) -> Option<String> {
    value.map(|id| id.to_string())
}

impl Row<MainColumn> for ItemRecord {
    fn cell(&self, column: MainColumn) -> Option<String> {
        let repo = self.repo.as_ref();
        let home = self.home.as_ref();
        let manifest = self.manifest.as_ref();
        let index = self.index.as_ref();

        match column {
            MainColumn::ItemName => Some(self.identity.to_string()),
            MainColumn::ItemType => self.item_type.map(|kind| kind.to_string()),
            MainColumn::UniqueId => Some(self.unique_id.to_string()),
            MainColumn::ItemNameRp => text(repo.map(|repo| repo.name.as_str())),
            MainColumn::ItemTypeRp => type_text(repo.map(|repo| repo.item_type)),
            MainColumn::RepoScopeRp => repo.map(|repo| repo.scope.to_string()),
            MainColumn::GitRp => self.git_rp().map(|tracked| tracked.to_string()),
            MainColumn::ItemNameHm => text(home.map(|home| home.name.as_str())),
            MainColumn::ItemTypeHm => type_text(home.map(|home| home.item_type)),
            MainColumn::ItemNameHmDb => {
                text(manifest.and_then(|manifest| manifest.name_hm.as_deref()))
            }
            MainColumn::ItemTypeHmDb => type_text(manifest.and_then(|manifest| manifest.type_hm)),
            MainColumn::ItemNameRpDb => {
                text(manifest.and_then(|manifest| manifest.name_rp.as_deref()))
            }
            MainColumn::ItemTypeRpDb => type_text(manifest.and_then(|manifest| manifest.type_rp)),
            MainColumn::RepoScopeDb => manifest
                .and_then(|manifest| manifest.scope)
                .map(|scope| scope.to_string()),
            MainColumn::ItemNameRpCf => text(index.and_then(|index| index.name_rp.as_deref())),
            MainColumn::ItemTypeRpCf => type_text(index.and_then(|index| index.type_rp)),
            MainColumn::ItemNameHmCf => text(index.and_then(|index| index.name_hm.as_deref())),
            MainColumn::ItemTypeHmCf => type_text(index.and_then(|index| index.type_hm)),
            MainColumn::RepoScopeCf => index
                .and_then(|index| index.scope)
                .map(|scope| scope.to_string()),
            MainColumn::DotStrucCf => self.dot_struc().map(|dot_struc| dot_struc.to_string()),
            MainColumn::Cat1Cf => text(self.cat_1()),
            MainColumn::Cat1NameCf => text(self.cat_1_name()),
            MainColumn::Cat2Cf => text(self.cat_2()),
            MainColumn::CommentCf => text(self.comment()),
            MainColumn::NoShowCf => index.map(|index| index.no_show.to_string()),
            MainColumn::SortOrig => Some(self.sort_orig.to_string()),
            MainColumn::UniqueIdRp => id_text(repo.map(|repo| repo.unique_id)),
            MainColumn::UniqueIdDb => id_text(manifest.map(|manifest| manifest.unique_id)),
            MainColumn::UniqueIdHm => id_text(home.map(|home| home.unique_id)),
            MainColumn::UniqueIdCf => id_text(index.map(|index| index.unique_id)),
        }
    }
}

/// Column of the report table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportColumn {
    ItemName,
    ItemType,
    DotState,
    StMatchSymb,
    StAlert,
    ItemNameRepo,
    ItemTypeRepo,
    ItemNameHome,
    ItemTypeHome,
    RepoScope,
    GitRp,
    DotStruc,
    StDbAll,
    MStatusDict,
    MConsolDict,
    MStatusResult,
    MConsolResult,
    Cat1,
    Cat1Name,
    Cat2,
    Comment,
    NoShow,
    SortOrig,
    SortOut,
    NosymSort,
    UniqueId,
}

impl ReportColumn {
    pub const ALL: [ReportColumn; 26] = [
        Self::ItemName,
        Self::ItemType,
        Self::DotState,
        Self::StMatchSymb,
        Self::StAlert,
        Self::ItemNameRepo,
        Self::ItemTypeRepo,
        Self::ItemNameHome,
        Self::ItemTypeHome,
        Self::RepoScope,
        Self::GitRp,
        Self::DotStruc,
        Self::StDbAll,
        Self::MStatusDict,
        Self::MConsolDict,
        Self::MStatusResult,
        Self::MConsolResult,
        Self::Cat1,
        Self::Cat1Name,
        Self::Cat2,
        Self::Comment,
        Self::NoShow,
        Self::SortOrig,
        Self::SortOut,
        Self::NosymSort,
        Self::UniqueId,
    ];
}

impl Column for ReportColumn {
    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn name(self) -> &'static str {
        match self {
            Self::ItemName => "item_name",
            Self::ItemType => "item_type",
            Self::DotState => "dot_state",
            Self::StMatchSymb => "st_match_symb",
            Self::StAlert => "st_alert",
            Self::ItemNameRepo => "item_name_repo",
            Self::ItemTypeRepo => "item_type_repo",
            Self::ItemNameHome => "item_name_home",
            Self::ItemTypeHome => "item_type_home",
            Self::RepoScope => "repo_scope",
            Self::GitRp => "git_rp",
            Self::DotStruc => "dot_struc",
            Self::StDbAll => "st_db_all",
            Self::MStatusDict => "m_status_dict",
            Self::MConsolDict => "m_consol_dict",
            Self::MStatusResult => "m_status_result",
            Self::MConsolResult => "m_consol_result",
            Self::Cat1 => "cat_1",
            Self::Cat1Name => "cat_1_name",
            Self::Cat2 => "cat_2",
            Self::Comment => "comment",
            Self::NoShow => "no_show",
            Self::SortOrig => "sort_orig",
            Self::SortOut => "sort_out",
            Self::NosymSort => "nosym_sort",
            Self::UniqueId => "unique_id",
        }
    }

    fn kind(self) -> ColumnKind {
        match self {
            Self::GitRp
            | Self::StDbAll
            | Self::MStatusResult
            | Self::MConsolResult
            | Self::NoShow => ColumnKind::Flag,
            Self::SortOrig | Self::SortOut | Self::NosymSort | Self::UniqueId => {
                ColumnKind::Integer
            }
            _ => ColumnKind::Text,
        }
    }
}

impl Display for ReportColumn {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.name())
    }
}

impl Row<ReportColumn> for ReportRow {
    fn cell(&self, column: ReportColumn) -> Option<String> {
        let item = &self.item;
        match column {
            ReportColumn::ItemName => Some(item.identity.to_string()),
            ReportColumn::ItemType => item.item_type.map(|kind| kind.to_string()),
            ReportColumn::DotState => Some(self.dot_state.to_string()),
            ReportColumn::StMatchSymb => Some(self.matching.symbol().to_string()),
            ReportColumn::StAlert => self.alert.clone(),
            ReportColumn::ItemNameRepo => text(item.name_on(Side::Repo)),
            ReportColumn::ItemTypeRepo => type_text(item.type_on(Side::Repo)),
            ReportColumn::ItemNameHome => text(item.name_on(Side::Home)),
            ReportColumn::ItemTypeHome => type_text(item.type_on(Side::Home)),
            ReportColumn::RepoScope => item.scope().map(|scope| scope.to_string()),
            ReportColumn::GitRp => item.git_rp().map(|tracked| tracked.to_string()),
            ReportColumn::DotStruc => item.dot_struc().map(|dot_struc| dot_struc.to_string()),
            ReportColumn::StDbAll => Some(self.matching.presence.manifest.to_string()),
            ReportColumn::MStatusDict => Some(self.matching.presence.to_string()),
            ReportColumn::MConsolDict => Some(self.matching.consistency.to_string()),
            ReportColumn::MStatusResult => Some(self.matching.status_result.to_string()),
            ReportColumn::MConsolResult => Some(self.matching.consol_result.to_string()),
            ReportColumn::Cat1 => text(item.cat_1()),
            ReportColumn::Cat1Name => text(item.cat_1_name()),
            ReportColumn::Cat2 => text(item.cat_2()),
            ReportColumn::Comment => text(item.comment()),
            ReportColumn::NoShow => Some(item.no_show().to_string()),
            ReportColumn::SortOrig => Some(item.sort_orig.to_string()),
            ReportColumn::SortOut => Some(self.sort_out.to_string()),
            ReportColumn::NosymSort => Some(self.nosym_sort.to_string()),
            ReportColumn::UniqueId => Some(item.unique_id.to_string()),
        }
    }
}
