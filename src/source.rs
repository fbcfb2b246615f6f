// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Source extraction.
//!
//! Dotrep reconciles four independent sources of truth about the user's
//! dotfiles:
//!
//! 1. The __repository__, possibly split into a public and a private root.
//! 2. The user's __home__ directory.
//! 3. The __manifest__ of the symlink manager, i.e., a dotbot style
//!    `install.conf.yaml` file.
//! 4. The __config index__, a user authored CSV file that declares every
//!    dotfile the user cares about, how it should be categorized, and how it
//!    relates the repository to the home directory.
//!
//! Each source gets its own extractor that produces a normalized record set.
//! Every record is stamped with a process unique identifier handed out by
//! [`UniqueIds`] so that rows can be traced back to the record that produced
//! them. Identifiers are only stable within a single run.
//!
//! Test fixture overrides are read here as well, because they are just
//! another file on disk, even though they never take part in the merge.

pub mod fixture;
pub mod home;
pub mod index;
pub mod manifest;
pub mod repo;

use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::Path,
    str::FromStr,
};

/// Truthy tokens accepted by flag columns and environment toggles.
pub const TRUE_TOKENS: [&str; 6] = ["1", "true", "t", "yes", "y", "on"];

/// Process unique record identifier.
pub type UniqueId = u64;

/// Issue monotonically increasing record identifiers for one run.
#[derive(Debug, Default)]
pub struct UniqueIds {
    next: UniqueId,
}

impl UniqueIds {
    /// Construct new identifier source starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next identifier.
    pub fn issue(&mut self) -> UniqueId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Base kind of a dotfile entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    File,
    Folder,
}

impl Display for ItemKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::File => fmt.write_str("file"),
            Self::Folder => fmt.write_str("folder"),
        }
    }
}

/// Type of a dotfile entry as a given source reports it.
///
/// Symlink and alias variants only exist at the source level. They always
/// normalize to their base [`ItemKind`] once consolidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    File,
    Folder,
    FileSym,
    FolderSym,
    FileAlias,
    FolderAlias,
}

impl ItemType {
    /// Normalize source specific variant into base kind.
    pub fn base(self) -> ItemKind {
        match self {
            Self::File | Self::FileSym | Self::FileAlias => ItemKind::File,
            Self::Folder | Self::FolderSym | Self::FolderAlias => ItemKind::Folder,
        }
    }

    /// Symlink variant pointing at an entry of the given kind.
    pub fn symlink_to(kind: ItemKind) -> Self {
        match kind {
            ItemKind::File => Self::FileSym,
            ItemKind::Folder => Self::FolderSym,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
            Self::FileSym => "file_sym",
            Self::FolderSym => "folder_sym",
            Self::FileAlias => "file_alias",
            Self::FolderAlias => "folder_alias",
        }
    }
}

impl From<ItemKind> for ItemType {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::File => Self::File,
            ItemKind::Folder => Self::Folder,
        }
    }
}

impl Display for ItemType {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = TokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "folder" => Ok(Self::Folder),
            "file_sym" => Ok(Self::FileSym),
            "folder_sym" => Ok(Self::FolderSym),
            "file_alias" => Ok(Self::FileAlias),
            "folder_alias" => Ok(Self::FolderAlias),
            _ => Err(TokenError::new("item type", token)),
        }
    }
}

/// Repository classification of a dotfile.
///
/// Repository roots only ever produce [`Scope::Public`] or [`Scope::Private`].
/// The config index may also declare [`Scope::Local`] for items that never
/// enter any repository.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Public,
    Private,
    Local,
}

impl Display for Scope {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Public => fmt.write_str("public"),
            Self::Private => fmt.write_str("private"),
            Self::Local => fmt.write_str("local"),
        }
    }
}

impl FromStr for Scope {
    type Err = TokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "local" => Ok(Self::Local),
            _ => Err(TokenError::new("scope", token)),
        }
    }
}

/// Structural hint declared by the config index.
///
/// Describes how the repository copy of an item relates to its home copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DotStruc {
    /// Lives in home only (`hm`).
    Home,

    /// Lives in repository only (`rp`).
    Repo,

    /// Repository item symlinked into home (`rp>hm`).
    RepoToHome,
}

impl DotStruc {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "hm",
            Self::Repo => "rp",
            Self::RepoToHome => "rp>hm",
        }
    }
}

impl Display for DotStruc {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

impl FromStr for DotStruc {
    type Err = TokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim() {
            "hm" => Ok(Self::Home),
            "rp" => Ok(Self::Repo),
            "rp>hm" => Ok(Self::RepoToHome),
            _ => Err(TokenError::new("structural hint", token)),
        }
    }
}

/// Token could not be parsed into its target type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid {what} token {token:?}")]
pub struct TokenError {
    what: &'static str,
    token: String,
}

impl TokenError {
    pub(crate) fn new(what: &'static str, token: impl Into<String>) -> Self {
        Self {
            what,
            token: token.into(),
        }
    }
}

/// Normalize a raw text cell.
///
/// Trims whitespace. Empty cells and the `none`/`nan` sentinels count as
/// absent.
pub fn normalize_token(value: Option<&str>) -> Option<String> {
    let text = value?.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("none") || text.eq_ignore_ascii_case("nan") {
        return None;
    }

    Some(text.to_string())
}

/// Interpret a raw text cell as a flag.
///
/// Only [`TRUE_TOKENS`] count as true, case insensitive. Anything else,
/// including absence, is false.
pub fn parse_flag(value: Option<&str>) -> bool {
    value
        .map(|text| text.trim().to_ascii_lowercase())
        .is_some_and(|text| TRUE_TOKENS.contains(&text.as_str()))
}

/// Top-level dot entry found in a scanned directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DotEntry {
    pub(crate) name: String,
    pub(crate) item_type: ItemType,
}

/// List top-level dot entries of a directory sorted by name.
///
/// Does not descend into sub-directories, and never follows symlinks. Names
/// inside `exclude` are skipped.
pub(crate) fn scan_dot_entries(
    root: &Path,
    exclude: &[String],
) -> Result<Vec<DotEntry>, ignore::Error> {
    let walker = WalkBuilder::new(root)
        .max_depth(Some(1))
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry?;

        // INVARIANT: Depth zero is the root itself.
        if entry.depth() == 0 {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') || exclude.contains(&name) {
            continue;
        }

        entries.push(DotEntry {
            item_type: determine_item_type(entry.path()),
            name,
        });
    }

    Ok(entries)
}

/// Determine item type of an entry on disk.
///
/// Symlinks are classified by the kind of their target. Dangling symlinks
/// count as file symlinks.
pub(crate) fn determine_item_type(path: &Path) -> ItemType {
    let is_symlink = path
        .symlink_metadata()
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);
    let kind = if path.is_dir() {
        ItemKind::Folder
    } else {
        ItemKind::File
    };

    if is_symlink {
        ItemType::symlink_to(kind)
    } else {
        ItemType::from(kind)
    }
}
