// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository extraction.
//!
//! The dotfile repository can be split across several roots, one per
//! [`Scope`]. Each root is scanned for top-level dot entries, and every entry
//! is classified as tracked or ignored through the root's own `.gitignore`
//! file.
//!
//! # Ignore Rules
//!
//! Ignore rules are deliberately simpler than full gitignore semantics. Each
//! non-blank, non-comment line becomes one pattern. Leading and trailing
//! slashes are stripped before matching, and a trailing slash marks the
//! pattern as folder-typed. An entry is ignored if and only if its name
//! glob-matches a pattern __and__ its base type equals the pattern's type. So
//! `build/` ignores a folder named "build", but never a file named "build".
//!
//! # Scope Collisions
//!
//! A name must belong to exactly one scope. If the same name turns up in more
//! than one root, extraction fails with every colliding name listed before
//! any merging can happen.

use crate::source::{scan_dot_entries, ItemKind, ItemType, Scope, UniqueId, UniqueIds};

use glob::Pattern;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Write as _,
    fs::read_to_string,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Top-level entry of a repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRecord {
    pub name: String,
    pub item_type: ItemType,
    pub scope: Scope,

    /// Entry is tracked by version control, i.e., not ignored.
    pub tracked: bool,
    pub unique_id: UniqueId,
}

/// Repository root tied to its scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRoot {
    pub scope: Scope,
    pub path: PathBuf,
}

impl RepoRoot {
    pub fn new(scope: Scope, path: impl Into<PathBuf>) -> Self {
        Self {
            scope,
            path: path.into(),
        }
    }
}

/// Scan repository roots for dot entries.
#[derive(Debug, Clone)]
pub struct RepoScan {
    roots: Vec<RepoRoot>,
    exclude: Vec<String>,
}

impl RepoScan {
    /// Construct new repository scanner.
    ///
    /// Names in `exclude` are never reported, e.g., ".git".
    pub fn new(
        roots: impl IntoIterator<Item = RepoRoot>,
        exclude: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            roots: roots.into_iter().collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Extract repository records across all roots.
    ///
    /// Missing roots are skipped, and contribute no records.
    ///
    /// # Errors
    ///
    /// - Return [`RepoError::Walk`] if a root cannot be listed.
    /// - Return [`RepoError::ReadIgnore`] if an ignore file cannot be read.
    /// - Return [`RepoError::ScopeCollision`] if any name shows up in more
    ///   than one scope.
    #[instrument(skip(self, ids), level = "debug")]
    pub fn extract(&self, ids: &mut UniqueIds) -> Result<Vec<RepoRecord>> {
        let mut records = Vec::new();
        let mut scopes_by_name: BTreeMap<String, BTreeSet<Scope>> = BTreeMap::new();

        for root in &self.roots {
            if !root.path.is_dir() {
                info!(
                    "repo path not found for scope {:?}: {}",
                    root.scope.to_string(),
                    root.path.display()
                );
                continue;
            }

            let rules = IgnoreRules::load(&root.path)?;
            for entry in scan_dot_entries(&root.path, &self.exclude)? {
                let tracked = !rules.is_ignored(&entry.name, entry.item_type);
                debug!(
                    "{} repo entry {:?} ({}), tracked: {tracked}",
                    root.scope, entry.name, entry.item_type
                );

                scopes_by_name
                    .entry(entry.name.clone())
                    .or_default()
                    .insert(root.scope);
                records.push(RepoRecord {
                    name: entry.name,
                    item_type: entry.item_type,
                    scope: root.scope,
                    tracked,
                    unique_id: ids.issue(),
                });
            }
        }

        let collisions = scopes_by_name
            .into_iter()
            .filter(|(_, scopes)| scopes.len() > 1)
            .map(|(name, scopes)| ScopeCollision {
                name,
                scopes: scopes.into_iter().collect(),
            })
            .collect::<Vec<_>>();
        if !collisions.is_empty() {
            return Err(RepoError::ScopeCollision(collisions));
        }

        Ok(records)
    }
}

/// Ignore rules of one repository root.
#[derive(Debug, Default, Clone)]
pub struct IgnoreRules {
    rules: Vec<IgnoreRule>,
}

#[derive(Debug, Clone)]
struct IgnoreRule {
    pattern: Pattern,
    kind: ItemKind,
}

impl IgnoreRules {
    /// Load ignore rules from `.gitignore` at the top-level of a root.
    ///
    /// Missing ignore file means nothing is ignored.
    ///
    /// # Errors
    ///
    /// - Return [`RepoError::ReadIgnore`] if the ignore file exists, but
    ///   cannot be read.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let path = root.as_ref().join(".gitignore");
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = read_to_string(&path).map_err(|err| RepoError::ReadIgnore {
            source: err,
            path: path.clone(),
        })?;

        Ok(Self::from(content.as_str()))
    }

    /// Check if an entry is ignored.
    ///
    /// Requires both a glob match on the name, and equal base types.
    pub fn is_ignored(&self, name: &str, item_type: ItemType) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.kind == item_type.base() && rule.pattern.matches(name))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<&str> for IgnoreRules {
    fn from(content: &str) -> Self {
        let mut rules: Vec<IgnoreRule> = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let kind = if line.ends_with('/') {
                ItemKind::Folder
            } else {
                ItemKind::File
            };
            let cleaned = line.trim_start_matches('/').trim_end_matches('/');
            let pattern = match Pattern::new(cleaned) {
                Ok(pattern) => pattern,
                Err(error) => {
                    warn!("skip invalid ignore pattern {line:?}: {error}");
                    continue;
                }
            };

            // INVARIANT: Last declaration of a pattern decides its kind.
            rules.retain(|rule| rule.pattern.as_str() != cleaned);
            rules.push(IgnoreRule { pattern, kind });
        }

        Self { rules }
    }
}

/// Name found in more than one repository scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeCollision {
    pub name: String,
    pub scopes: Vec<Scope>,
}

fn render_collisions(collisions: &[ScopeCollision]) -> String {
    let mut out = String::from("dot item name collision across repos:");
    for collision in collisions {
        let mut scopes = collision
            .scopes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        scopes.sort();
        let scopes = scopes.join(", ");
        let _ = write!(out, "\n- {}: {scopes}", collision.name);
    }

    out
}

/// Repository extraction error types.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Repository root cannot be listed.
    #[error(transparent)]
    Walk(#[from] ignore::Error),

    /// Ignore file exists, but cannot be read.
    #[error("failed to read ignore file at {:?}", path.display())]
    ReadIgnore {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Same name appears in more than one repository scope.
    #[error("{}", render_collisions(.0))]
    ScopeCollision(Vec<ScopeCollision>),
}

/// Friendly result alias :3
type Result<T, E = RepoError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[test]
    fn ignore_rules_respect_pattern_type() {
        let rules = IgnoreRules::from("build/\n");

        assert!(rules.is_ignored("build", ItemType::Folder));
        assert!(rules.is_ignored("build", ItemType::FolderSym));
        assert!(!rules.is_ignored("build", ItemType::File));
    }

    #[test]
    fn ignore_rules_skip_comments_and_strip_slashes() {
        let rules = IgnoreRules::from(indoc! {r#"
            # local secrets

            /.netrc
            /.cache/
            .*_history
        "#});

        assert_eq!(rules.len(), 3);
        assert!(rules.is_ignored(".netrc", ItemType::File));
        assert!(rules.is_ignored(".cache", ItemType::Folder));
        assert!(rules.is_ignored(".zsh_history", ItemType::File));
        assert!(!rules.is_ignored(".cache", ItemType::File));
        assert!(!rules.is_ignored(".zshrc", ItemType::File));
    }

    #[test]
    fn ignore_rules_keep_last_declaration() {
        let rules = IgnoreRules::from(indoc! {r#"
            build/
            build
        "#});

        assert_eq!(rules.len(), 1);
        assert!(rules.is_ignored("build", ItemType::File));
        assert!(!rules.is_ignored("build", ItemType::Folder));
    }

    #[sealed_test]
    fn extract_marks_ignored_entries_untracked() -> anyhow::Result<()> {
        std::fs::create_dir_all("public/.git")?;
        std::fs::create_dir_all("public/.vim")?;
        std::fs::write("public/.zshrc", "")?;
        std::fs::write("public/.gitignore", ".vim/\n")?;

        let scan = RepoScan::new(
            [RepoRoot::new(Scope::Public, "public")],
            [".git", ".gitignore"],
        );
        let mut ids = UniqueIds::new();
        let result = scan.extract(&mut ids)?;
        let expect = vec![
            RepoRecord {
                name: ".vim".into(),
                item_type: ItemType::Folder,
                scope: Scope::Public,
                tracked: false,
                unique_id: 0,
            },
            RepoRecord {
                name: ".zshrc".into(),
                item_type: ItemType::File,
                scope: Scope::Public,
                tracked: true,
                unique_id: 1,
            },
        ];
        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test]
    fn extract_skips_missing_root() -> anyhow::Result<()> {
        std::fs::create_dir_all("public")?;
        std::fs::write("public/.bashrc", "")?;

        let scan = RepoScan::new(
            [
                RepoRoot::new(Scope::Public, "public"),
                RepoRoot::new(Scope::Private, "does-not-exist"),
            ],
            Vec::<String>::new(),
        );
        let result = scan.extract(&mut UniqueIds::new())?;
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].scope, Scope::Public);

        Ok(())
    }

    #[sealed_test]
    fn extract_reports_every_scope_collision() -> anyhow::Result<()> {
        for root in ["public", "private"] {
            std::fs::create_dir_all(root)?;
            std::fs::write(format!("{root}/.zshrc"), "")?;
            std::fs::write(format!("{root}/.gitconfig"), "")?;
        }
        std::fs::write("private/.ssh_config", "")?;

        let scan = RepoScan::new(
            [
                RepoRoot::new(Scope::Public, "public"),
                RepoRoot::new(Scope::Private, "private"),
            ],
            Vec::<String>::new(),
        );
        let error = scan.extract(&mut UniqueIds::new()).unwrap_err();
        let expect = indoc! {r#"
            dot item name collision across repos:
            - .gitconfig: private, public
            - .zshrc: private, public"#};
        assert_eq!(error.to_string(), expect);

        match error {
            RepoError::ScopeCollision(collisions) => assert_eq!(collisions.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }

        Ok(())
    }
}
