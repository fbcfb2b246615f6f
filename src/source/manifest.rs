// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Symlink manager manifest extraction.
//!
//! The manifest is a [dotbot] style YAML file. It is a list of directives,
//! and only `link` directives matter here. A link maps a target path in home
//! to a source path inside the repository:
//!
//! ```yaml
//! - link:
//!     ~/.zshrc: zsh/zshrc
//!     ~/.vim:
//!       path: vim
//!       create: true
//!     ~/.tmux.conf:
//! ```
//!
//! A null source means the basename of the target with its leading dot
//! stripped. Source paths are resolved relative to the directory holding the
//! manifest itself. Only targets that name a single top-level entry of home
//! are kept, because those are the only entries the home scan can see.
//!
//! [dotbot]: https://github.com/anishathalye/dotbot

use crate::source::{determine_item_type, ItemType, Scope, UniqueId, UniqueIds};

use serde_yaml::Value;
use std::{
    fs::read_to_string,
    path::{Component, Path, PathBuf},
};
use tracing::{debug, instrument, warn};

/// One link declared by the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    /// Name of the symlink in home.
    pub name_hm: Option<String>,

    /// Type of the symlink in home.
    pub type_hm: Option<ItemType>,

    /// Name of the link source in the repository.
    pub name_rp: Option<String>,

    /// Type of the link source in the repository.
    pub type_rp: Option<ItemType>,

    /// Scope of the repository holding the manifest.
    pub scope: Option<Scope>,
    pub unique_id: UniqueId,
}

/// Raw link entry as written in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub target: String,
    pub source: String,
}

/// Load symlink manager manifest.
#[derive(Debug, Clone)]
pub struct ManifestLoad {
    path: PathBuf,
    scope: Scope,
}

impl ManifestLoad {
    pub fn new(path: impl Into<PathBuf>, scope: Scope) -> Self {
        Self {
            path: path.into(),
            scope,
        }
    }

    /// Extract manifest records.
    ///
    /// Missing manifest contributes no records.
    ///
    /// # Errors
    ///
    /// - Return [`ManifestError::Read`] if the manifest cannot be read.
    /// - Return [`ManifestError::Deserialize`] if the manifest is not valid
    ///   YAML.
    #[instrument(skip(self, ids), level = "debug")]
    pub fn extract(&self, ids: &mut UniqueIds) -> Result<Vec<ManifestRecord>> {
        if !self.path.is_file() {
            warn!("manifest not found: {}", self.path.display());
            return Ok(Vec::new());
        }

        let content = read_to_string(&self.path).map_err(|err| ManifestError::Read {
            source: err,
            path: self.path.clone(),
        })?;
        let base_dir = self.path.parent().unwrap_or(Path::new("."));

        let mut records = Vec::new();
        for link in parse_links(&content)? {
            let Some(name_hm) = home_entry_name(&link.target) else {
                debug!("skip nested link target {:?}", link.target);
                continue;
            };

            let source_path = base_dir.join(&link.source);
            let kind = source_path
                .exists()
                .then(|| determine_item_type(&source_path).base());

            records.push(ManifestRecord {
                name_hm: Some(name_hm),
                type_hm: kind.map(ItemType::symlink_to),
                name_rp: Path::new(&link.source)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned()),
                type_rp: kind.map(ItemType::from),
                scope: Some(self.scope),
                unique_id: ids.issue(),
            });
        }

        Ok(records)
    }
}

/// Parse all link entries out of manifest content.
///
/// # Errors
///
/// - Return [`ManifestError::Deserialize`] if content is not a YAML list.
pub fn parse_links(content: &str) -> Result<Vec<Link>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let directives: Vec<Value> = serde_yaml::from_str(content)?;
    let mut links = Vec::new();
    for directive in &directives {
        let Some(Value::Mapping(mapping)) = directive.get("link") else {
            continue;
        };

        for (target, source) in mapping {
            let Some(target) = target.as_str() else {
                continue;
            };

            let source = match source {
                Value::String(path) => path.clone(),
                Value::Mapping(_) => match source.get("path").and_then(Value::as_str) {
                    Some(path) => path.to_string(),
                    None => default_source(target),
                },
                Value::Null => default_source(target),
                _ => {
                    warn!("skip link {target:?} with unsupported source");
                    continue;
                }
            };

            links.push(Link {
                target: target.to_string(),
                source,
            });
        }
    }

    Ok(links)
}

/// Dotbot default source: basename of target without its leading dot.
fn default_source(target: &str) -> String {
    Path::new(target)
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default()
        .trim_start_matches('.')
        .to_string()
}

/// Name of the top-level home entry a link target refers to.
///
/// Targets must be written relative to home, i.e., with a `~/` or `$HOME/`
/// prefix. Returns `None` for nested targets.
fn home_entry_name(target: &str) -> Option<String> {
    let relative = target
        .strip_prefix("~/")
        .or_else(|| target.strip_prefix("$HOME/"))?;

    let mut components = Path::new(relative)
        .components()
        .filter(|component| !matches!(component, Component::CurDir));
    let first = match components.next()? {
        Component::Normal(name) => name.to_string_lossy().into_owned(),
        _ => return None,
    };

    components.next().is_none().then_some(first)
}

/// Manifest extraction error types.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Manifest cannot be read.
    #[error("failed to read manifest at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Manifest is not valid YAML.
    #[error(transparent)]
    Deserialize(#[from] serde_yaml::Error),
}

/// Friendly result alias :3
type Result<T, E = ManifestError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[test]
    fn parse_link_directives() -> anyhow::Result<()> {
        let result = parse_links(indoc! {r#"
            - defaults:
                link:
                  relink: true
            - clean: ['~']
            - link:
                ~/.zshrc: zsh/zshrc
                ~/.vim:
                  path: vim
                  create: true
                ~/.tmux.conf:
        "#})?;
        let expect = vec![
            Link {
                target: "~/.zshrc".into(),
                source: "zsh/zshrc".into(),
            },
            Link {
                target: "~/.vim".into(),
                source: "vim".into(),
            },
            Link {
                target: "~/.tmux.conf".into(),
                source: "tmux.conf".into(),
            },
        ];
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn empty_manifest_has_no_links() -> anyhow::Result<()> {
        assert_eq!(parse_links("  \n")?, Vec::new());
        Ok(())
    }

    #[test]
    fn home_entry_name_only_accepts_top_level_targets() {
        assert_eq!(home_entry_name("~/.zshrc"), Some(".zshrc".into()));
        assert_eq!(home_entry_name("$HOME/.gitconfig"), Some(".gitconfig".into()));
        assert_eq!(home_entry_name("~/.config/nvim"), None);
        assert_eq!(home_entry_name("/etc/hosts"), None);
    }

    #[sealed_test]
    fn extract_resolves_types_from_repo() -> anyhow::Result<()> {
        std::fs::create_dir_all("repo/vim")?;
        std::fs::write("repo/zshrc", "")?;
        std::fs::write(
            "repo/install.conf.yaml",
            indoc! {r#"
                - link:
                    ~/.zshrc: zshrc
                    ~/.vim: vim
                    ~/.inputrc: inputrc
                    ~/.config/nvim: nvim
            "#},
        )?;

        let result = ManifestLoad::new("repo/install.conf.yaml", Scope::Public)
            .extract(&mut UniqueIds::new())?;
        let expect = vec![
            ManifestRecord {
                name_hm: Some(".zshrc".into()),
                type_hm: Some(ItemType::FileSym),
                name_rp: Some("zshrc".into()),
                type_rp: Some(ItemType::File),
                scope: Some(Scope::Public),
                unique_id: 0,
            },
            ManifestRecord {
                name_hm: Some(".vim".into()),
                type_hm: Some(ItemType::FolderSym),
                name_rp: Some("vim".into()),
                type_rp: Some(ItemType::Folder),
                scope: Some(Scope::Public),
                unique_id: 1,
            },
            ManifestRecord {
                name_hm: Some(".inputrc".into()),
                type_hm: None,
                name_rp: Some("inputrc".into()),
                type_rp: None,
                scope: Some(Scope::Public),
                unique_id: 2,
            },
        ];
        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test]
    fn missing_manifest_is_empty() -> anyhow::Result<()> {
        let result =
            ManifestLoad::new("install.conf.yaml", Scope::Public).extract(&mut UniqueIds::new())?;
        assert!(result.is_empty());
        Ok(())
    }
}
