// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the settings file that dotrep reads to locate its
//! four sources and decide what to export. Every section and every field is
//! optional. Anything left out falls back to its default.
//!
//! # General Layout
//!
//! ```toml
//! [repo]
//! public = "~/._dotfiles/dotfiles_srb_repo"
//! private = "~/._dotfiles/dotfiles_srb_repo_private"
//! exclude = [".git", ".gitignore", ".DS_Store"]
//!
//! [home]
//! path = "~"
//! exclude = [".DS_Store"]
//!
//! [manifest]
//! path = "~/._dotfiles/dotfiles_srb_repo/install.conf.yaml"
//! scope = "public"
//!
//! [index]
//! path = "./data/dotrep_config.csv"
//! fixtures = "./data/test_fixtures.csv"
//!
//! [report]
//! dir = "./_output"
//! base_name = "mac-dot-report"
//! markdown = true
//! csv = true
//! full_csv = false
//!
//! [filter]
//! hide_no_shows = false
//! hide_full_matches = false
//! hide_full_and_only = false
//! match_result = "all"
//! ```
//!
//! Paths undergo shell expansion, so `~` and `$VAR` work anywhere a path is
//! expected.

use crate::{
    report::{export::ExportSettings, FilterSettings},
    source::Scope,
};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, instrument};

/// Environment variable overriding the report output directory.
pub const REPORTS_DIR_ENV: &str = "SRB_REPORTS_DIR";

/// Name of the manifest file inside the public repository root.
pub const MANIFEST_FILE_NAME: &str = "install.conf.yaml";

/// Full settings of a run.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub repo: RepoSettings,
    pub home: HomeSettings,
    pub manifest: ManifestSettings,
    pub index: IndexSettings,
    pub report: ExportSettings,
    pub filter: FilterSettings,
}

impl Settings {
    /// Load settings from file.
    ///
    /// Missing file yields defaults. Either way, paths are shell expanded.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if the file exists, but cannot be read.
    /// - Return [`ConfigError::Deserialize`] if the file is not valid TOML.
    /// - Return [`ConfigError::ShellExpansion`] if a path references an
    ///   undefined variable.
    #[instrument(skip(path), level = "debug")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("no settings file at {}, using defaults", path.display());
            let mut settings = Self::default();
            settings.expand_paths()?;
            return Ok(settings);
        }

        read_to_string(path)
            .map_err(|err| ConfigError::Read {
                source: err,
                path: path.to_path_buf(),
            })?
            .parse()
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = std::env::var_os(REPORTS_DIR_ENV).filter(|dir| !dir.is_empty()) {
            self.report.dir = PathBuf::from(dir);
        }

        self
    }

    /// Manifest path, defaulting to the one inside the public repository.
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest
            .path
            .clone()
            .unwrap_or_else(|| self.repo.public.join(MANIFEST_FILE_NAME))
    }

    fn expand_paths(&mut self) -> Result<()> {
        // INVARIANT: Perform shell expansion on every path field.
        expand(&mut self.repo.public)?;
        expand(&mut self.repo.private)?;
        expand(&mut self.home.path)?;
        if let Some(path) = self.manifest.path.as_mut() {
            expand(path)?;
        }
        expand(&mut self.index.path)?;
        expand(&mut self.index.fixtures)?;
        expand(&mut self.report.dir)?;

        Ok(())
    }
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut settings: Settings = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;
        settings.expand_paths()?;

        Ok(settings)
    }
}

impl Display for Settings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

fn expand(path: &mut PathBuf) -> Result<()> {
    let expanded = shellexpand::full(path.to_string_lossy().as_ref())
        .map_err(ConfigError::ShellExpansion)?
        .into_owned();
    *path = PathBuf::from(expanded);

    Ok(())
}

/// Repository roots.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RepoSettings {
    /// Root of the public repository.
    pub public: PathBuf,

    /// Root of the private repository.
    pub private: PathBuf,

    /// Entry names never reported from either root.
    pub exclude: Vec<String>,
}

impl Default for RepoSettings {
    fn default() -> Self {
        Self {
            public: PathBuf::from("~/._dotfiles/dotfiles_srb_repo"),
            private: PathBuf::from("~/._dotfiles/dotfiles_srb_repo_private"),
            exclude: vec![".git".into(), ".gitignore".into(), ".DS_Store".into()],
        }
    }
}

/// Home directory listing.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HomeSettings {
    pub path: PathBuf,
    pub exclude: Vec<String>,
}

impl Default for HomeSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("~"),
            exclude: vec![".DS_Store".into()],
        }
    }
}

/// Symlink manager manifest.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ManifestSettings {
    /// Manifest path, or absent to use the public repository's manifest.
    pub path: Option<PathBuf>,

    /// Scope every manifest record belongs to.
    pub scope: Scope,
}

/// Config index and test fixtures.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexSettings {
    pub path: PathBuf,
    pub fixtures: PathBuf,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/dotrep_config.csv"),
            fixtures: PathBuf::from("./data/test_fixtures.csv"),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Settings file exists, but cannot be read.
    #[error("failed to read settings file at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MatchFilter;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("HOME", "/home/blah"), ("DOTS", "/srv/dots")])]
    fn deserialize_settings() -> anyhow::Result<()> {
        let result: Settings = indoc! {r#"
            [repo]
            public = "$DOTS/public"
            private = "$DOTS/private"

            [home]
            exclude = [".DS_Store", ".Trash"]

            [manifest]
            scope = "private"

            [report]
            dir = "~/reports"
            full_csv = true

            [filter]
            hide_no_shows = true
            match_result = "unmatched"
        "#}
        .parse()?;

        let expect = Settings {
            repo: RepoSettings {
                public: "/srv/dots/public".into(),
                private: "/srv/dots/private".into(),
                ..Default::default()
            },
            home: HomeSettings {
                path: "/home/blah".into(),
                exclude: vec![".DS_Store".into(), ".Trash".into()],
            },
            manifest: ManifestSettings {
                path: None,
                scope: Scope::Private,
            },
            index: IndexSettings::default(),
            report: ExportSettings {
                dir: "/home/blah/reports".into(),
                full_csv: true,
                ..Default::default()
            },
            filter: FilterSettings {
                hide_no_shows: true,
                match_result: MatchFilter::Unmatched,
                ..Default::default()
            },
        };

        assert_eq!(result, expect);
        assert_eq!(
            result.manifest_path(),
            PathBuf::from("/srv/dots/public/install.conf.yaml")
        );

        Ok(())
    }

    #[sealed_test(env = [("HOME", "/home/blah")])]
    fn missing_settings_file_yields_expanded_defaults() -> anyhow::Result<()> {
        let settings = Settings::load("dotrep.toml")?;

        assert_eq!(
            settings.repo.public,
            PathBuf::from("/home/blah/._dotfiles/dotfiles_srb_repo")
        );
        assert_eq!(settings.home.path, PathBuf::from("/home/blah"));
        assert_eq!(settings.report, ExportSettings::default());
        assert_eq!(settings.filter, FilterSettings::default());

        Ok(())
    }

    #[sealed_test(env = [("HOME", "/home/blah"), ("SRB_REPORTS_DIR", "/var/reports")])]
    fn reports_dir_env_overrides_settings() -> anyhow::Result<()> {
        let settings = Settings::load("dotrep.toml")?.with_env_overrides();
        assert_eq!(settings.report.dir, PathBuf::from("/var/reports"));

        Ok(())
    }

    #[test]
    fn reject_unknown_match_filter() {
        let result = "[filter]\nmatch_result = \"both\"\n".parse::<Settings>();
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }

    #[test]
    fn serialize_filter_section() {
        let settings = Settings {
            filter: FilterSettings {
                hide_full_matches: true,
                ..Default::default()
            },
            ..Default::default()
        };

        let expect = indoc! {r#"
            [filter]
            hide_no_shows = false
            hide_full_matches = true
            hide_full_and_only = false
            match_result = "all"
        "#};
        assert!(settings.to_string().ends_with(expect));
    }
}
