// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Run pipeline.
//!
//! One run reads all four sources plus the fixture file, then merges,
//! consolidates, derives status, and orders the result entirely in memory.
//! Nothing carries over from a previous run.

use crate::{
    config::Settings,
    consolidate::{consolidate, MainTable},
    merge::{merge_sources, Sources},
    report::{build_report, FilterSettings, ReportTable},
    source::{
        fixture::{FixtureRecord, FixtureSet},
        home::HomeScan,
        index::IndexLoad,
        manifest::ManifestLoad,
        repo::{RepoError, RepoRoot, RepoScan},
        Scope, UniqueIds,
    },
    status::{
        derive_status,
        overrides::{FixtureMode, FixtureOverrides, StateMismatch},
        unmatched::{find_unmatched, Unmatched},
    },
};

use tracing::{error, info, instrument};

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Every logical item with all of its source fields.
    pub full: MainTable,

    /// Ordered and filtered report rows.
    pub report: ReportTable,
    pub unmatched: Unmatched,

    /// Fixtures to display, empty unless fixtures are shown.
    pub fixtures: Vec<FixtureRecord>,

    /// Fixtures whose expected dot state the report contradicts.
    pub mismatches: Vec<StateMismatch>,
}

/// Read all sources described by settings.
///
/// A source that cannot be read is logged and contributes no records, so the
/// run continues with degraded data.
///
/// # Errors
///
/// - Return [`PipelineError::Collision`] if any name collides across
///   repository scopes.
#[instrument(skip(settings), level = "debug")]
pub fn load_sources(settings: &Settings) -> Result<(Sources, FixtureSet)> {
    let mut ids = UniqueIds::new();

    let roots = [
        RepoRoot::new(Scope::Public, &settings.repo.public),
        RepoRoot::new(Scope::Private, &settings.repo.private),
    ];
    let repo = match RepoScan::new(roots, &settings.repo.exclude).extract(&mut ids) {
        Ok(records) => records,
        Err(error @ RepoError::ScopeCollision(_)) => return Err(error.into()),
        Err(error) => degrade("repository", error),
    };
    let home = HomeScan::new(&settings.home.path, &settings.home.exclude)
        .extract(&mut ids)
        .unwrap_or_else(|error| degrade("home directory", error));
    let manifest = ManifestLoad::new(settings.manifest_path(), settings.manifest.scope)
        .extract(&mut ids)
        .unwrap_or_else(|error| degrade("manifest", error));
    let index = IndexLoad::new(&settings.index.path)
        .extract(&mut ids)
        .unwrap_or_else(|error| degrade("config index", error));
    let fixtures = FixtureSet::load(&settings.index.fixtures).unwrap_or_else(|error| {
        error!("failed to read test fixtures, continuing without them: {error}");
        FixtureSet::default()
    });

    info!(
        "loaded {} repo, {} home, {} manifest, {} index records, {} fixtures",
        repo.len(),
        home.len(),
        manifest.len(),
        index.len(),
        fixtures.records().len()
    );

    let sources = Sources {
        repo,
        home,
        manifest,
        index,
    };

    Ok((sources, fixtures))
}

fn degrade<T>(what: &str, error: impl std::error::Error) -> Vec<T> {
    error!("failed to read {what}, continuing without it: {error}");
    Vec::new()
}

/// Build run output from already loaded sources.
#[instrument(skip(sources, fixtures, filter), level = "debug")]
pub fn build_output(
    sources: Sources,
    fixtures: &FixtureSet,
    mode: FixtureMode,
    filter: &FilterSettings,
) -> Output {
    let overrides = FixtureOverrides::new(fixtures, mode);

    // INVARIANT: Unmatched lists compare raw source names, so they are
    // computed before the merge takes ownership of the sources.
    let unmatched = find_unmatched(&sources.home, &sources.index, &overrides);

    let full = consolidate(merge_sources(sources));
    let rows = derive_status(&full);
    let mismatches = overrides.check_expected_states(&rows);
    let report = build_report(overrides.apply(rows), filter);

    Output {
        full,
        report,
        unmatched,
        fixtures: overrides.displayed().to_vec(),
        mismatches,
    }
}

/// Perform a full run.
///
/// # Errors
///
/// - Return [`PipelineError::Collision`] if any name collides across
///   repository scopes.
pub fn run(settings: &Settings, mode: FixtureMode) -> Result<Output> {
    let (sources, fixtures) = load_sources(settings)?;
    Ok(build_output(sources, &fixtures, mode, &settings.filter))
}

/// Pipeline error types.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Same name appears in more than one repository scope.
    #[error(transparent)]
    Collision(#[from] RepoError),
}

/// Friendly result alias :3
type Result<T, E = PipelineError> = std::result::Result<T, E>;
