// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dotrep::{
    config::Settings,
    pipeline::{run, PipelineError},
    report::export::save_outputs,
    source::{repo::RepoError, ItemType},
    status::{overrides::FixtureMode, DotState},
    Output,
};

use anyhow::Result;
use indoc::indoc;
use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::{
    fs::{create_dir_all, read_dir, read_to_string, remove_dir_all, remove_file, write},
    os::unix::fs::symlink,
    path::Path,
};

const SETTINGS: &str = indoc! {r#"
    [repo]
    public = "./public"
    private = "./private"

    [home]
    path = "./home"

    [index]
    path = "./data/dotrep_config.csv"
    fixtures = "./data/test_fixtures.csv"

    [report]
    dir = "./_output"
    full_csv = true
"#};

const MANIFEST: &str = indoc! {r#"
    - defaults:
        link:
          relink: true
    - clean: ['~']
    - link:
        ~/.zshrc: .zshrc
        ~/.config/nvim: nvim
"#};

const CONFIG_INDEX: &str = indoc! {r#"
    item_name_rp,item_type_rp,item_name_hm,item_type_hm,repo_scope,dot_struc,cat_1,cat_1_name,cat_2,comment,no_show
    .zshrc,file,.zshrc,file_sym,public,rp>hm,01,shell,,zsh config,
    .ssh_config,file,none,none,private,rp,02,secrets,,ssh,
    none,none,.vimrc,file,local,hm,01,shell,,vim,yes
    .gone,file,.gone,file_sym,public,rp>hm,03,misc,,removed long ago,
"#};

const FIXTURES: &str = indoc! {r#"
    fixture_id,item_name,scope,fixture_type,enabled,suppress_unmatched,suppress_alert,expected_state,notes
    fx-01,.dotrep_test_a,local,file,yes,yes,yes,Synced,dummy file
"#};

/// Synthetic repository and home layout inside the current directory.
struct DotTree;

impl DotTree {
    fn build() -> Result<Self> {
        create_dir_all("public/.git")?;
        create_dir_all("private")?;
        create_dir_all("home/.cache")?;
        create_dir_all("data")?;

        write("public/.zshrc", "export EDITOR=nvim\n")?;
        write("public/.env_local", "TOKEN=blah\n")?;
        write("public/.gitignore", ".env_local\n")?;
        write("public/install.conf.yaml", MANIFEST)?;
        write("private/.ssh_config", "Host *\n")?;

        symlink("../public/.zshrc", "home/.zshrc")?;
        write("home/.vimrc", "set number\n")?;
        write("home/.dotrep_test_a", "")?;
        write("home/.DS_Store", "")?;

        write("data/dotrep_config.csv", CONFIG_INDEX)?;
        write("data/test_fixtures.csv", FIXTURES)?;
        write("dotrep.toml", SETTINGS)?;

        Ok(Self)
    }

    fn settings(&self) -> Result<Settings> {
        Ok(Settings::load("dotrep.toml")?)
    }

    fn run(&self, mode: FixtureMode) -> Result<Output> {
        Ok(run(&self.settings()?, mode)?)
    }
}

fn report_names(output: &Output) -> Vec<&str> {
    output.report.rows.iter().map(|row| row.name()).collect()
}

fn unmatched_names(items: &[dotrep::status::unmatched::UnmatchedItem]) -> Vec<&str> {
    items.iter().map(|item| item.name.as_str()).collect()
}

#[sealed_test]
fn full_report_over_synthetic_tree() -> Result<()> {
    let tree = DotTree::build()?;
    let output = tree.run(FixtureMode::Hide)?;

    assert_eq!(output.full.rows.len(), 7);
    assert_eq!(
        report_names(&output),
        vec![".env_local", ".cache", ".zshrc", ".vimrc", ".ssh_config", ".gone"]
    );
    assert_eq!(
        output
            .report
            .rows
            .iter()
            .map(|row| row.sort_out)
            .collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4, 5]
    );

    let zshrc = output.report.find(".zshrc").ok_or_else(|| anyhow::anyhow!("no .zshrc"))?;
    assert_eq!(zshrc.dot_state, DotState::Synced);
    assert_eq!(zshrc.matching.symbol(), "✓");
    assert!(zshrc.matching.presence.manifest);
    assert_eq!(zshrc.alert, None);

    let ssh = output.report.find(".ssh_config").ok_or_else(|| anyhow::anyhow!("no .ssh_config"))?;
    assert_eq!(ssh.dot_state, DotState::Local);
    assert_eq!(ssh.matching.symbol(), "✓");

    let vimrc = output.report.find(".vimrc").ok_or_else(|| anyhow::anyhow!("no .vimrc"))?;
    assert_eq!(vimrc.dot_state, DotState::NoSym);

    let env = output.report.find(".env_local").ok_or_else(|| anyhow::anyhow!("no .env_local"))?;
    assert_eq!(env.item.git_rp(), Some(false));
    assert_eq!(env.alert.as_deref(), Some("not indexed"));

    let gone = output.report.find(".gone").ok_or_else(|| anyhow::anyhow!("no .gone"))?;
    assert_eq!(gone.alert.as_deref(), Some("missing"));
    assert_eq!(gone.matching.symbol(), "✗");

    assert_eq!(unmatched_names(&output.unmatched.home_not_in_config), vec![".cache"]);
    assert_eq!(
        unmatched_names(&output.unmatched.config_not_in_home),
        vec![".gone", ".ssh_config"]
    );
    assert_eq!(
        output.unmatched.config_not_in_home[1].item_type,
        Some(ItemType::File)
    );
    assert_eq!(
        output.unmatched.config_not_in_home[1].comment.as_deref(),
        Some("ssh")
    );
    assert!(output.fixtures.is_empty());
    assert!(output.mismatches.is_empty());

    Ok(())
}

#[sealed_test(env = [("DOTREP_SHOW_TEST_FIXTURES", "1")])]
fn shown_fixtures_keep_rows_but_clear_alerts() -> Result<()> {
    let tree = DotTree::build()?;
    let output = tree.run(FixtureMode::from_env())?;

    assert_eq!(output.report.len(), 7);
    let fixture = output
        .report
        .find(".dotrep_test_a")
        .ok_or_else(|| anyhow::anyhow!("no fixture row"))?;
    assert_eq!(fixture.alert, None);
    assert_eq!(fixture.dot_state, DotState::NoSym);

    assert_eq!(unmatched_names(&output.unmatched.home_not_in_config), vec![".cache"]);
    assert_eq!(output.fixtures.len(), 1);
    assert_eq!(output.mismatches.len(), 1);
    assert_eq!(output.mismatches[0].expected, DotState::Synced);

    Ok(())
}

#[sealed_test]
fn runs_are_idempotent() -> Result<()> {
    let tree = DotTree::build()?;
    let first = tree.run(FixtureMode::Hide)?;
    let second = tree.run(FixtureMode::Hide)?;

    assert_eq!(first, second);

    Ok(())
}

#[sealed_test]
fn missing_private_root_is_skipped() -> Result<()> {
    let tree = DotTree::build()?;
    remove_dir_all("private")?;
    let output = tree.run(FixtureMode::Hide)?;

    let ssh = output.report.find(".ssh_config").ok_or_else(|| anyhow::anyhow!("no .ssh_config"))?;
    assert_eq!(ssh.alert.as_deref(), Some("missing"));
    assert_eq!(ssh.dot_state, DotState::Local);

    Ok(())
}

#[sealed_test]
fn malformed_manifest_still_reports() -> Result<()> {
    let tree = DotTree::build()?;
    write("public/install.conf.yaml", "- link: [unclosed\n")?;
    let output = tree.run(FixtureMode::Hide)?;

    assert_eq!(output.report.len(), 6);
    let zshrc = output.report.find(".zshrc").ok_or_else(|| anyhow::anyhow!("no .zshrc"))?;
    assert!(!zshrc.matching.presence.manifest);
    assert_eq!(zshrc.dot_state, DotState::Synced);

    Ok(())
}

#[sealed_test]
fn malformed_fixtures_still_report() -> Result<()> {
    let tree = DotTree::build()?;
    write("data/test_fixtures.csv", "fixture_id,item_name\nfx-01,.dotrep_test_a,extra\n")?;
    let output = tree.run(FixtureMode::Hide)?;

    assert!(output.report.find(".dotrep_test_a").is_some());
    assert_eq!(
        unmatched_names(&output.unmatched.home_not_in_config),
        vec![".cache", ".dotrep_test_a"]
    );

    Ok(())
}

#[sealed_test]
fn missing_index_still_reports() -> Result<()> {
    let tree = DotTree::build()?;
    remove_file("data/dotrep_config.csv")?;
    let output = tree.run(FixtureMode::Hide)?;

    let zshrc = output.report.find(".zshrc").ok_or_else(|| anyhow::anyhow!("no .zshrc"))?;
    assert_eq!(zshrc.alert.as_deref(), Some("not indexed"));
    assert!(output.unmatched.config_not_in_home.is_empty());

    Ok(())
}

#[sealed_test]
fn missing_home_still_reports() -> Result<()> {
    let tree = DotTree::build()?;
    remove_dir_all("home")?;
    let output = tree.run(FixtureMode::Hide)?;

    let zshrc = output.report.find(".zshrc").ok_or_else(|| anyhow::anyhow!("no .zshrc"))?;
    assert!(!zshrc.matching.presence.home);
    assert!(output.unmatched.home_not_in_config.is_empty());

    Ok(())
}

#[sealed_test]
fn scope_collision_is_fatal() -> Result<()> {
    let tree = DotTree::build()?;
    write("public/.ssh_config", "Host *\n")?;

    let result = tree.run(FixtureMode::Hide);
    let error = result.err().ok_or_else(|| anyhow::anyhow!("expected collision"))?;
    let error = error
        .downcast::<PipelineError>()
        .map_err(|_| anyhow::anyhow!("unexpected error type"))?;

    assert!(matches!(error, PipelineError::Collision(RepoError::ScopeCollision(_))));
    assert_eq!(
        error.to_string(),
        "dot item name collision across repos:\n- .ssh_config: private, public"
    );

    Ok(())
}

#[sealed_test]
fn export_writes_timestamped_outputs() -> Result<()> {
    let tree = DotTree::build()?;
    let settings = tree.settings()?;
    let output = run(&settings, FixtureMode::Hide)?;

    let written = save_outputs(&output, &settings.report);
    assert_eq!(written.len(), 3);

    let mut names = read_dir("_output")?
        .map(|entry| Ok(entry?.file_name().to_string_lossy().into_owned()))
        .collect::<Result<Vec<_>>>()?;
    names.sort();
    assert!(names[0].ends_with("_mac-dot-report.csv"));
    assert!(names[1].ends_with("_mac-dot-report.md"));
    assert!(names[2].ends_with("_mac-dot-report_FULL_DF.csv"));

    let markdown = read_to_string(Path::new("_output").join(&names[1]))?;
    assert!(markdown.contains("## shell"));
    assert!(markdown.contains("## Home items not in config\n\n- `.cache` (folder)"));

    Ok(())
}
