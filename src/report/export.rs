// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Report export.
//!
//! Every export run writes into one directory, prefixing each file with the
//! same timestamp so the outputs of one run sort together:
//!
//! - `<yymmdd-HHMMSS>_<base>.md`: Markdown report.
//! - `<yymmdd-HHMMSS>_<base>.csv`: report table.
//! - `<yymmdd-HHMMSS>_<base>_FULL_DF.csv`: full table.
//!
//! A failed export is logged, never fatal. Other outputs are still attempted.

use crate::{
    pipeline::Output,
    report::markdown::MarkdownReport,
    schema::{header, Column, MainColumn, ReportColumn, Row},
};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::{
    fs::{create_dir_all, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{error, info, instrument};

/// Title of the Markdown report.
pub const REPORT_TITLE: &str = "Dotfile report";

/// Export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory to write outputs into.
    pub dir: PathBuf,

    /// Base name shared by all outputs.
    pub base_name: String,
    pub markdown: bool,
    pub csv: bool,
    pub full_csv: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./_output"),
            base_name: "mac-dot-report".into(),
            markdown: true,
            csv: true,
            full_csv: false,
        }
    }
}

/// Output file paths of one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub markdown: PathBuf,
    pub csv: PathBuf,
    pub full_csv: PathBuf,
}

impl OutputPaths {
    pub fn timestamped(dir: impl AsRef<Path>, base_name: &str, now: DateTime<Local>) -> Self {
        let dir = dir.as_ref();
        let stamp = now.format("%y%m%d-%H%M%S");

        Self {
            markdown: dir.join(format!("{stamp}_{base_name}.md")),
            csv: dir.join(format!("{stamp}_{base_name}.csv")),
            full_csv: dir.join(format!("{stamp}_{base_name}_FULL_DF.csv")),
        }
    }
}

/// Write rows as CSV, with header, in schema column order.
///
/// # Errors
///
/// - Return [`ExportError::Csv`] if a record cannot be written.
/// - Return [`ExportError::Io`] if the writer cannot be flushed.
pub fn write_table<C, R>(writer: impl Write, rows: &[R]) -> Result<()>
where
    C: Column,
    R: Row<C>,
{
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(header::<C>())?;
    for row in rows {
        csv.write_record(row.record())?;
    }
    csv.flush()?;

    Ok(())
}

/// Save every enabled output of a run.
///
/// Returns the paths that were written successfully.
#[instrument(skip(output, settings), level = "debug")]
pub fn save_outputs(output: &Output, settings: &ExportSettings) -> Vec<PathBuf> {
    let mut written = Vec::new();

    if let Err(error) = create_dir_all(&settings.dir) {
        error!(
            "failed to create output directory {:?}: {error}",
            settings.dir.display()
        );
        return written;
    }
    info!("output directory: {}", settings.dir.display());

    let paths = OutputPaths::timestamped(&settings.dir, &settings.base_name, Local::now());

    if settings.markdown {
        let markdown = MarkdownReport {
            title: REPORT_TITLE,
            report: &output.report,
            unmatched: &output.unmatched,
            fixtures: &output.fixtures,
        };
        export_file(&mut written, &paths.markdown, "Markdown report", |file| {
            write!(file, "{markdown}")?;
            file.flush()?;
            Ok(())
        });
    }

    if settings.csv {
        export_file(&mut written, &paths.csv, "report CSV", |file| {
            write_table::<ReportColumn, _>(file, &output.report.rows)
        });
    }

    if settings.full_csv {
        export_file(&mut written, &paths.full_csv, "full table CSV", |file| {
            write_table::<MainColumn, _>(file, &output.full.rows)
        });
    }

    written
}

fn export_file(
    written: &mut Vec<PathBuf>,
    path: &Path,
    what: &str,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<()>,
) {
    let result = File::create(path)
        .map_err(|err| ExportError::Create {
            source: err,
            path: path.to_path_buf(),
        })
        .and_then(|file| write(&mut BufWriter::new(file)));

    match result {
        Ok(()) => {
            info!("{what} saved to {}", path.display());
            written.push(path.to_path_buf());
        }
        Err(error) => error!("failed to export {what}: {error}"),
    }
}

/// Export error types.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Output file cannot be created.
    #[error("failed to create output file {:?}", path.display())]
    Create {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Record cannot be written as CSV.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Output cannot be written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Friendly result alias :3
type Result<T, E = ExportError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        consolidate::{ItemRecord, MainTable},
        merge::identity::Identity,
        report::ReportTable,
        source::{home::HomeRecord, ItemKind, ItemType},
        status::{unmatched::Unmatched, ReportRow},
    };
    use chrono::TimeZone;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    fn item() -> ItemRecord {
        ItemRecord {
            identity: Identity::new(".bashrc"),
            item_type: Some(ItemKind::File),
            unique_id: 4,
            sort_orig: -1,
            repo: None,
            home: Some(HomeRecord {
                name: ".bashrc".into(),
                item_type: ItemType::File,
                unique_id: 4,
            }),
            manifest: None,
            index: None,
        }
    }

    fn output() -> Output {
        let item = item();
        Output {
            report: ReportTable {
                rows: vec![ReportRow::derive(&item)],
            },
            full: MainTable { rows: vec![item] },
            unmatched: Unmatched::default(),
            fixtures: Vec::new(),
            mismatches: Vec::new(),
        }
    }

    #[test]
    fn timestamped_paths_share_prefix() -> anyhow::Result<()> {
        let now = Local
            .with_ymd_and_hms(2025, 3, 7, 9, 5, 1)
            .single()
            .ok_or_else(|| anyhow::anyhow!("ambiguous local time"))?;
        let paths = OutputPaths::timestamped("/tmp/out", "mac-dot-report", now);

        assert_eq!(
            paths,
            OutputPaths {
                markdown: "/tmp/out/250307-090501_mac-dot-report.md".into(),
                csv: "/tmp/out/250307-090501_mac-dot-report.csv".into(),
                full_csv: "/tmp/out/250307-090501_mac-dot-report_FULL_DF.csv".into(),
            }
        );

        Ok(())
    }

    #[test]
    fn full_table_csv_fills_defaults() -> anyhow::Result<()> {
        let mut buffer = Vec::new();
        write_table::<MainColumn, _>(&mut buffer, &[item()])?;

        let expect = indoc! {"
            item_name,item_type,unique_id,item_name_rp,item_type_rp,repo_scope_rp,git_rp,item_name_hm,item_type_hm,item_name_hm_db,item_type_hm_db,item_name_rp_db,item_type_rp_db,repo_scope_db,item_name_rp_cf,item_type_rp_cf,item_name_hm_cf,item_type_hm_cf,repo_scope_cf,dot_struc_cf,cat_1_cf,cat_1_name_cf,cat_2_cf,comment_cf,no_show_cf,sort_orig,unique_id_rp,unique_id_db,unique_id_hm,unique_id_cf
            .bashrc,file,4,,,,false,.bashrc,file,,,,,,,,,,,,,,,,false,-1,-1,-1,4,-1
        "};
        assert_eq!(String::from_utf8(buffer)?, expect);

        Ok(())
    }

    #[sealed_test]
    fn save_enabled_outputs_only() -> anyhow::Result<()> {
        let settings = ExportSettings {
            dir: "nested/out".into(),
            full_csv: true,
            markdown: false,
            ..Default::default()
        };

        let written = save_outputs(&output(), &settings);
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|path| path.exists()));
        assert!(written[0].to_string_lossy().ends_with("_mac-dot-report.csv"));
        assert!(written[1].to_string_lossy().ends_with("_mac-dot-report_FULL_DF.csv"));

        let report = std::fs::read_to_string(&written[0])?;
        assert!(report.starts_with("item_name,item_type,dot_state,st_match_symb,st_alert,"));
        assert!(report.contains(".bashrc,file,NoSym,✗,not indexed,"));

        Ok(())
    }
}
