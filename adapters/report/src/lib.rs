#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Plain-text diagnostic rendering of a finished experiment plan.
//!
//! The report consists of one structure file describing every block's
//! series sizes and deck cuts, followed by one file per block listing the
//! final card handles of each series together with its rule label.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result as AnyResult};
use card_sort_core::{Block, EXPERIMENT_NAME, PLAN_VERSION};
use card_sort_session::ExperimentPlan;

/// File name of the global structure listing.
pub const STRUCTURE_FILE_NAME: &str = "blocks_structure.txt";

/// Named text file produced by the report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportFile {
    name: String,
    contents: String,
}

impl ReportFile {
    /// File name relative to the report directory.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rendered text of the file.
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.contents
    }
}

/// File name used for the listing of one block.
#[must_use]
pub fn block_file_name(block: &Block) -> String {
    format!("block_{}.txt", block.index())
}

/// Renders the global structure listing of every block.
#[must_use]
pub fn render_structure(plan: &ExperimentPlan) -> String {
    let mut out = format!(
        "{EXPERIMENT_NAME} {PLAN_VERSION}: global blocks structure (seed {})\n\n",
        plan.seed()
    );

    for block in plan.blocks() {
        out.push_str(&format!("Block {}\n\n", block.index()));
        for series in block.series() {
            out.push_str(&format!(
                "Series {}: size {}\n",
                series.index(),
                series.size().slots()
            ));
        }

        out.push_str("Deck distribution:\n");
        for cut in block.cuts() {
            let dealt = if cut.dealt() == cut.size() {
                String::new()
            } else {
                format!(", dealt {}", cut.dealt())
            };
            out.push_str(&format!(
                "  Deck {} (size {}{dealt}): series {} to {}\n",
                cut.index(),
                cut.size(),
                cut.from_series(),
                cut.to_series()
            ));
            for entry in cut.usage().iter().filter(|entry| entry.used_slots() > 0) {
                out.push_str(&format!(
                    "    Series {}: uses {} slots\n",
                    entry.series(),
                    entry.used_slots()
                ));
            }
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "Discarded: {} singles, {} doubles\n",
        plan.discarded().singles().len(),
        plan.discarded().doubles().len()
    ));
    out
}

/// Renders the final series contents of one block.
#[must_use]
pub fn render_block(block: &Block) -> String {
    let mut out = format!("Final structure of block {}\n\n", block.index());
    for (series, label) in block.labelled_series() {
        out.push_str(&format!(
            "Series {} (size {}, rule {label}):\n",
            series.index(),
            series.size().slots()
        ));
        for card in series.cards() {
            out.push_str("  ");
            out.push_str(card.handle());
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Renders every file of the report, structure listing first.
#[must_use]
pub fn render_report(plan: &ExperimentPlan) -> Vec<ReportFile> {
    let mut files = Vec::with_capacity(plan.blocks().len() + 1);
    files.push(ReportFile {
        name: STRUCTURE_FILE_NAME.to_owned(),
        contents: render_structure(plan),
    });
    files.extend(plan.blocks().iter().map(|block| ReportFile {
        name: block_file_name(block),
        contents: render_block(block),
    }));
    files
}

/// Writes the report into `directory`, creating it when missing.
///
/// Returns the paths of the written files in report order.
pub fn write_report(plan: &ExperimentPlan, directory: &Path) -> AnyResult<Vec<PathBuf>> {
    fs::create_dir_all(directory).with_context(|| {
        format!(
            "failed to create report directory {}",
            directory.display()
        )
    })?;

    let mut written = Vec::new();
    for file in render_report(plan) {
        let path = directory.join(file.name());
        fs::write(&path, file.contents())
            .with_context(|| format!("failed to write report file {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
