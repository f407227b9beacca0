use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use card_sort_core::ExperimentConfig;
use serde::Deserialize;

const DEFAULT_SINGLES_DIR: &str = "media/images/Single";
const DEFAULT_DOUBLES_DIR: &str = "media/images/Double";

/// Fully resolved settings of one invocation.
#[derive(Debug)]
pub(crate) struct Settings {
    pub(crate) experiment: ExperimentConfig,
    pub(crate) singles_dir: PathBuf,
    pub(crate) doubles_dir: PathBuf,
    pub(crate) seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    seed: Option<u64>,
    experiment: ExperimentConfig,
    stimuli: StimuliSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StimuliSection {
    singles_dir: Option<PathBuf>,
    doubles_dir: Option<PathBuf>,
}

impl Settings {
    /// Reads the settings file when one is given, otherwise uses defaults.
    ///
    /// Relative stimulus folders in the file resolve against the file's
    /// own directory.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::from_file(SettingsFile::default(), Path::new("")));
        };

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let file = parse_settings(&contents)
            .with_context(|| format!("invalid settings file {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(Self::from_file(file, base))
    }

    /// Applies command-line values on top of the file settings.
    pub(crate) fn with_overrides(
        mut self,
        singles_dir: Option<PathBuf>,
        doubles_dir: Option<PathBuf>,
        seed: Option<u64>,
    ) -> Self {
        if let Some(dir) = singles_dir {
            self.singles_dir = dir;
        }
        if let Some(dir) = doubles_dir {
            self.doubles_dir = dir;
        }
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }

    fn from_file(file: SettingsFile, base: &Path) -> Self {
        let singles_dir = file
            .stimuli
            .singles_dir
            .map_or_else(|| PathBuf::from(DEFAULT_SINGLES_DIR), |dir| base.join(dir));
        let doubles_dir = file
            .stimuli
            .doubles_dir
            .map_or_else(|| PathBuf::from(DEFAULT_DOUBLES_DIR), |dir| base.join(dir));

        Self {
            experiment: file.experiment,
            singles_dir,
            doubles_dir,
            seed: file.seed,
        }
    }
}

fn parse_settings(contents: &str) -> Result<SettingsFile> {
    toml::from_str(contents).context("failed to parse settings toml contents")
}
