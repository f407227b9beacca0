use std::{fs, path::Path};

use anyhow::{Context, Result};
use card_sort_core::StimulusItem;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// ChaCha stream reserved for the initial shuffle of the collections.
const LOADING_STREAM: u64 = 1;

/// Loads and shuffles the singles and doubles collections.
///
/// The shuffle draws from its own stream of `seed` so that it never
/// consumes values the allocation engine will draw.
pub(crate) fn load_collections(
    singles_dir: &Path,
    doubles_dir: &Path,
    seed: u64,
) -> Result<(Vec<StimulusItem>, Vec<StimulusItem>)> {
    let mut singles = load_folder(singles_dir)?;
    let mut doubles = load_folder(doubles_dir)?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(LOADING_STREAM);
    singles.shuffle(&mut rng);
    doubles.shuffle(&mut rng);

    Ok((singles, doubles))
}

/// Lists every regular file of `folder`, sorted by name.
fn load_folder(folder: &Path) -> Result<Vec<StimulusItem>> {
    let entries = fs::read_dir(folder)
        .with_context(|| format!("stimulus folder not found: {}", folder.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to list stimulus folder {}", folder.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to inspect {}", entry.path().display()))?;
        if file_type.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    tracing::debug!(folder = %folder.display(), count = paths.len(), "stimulus folder listed");
    Ok(paths
        .iter()
        .map(|path| StimulusItem::new(path.to_string_lossy()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn folder_with(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in names {
            fs::write(dir.path().join(name), b"png").expect("write stimulus");
        }
        dir
    }

    #[test]
    fn lists_regular_files_in_name_order() {
        let dir = folder_with(&["c_red.png", "a_blue.png", "b_green.png"]);
        fs::create_dir(dir.path().join("nested")).expect("nested dir");

        let items = load_folder(dir.path()).expect("load");
        let names: Vec<PathBuf> = items
            .iter()
            .map(|item| PathBuf::from(item.handle()))
            .collect();
        assert_eq!(
            names,
            [
                dir.path().join("a_blue.png"),
                dir.path().join("b_green.png"),
                dir.path().join("c_red.png"),
            ]
        );
        assert_eq!(items[0].discriminant(), ["a", "blue"]);
    }

    #[test]
    fn missing_folder_is_named_in_the_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("Single");
        let error = load_folder(&missing).expect_err("folder is missing");
        assert!(error.to_string().contains("Single"));
    }

    #[test]
    fn shuffle_is_reproducible_for_a_seed() {
        let singles: Vec<String> = (0..20).map(|n| format!("s{n:02}.png")).collect();
        let doubles: Vec<String> = (0..20).map(|n| format!("d{n:02}.png")).collect();
        let singles_dir = folder_with(&singles.iter().map(String::as_str).collect::<Vec<_>>());
        let doubles_dir = folder_with(&doubles.iter().map(String::as_str).collect::<Vec<_>>());

        let first = load_collections(singles_dir.path(), doubles_dir.path(), 11).expect("load");
        let second = load_collections(singles_dir.path(), doubles_dir.path(), 11).expect("load");
        let other = load_collections(singles_dir.path(), doubles_dir.path(), 12).expect("load");

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.0.len(), 20);
        assert_eq!(first.1.len(), 20);
    }
}
