use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::error::{OverlayError, OverlayResult};

/// Chart image and record document sharing one normalized stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePair {
    pub image: PathBuf,
    pub record: PathBuf,
    /// Directory of the pair relative to the discovery root.
    pub relative_dir: PathBuf,
    pub stem: String,
}

impl SourcePair {
    /// Output file for this pair under `output_root`, mirroring its source
    /// directory.
    #[must_use]
    pub fn output_path(&self, output_root: &Path) -> PathBuf {
        output_root
            .join(&self.relative_dir)
            .join(format!("{}.png", self.stem))
    }
}

/// Replaces every whitespace character and underscore with a hyphen.
#[must_use]
pub fn normalize_stem(stem: &str) -> String {
    stem.chars()
        .map(|ch| if ch.is_whitespace() || ch == '_' { '-' } else { ch })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArtifactKind {
    Image,
    Record,
}

fn artifact_kind(path: &Path) -> Option<ArtifactKind> {
    let extension = path.extension()?.to_str()?;
    if extension.eq_ignore_ascii_case("png") {
        Some(ArtifactKind::Image)
    } else if extension.eq_ignore_ascii_case("json") {
        Some(ArtifactKind::Record)
    } else {
        None
    }
}

#[derive(Debug, Default)]
struct PendingPair {
    image: Option<PathBuf>,
    record: Option<PathBuf>,
}

/// Recursively pairs `.png` and `.json` files under `root`.
///
/// Directories whose name is in `excluded_dirs` are not entered, symlinked
/// directories are not followed and unreadable subdirectories are skipped
/// with a warning. Files pair up when they live in the same directory and
/// their normalized stems match; on a collision the first name in sort order
/// wins. Pairs come back sorted by relative directory, then stem.
pub fn discover_pairs(root: &Path, excluded_dirs: &[String]) -> OverlayResult<Vec<SourcePair>> {
    let mut pending: BTreeMap<(PathBuf, String), PendingPair> = BTreeMap::new();
    collect_artifacts(root, root, excluded_dirs, &mut pending)?;

    let mut pairs = Vec::new();
    for ((relative_dir, stem), candidate) in pending {
        match candidate {
            PendingPair {
                image: Some(image),
                record: Some(record),
            } => pairs.push(SourcePair {
                image,
                record,
                relative_dir,
                stem,
            }),
            PendingPair {
                image: Some(image),
                record: None,
            } => warn!(path = %image.display(), "skipping chart image without record"),
            PendingPair { record, .. } => {
                if let Some(record) = record {
                    debug!(path = %record.display(), "skipping json without chart image");
                }
            }
        }
    }
    Ok(pairs)
}

fn collect_artifacts(
    root: &Path,
    dir: &Path,
    excluded_dirs: &[String],
    pending: &mut BTreeMap<(PathBuf, String), PendingPair>,
) -> OverlayResult<()> {
    let entries = match sorted_entries(dir) {
        Ok(entries) => entries,
        Err(err) if dir != root => {
            warn!(path = %dir.display(), error = %err, "skipping unreadable directory");
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    for (path, file_type) in entries {
        if file_type.is_dir() {
            let excluded = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| excluded_dirs.iter().any(|skip| skip == name));
            if excluded {
                trace!(path = %path.display(), "skipping excluded directory");
                continue;
            }
            collect_artifacts(root, &path, excluded_dirs, pending)?;
            continue;
        }
        // Symlinked directories are not followed, so links cannot loop.
        if file_type.is_symlink() && path.is_dir() {
            debug!(path = %path.display(), "skipping symlinked directory");
            continue;
        }

        let Some(kind) = artifact_kind(&path) else {
            continue;
        };
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let relative_dir = dir.strip_prefix(root).unwrap_or(dir).to_path_buf();
        let slot = pending
            .entry((relative_dir, normalize_stem(stem)))
            .or_default();
        let target = match kind {
            ArtifactKind::Image => &mut slot.image,
            ArtifactKind::Record => &mut slot.record,
        };
        if let Some(kept) = target.as_ref() {
            warn!(
                kept = %kept.display(),
                ignored = %path.display(),
                "file names collide after stem normalization"
            );
            continue;
        }
        *target = Some(path);
    }
    Ok(())
}

fn sorted_entries(dir: &Path) -> OverlayResult<Vec<(PathBuf, fs::FileType)>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|err| OverlayError::io(dir, err))?
        .map(|entry| {
            let entry = entry?;
            Ok((entry.path(), entry.file_type()?))
        })
        .collect::<Result<Vec<_>, std::io::Error>>()
        .map_err(|err| OverlayError::io(dir, err))?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}
