//! Metadata re-derived from the artifacts of a prior mothur run.
//!
//! Continuation mode never trusts the command line for the label,
//! the number of samples or the groups to drop: they are read back
//! from the taxonomy summaries, the manifest and the mothur logfile
//! left in the files directory.

pub mod groups;
pub mod label;

use chrono::{DateTime, Local};
use log::{info, warn};
use regex::Regex;

use std::path::{Path, PathBuf};

use crate::consts::*;
use crate::error::{MothulityError, Result};
use crate::manifest::list_files;

pub use groups::ExcludedGroups;

/// Values derived from a prior run, recomputed on every invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct LogDerivedMetadata {
    pub label: f64,
    pub sample_count: usize,
    pub groups_to_exclude: ExcludedGroups,
}

/// Extract label, sample count and (if `remove_below` is set) the
/// groups below that abundance from the artifacts in `directory`.
///
/// # Example
///
/// ```rust, no_run
/// use mothulity::extract::extract;
///
/// let meta = extract("run/".as_ref(), Some(100)).unwrap();
/// println!("{} samples at label {}", meta.sample_count, meta.label);
/// ```
pub fn extract(directory: &Path, remove_below: Option<u64>) -> Result<LogDerivedMetadata> {
    let label = read_label(directory, TAXONOMY_PATTERN)?;
    let sample_count = read_sample_count(directory, MANIFEST_PATTERN)?;
    let groups_to_exclude = match remove_below {
        Some(threshold) => read_groups_to_exclude(directory, LOG_PATTERN, threshold)?,
        None => ExcludedGroups::default(),
    };

    info!(
        "INFO: prior run has label {}, {} samples, {} groups to exclude",
        label,
        sample_count,
        groups_to_exclude.len()
    );

    Ok(LogDerivedMetadata {
        label,
        sample_count,
        groups_to_exclude,
    })
}

/// Translate a shell-style pattern (`*` and `?` only) into an anchored regex.
fn pattern_to_regex(pattern: &str) -> Regex {
    let mut expr = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            c => expr.push_str(&regex::escape(&c.to_string())),
        }
    }
    expr.push('$');

    // every non-wildcard character is escaped above
    Regex::new(&expr).expect("ERROR: escaped pattern is not a valid regex")
}

/// Files directly under `directory` whose name matches `pattern`, sorted by name.
pub fn find_artifacts(directory: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let re = pattern_to_regex(pattern);

    let matches = list_files(directory)?
        .into_iter()
        .filter(|name| re.is_match(name))
        .map(|name| directory.join(name))
        .collect::<Vec<_>>();

    if matches.is_empty() {
        return Err(MothulityError::ArtifactNotFound {
            pattern: pattern.to_string(),
            directory: directory.to_path_buf(),
        });
    }

    Ok(matches)
}

/// First label encoded in the names of the taxonomy summaries.
pub fn read_label(directory: &Path, pattern: &str) -> Result<f64> {
    find_artifacts(directory, pattern)?
        .iter()
        .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .find_map(|name| label::parse_label(&name))
        .ok_or_else(|| MothulityError::UnresolvableLabel {
            pattern: pattern.to_string(),
            directory: directory.to_path_buf(),
        })
}

/// Number of lines in the manifest, one per paired sample.
pub fn read_sample_count(directory: &Path, pattern: &str) -> Result<usize> {
    let matches = find_artifacts(directory, pattern)?;
    if matches.len() > 1 {
        warn!(
            "WARN: {} files match '{}', counting samples in {}",
            matches.len(),
            pattern,
            matches[0].display()
        );
    }

    let manifest = &matches[0];
    let contents =
        std::fs::read_to_string(manifest).map_err(|e| MothulityError::MalformedManifest {
            path: manifest.clone(),
            line: 0,
            reason: e.to_string(),
        })?;

    Ok(contents.lines().count())
}

/// Groups below `threshold` in the most recent logfile.
pub fn read_groups_to_exclude(
    directory: &Path,
    pattern: &str,
    threshold: u64,
) -> Result<ExcludedGroups> {
    let log = most_recent(find_artifacts(directory, pattern)?)?;
    let contents = std::fs::read_to_string(&log).map_err(|e| MothulityError::io(&log, e))?;

    Ok(groups::groups_below(&contents, threshold))
}

/// Pick the most recently modified path; ties go to the later name.
fn most_recent(paths: Vec<PathBuf>) -> Result<PathBuf> {
    let stamped = paths
        .into_iter()
        .map(|path| {
            std::fs::metadata(&path)
                .and_then(|m| m.modified())
                .map(|modified| (modified, path.clone()))
                .map_err(|e| MothulityError::io(&path, e))
        })
        .collect::<Result<Vec<_>>>()?;

    let (modified, path) = stamped
        .into_iter()
        .max_by_key(|(modified, _)| *modified)
        .ok_or_else(|| {
            MothulityError::io(".", std::io::Error::other("no candidate logfile"))
        })?;

    info!(
        "INFO: reading groups from {} (modified {})",
        path.display(),
        DateTime::<Local>::from(modified).format("%Y-%m-%d %H:%M:%S")
    );

    Ok(path)
}
