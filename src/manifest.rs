use hashbrown::HashMap;
use log::{debug, info, warn};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{MothulityError, Result};

/// A sample with its paired reads, one row of a mothur `.files` manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    pub sample: String,
    pub left: PathBuf,
    pub right: PathBuf,
}

/// How to resolve several files matching the same sample and read marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingPolicy {
    /// Fail with [`MothulityError::AmbiguousPairing`].
    #[default]
    Strict,
    /// Keep the last file in listing order and warn.
    LastMatchWins,
}

/// Options driving manifest construction.
///
/// # Example
///
/// ```rust, no_run
/// use mothulity::manifest::ManifestOptions;
///
/// let opts = ManifestOptions::new("reads/")
///     .extension("fq")
///     .sanitize(false);
///
/// let records = opts.build().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ManifestOptions {
    pub directory: PathBuf,
    pub split_sign: String,
    pub extension: String,
    pub left_sign: String,
    pub right_sign: String,
    pub sanitize: bool,
    pub pairing: PairingPolicy,
}

impl ManifestOptions {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            split_sign: crate::consts::DEFAULT_SPLIT_SIGN.into(),
            extension: crate::consts::DEFAULT_EXTENSION.into(),
            left_sign: crate::consts::DEFAULT_LEFT_SIGN.into(),
            right_sign: crate::consts::DEFAULT_RIGHT_SIGN.into(),
            sanitize: true,
            pairing: PairingPolicy::default(),
        }
    }

    pub fn split_sign(mut self, sign: &str) -> Self {
        self.split_sign = sign.into();
        self
    }

    pub fn extension(mut self, ext: &str) -> Self {
        self.extension = ext.into();
        self
    }

    pub fn signs(mut self, left: &str, right: &str) -> Self {
        self.left_sign = left.into();
        self.right_sign = right.into();
        self
    }

    pub fn sanitize(mut self, sanitize: bool) -> Self {
        self.sanitize = sanitize;
        self
    }

    pub fn pairing(mut self, pairing: PairingPolicy) -> Self {
        self.pairing = pairing;
        self
    }

    /// Sanitize (if requested), list and pair the reads in `directory`.
    pub fn build(&self) -> Result<Vec<ManifestRecord>> {
        if self.sanitize {
            sanitize_names(&self.directory, crate::consts::UNWANTED_SIGN)?;
        }

        let files = list_files(&self.directory)?
            .into_iter()
            .filter(|f| has_extension(f, &self.extension))
            .collect::<Vec<_>>();

        debug!(
            "DEBUG: {} files with extension '{}' in {}",
            files.len(),
            self.extension,
            self.directory.display()
        );

        pair_reads(&files, self)
    }
}

/// Sample name of a read file: everything before the first `split_sign`.
pub fn sample_name<'a>(filename: &'a str, split_sign: &str) -> &'a str {
    match filename.split_once(split_sign) {
        Some((prefix, _)) => prefix,
        None => filename,
    }
}

/// True if the last dot-delimited suffix of `filename` equals `extension`.
fn has_extension(filename: &str, extension: &str) -> bool {
    filename.rsplit('.').next() == Some(extension)
}

/// Plain files directly under `directory`, sorted by name.
pub(crate) fn list_files(directory: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            MothulityError::io(directory, source)
        })?;

        // symlinked reads count when their target is a regular file
        if entry.file_type().is_file() || entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    Ok(names)
}

/// Remove `unwanted` from every filename in `directory`, in place.
///
/// A rename that would clobber an existing file is skipped.
pub fn sanitize_names(directory: &Path, unwanted: char) -> Result<usize> {
    let mut renamed = 0;

    for name in list_files(directory)? {
        if !name.contains(unwanted) {
            continue;
        }

        let clean = name.replace(unwanted, "");
        let from = directory.join(&name);
        let to = directory.join(&clean);

        if to.exists() {
            warn!(
                "WARN: not renaming {} -> {}, target already exists",
                name, clean
            );
            continue;
        }

        std::fs::rename(&from, &to).map_err(|e| MothulityError::io(&from, e))?;
        debug!("DEBUG: renamed {} -> {}", name, clean);
        renamed += 1;
    }

    if renamed > 0 {
        info!(
            "INFO: removed '{}' from {} filenames in {}",
            unwanted,
            renamed,
            directory.display()
        );
    }

    Ok(renamed)
}

/// Candidate files for one sample, collected before resolution.
#[derive(Debug, Default)]
struct Candidates<'a> {
    left: Vec<&'a str>,
    right: Vec<&'a str>,
}

/// Pair left and right reads by sample name.
///
/// Samples are emitted in first-seen order. A file containing the
/// left sign is never considered as a right read. Samples missing
/// either side are dropped.
fn pair_reads(files: &[String], opts: &ManifestOptions) -> Result<Vec<ManifestRecord>> {
    let mut order: Vec<&str> = Vec::new();
    let mut candidates: HashMap<&str, Candidates> = HashMap::new();

    for file in files {
        let sample = sample_name(file, &opts.split_sign);
        let slot = candidates.entry(sample).or_insert_with(|| {
            order.push(sample);
            Candidates::default()
        });

        if file.contains(opts.left_sign.as_str()) {
            slot.left.push(file);
        } else if file.contains(opts.right_sign.as_str()) {
            slot.right.push(file);
        }
    }

    let mut records = Vec::with_capacity(order.len());
    for sample in order {
        let found = &candidates[sample];

        let left = resolve(sample, &opts.left_sign, &found.left, opts.pairing)?;
        let right = resolve(sample, &opts.right_sign, &found.right, opts.pairing)?;

        match (left, right) {
            (Some(left), Some(right)) => records.push(ManifestRecord {
                sample: sample.to_string(),
                left: PathBuf::from(left),
                right: PathBuf::from(right),
            }),
            (left, right) => warn!(
                "WARN: dropping unmatched sample '{}' (left: {}, right: {})",
                sample,
                left.unwrap_or("-"),
                right.unwrap_or("-")
            ),
        }
    }

    Ok(records)
}

fn resolve<'a>(
    sample: &str,
    marker: &str,
    found: &[&'a str],
    policy: PairingPolicy,
) -> Result<Option<&'a str>> {
    if found.len() > 1 {
        match policy {
            PairingPolicy::Strict => {
                return Err(MothulityError::AmbiguousPairing {
                    sample: sample.to_string(),
                    marker: marker.to_string(),
                    files: found.iter().map(|f| f.to_string()).collect(),
                })
            }
            PairingPolicy::LastMatchWins => warn!(
                "WARN: sample '{}' has {} files matching '{}', keeping {}",
                sample,
                found.len(),
                marker,
                found[found.len() - 1]
            ),
        }
    }

    Ok(found.last().copied())
}

/// Write records as a headerless, tab-separated manifest.
pub fn write_manifest(path: &Path, records: &[ManifestRecord]) -> Result<()> {
    let file = File::create(path).map_err(|e| MothulityError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    for record in records {
        writeln!(
            writer,
            "{}\t{}\t{}",
            record.sample,
            record.left.display(),
            record.right.display()
        )
        .map_err(|e| MothulityError::io(path, e))?;
    }

    writer.flush().map_err(|e| MothulityError::io(path, e))?;
    Ok(())
}

/// Read a manifest written by [`write_manifest`]. Blank lines are ignored.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestRecord>> {
    let mut contents = String::new();
    File::open(path)
        .and_then(|mut f| f.read_to_string(&mut contents))
        .map_err(|e| MothulityError::MalformedManifest {
            path: path.to_path_buf(),
            line: 0,
            reason: e.to_string(),
        })?;

    let mut records = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let fields = line.split('\t').collect::<Vec<_>>();
        match fields.as_slice() {
            [sample, left, right] => records.push(ManifestRecord {
                sample: sample.to_string(),
                left: PathBuf::from(left),
                right: PathBuf::from(right),
            }),
            _ => {
                return Err(MothulityError::MalformedManifest {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: format!("expected 3 tab-separated columns, found {}", fields.len()),
                })
            }
        }
    }

    Ok(records)
}
