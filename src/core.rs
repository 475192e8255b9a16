use log::{debug, info};

use std::path::{Path, PathBuf};

use crate::cli::{ManifestArgs, ScriptArgs};
use crate::config::{resolve, JobOptions, Mode};
use crate::consts::*;
use crate::error::{MothulityError, Result};
use crate::executor::dispatch::dispatch;
use crate::extract::extract;
use crate::manifest::write_manifest;
use crate::render::{render, save, ScriptTemplate};

/// What a `script` invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    Script(PathBuf),
    Summary(PathBuf),
}

/// Resolve, render and (optionally) dispatch a mothur job script.
///
/// # Example
///
/// ```rust, no_run
/// use clap::Parser;
/// use mothulity::cli::ScriptArgs;
///
/// let args = ScriptArgs::parse_from(["script", "reads/", "--resources", "S"]);
/// mothulity::core::run_script(&args).unwrap();
/// ```
pub fn run_script(args: &ScriptArgs) -> Result<Generated> {
    let options = match &args.config {
        Some(path) => {
            info!("INFO: reading options from {}", path.display());
            args.options().or(JobOptions::read(path)?)
        }
        None => args.options(),
    };
    let options = absolute_dirs(options)?;
    debug!("DEBUG: options after layering: {:#?}", options);

    let mode = options.mode();

    let extracted = match mode {
        Mode::Continuation => {
            let files_directory = options
                .files_directory
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FILES_DIR));
            Some(extract(&files_directory, options.remove_below)?)
        }
        Mode::FirstPhase => None,
    };

    let config = resolve(
        &options,
        mode,
        options.resources.as_deref(),
        options.preset_policy(),
        extracted,
    )?;

    if options.render_html == Some(true) {
        let html = render(&ScriptTemplate::summary(), &config)?;
        let path = save(config.output_path(HTML_EXT), &html)?;
        return Ok(Generated::Summary(path));
    }

    let template = match &options.template {
        Some(path) => ScriptTemplate::from_file(path)?,
        None => ScriptTemplate::builtin(config.mode),
    };

    let script = render(&template, &config)?;
    let path = save(config.output_path(SCRIPT_EXT), &script)?;

    if let Some(launcher) = &config.launcher {
        dispatch(launcher, &path);
    }

    Ok(Generated::Script(path))
}

/// Build the paired-read manifest and write it to `args.output`.
pub fn run_manifest(args: &ManifestArgs) -> Result<PathBuf> {
    let options = args.options();
    let records = options.build()?;

    if records.is_empty() {
        return Err(MothulityError::EmptyManifest {
            directory: options.directory,
            extension: options.extension,
            left: options.left_sign,
            right: options.right_sign,
        });
    }

    write_manifest(&args.output, &records)?;

    info!(
        "INFO: wrote {} samples to {}",
        records.len(),
        args.output.display()
    );

    Ok(args.output.clone())
}

/// Make the files and output directories absolute, creating the
/// output directory if needed.
fn absolute_dirs(mut options: JobOptions) -> Result<JobOptions> {
    let files_directory = options
        .files_directory
        .take()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FILES_DIR));
    let output_dir = options
        .output_dir
        .take()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    std::fs::create_dir_all(&output_dir).map_err(|e| MothulityError::io(&output_dir, e))?;

    options.files_directory = Some(canonical(&files_directory)?);
    options.output_dir = Some(canonical(&output_dir)?);

    Ok(options)
}

fn canonical(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|e| MothulityError::io(path, e))
}
