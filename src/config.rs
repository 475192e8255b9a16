use log::{debug, info, warn};
use serde::{Deserialize, Serialize, Serializer};

use std::path::{Path, PathBuf};

use crate::consts::*;
use crate::error::{MothulityError, Result};
use crate::extract::{ExcludedGroups, LogDerivedMetadata};
use crate::resources::{self, ResourcePreset};

/// Which phase of the mothur workflow the script is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Preprocessing: contigs, screening, alignment, clustering.
    FirstPhase,
    /// Analysis of a finished first phase, driven by its artifacts.
    Continuation,
}

/// What to do with a resource preset name missing from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresetPolicy {
    /// Warn and keep the hardware values from the options.
    #[default]
    Fallback,
    /// Fail with [`MothulityError::UnknownPreset`].
    Strict,
}

/// Unresolved job options, as given on the command line or in a
/// TOML config file. Every field is optional; missing fields fall
/// through to the next layer and finally to the built-in defaults.
///
/// # Example
///
/// ``` toml
/// job_name = "soil16S"
/// resources = "M"
/// classify_its = false
/// cluster_cutoff = 0.03
/// ```
///
/// ``` rust, no_run
/// use mothulity::config::JobOptions;
///
/// let file = JobOptions::read("mothulity.toml".as_ref()).unwrap();
/// let opts = JobOptions { nodes: Some(4), ..Default::default() }.or(file);
/// ```
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct JobOptions {
    pub files_directory: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub job_name: Option<String>,
    pub run: Option<String>,
    pub analysis_only: Option<bool>,
    pub template: Option<PathBuf>,
    pub render_html: Option<bool>,
    pub notify_email: Option<String>,
    pub resources: Option<String>,
    pub strict_resources: Option<bool>,
    pub partition: Option<String>,
    pub nodes: Option<u32>,
    pub ntasks_per_node: Option<u32>,
    pub mem_per_cpu: Option<u32>,
    pub node_list: Option<String>,
    pub processors: Option<u32>,
    pub max_ambig: Option<u32>,
    pub max_homop: Option<u32>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub min_overlap: Option<u32>,
    pub screen_criteria: Option<u32>,
    pub chop_length: Option<u32>,
    pub precluster_diffs: Option<u32>,
    pub chimera_dereplicate: Option<bool>,
    pub classify_seqs_cutoff: Option<u32>,
    #[serde(alias = "classify_ITS")]
    pub classify_its: Option<bool>,
    pub align_database: Option<String>,
    pub taxonomy_database: Option<String>,
    pub cluster_cutoff: Option<f64>,
    pub full_ram_load: Option<bool>,
    pub label: Option<f64>,
    pub exclude_groups: Option<Vec<String>>,
    pub remove_below: Option<u64>,
}

impl JobOptions {
    /// Read options from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file.
    ///
    /// # Returns
    ///
    /// The options, or a `ConfigFile` error naming the file.
    pub fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| MothulityError::io(path, e))?;

        toml::from_str(&contents).map_err(|source| MothulityError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Layer `self` over `lower`: every field set in `self` wins.
    pub fn or(self, lower: JobOptions) -> JobOptions {
        JobOptions {
            files_directory: self.files_directory.or(lower.files_directory),
            output_dir: self.output_dir.or(lower.output_dir),
            job_name: self.job_name.or(lower.job_name),
            run: self.run.or(lower.run),
            analysis_only: self.analysis_only.or(lower.analysis_only),
            template: self.template.or(lower.template),
            render_html: self.render_html.or(lower.render_html),
            notify_email: self.notify_email.or(lower.notify_email),
            resources: self.resources.or(lower.resources),
            strict_resources: self.strict_resources.or(lower.strict_resources),
            partition: self.partition.or(lower.partition),
            nodes: self.nodes.or(lower.nodes),
            ntasks_per_node: self.ntasks_per_node.or(lower.ntasks_per_node),
            mem_per_cpu: self.mem_per_cpu.or(lower.mem_per_cpu),
            node_list: self.node_list.or(lower.node_list),
            processors: self.processors.or(lower.processors),
            max_ambig: self.max_ambig.or(lower.max_ambig),
            max_homop: self.max_homop.or(lower.max_homop),
            min_length: self.min_length.or(lower.min_length),
            max_length: self.max_length.or(lower.max_length),
            min_overlap: self.min_overlap.or(lower.min_overlap),
            screen_criteria: self.screen_criteria.or(lower.screen_criteria),
            chop_length: self.chop_length.or(lower.chop_length),
            precluster_diffs: self.precluster_diffs.or(lower.precluster_diffs),
            chimera_dereplicate: self.chimera_dereplicate.or(lower.chimera_dereplicate),
            classify_seqs_cutoff: self.classify_seqs_cutoff.or(lower.classify_seqs_cutoff),
            classify_its: self.classify_its.or(lower.classify_its),
            align_database: self.align_database.or(lower.align_database),
            taxonomy_database: self.taxonomy_database.or(lower.taxonomy_database),
            cluster_cutoff: self.cluster_cutoff.or(lower.cluster_cutoff),
            full_ram_load: self.full_ram_load.or(lower.full_ram_load),
            label: self.label.or(lower.label),
            exclude_groups: self.exclude_groups.or(lower.exclude_groups),
            remove_below: self.remove_below.or(lower.remove_below),
        }
    }

    /// Continuation when `analysis_only` is set. The html summary only
    /// shows the parameters as given, so `render_html` wins.
    pub fn mode(&self) -> Mode {
        match (self.render_html, self.analysis_only) {
            (Some(true), _) => Mode::FirstPhase,
            (_, Some(true)) => Mode::Continuation,
            _ => Mode::FirstPhase,
        }
    }

    pub fn preset_policy(&self) -> PresetPolicy {
        match self.strict_resources {
            Some(true) => PresetPolicy::Strict,
            _ => PresetPolicy::Fallback,
        }
    }
}

/// Hardware requested from the cluster headnode.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Hardware {
    pub partition: String,
    pub nodes: u32,
    pub ntasks_per_node: u32,
    #[serde(serialize_with = "as_gigabytes")]
    pub mem_per_cpu: u32,
    pub node_list: Option<String>,
    pub processors: u32,
}

impl From<ResourcePreset> for Hardware {
    fn from(preset: ResourcePreset) -> Self {
        Self {
            partition: preset.partition.to_string(),
            nodes: preset.nodes,
            ntasks_per_node: preset.ntasks_per_node,
            mem_per_cpu: preset.mem_per_cpu,
            node_list: None,
            processors: preset.processors,
        }
    }
}

/// mothur command parameters.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Tuning {
    pub max_ambig: u32,
    pub max_homop: u32,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub min_overlap: u32,
    pub screen_criteria: u32,
    pub chop_length: u32,
    pub precluster_diffs: u32,
    #[serde(serialize_with = "as_flag")]
    pub chimera_dereplicate: bool,
    pub classify_seqs_cutoff: u32,
    pub classify_its: bool,
    pub align_database: String,
    pub taxonomy_database: String,
    pub cluster_cutoff: f64,
    pub full_ram_load: bool,
}

/// Fully resolved job configuration. Built once by [`resolve`] and
/// never mutated; its serialized fields are the template slots.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct JobConfig {
    #[serde(skip)]
    pub mode: Mode,
    #[serde(serialize_with = "as_dir")]
    pub files_directory: PathBuf,
    #[serde(serialize_with = "as_dir")]
    pub output_dir: PathBuf,
    pub job_name: String,
    pub launcher: Option<String>,
    pub notify_email: Option<String>,
    #[serde(flatten)]
    pub hardware: Hardware,
    #[serde(flatten)]
    pub tuning: Tuning,
    pub label: f64,
    #[serde(serialize_with = "as_joined")]
    pub groups_to_exclude: ExcludedGroups,
    pub sample_count: Option<usize>,
}

impl JobConfig {
    /// `<output_dir>/<job_name>.<ext>`
    pub fn output_path(&self, ext: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", self.job_name, ext))
    }
}

/// Resolve options into a [`JobConfig`].
///
/// # Arguments
///
/// * `options` - Layered CLI and config-file options.
/// * `mode` - First phase or continuation.
/// * `preset` - Resource preset name; when known it replaces all
///   hardware options and clears the node list.
/// * `policy` - Handling of an unknown preset name.
/// * `extracted` - Prior-run metadata, required in continuation mode.
///
/// # Returns
///
/// The resolved configuration. No I/O is performed.
///
/// # Example
///
/// ``` rust, no_run
/// use mothulity::config::*;
///
/// let opts = JobOptions { processors: Some(8), ..Default::default() };
/// let config = resolve(&opts, Mode::FirstPhase, Some("S"), PresetPolicy::Fallback, None).unwrap();
///
/// assert_eq!(config.hardware.processors, 48);
/// ```
pub fn resolve(
    options: &JobOptions,
    mode: Mode,
    preset: Option<&str>,
    policy: PresetPolicy,
    extracted: Option<LogDerivedMetadata>,
) -> Result<JobConfig> {
    let hardware = resolve_hardware(options, preset, policy)?;
    let tuning = resolve_tuning(options);

    let (label, groups_to_exclude, sample_count) = match mode {
        Mode::FirstPhase => {
            if extracted.is_some() {
                debug!("DEBUG: ignoring prior-run metadata in first phase");
            }

            let groups = ExcludedGroups::new(options.exclude_groups.clone().unwrap_or_default());
            (options.label.unwrap_or(DEFAULT_LABEL), groups, None)
        }
        Mode::Continuation => {
            let meta = extracted.ok_or(MothulityError::MissingContinuationMetadata)?;

            if let Some(label) = options.label {
                warn!(
                    "WARN: --label {} ignored, using {} from the prior run",
                    label, meta.label
                );
            }

            (meta.label, meta.groups_to_exclude, Some(meta.sample_count))
        }
    };

    if !(0.0..=1.0).contains(&label) {
        warn!("WARN: label {} is outside [0, 1]", label);
    }

    Ok(JobConfig {
        mode,
        files_directory: options
            .files_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILES_DIR)),
        output_dir: options
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        job_name: options
            .job_name
            .clone()
            .unwrap_or_else(|| DEFAULT_JOB_NAME.to_string()),
        launcher: options.run.clone(),
        notify_email: options.notify_email.clone(),
        hardware,
        tuning,
        label,
        groups_to_exclude,
        sample_count,
    })
}

fn resolve_hardware(
    options: &JobOptions,
    preset: Option<&str>,
    policy: PresetPolicy,
) -> Result<Hardware> {
    if let Some(name) = preset {
        match resources::lookup(name) {
            Some(preset) => {
                info!("INFO: using resource preset {}", preset);
                return Ok(Hardware::from(preset));
            }
            None if policy == PresetPolicy::Strict => {
                return Err(MothulityError::UnknownPreset(name.to_string()));
            }
            None => warn!(
                "WARN: unknown resource preset '{}' (known: {}), using explicit hardware options",
                name,
                resources::names().join(", ")
            ),
        }
    }

    Ok(Hardware {
        partition: options
            .partition
            .clone()
            .unwrap_or_else(|| DEFAULT_PARTITION.to_string()),
        nodes: options.nodes.unwrap_or(DEFAULT_NODES),
        ntasks_per_node: options.ntasks_per_node.unwrap_or(DEFAULT_NTASKS_PER_NODE),
        mem_per_cpu: options.mem_per_cpu.unwrap_or(DEFAULT_MEM_PER_CPU),
        node_list: options.node_list.clone(),
        processors: options.processors.unwrap_or(DEFAULT_PROCESSORS),
    })
}

fn resolve_tuning(options: &JobOptions) -> Tuning {
    Tuning {
        max_ambig: options.max_ambig.unwrap_or(DEFAULT_MAX_AMBIG),
        max_homop: options.max_homop.unwrap_or(DEFAULT_MAX_HOMOP),
        min_length: options.min_length,
        max_length: options.max_length,
        min_overlap: options.min_overlap.unwrap_or(DEFAULT_MIN_OVERLAP),
        screen_criteria: options.screen_criteria.unwrap_or(DEFAULT_SCREEN_CRITERIA),
        chop_length: options.chop_length.unwrap_or(DEFAULT_CHOP_LENGTH),
        precluster_diffs: options.precluster_diffs.unwrap_or(DEFAULT_PRECLUSTER_DIFFS),
        chimera_dereplicate: options
            .chimera_dereplicate
            .unwrap_or(DEFAULT_CHIMERA_DEREPLICATE),
        classify_seqs_cutoff: options
            .classify_seqs_cutoff
            .unwrap_or(DEFAULT_CLASSIFY_SEQS_CUTOFF),
        classify_its: options.classify_its.unwrap_or(false),
        align_database: options
            .align_database
            .clone()
            .unwrap_or_else(|| DEFAULT_ALIGN_DATABASE.to_string()),
        taxonomy_database: options
            .taxonomy_database
            .clone()
            .unwrap_or_else(|| DEFAULT_TAXONOMY_DATABASE.to_string()),
        cluster_cutoff: options.cluster_cutoff.unwrap_or(DEFAULT_CLUSTER_CUTOFF),
        full_ram_load: options.full_ram_load.unwrap_or(false),
    }
}

/// Parse a mothur-style boolean (`T`/`F`, `true`/`false`).
pub fn parse_flag(s: &str) -> std::result::Result<bool, String> {
    match s.to_lowercase().as_str() {
        "t" | "true" => Ok(true),
        "f" | "false" => Ok(false),
        _ => Err(format!("ERROR: expected T or F, got '{}'", s)),
    }
}

fn as_gigabytes<S: Serializer>(mem: &u32, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{}G", mem))
}

fn as_flag<S: Serializer>(flag: &bool, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(if *flag { "T" } else { "F" })
}

fn as_dir<S: Serializer>(dir: &PathBuf, s: S) -> std::result::Result<S::Ok, S::Error> {
    let dir = dir.display().to_string();
    if dir.ends_with('/') {
        s.serialize_str(&dir)
    } else {
        s.serialize_str(&format!("{}/", dir))
    }
}

fn as_joined<S: Serializer>(groups: &ExcludedGroups, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&groups.joined())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> LogDerivedMetadata {
        LogDerivedMetadata {
            label: 0.05,
            sample_count: 12,
            groups_to_exclude: ExcludedGroups::new(vec!["G1".into(), "G2".into()]),
        }
    }

    #[test]
    fn test_defaults() {
        let config = resolve(
            &JobOptions::default(),
            Mode::FirstPhase,
            None,
            PresetPolicy::Fallback,
            None,
        )
        .unwrap();

        assert_eq!(config.job_name, "mothur.job");
        assert_eq!(config.files_directory, PathBuf::from("."));
        assert_eq!(
            config.hardware,
            Hardware {
                partition: "long".into(),
                nodes: 1,
                ntasks_per_node: 6,
                mem_per_cpu: 24,
                node_list: None,
                processors: 24,
            }
        );
        assert_eq!(config.tuning.max_homop, 8);
        assert_eq!(config.tuning.min_length, None);
        assert!(config.tuning.chimera_dereplicate);
        assert!(!config.tuning.classify_its);
        assert_eq!(config.tuning.cluster_cutoff, 0.15);
        assert_eq!(config.label, 0.03);
        assert!(config.groups_to_exclude.is_empty());
        assert_eq!(config.sample_count, None);
        assert_eq!(config.launcher, None);
    }

    #[test]
    fn test_preset_overrides_cli_processors() {
        let opts = JobOptions {
            processors: Some(8),
            node_list: Some("n[01-02]".into()),
            max_homop: Some(6),
            ..Default::default()
        };

        let config = resolve(&opts, Mode::FirstPhase, Some("S"), PresetPolicy::Fallback, None)
            .unwrap();

        assert_eq!(config.hardware.processors, 48);
        assert_eq!(config.hardware.nodes, 2);
        assert_eq!(config.hardware.node_list, None);
        // tuning is never touched by a preset
        assert_eq!(config.tuning.max_homop, 6);
    }

    #[test]
    fn test_cli_processors_kept_without_preset() {
        let opts = JobOptions {
            processors: Some(8),
            node_list: Some("n01".into()),
            ..Default::default()
        };

        let config = resolve(&opts, Mode::FirstPhase, None, PresetPolicy::Fallback, None).unwrap();

        assert_eq!(config.hardware.processors, 8);
        assert_eq!(config.hardware.node_list.as_deref(), Some("n01"));
    }

    #[test]
    fn test_unknown_preset_falls_back() {
        let opts = JobOptions {
            processors: Some(8),
            partition: Some("short".into()),
            ..Default::default()
        };

        let config =
            resolve(&opts, Mode::FirstPhase, Some("XXL"), PresetPolicy::Fallback, None).unwrap();

        assert_eq!(config.hardware.processors, 8);
        assert_eq!(config.hardware.partition, "short");
    }

    #[test]
    fn test_unknown_preset_strict() {
        let err = resolve(
            &JobOptions::default(),
            Mode::FirstPhase,
            Some("XXL"),
            PresetPolicy::Strict,
            None,
        )
        .unwrap_err();

        assert!(matches!(err, MothulityError::UnknownPreset(name) if name == "XXL"));
    }

    #[test]
    fn test_first_phase_takes_label_and_groups_from_options() {
        let opts = JobOptions {
            label: Some(0.02),
            exclude_groups: Some(vec!["Mock".into()]),
            ..Default::default()
        };

        let config = resolve(&opts, Mode::FirstPhase, None, PresetPolicy::Fallback, Some(meta()))
            .unwrap();

        assert_eq!(config.label, 0.02);
        assert_eq!(config.groups_to_exclude.joined(), "Mock");
        assert_eq!(config.sample_count, None);
    }

    #[test]
    fn test_continuation_uses_extracted_metadata() {
        let opts = JobOptions {
            label: Some(0.02),
            exclude_groups: Some(vec!["Mock".into()]),
            ..Default::default()
        };

        let config = resolve(
            &opts,
            Mode::Continuation,
            None,
            PresetPolicy::Fallback,
            Some(meta()),
        )
        .unwrap();

        assert_eq!(config.mode, Mode::Continuation);
        assert_eq!(config.label, 0.05);
        assert_eq!(config.sample_count, Some(12));
        assert_eq!(config.groups_to_exclude.joined(), "G1-G2");
    }

    #[test]
    fn test_continuation_requires_metadata() {
        let err = resolve(
            &JobOptions::default(),
            Mode::Continuation,
            None,
            PresetPolicy::Fallback,
            None,
        )
        .unwrap_err();

        assert!(matches!(err, MothulityError::MissingContinuationMetadata));
    }

    #[test]
    fn test_options_layering() {
        let cli = JobOptions {
            nodes: Some(3),
            ..Default::default()
        };
        let file: JobOptions = toml::from_str(
            r#"
            nodes = 5
            processors = 30
            classify_ITS = true
            "#,
        )
        .unwrap();

        let opts = cli.or(file);

        assert_eq!(opts.nodes, Some(3));
        assert_eq!(opts.processors, Some(30));
        assert_eq!(opts.classify_its, Some(true));
        assert_eq!(opts.partition, None);
    }

    #[test]
    fn test_config_file_holds_run_switches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mothulity.toml");
        std::fs::write(
            &path,
            "analysis_only = true\nstrict_resources = true\ntemplate = \"custom.sh.j2\"\n",
        )
        .unwrap();

        let opts = JobOptions::default().or(JobOptions::read(&path).unwrap());

        assert_eq!(opts.mode(), Mode::Continuation);
        assert_eq!(opts.preset_policy(), PresetPolicy::Strict);
        assert_eq!(opts.template, Some(PathBuf::from("custom.sh.j2")));

        let html = JobOptions {
            render_html: Some(true),
            ..Default::default()
        }
        .or(opts);
        assert_eq!(html.mode(), Mode::FirstPhase);
    }

    #[test]
    fn test_config_file_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mothulity.toml");
        std::fs::write(&path, "nodez = 3\n").unwrap();

        let err = JobOptions::read(&path).unwrap_err();
        assert!(matches!(err, MothulityError::ConfigFile { .. }));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("T"), Ok(true));
        assert_eq!(parse_flag("false"), Ok(false));
        assert!(parse_flag("yes").is_err());
    }

    #[test]
    fn test_output_path() {
        let opts = JobOptions {
            output_dir: Some("/scratch/out".into()),
            job_name: Some("soil".into()),
            ..Default::default()
        };
        let config = resolve(&opts, Mode::FirstPhase, None, PresetPolicy::Fallback, None).unwrap();

        assert_eq!(config.output_path("sh"), PathBuf::from("/scratch/out/soil.sh"));
    }
}
