use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{parse_flag, JobOptions};
use crate::consts::*;
use crate::manifest::{ManifestOptions, PairingPolicy};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubArgs,

    #[arg(
        short = 'v',
        long = "verbose",
        help = "Increase verbosity",
        global = true,
        conflicts_with = "quiet"
    )]
    pub verbose: bool,

    #[arg(short = 'q', long = "quiet", help = "Decrease verbosity", global = true)]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> log::Level {
        if self.verbose {
            log::Level::Debug
        } else if self.quiet {
            log::Level::Warn
        } else {
            log::Level::Info
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum SubArgs {
    #[command(name = "script")]
    Script {
        #[command(flatten)]
        args: ScriptArgs,
    },
    #[command(name = "manifest")]
    Manifest {
        #[command(flatten)]
        args: ManifestArgs,
    },
}

/// Create a headnode-suitable mothur script
///
/// # Example
///
/// ```bash,no_run
/// mothulity script reads/ -n soil --resources M -r sbatch
/// mothulity script reads/ -n soil --analysis-only --remove-below 1000
/// ```
///
/// # Note
///
/// * Options left out fall back to --config, then to built-in defaults
/// * --resources overrides every other headnode option
/// * --analysis-only reads label, sample count and groups from the prior run
#[derive(Debug, Parser, Clone, Default)]
pub struct ScriptArgs {
    #[arg(
        value_name = "FILES_DIRECTORY",
        help = "Input directory path, used as the job's working directory [default: .]"
    )]
    pub files_directory: Option<PathBuf>,

    #[arg(
        short = 'n',
        long = "job-name",
        help = "Job name, used for the script, the queued job and html output [default: mothur.job]",
        value_name = "NAME"
    )]
    pub job_name: Option<String>,

    #[arg(
        short = 'd',
        long = "output-dir",
        help = "Output directory for the script, NOT for the job itself [default: .]",
        value_name = "DIR"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        short = 'r',
        long = "run",
        help = "Shell call to run the script right away, e.g. 'sh' or 'sbatch'",
        value_name = "LAUNCHER"
    )]
    pub run: Option<String>,

    #[arg(
        short = 'a',
        long = "analysis-only",
        help = "Output only the analysis part, resolved from a finished first phase"
    )]
    pub analysis_only: bool,

    #[arg(
        short = 't',
        long = "template",
        help = "Path to a template used instead of the built-in one",
        value_name = "PATH"
    )]
    pub template: Option<PathBuf>,

    #[arg(
        long = "render-html",
        help = "Render an html summary of the job parameters and exit"
    )]
    pub render_html: bool,

    #[arg(
        long = "notify-email",
        help = "Email address to notify when the job is done",
        value_name = "EMAIL"
    )]
    pub notify_email: Option<String>,

    #[arg(
        short = 'c',
        long = "config",
        help = "TOML file with default values for any of these options",
        value_name = "PATH"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "resources",
        help = "Headnode resources shortcut: S, M, L, XL, PHI or JUMBO. Overrides all other headnode options",
        value_name = "PRESET"
    )]
    pub resources: Option<String>,

    #[arg(
        long = "strict-resources",
        help = "Fail on an unknown --resources value instead of falling back"
    )]
    pub strict_resources: bool,

    #[arg(
        long = "partition",
        help = "Headnode partition: test, short, big, long, accel [default: long]",
        value_name = "PARTITION"
    )]
    pub partition: Option<String>,

    #[arg(long = "nodes", help = "Number of nodes [default: 1]", value_name = "N")]
    pub nodes: Option<u32>,

    #[arg(
        long = "ntasks-per-node",
        help = "Number of tasks on each node [default: 6]",
        value_name = "N"
    )]
    pub ntasks_per_node: Option<u32>,

    #[arg(
        long = "mem-per-cpu",
        help = "Real memory per cpu in gigabytes [default: 24]",
        value_name = "GB"
    )]
    pub mem_per_cpu: Option<u32>,

    #[arg(long = "node-list", help = "Request a specific list of nodes", value_name = "NODES")]
    pub node_list: Option<String>,

    #[arg(
        long = "processors",
        help = "Number of logical processors [default: 24]",
        value_name = "N"
    )]
    pub processors: Option<u32>,

    #[arg(
        long = "max-ambig",
        help = "Maximum number of ambiguous bases, screen.seqs [default: 0]",
        value_name = "N"
    )]
    pub max_ambig: Option<u32>,

    #[arg(
        long = "max-homop",
        help = "Maximum homopolymer length, screen.seqs [default: 8]",
        value_name = "N"
    )]
    pub max_homop: Option<u32>,

    #[arg(long = "min-length", help = "Minimum read length, screen.seqs", value_name = "N")]
    pub min_length: Option<u32>,

    #[arg(long = "max-length", help = "Maximum read length, screen.seqs", value_name = "N")]
    pub max_length: Option<u32>,

    #[arg(
        long = "min-overlap",
        help = "Minimum contig overlap in bases [default: 25]",
        value_name = "N"
    )]
    pub min_overlap: Option<u32>,

    #[arg(
        long = "screen-criteria",
        help = "Trim start and end to fit this percentage of reads [default: 95]",
        value_name = "PERCENT"
    )]
    pub screen_criteria: Option<u32>,

    #[arg(
        long = "chop-length",
        help = "Cut all reads to this length, keeping the front, chop.seqs [default: 250]",
        value_name = "N"
    )]
    pub chop_length: Option<u32>,

    #[arg(
        long = "precluster-diffs",
        help = "Differences treated as insignificant, pre.cluster [default: 2]",
        value_name = "N"
    )]
    pub precluster_diffs: Option<u32>,

    #[arg(
        long = "chimera-dereplicate",
        help = "Check for chimeras by group, chimera.uchime [default: T]",
        value_name = "T|F",
        value_parser = parse_flag
    )]
    pub chimera_dereplicate: Option<bool>,

    #[arg(
        long = "classify-seqs-cutoff",
        help = "Bootstrap value for taxonomic assignment, classify.seqs [default: 80]",
        value_name = "N"
    )]
    pub classify_seqs_cutoff: Option<u32>,

    #[arg(
        long = "classify-ITS",
        help = "Drop align.seqs and classify with knn/blast",
        action = ArgAction::SetTrue
    )]
    pub classify_its: bool,

    #[arg(
        long = "align-database",
        help = "Reference for align.seqs [default: ~/db/Silva.nr_v119/silva.nr_v119.align]",
        value_name = "PATH"
    )]
    pub align_database: Option<String>,

    #[arg(
        long = "taxonomy-database",
        help = "Taxonomy for classify.seqs [default: ~/db/Silva.nr_v119/silva.nr_v119.tax]",
        value_name = "PATH"
    )]
    pub taxonomy_database: Option<String>,

    #[arg(
        long = "cluster-cutoff",
        help = "Cluster cutoff, smaller is faster [default: 0.15]",
        value_name = "CUTOFF"
    )]
    pub cluster_cutoff: Option<f64>,

    #[arg(
        long = "full-ram-load",
        help = "Use cluster instead of cluster.split",
        action = ArgAction::SetTrue
    )]
    pub full_ram_load: bool,

    #[arg(
        long = "label",
        help = "Label for OTU-based commands, ignored with --analysis-only [default: 0.03]",
        value_name = "LABEL"
    )]
    pub label: Option<f64>,

    #[arg(
        long = "remove-below",
        help = "With --analysis-only, remove groups with fewer sequences than this [default if given without a value: 100]",
        value_name = "N",
        num_args = 0..=1,
        default_missing_value = DEFAULT_REMOVE_BELOW
    )]
    pub remove_below: Option<u64>,

    #[arg(
        long = "exclude-groups",
        help = "Groups to remove in the first phase",
        value_name = "GROUPS",
        value_delimiter = ',',
        num_args = 1..
    )]
    pub exclude_groups: Option<Vec<String>>,
}

impl ScriptArgs {
    /// Options given on the command line; unset flags stay `None`
    /// so lower layers can fill them.
    pub fn options(&self) -> JobOptions {
        JobOptions {
            files_directory: self.files_directory.clone(),
            output_dir: self.output_dir.clone(),
            job_name: self.job_name.clone(),
            run: self.run.clone(),
            analysis_only: self.analysis_only.then_some(true),
            template: self.template.clone(),
            render_html: self.render_html.then_some(true),
            notify_email: self.notify_email.clone(),
            resources: self.resources.clone(),
            strict_resources: self.strict_resources.then_some(true),
            partition: self.partition.clone(),
            nodes: self.nodes,
            ntasks_per_node: self.ntasks_per_node,
            mem_per_cpu: self.mem_per_cpu,
            node_list: self.node_list.clone(),
            processors: self.processors,
            max_ambig: self.max_ambig,
            max_homop: self.max_homop,
            min_length: self.min_length,
            max_length: self.max_length,
            min_overlap: self.min_overlap,
            screen_criteria: self.screen_criteria,
            chop_length: self.chop_length,
            precluster_diffs: self.precluster_diffs,
            chimera_dereplicate: self.chimera_dereplicate,
            classify_seqs_cutoff: self.classify_seqs_cutoff,
            classify_its: self.classify_its.then_some(true),
            align_database: self.align_database.clone(),
            taxonomy_database: self.taxonomy_database.clone(),
            cluster_cutoff: self.cluster_cutoff,
            full_ram_load: self.full_ram_load.then_some(true),
            label: self.label,
            exclude_groups: self.exclude_groups.clone(),
            remove_below: self.remove_below,
        }
    }
}

/// Create a mothur-suitable `.files` manifest from read file names
///
/// # Example
///
/// ```bash,no_run
/// mothulity manifest reads/ -o reads/mothur.files
/// mothulity manifest reads/ -e fq -l _1 -r _2 --original-names
/// ```
///
/// # Note
///
/// * Removes '-' from file names unless --original-names is given
/// * Samples missing either read are left out
#[derive(Debug, Parser, Clone)]
pub struct ManifestArgs {
    #[arg(value_name = "FILES_DIRECTORY", help = "Input directory path")]
    pub files_directory: PathBuf,

    #[arg(
        short = 'o',
        long = "output",
        help = "Output file name",
        value_name = "PATH",
        default_value = DEFAULT_MANIFEST
    )]
    pub output: PathBuf,

    #[arg(
        short = 's',
        long = "split-sign",
        help = "Characters before the first occurrence of this sign are the sample name",
        value_name = "SIGN",
        default_value = DEFAULT_SPLIT_SIGN,
        value_parser = non_empty
    )]
    pub split_sign: String,

    #[arg(
        short = 'e',
        long = "files-extension",
        help = "Read files are recognized by this extension",
        value_name = "EXT",
        default_value = DEFAULT_EXTENSION
    )]
    pub files_extension: String,

    #[arg(
        short = 'l',
        long = "left-reads-sign",
        help = "Left read files are recognized by this",
        value_name = "SIGN",
        default_value = DEFAULT_LEFT_SIGN,
        value_parser = non_empty
    )]
    pub left_reads_sign: String,

    #[arg(
        short = 'r',
        long = "right-reads-sign",
        help = "Right read files are recognized by this",
        value_name = "SIGN",
        default_value = DEFAULT_RIGHT_SIGN,
        value_parser = non_empty
    )]
    pub right_reads_sign: String,

    #[arg(long = "original-names", help = "Do not modify file names")]
    pub original_names: bool,

    #[arg(
        long = "allow-ambiguous",
        help = "Keep the last of several files matching one sample and sign instead of failing"
    )]
    pub allow_ambiguous: bool,
}

impl ManifestArgs {
    pub fn options(&self) -> ManifestOptions {
        ManifestOptions::new(&self.files_directory)
            .split_sign(&self.split_sign)
            .extension(&self.files_extension)
            .signs(&self.left_reads_sign, &self.right_reads_sign)
            .sanitize(!self.original_names)
            .pairing(if self.allow_ambiguous {
                PairingPolicy::LastMatchWins
            } else {
                PairingPolicy::Strict
            })
    }
}

fn non_empty(s: &str) -> Result<String, String> {
    if s.is_empty() {
        Err("must not be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_script_flags_map_to_options() {
        let args = Args::parse_from([
            "mothulity",
            "script",
            "reads",
            "-n",
            "soil",
            "--resources",
            "phi",
            "--chimera-dereplicate",
            "F",
            "--classify-ITS",
            "--exclude-groups",
            "Mock,Blank",
        ]);

        let SubArgs::Script { args } = args.command else {
            panic!("expected script subcommand");
        };
        let opts = args.options();

        assert_eq!(opts.mode(), Mode::FirstPhase);
        assert_eq!(opts.files_directory, Some(PathBuf::from("reads")));
        assert_eq!(opts.job_name.as_deref(), Some("soil"));
        assert_eq!(opts.resources.as_deref(), Some("phi"));
        assert_eq!(opts.chimera_dereplicate, Some(false));
        assert_eq!(opts.classify_its, Some(true));
        assert_eq!(opts.full_ram_load, None);
        assert_eq!(opts.nodes, None);
        assert_eq!(
            opts.exclude_groups,
            Some(vec!["Mock".to_string(), "Blank".to_string()])
        );
    }

    #[test]
    fn test_analysis_only_selects_continuation() {
        let args = Args::parse_from(["mothulity", "-q", "script", "-a", "--remove-below", "500"]);

        assert_eq!(args.log_level(), log::Level::Warn);
        let SubArgs::Script { args } = args.command else {
            panic!("expected script subcommand");
        };

        assert_eq!(args.options().mode(), Mode::Continuation);
        assert_eq!(args.options().remove_below, Some(500));
        assert_eq!(args.options().files_directory, None);
    }

    #[test]
    fn test_bare_remove_below_uses_default_threshold() {
        let args = Args::parse_from(["mothulity", "script", "run", "-a", "--remove-below"]);

        let SubArgs::Script { args } = args.command else {
            panic!("expected script subcommand");
        };
        assert_eq!(args.remove_below, Some(100));
    }

    #[test]
    fn test_empty_manifest_signs_are_rejected() {
        for flag in ["-s", "-l", "-r"] {
            let parsed = Args::try_parse_from(["mothulity", "manifest", "reads", flag, ""]);
            assert!(parsed.is_err(), "{flag} accepted an empty value");
        }

        assert!(Args::try_parse_from(["mothulity", "manifest", "reads", "-l", "_1"]).is_ok());
    }

    #[test]
    fn test_manifest_defaults() {
        let args = Args::parse_from(["mothulity", "manifest", "reads"]);

        let SubArgs::Manifest { args } = args.command else {
            panic!("expected manifest subcommand");
        };
        let opts = args.options();

        assert_eq!(args.output, PathBuf::from("mothur.files"));
        assert_eq!(opts.split_sign, "_");
        assert_eq!(opts.extension, "fastq");
        assert_eq!((opts.left_sign.as_str(), opts.right_sign.as_str()), ("R1", "R2"));
        assert!(opts.sanitize);
        assert_eq!(opts.pairing, PairingPolicy::Strict);
    }
}
