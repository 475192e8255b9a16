// project-wide names
pub const SCRIPT_EXT: &str = "sh";
pub const HTML_EXT: &str = "html";

// job defaults
pub const DEFAULT_FILES_DIR: &str = ".";
pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const DEFAULT_JOB_NAME: &str = "mothur.job";

// hardware defaults (no preset)
pub const DEFAULT_PARTITION: &str = "long";
pub const DEFAULT_NODES: u32 = 1;
pub const DEFAULT_NTASKS_PER_NODE: u32 = 6;
pub const DEFAULT_MEM_PER_CPU: u32 = 24;
pub const DEFAULT_PROCESSORS: u32 = 24;

// mothur defaults
pub const DEFAULT_MAX_AMBIG: u32 = 0;
pub const DEFAULT_MAX_HOMOP: u32 = 8;
pub const DEFAULT_MIN_OVERLAP: u32 = 25;
pub const DEFAULT_SCREEN_CRITERIA: u32 = 95;
pub const DEFAULT_CHOP_LENGTH: u32 = 250;
pub const DEFAULT_PRECLUSTER_DIFFS: u32 = 2;
pub const DEFAULT_CHIMERA_DEREPLICATE: bool = true;
pub const DEFAULT_CLASSIFY_SEQS_CUTOFF: u32 = 80;
pub const DEFAULT_ALIGN_DATABASE: &str = "~/db/Silva.nr_v119/silva.nr_v119.align";
pub const DEFAULT_TAXONOMY_DATABASE: &str = "~/db/Silva.nr_v119/silva.nr_v119.tax";
pub const DEFAULT_CLUSTER_CUTOFF: f64 = 0.15;
pub const DEFAULT_LABEL: f64 = 0.03;

// prior-run artifacts
pub const TAXONOMY_PATTERN: &str = "*cons.taxonomy";
pub const MANIFEST_PATTERN: &str = "*files";
pub const LOG_PATTERN: &str = "*logfile";
pub const LOG_KEYWORD: &str = "contains";
pub const LOG_STRIP_CHARS: &[char] = &['.', '\n', '\r'];
pub const DEFAULT_REMOVE_BELOW: &str = "100";
pub const GROUP_SEPARATOR: &str = "-";

// manifest defaults
pub const DEFAULT_MANIFEST: &str = "mothur.files";
pub const DEFAULT_SPLIT_SIGN: &str = "_";
pub const DEFAULT_EXTENSION: &str = "fastq";
pub const DEFAULT_LEFT_SIGN: &str = "R1";
pub const DEFAULT_RIGHT_SIGN: &str = "R2";
pub const UNWANTED_SIGN: char = '-';

// templates
pub const TEMPLATE_SLOTS_VERSION: u32 = 1;
pub const TEMPLATE_SLOTS: &[&str] = &[
    "files_directory",
    "output_dir",
    "job_name",
    "launcher",
    "notify_email",
    "partition",
    "nodes",
    "ntasks_per_node",
    "mem_per_cpu",
    "node_list",
    "processors",
    "max_ambig",
    "max_homop",
    "min_length",
    "max_length",
    "min_overlap",
    "screen_criteria",
    "chop_length",
    "precluster_diffs",
    "chimera_dereplicate",
    "classify_seqs_cutoff",
    "classify_its",
    "align_database",
    "taxonomy_database",
    "cluster_cutoff",
    "full_ram_load",
    "label",
    "groups_to_exclude",
    "sample_count",
];
