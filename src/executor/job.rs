use std::path::Path;

/// Shell command line used to launch a generated script.
///
/// # Example
///
/// ```rust, no_run
/// use mothulity::executor::job::Job;
///
/// let job = Job::new()
///     .task("sbatch")
///     .arg("--parsable")
///     .script("out/mothur.job.sh".as_ref());
///
/// assert_eq!(job.cmd(), "sbatch --parsable out/mothur.job.sh");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Job {
    pub cmd: String,
}

impl Job {
    /// Create an empty job
    pub fn new() -> Self {
        Self { cmd: String::new() }
    }

    /// Set the launcher, e.g. `sh` or `sbatch`. May carry its own flags.
    pub fn task(mut self, launcher: &str) -> Self {
        self.cmd.push_str(launcher.trim());
        self
    }

    /// Add an argument to the job
    pub fn arg(mut self, arg: &str) -> Self {
        if !self.cmd.is_empty() {
            self.cmd.push(' ');
        }
        self.cmd.push_str(arg);
        self
    }

    /// Add the script to run as the last argument
    pub fn script(self, path: &Path) -> Self {
        let path = path.display().to_string();
        self.arg(&path)
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }
}
