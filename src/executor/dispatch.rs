use log::{error, info, warn};

use std::path::Path;
use std::process::{Command, ExitStatus};

use crate::executor::job::Job;

/// Launch `script` with `launcher` through `sh -c`.
///
/// Fire-and-forget: the outcome is logged and returned for callers
/// that care, but never raised. `None` means the shell could not be
/// spawned.
///
/// # Example
///
/// ```rust, no_run
/// use mothulity::executor::dispatch::dispatch;
///
/// dispatch("sbatch", "out/mothur.job.sh".as_ref());
/// ```
pub fn dispatch(launcher: &str, script: &Path) -> Option<ExitStatus> {
    let job = Job::new().task(launcher).script(script);
    info!("INFO: dispatching '{}'", job.cmd());

    match Command::new("sh").arg("-c").arg(job.cmd()).status() {
        Ok(status) if status.success() => {
            info!("INFO: '{}' exited with {}", job.cmd(), status);
            Some(status)
        }
        Ok(status) => {
            warn!("WARN: '{}' exited with {}", job.cmd(), status);
            Some(status)
        }
        Err(e) => {
            error!("ERROR: failed to launch '{}': {}", job.cmd(), e);
            None
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_runs_script() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let script = dir.path().join("job.sh");
        std::fs::write(&script, format!("touch {}\n", marker.display())).unwrap();

        let status = dispatch("sh", &script).unwrap();

        assert!(status.success());
        assert!(marker.exists());
    }

    #[test]
    fn test_dispatch_failure_is_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("job.sh");
        std::fs::write(&script, "exit 3\n").unwrap();

        let status = dispatch("sh", &script).unwrap();

        assert_eq!(status.code(), Some(3));
    }
}
