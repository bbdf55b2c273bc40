//! Readiness marker capability.
//!
//! The host watches the handshake-supplied pid directory for an empty file
//! named after the worker's pid. Creation is best-effort: the component
//! ignores any failure, so a reporter must not panic.

use std::fs::File;
use std::io;
use std::path::Path;

/// Creates the readiness marker once the handshake has completed.
///
/// Injected at construction time so tests (and unusual deployments) can
/// observe or replace the side effect.
pub trait ReadinessReporter {
    /// Signal readiness for the worker with the given pid.
    fn report(&mut self, pid_dir: &Path, pid: u32) -> io::Result<()>;
}

/// Default reporter: creates the empty `<pid>` file inside `pid_dir`.
#[derive(Debug, Default)]
pub struct FsReadiness;

impl ReadinessReporter for FsReadiness {
    fn report(&mut self, pid_dir: &Path, pid: u32) -> io::Result<()> {
        File::create(pid_dir.join(pid.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_readiness_creates_empty_marker() {
        let dir = tempfile::tempdir().unwrap();
        FsReadiness.report(dir.path(), 12345).unwrap();

        let marker = dir.path().join("12345");
        assert!(marker.is_file());
        assert_eq!(std::fs::metadata(&marker).unwrap().len(), 0);
    }

    #[test]
    fn test_fs_readiness_missing_dir_errors() {
        let result = FsReadiness.report(Path::new("/nonexistent/pids"), 1);
        assert!(result.is_err());
    }
}
