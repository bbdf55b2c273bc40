//! Optional read-trace capability.
//!
//! When debugging a misbehaving worker it helps to see exactly what the
//! host sent, line by line. A [`TraceSink`] attached to the reader mirrors
//! every line read; [`FileTrace`] is the stock file-backed sink.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Mirror for every line read from the host.
///
/// Recording is best-effort; implementations swallow their own errors
/// rather than disturb the dispatch loop.
pub trait TraceSink {
    /// Record one line as it was read (already trimmed).
    fn record(&mut self, line: &str);
}

/// File-backed trace sink.
///
/// [`FileTrace::for_process`] derives the file name deterministically from
/// the pid and the invoking program name, so traces from repeated runs of
/// the same component land in predictable places.
#[derive(Debug)]
pub struct FileTrace {
    file: File,
}

impl FileTrace {
    /// Open a trace file at the given path, truncating any previous trace.
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            file: File::create(path)?,
        })
    }

    /// Open `<dir>/<pid>_<program>.txt` for the current process.
    pub fn for_process(dir: &Path, pid: u32) -> io::Result<Self> {
        Self::create(&dir.join(Self::file_name(pid)))
    }

    fn file_name(pid: u32) -> PathBuf {
        let program = std::env::args()
            .next()
            .as_deref()
            .and_then(|argv0| {
                Path::new(argv0)
                    .file_name()
                    .map(|name| name.to_string_lossy().to_lowercase())
            })
            .unwrap_or_else(|| "worker".to_string());
        PathBuf::from(format!("{pid}_{program}.txt"))
    }
}

impl TraceSink for FileTrace {
    fn record(&mut self, line: &str) {
        let _ = writeln!(self.file, "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_trace_records_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.txt");
        {
            let mut trace = FileTrace::create(&path).unwrap();
            trace.record("{\"command\":\"next\"}");
            trace.record("end");
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "{\"command\":\"next\"}\nend\n");
    }

    #[test]
    fn test_for_process_names_file_from_pid() {
        let dir = tempfile::tempdir().unwrap();
        let _trace = FileTrace::for_process(dir.path(), 77).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("77_"), "got {names:?}");
        assert!(names[0].ends_with(".txt"));
    }
}
