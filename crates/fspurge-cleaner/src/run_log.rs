//! The per-run audit log.
//!
//! One line per record, tab separated: `key<TAB>value` for run parameters
//! and results, `R<TAB>path` for a removed file, `K<TAB>path` for a kept one.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub struct RunLog<W: Write = Box<dyn Write + Send>> {
    out: W,
    write_failed: bool,
}

impl RunLog<Box<dyn Write + Send>> {
    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }

    /// Create (or truncate) the log file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(Box::new(BufWriter::new(file))))
    }

    /// Like [`RunLog::create`], but falls back to stderr when the file cannot
    /// be opened.
    pub fn create_or_stderr(path: &Path) -> Self {
        match Self::create(path) {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Cannot open run log, writing it to stderr"
                );
                Self::stderr()
            }
        }
    }
}

impl<W: Write> RunLog<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            write_failed: false,
        }
    }

    pub fn kv(&mut self, key: &str, value: impl fmt::Display) {
        self.line(format_args!("{}\t{}", key, value));
    }

    pub fn removed(&mut self, path: &str) {
        self.line(format_args!("R\t{}", path));
    }

    pub fn kept(&mut self, path: &str) {
        self.line(format_args!("K\t{}", path));
    }

    pub fn flush(&mut self) {
        if let Err(e) = self.out.flush() {
            self.report_failure(&e);
        }
    }

    /// Whether any write to the log has failed.
    pub fn write_failed(&self) -> bool {
        self.write_failed
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{}", args) {
            self.report_failure(&e);
        }
    }

    // Only the first failure is reported; the run carries on regardless.
    fn report_failure(&mut self, err: &io::Error) {
        if !self.write_failed {
            tracing::warn!(error = %err, "Write to run log failed");
            self.write_failed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_line_formats() {
        let mut log = RunLog::new(Vec::new());
        log.kv("dry_run", 1);
        log.removed("/a/b");
        log.kept("/a/c d");
        let text = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(text, "dry_run\t1\nR\t/a/b\nK\t/a/c d\n");
    }

    #[test]
    fn test_write_failure_is_recorded_not_fatal() {
        let mut log = RunLog::new(BrokenPipe);
        log.kv("a", 1);
        log.kv("b", 2);
        log.flush();
        assert!(log.write_failed());
    }

    #[test]
    fn test_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let mut log = RunLog::create(&path).unwrap();
        log.kv("directory", "/scratch");
        log.flush();
        drop(log);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "directory\t/scratch\n");
    }

    #[test]
    fn test_create_or_stderr_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::create_or_stderr(&dir.path().join("missing/run.log"));
        assert!(!log.write_failed());
        assert!(RunLog::create(&dir.path().join("missing/run.log")).is_err());
    }
}
