//! Process environment and target handling.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use fspurge_cleaner::PurgeError;

/// Environment variable that can force a dry run.
pub const DRY_RUN_ENV: &str = "DRY_RUN";

/// The parts of the process environment a run depends on.
#[derive(Debug, Clone)]
pub struct Environment {
    pub euid: u32,
    pub dry_run_var: Option<String>,
}

impl Environment {
    pub fn from_process() -> Self {
        // SAFETY: geteuid has no preconditions and cannot fail.
        let euid = unsafe { libc::geteuid() };
        Self {
            euid,
            dry_run_var: std::env::var(DRY_RUN_ENV).ok(),
        }
    }

    /// Whether `DRY_RUN` holds a non-zero integer. Unset, empty, zero and
    /// non-numeric values do not force anything.
    pub fn dry_run_forced(&self) -> bool {
        self.dry_run_var.as_deref().map_or(false, leading_int_is_nonzero)
    }

    pub fn check_privileged(&self) -> anyhow::Result<()> {
        if self.euid != 0 {
            bail!("must be run as root (effective uid is {})", self.euid);
        }
        Ok(())
    }
}

/// Whether the integer at the start of `s` is non-zero. Only the digits
/// matter, so values too large for any integer type still count.
fn leading_int_is_nonzero(s: &str) -> bool {
    let s = s.trim_start();
    let digits = s.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(s);
    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .any(|b| b != b'0')
}

/// Make `raw` absolute and drop trailing separators, keeping `/` as is.
pub fn normalize_target(raw: &Path) -> anyhow::Result<String> {
    let absolute = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot determine the current directory")?
            .join(raw)
    };
    let Some(text) = absolute.to_str() else {
        bail!("target path is not valid UTF-8: {}", absolute.display());
    };
    let trimmed = text.trim_end_matches('/');
    Ok(if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    })
}

/// The target must exist and be a directory itself, not a link to one.
pub fn validate_target(target: &str) -> Result<(), PurgeError> {
    let invalid = |reason: String| PurgeError::InvalidTarget {
        path: target.to_string(),
        reason,
    };
    let meta = std::fs::symlink_metadata(target).map_err(|e| invalid(e.to_string()))?;
    if !meta.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }
    Ok(())
}

/// `<log_dir>/<started_at>-<basename of target>.log`. The store root is
/// named `root`.
pub fn log_file_path(log_dir: &Path, started_at: i64, target: &str) -> PathBuf {
    let base = Path::new(target)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("root");
    log_dir.join(format!("{}-{}.log", started_at, base))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(euid: u32, dry_run: Option<&str>) -> Environment {
        Environment {
            euid,
            dry_run_var: dry_run.map(str::to_string),
        }
    }

    #[test]
    fn test_dry_run_env() {
        assert!(!env(0, None).dry_run_forced());
        assert!(!env(0, Some("")).dry_run_forced());
        assert!(!env(0, Some("0")).dry_run_forced());
        assert!(!env(0, Some("false")).dry_run_forced());
        assert!(env(0, Some("1")).dry_run_forced());
        assert!(env(0, Some(" 2")).dry_run_forced());
        assert!(env(0, Some("-1")).dry_run_forced());
        assert!(env(0, Some("3yes")).dry_run_forced());
        assert!(!env(0, Some("-000")).dry_run_forced());
        assert!(!env(0, Some("x1")).dry_run_forced());
    }

    #[test]
    fn test_dry_run_env_beyond_i64() {
        assert!(env(0, Some("99999999999999999999999")).dry_run_forced());
        assert!(env(0, Some("-99999999999999999999999")).dry_run_forced());
    }

    #[test]
    fn test_privilege() {
        assert!(env(0, None).check_privileged().is_ok());
        let err = env(1000, None).check_privileged().unwrap_err();
        assert!(err.to_string().contains("root"));
    }

    #[test]
    fn test_normalize_target() {
        assert_eq!(normalize_target(Path::new("/a/b/")).unwrap(), "/a/b");
        assert_eq!(normalize_target(Path::new("/a/b//")).unwrap(), "/a/b");
        assert_eq!(normalize_target(Path::new("/")).unwrap(), "/");
        assert_eq!(normalize_target(Path::new("//")).unwrap(), "/");
        let relative = normalize_target(Path::new("rel")).unwrap();
        assert!(relative.starts_with('/'));
        assert!(relative.ends_with("/rel"));
    }

    #[test]
    fn test_validate_target() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, b"x").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(dir.path(), &link).unwrap();

        assert!(validate_target(dir.path().to_str().unwrap()).is_ok());
        let err = validate_target(file.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().ends_with("not a directory"));
        assert!(validate_target(link.to_str().unwrap()).is_err());
        assert!(validate_target(dir.path().join("missing").to_str().unwrap()).is_err());
    }

    #[test]
    fn test_log_file_path() {
        let dir = Path::new("/var/log/fspurge");
        assert_eq!(
            log_file_path(dir, 1_700_000_000, "/mnt/fs/users/alice"),
            PathBuf::from("/var/log/fspurge/1700000000-alice.log")
        );
        assert_eq!(
            log_file_path(dir, 5, "/"),
            PathBuf::from("/var/log/fspurge/5-root.log")
        );
    }
}
