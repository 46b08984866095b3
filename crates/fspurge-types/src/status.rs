use std::fmt;
use std::io;

use crate::status_code::{code_name, status_code_t, StatusCode, StoreCode};

/// Outcome of a failed store call: a code plus optional detail.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Status {
    code: status_code_t,
    message: Option<String>,
}

/// Result of a store call.
pub type Result<T> = std::result::Result<T, Status>;

impl Status {
    pub fn new(code: status_code_t) -> Self {
        Self {
            code,
            message: None,
        }
    }

    pub fn with_message(code: status_code_t, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(msg.into()),
        }
    }

    /// Map an I/O error from a mounted store onto the closest code.
    /// `context` names the failed operation and its path.
    pub fn from_io(err: &io::Error, context: impl fmt::Display) -> Self {
        let code = match err.kind() {
            io::ErrorKind::NotFound => StoreCode::NOT_FOUND,
            io::ErrorKind::PermissionDenied => StoreCode::NO_PERMISSION,
            _ => StatusCode::OS_ERROR,
        };
        Self::with_message(code, format!("{}: {}", context, err))
    }

    pub fn code(&self) -> status_code_t {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Renders as `Name(code)` followed by the message, if any.
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", code_name(self.code), self.code)?;
        if let Some(msg) = &self.message {
            write!(f, " {}", msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for Status {}

pub fn make_error<T>(code: status_code_t) -> Result<T> {
    Err(Status::new(code))
}

pub fn make_error_msg<T>(code: status_code_t, msg: impl Into<String>) -> Result<T> {
    Err(Status::with_message(code, msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Status::new(StoreCode::INVALID_TOKEN).to_string(),
            "Store::InvalidToken(3013)"
        );
        let s = Status::with_message(StoreCode::NOT_FOUND, "lookup /a");
        assert_eq!(s.message(), Some("lookup /a"));
        assert_eq!(s.to_string(), "Store::NotFound(3000) lookup /a");
    }

    #[test]
    fn test_from_io() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let s = Status::from_io(&err, "unlink /a/b");
        assert_eq!(s.code(), StoreCode::NO_PERMISSION);
        assert_eq!(s.message(), Some("unlink /a/b: denied"));

        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(Status::from_io(&err, "x").code(), StoreCode::NOT_FOUND);
        let err = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(Status::from_io(&err, "x").code(), StatusCode::OS_ERROR);
    }

    #[test]
    fn test_make_error() {
        let r: Result<()> = make_error(StoreCode::NOT_FOUND);
        assert_eq!(r.unwrap_err().code(), StoreCode::NOT_FOUND);

        let r: Result<u32> = make_error_msg(StatusCode::INVALID_ARG, "bad name");
        let err = r.unwrap_err();
        assert_eq!(err.code(), StatusCode::INVALID_ARG);
        let e: &dyn std::error::Error = &err;
        assert!(e.to_string().starts_with("InvalidArg(3)"));
    }
}
