/// Numeric status code carried by every [`Status`](crate::Status).
#[allow(non_camel_case_types)]
pub type status_code_t = u16;

/// Codes not tied to the store (0-999).
pub mod StatusCode {
    use super::status_code_t;

    pub const NOT_IMPLEMENTED: status_code_t = 1;
    pub const DATA_CORRUPTION: status_code_t = 2;
    pub const INVALID_ARG: status_code_t = 3;
    pub const FAULT_INJECTION: status_code_t = 70;
    pub const OS_ERROR: status_code_t = 72;
}

/// Namespace codes reported by store calls (3xxx).
pub mod StoreCode {
    use super::status_code_t;

    pub const NOT_FOUND: status_code_t = 3000;
    pub const NOT_DIRECTORY: status_code_t = 3003;
    pub const IS_DIRECTORY: status_code_t = 3006;
    pub const NO_PERMISSION: status_code_t = 3008;
    pub const NO_FILE_SYSTEM: status_code_t = 3011;
    pub const INVALID_HANDLE: status_code_t = 3012;
    pub const INVALID_TOKEN: status_code_t = 3013;
}

/// Name of `code` as it appears in diagnostics.
pub fn code_name(code: status_code_t) -> &'static str {
    match code {
        StatusCode::NOT_IMPLEMENTED => "NotImplemented",
        StatusCode::DATA_CORRUPTION => "DataCorruption",
        StatusCode::INVALID_ARG => "InvalidArg",
        StatusCode::FAULT_INJECTION => "FaultInjection",
        StatusCode::OS_ERROR => "OSError",

        StoreCode::NOT_FOUND => "Store::NotFound",
        StoreCode::NOT_DIRECTORY => "Store::NotDirectory",
        StoreCode::IS_DIRECTORY => "Store::IsDirectory",
        StoreCode::NO_PERMISSION => "Store::NoPermission",
        StoreCode::NO_FILE_SYSTEM => "Store::NoFileSystem",
        StoreCode::INVALID_HANDLE => "Store::InvalidHandle",
        StoreCode::INVALID_TOKEN => "Store::InvalidToken",

        _ => "UnknownCode",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_name() {
        assert_eq!(code_name(StatusCode::OS_ERROR), "OSError");
        assert_eq!(code_name(StoreCode::NO_FILE_SYSTEM), "Store::NoFileSystem");
        assert_eq!(code_name(12345), "UnknownCode");
    }
}
