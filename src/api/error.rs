//! Transport-level failure categories.

use thiserror::Error;

/// Every non-success outcome of a request collapses into one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received (connection refused, DNS, timeout).
    #[error("Server unreachable: {0}")]
    Unreachable(String),

    /// HTTP 401. The persisted token has already been cleared.
    #[error("Unauthorized")]
    Unauthorized,

    /// HTTP 409, the entity already exists.
    #[error("Conflict: entity already exists")]
    Conflict,

    /// Any other non-success status.
    #[error("Request failed with status {0}")]
    Unknown(u16),

    /// A success status whose body could not be decoded.
    #[error("Failed to decode response ({status}): {message}")]
    Decode { status: u16, message: String },
}

impl ApiError {
    /// Status code reported to callers for this failure.
    ///
    /// No response at all, or a body that could not be understood, is
    /// reported as 500.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Unreachable(_) | ApiError::Decode { .. } => 500,
            ApiError::Unauthorized => 401,
            ApiError::Conflict => 409,
            ApiError::Unknown(code) => *code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Unreachable("refused".into()).status_code(), 500);
        assert_eq!(ApiError::Unauthorized.status_code(), 401);
        assert_eq!(ApiError::Conflict.status_code(), 409);
        assert_eq!(ApiError::Unknown(418).status_code(), 418);
        assert_eq!(
            ApiError::Decode {
                status: 200,
                message: "eof".into()
            }
            .status_code(),
            500
        );
    }
}
