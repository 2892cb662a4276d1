//! Error classification for the resolution pipeline

use super::types::FreebotsError;

/// Coarse error category used by callers that need to tell failures apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Key absent upstream; expected and silent
    NotFound,
    /// Network or server failure; worth retrying on a later call
    Transient,
    /// Corrupt cached token; treated as a cache miss
    Decode,
    /// Bad configuration or input
    Configuration,
    /// Everything else
    Internal,
}

impl FreebotsError {
    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Http {
                status_code: Some(404),
                ..
            } => ErrorCategory::NotFound,
            Self::Http { .. } | Self::Io { .. } | Self::Storage { .. } => ErrorCategory::Transient,
            Self::Decode { .. } => ErrorCategory::Decode,
            Self::Config { .. } | Self::InvalidInput { .. } => ErrorCategory::Configuration,
            Self::Json { .. } | Self::Cancelled | Self::Other { .. } => ErrorCategory::Internal,
        }
    }

    /// Whether re-invoking the failed operation later may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http {
                status_code: Some(code),
                ..
            } => *code >= 500 || *code == 408 || *code == 429,
            Self::Http {
                status_code: None, ..
            } => true,
            Self::Io { .. } | Self::Storage { .. } => true,
            _ => false,
        }
    }

    /// Whether this error means the resource does not exist upstream
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }
}
