/// Structured error types for chatharvest-core.
///
/// Page-level failures (evaluation, parsing) never surface here: they degrade
/// to empty results inside discovery and extraction. What remains are the
/// run-level conditions the caller has to act on.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    /// Requested provider identity is not registered
    #[error("unknown provider '{requested}' (available: {})", .valid.join(", "))]
    UnknownProvider {
        requested: String,
        valid: Vec<String>,
    },

    /// The target site shows a sign-in affordance
    #[error("not signed in to {provider}; sign in in the browser and retry")]
    NotSignedIn { provider: String },

    /// I/O operation failed
    #[error("I/O error at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    /// JSON serialization failed
    #[error("JSON error in {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// Configuration error
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

pub type Result<T> = std::result::Result<T, HarvestError>;

impl HarvestError {
    pub fn unknown_provider(requested: impl Into<String>, valid: &[&str]) -> Self {
        Self::UnknownProvider {
            requested: requested.into(),
            valid: valid.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub fn not_signed_in(provider: impl Into<String>) -> Self {
        Self::NotSignedIn {
            provider: provider.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_lists_valid_identities() {
        let err = HarvestError::unknown_provider("bard", &["gemini", "chatgpt"]);
        assert_eq!(
            err.to_string(),
            "unknown provider 'bard' (available: gemini, chatgpt)"
        );
    }

    #[test]
    fn io_error_names_path() {
        let err = HarvestError::io(
            "/tmp/out/chat.md",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/out/chat.md"));
        assert!(matches!(err, HarvestError::Io { .. }));
    }
}
