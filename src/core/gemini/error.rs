use thiserror::Error;

use crate::core::credentials::CredentialError;

#[derive(Error, Debug)]
pub enum GenerationError {
    /// No key stored. Callers route this to the key prompt instead of
    /// showing it as an error.
    #[error("API key is not configured. Please set the API key.")]
    MissingCredential,

    #[error("{message}")]
    ExternalService { status: Option<u16>, message: String },

    #[error("{0}")]
    Schema(String),

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    InvalidImage(String),

    #[error("Credential store error: {0}")]
    Credential(#[from] CredentialError),
}

pub type Result<T> = std::result::Result<T, GenerationError>;

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Network(e.to_string())
    }
}

impl GenerationError {
    pub fn external(message: impl Into<String>) -> Self {
        GenerationError::ExternalService {
            status: None,
            message: message.into(),
        }
    }

    /// Prefix the user-facing message, e.g. `"Failed to generate image: "`.
    /// Credential errors keep their own wording.
    pub fn context(self, prefix: &str) -> Self {
        match self {
            GenerationError::ExternalService { status, message } => {
                GenerationError::ExternalService {
                    status,
                    message: format!("{prefix}{message}"),
                }
            }
            GenerationError::Schema(m) => GenerationError::Schema(format!("{prefix}{m}")),
            GenerationError::Network(m) => GenerationError::Network(format!("{prefix}{m}")),
            GenerationError::InvalidImage(m) => {
                GenerationError::InvalidImage(format!("{prefix}{m}"))
            }
            other => other,
        }
    }

    pub fn is_missing_credential(&self) -> bool {
        matches!(self, GenerationError::MissingCredential)
    }

    /// HTTP status reported by the backend, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            GenerationError::ExternalService { status, .. } => *status,
            _ => None,
        }
    }
}
