use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("registry parse failure: {0}")]
    ParseFailure(String),
    #[error("invalid registry entry #{position} ({name}): {reason}")]
    InvalidEntry {
        position: usize,
        name: String,
        reason: String,
    },
}

pub type RegistryResult<T> = Result<T, RegistryError>;

impl RegistryError {
    pub(crate) fn invalid(position: usize, name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEntry {
            position,
            name: if name.is_empty() {
                "<unnamed>".to_string()
            } else {
                name.to_string()
            },
            reason: reason.into(),
        }
    }
}
