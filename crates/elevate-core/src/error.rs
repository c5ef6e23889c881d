use thiserror::Error;

pub type Result<T, E = ElevateError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElevateError {
    /// A decorator was handed something it cannot install. Raised while the
    /// class is being built, before any instance exists.
    #[error("invalid argument for field `{field}`: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// Props and children are owned by the parent.
    #[error("field `{field}` is read-only")]
    ReadOnlyField { field: String },

    #[error("no elevated field named `{field}`")]
    UnknownField { field: String },
}

impl ElevateError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ElevateError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
