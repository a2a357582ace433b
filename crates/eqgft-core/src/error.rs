use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EqgftError {
    /// Caller-supplied argument outside the domain of a formula.
    InvalidParameter(String),
    /// A probability distribution rejected its parameters.
    Distribution(String),
}

impl fmt::Display for EqgftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EqgftError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            EqgftError::Distribution(msg) => write!(f, "distribution error: {msg}"),
        }
    }
}

impl std::error::Error for EqgftError {}

impl EqgftError {
    pub(crate) fn distribution(context: &str, err: impl fmt::Display) -> Self {
        EqgftError::Distribution(format!("{context}: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, EqgftError>;
