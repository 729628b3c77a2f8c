use std::error::Error;
use std::fmt;

/// No profile in the snapshot carries the requested alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    NotFound { alias: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NotFound { alias } => write!(f, "model '{alias}' not found"),
        }
    }
}

impl Error for ResolveError {}

/// A profile that cannot be turned into an upstream base URL.
///
/// This is an operator-side misconfiguration, never a client error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    UnknownProvider {
        alias: String,
        provider: Option<String>,
    },
}

impl fmt::Display for LocateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocateError::UnknownProvider { alias, provider } => match provider {
                Some(provider) => write!(
                    f,
                    "model '{alias}' has no baseUrl and unknown provider '{provider}'"
                ),
                None => write!(f, "model '{alias}' has neither baseUrl nor provider"),
            },
        }
    }
}

impl Error for LocateError {}
