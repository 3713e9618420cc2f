use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("Place '{0}' is already registered")]
    DuplicateRoute(String),
    #[error("Unable to find root element '{0}'")]
    RootNotFound(String),
    #[error("No loader registered under '{0}'")]
    UnknownLoader(String),
}
