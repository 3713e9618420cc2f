use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to read settings from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid log directive '{directive}': {reason}")]
    Directive { directive: String, reason: String },
    #[error("Unable to install tracing subscriber: {0}")]
    Subscriber(String),
}
