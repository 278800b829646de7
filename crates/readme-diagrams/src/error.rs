use std::process::ExitStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{path} not found")]
    MissingReadme { path: String },

    #[error("renderer config {path} not found")]
    MissingRendererConfig { path: String },

    #[error("invalid renderer config {path}: {message}")]
    InvalidRendererConfig { path: String, message: String },

    #[error("diagram language tag must not be empty")]
    EmptyLanguage,

    #[error("invalid fence pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file {path}: {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn renderer `{program}`: {source}")]
    SpawnRenderer {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("renderer `{program}` failed on {input} ({status})")]
    RendererFailed {
        program: String,
        input: String,
        status: ExitStatus,
    },
}
