use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PageGradeError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("stylesheet {href} could not be loaded: {message}")]
    Stylesheet { href: String, message: String },
}

impl PageGradeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PageGradeError::Io {
            path: path.into(),
            source,
        }
    }
}
