use crate::error::PageGradeError;
use pagegrade_rubric::hex_sha256;
use std::path::{Path, PathBuf};

/// The Document and Stylesheet of one run, read once and never modified.
#[derive(Debug, Clone)]
pub struct SourceSnapshot {
    html_path: PathBuf,
    css_path: PathBuf,
    html: String,
    css: String,
    fingerprint: String,
}

impl SourceSnapshot {
    pub fn load(html_path: impl AsRef<Path>, css_path: impl AsRef<Path>) -> Result<Self, PageGradeError> {
        let html_path = html_path.as_ref().to_path_buf();
        let css_path = css_path.as_ref().to_path_buf();
        let html = std::fs::read_to_string(&html_path)
            .map_err(|err| PageGradeError::io(&html_path, err))?;
        let css = std::fs::read_to_string(&css_path)
            .map_err(|err| PageGradeError::io(&css_path, err))?;
        Ok(Self::from_parts(html_path, css_path, html, css))
    }

    pub fn from_parts(
        html_path: impl Into<PathBuf>,
        css_path: impl Into<PathBuf>,
        html: impl Into<String>,
        css: impl Into<String>,
    ) -> Self {
        let html = html.into();
        let fingerprint = hex_sha256(html.as_bytes());
        Self {
            html_path: html_path.into(),
            css_path: css_path.into(),
            html,
            css: css.into(),
            fingerprint,
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn html_path(&self) -> &Path {
        &self.html_path
    }

    pub fn css_path(&self) -> &Path {
        &self.css_path
    }

    /// Directory the Document lives in; relative references resolve against it.
    pub fn base_dir(&self) -> PathBuf {
        self.html_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Hex SHA-256 of the Document text.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}
