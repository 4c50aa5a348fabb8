//! Renderer error model.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use texinvoice_core::DomainError;

pub type RenderResult<T> = Result<T, RenderError>;

/// The renderer was pointed at templates that do not exist.
///
/// Raised before any rendering happens.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("template directory {} does not exist", .0.display())]
    TemplateDirNotFound(PathBuf),

    #[error("template `{name}` not found in {}", .dir.display())]
    TemplateNotFound { name: String, dir: PathBuf },
}

/// The external compiler did not produce the document.
///
/// Intermediate files are left in place for inspection.
#[derive(Debug, Error)]
pub enum CompilationError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error(
        "compilation failed on pass {pass} (exit code: {})\n{stdout_tail}",
        .status.map_or_else(|| "none".to_string(), |c| c.to_string())
    )]
    MissingSuccessMarker {
        pass: usize,
        status: Option<i32>,
        stdout_tail: String,
        stderr_tail: String,
    },
}

/// Any failure of [`crate::Renderer`].
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Compilation(#[from] CompilationError),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("invoice data could not be copied: {0}")]
    Data(#[from] serde_json::Error),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RenderError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
