use std::num::ParseFloatError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The input had no line to use as header.
    #[error("no header line found, the input is empty")]
    EmptyInput,

    /// An empty marker would match every line as header.
    #[error("the header marker must not be empty")]
    EmptyMarker,

    /// A column the cleaning needs is not in the header.
    #[error("column '{0}' not found in header {1:?}")]
    MissingColumn(String, Vec<String>),

    /// A memory field without the usage/limit separator.
    #[error("could not split memory usage '{value}' on data line {line}")]
    MalformedMemory { value: String, line: usize },

    /// Numeric prefix that does not parse once the unit or percent is stripped.
    #[error("could not parse {field} value '{value}' on data line {line}: {source}")]
    Parse {
        field: &'static str,
        value: String,
        line: usize,
        #[source]
        source: ParseFloatError,
    },

    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not draw chart {path:?}: {msg}")]
    Plot { path: PathBuf, msg: String },
}

impl Error {
    pub(crate) fn io<P: Into<PathBuf>>(path: P) -> impl FnOnce(std::io::Error) -> Error {
        let path = path.into();
        move |source| Error::Io { path, source }
    }
}
