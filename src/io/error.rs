use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse PDB data: {details} (at line {line})")]
    Parse { line: usize, details: String },

    #[error("model {model} holds {found} atoms but the first model holds {expected}")]
    ModelSize {
        model: usize,
        expected: usize,
        found: usize,
    },

    #[error("frame {frame} requested but the structure has {count} frame(s)")]
    MissingFrame { frame: usize, count: usize },
}

impl Error {
    pub fn parse(line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            line,
            details: details.into(),
        }
    }
}
