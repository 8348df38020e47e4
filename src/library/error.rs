use std::path::PathBuf;

use thiserror::Error;

/// Library mutation errors
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The path is not part of the library
    #[error("not in library: {}", .0.display())]
    NotFound(PathBuf),

    /// The file could not be removed from disk
    #[error("cannot delete {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
