use std::path::PathBuf;

use thiserror::Error;

/// Failure to add an item to the board.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("drop carried no file paths")]
    NoFiles,

    #[error("can't load image: {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The pick pass encodes positions in one byte.
    #[error("board is full ({max} items)")]
    Full { max: usize },
}

/// Rejected reorder request. The draw order is unchanged.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum ReorderError {
    #[error("no item selected")]
    NoSelection,

    #[error("already at top of stack")]
    AtTop,

    #[error("already at bottom of stack")]
    AtBottom,
}
