use std::fmt;

use thiserror::Error;

/// Collaborator operation that produced a [`SpriteError::Collaborator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorOp {
    CreateCanvas,
    LoadImages,
    RemoveLayer,
    Placement,
    Reveal,
    Trim,
    ViewActualSize,
    ExportImage,
    CloseDocument,
    SaveStylesheet,
    OpenFolder,
}

impl fmt::Display for CollaboratorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateCanvas => "create canvas",
            Self::LoadImages => "load images",
            Self::RemoveLayer => "remove layer",
            Self::Placement => "placement",
            Self::Reveal => "reveal all",
            Self::Trim => "trim",
            Self::ViewActualSize => "view actual size",
            Self::ExportImage => "export image",
            Self::CloseDocument => "close document",
            Self::SaveStylesheet => "save stylesheet",
            Self::OpenFolder => "open folder",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid geometry for `{name}`: {width}x{height} (both sides must be positive)")]
    InvalidGeometry { name: String, width: u32, height: u32 },
    #[error("row_nums must be positive for tiled layouts, got {0}")]
    InvalidRowNums(u32),
    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
    #[error("No source images to build")]
    Empty,
    #[error("{op} failed: {source}")]
    Collaborator {
        op: CollaboratorOp,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SpriteError {
    /// Wraps a failure reported by a canvas or persistence collaborator.
    pub fn collaborator(
        op: CollaboratorOp,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Collaborator {
            op,
            source: source.into(),
        }
    }

    /// True for errors raised while checking settings or geometry, before any side effect.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Collaborator { .. })
    }

    /// The collaborator operation that failed, if any.
    pub fn operation(&self) -> Option<CollaboratorOp> {
        match self {
            Self::Collaborator { op, .. } => Some(*op),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SpriteError>;
