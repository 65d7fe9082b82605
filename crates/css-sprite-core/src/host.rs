//! Collaborators the build drives but does not implement: the canvas that holds
//! image layers and the persistence layer that writes files.
//!
//! The CLI crate provides raster/filesystem implementations; tests use in-memory fakes.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Layer extent on the canvas as `(x0, y0)`..`(x1, y1)`, exclusive on the far edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerBounds {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl LayerBounds {
    pub fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self { x0, y0, x1, y1 }
    }
    pub fn width(&self) -> i64 {
        self.x1 - self.x0
    }
    pub fn height(&self) -> i64 {
        self.y1 - self.y0
    }
}

/// A layer as reported by [`Canvas::load_images_as_layers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo<L> {
    pub handle: L,
    pub name: String,
    pub bounds: LayerBounds,
}

/// Document that source images are stacked on and moved around in.
pub trait Canvas {
    type Layer: Clone;

    /// Opens a fresh document with a single empty base layer.
    fn create_blank_canvas(&mut self) -> Result<()>;

    /// Adds one layer per path, each new layer stacked above the previous ones.
    ///
    /// Returns every layer of the document topmost first, so the base layer
    /// created with the canvas comes last.
    fn load_images_as_layers(&mut self, paths: &[PathBuf]) -> Result<Vec<LayerInfo<Self::Layer>>>;

    fn remove_layer(&mut self, layer: &Self::Layer) -> Result<()>;

    /// Moves a layer by a relative amount.
    fn translate(&mut self, layer: &Self::Layer, dx: i64, dy: i64) -> Result<()>;

    /// Grows the document so every layer is fully inside it.
    fn reveal_all(&mut self) -> Result<()>;

    /// Crops transparent margins off the document.
    fn trim_transparent(&mut self) -> Result<()>;

    fn view_actual_size(&mut self) -> Result<()>;

    /// Writes the flattened document as PNG into `folder`.
    fn export_png(&mut self, folder: &Path) -> Result<()>;

    fn close(&mut self, discard_changes: bool) -> Result<()>;
}

/// Text output and folder handling.
pub trait Persistence {
    /// Stores stylesheet text in `folder`; the file name is up to the implementation.
    fn save_text_file(&mut self, contents: &str, folder: &Path) -> Result<()>;

    /// Shows `path` to the user. Callers treat failures as non-fatal.
    fn open_folder(&mut self, path: &Path) -> Result<()>;
}
