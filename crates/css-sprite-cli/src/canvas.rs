use std::fs;
use std::path::{Path, PathBuf};

use css_sprite_core::{Canvas, CollaboratorOp, LayerBounds, LayerInfo, Result, SpriteError};
use image::{ImageReader, RgbaImage, imageops};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

/// Handle of a layer inside a [`RasterCanvas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerId(usize);

struct RasterLayer {
    id: LayerId,
    name: String,
    /// `None` for the empty base layer.
    pixels: Option<RgbaImage>,
    x: i64,
    y: i64,
}

impl RasterLayer {
    fn bounds(&self, canvas: (u32, u32)) -> LayerBounds {
        let (w, h) = match &self.pixels {
            Some(p) => p.dimensions(),
            None => canvas,
        };
        LayerBounds::new(self.x, self.y, self.x + w as i64, self.y + h as i64)
    }
}

/// In-memory RGBA document: decoded images stacked as layers, flattened on export.
pub struct RasterCanvas {
    name: String,
    /// Bottom layer first.
    layers: Vec<RasterLayer>,
    next_id: usize,
    size: (u32, u32),
    open: bool,
    progress: bool,
    dry_run: bool,
}

impl RasterCanvas {
    /// `name` is the base name of the exported PNG (`<name>.png`).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers: Vec::new(),
            next_id: 0,
            size: (0, 0),
            open: false,
            progress: false,
            dry_run: false,
        }
    }

    pub fn with_progress(mut self, v: bool) -> Self {
        self.progress = v;
        self
    }

    /// Compute everything but skip writing the PNG.
    pub fn with_dry_run(mut self, v: bool) -> Self {
        self.dry_run = v;
        self
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_open(&self, op: CollaboratorOp) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(SpriteError::collaborator(op, "no open document"))
        }
    }

    fn push_layer(&mut self, name: String, pixels: Option<RgbaImage>) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.push(RasterLayer {
            id,
            name,
            pixels,
            x: 0,
            y: 0,
        });
        id
    }

    fn layer_mut(&mut self, id: LayerId, op: CollaboratorOp) -> Result<&mut RasterLayer> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| SpriteError::collaborator(op, format!("unknown layer {:?}", id)))
    }

    /// Flattens all layers bottom to top over a transparent document.
    fn compose(&self) -> RgbaImage {
        let (w, h) = self.size;
        let mut out = RgbaImage::new(w, h);
        for layer in &self.layers {
            if let Some(px) = &layer.pixels {
                imageops::overlay(&mut out, px, layer.x, layer.y);
            }
        }
        out
    }
}

fn load_error(path: &Path, e: impl std::fmt::Display) -> SpriteError {
    SpriteError::collaborator(CollaboratorOp::LoadImages, format!("{}: {}", path.display(), e))
}

fn decode(path: &Path) -> Result<RgbaImage> {
    let img = ImageReader::open(path)
        .map_err(|e| load_error(path, e))?
        .with_guessed_format()
        .map_err(|e| load_error(path, e))?
        .decode()
        .map_err(|e| load_error(path, e))?;
    Ok(img.to_rgba8())
}

/// Layer and selector name of a source file: its stem, lossily decoded.
pub(crate) fn layer_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Smallest `(w, h)` that keeps every pixel with alpha above zero; the origin is kept.
fn content_extent(rgba: &RgbaImage) -> Option<(u32, u32)> {
    let (w, h) = rgba.dimensions();
    let column_clear = |x: u32| (0..h).all(|y| rgba.get_pixel(x, y)[3] == 0);
    let row_clear = |y: u32, x_end: u32| (0..x_end).all(|x| rgba.get_pixel(x, y)[3] == 0);

    let mut x_end = w;
    while x_end > 0 && column_clear(x_end - 1) {
        x_end -= 1;
    }
    if x_end == 0 {
        return None;
    }
    let mut y_end = h;
    while y_end > 0 && row_clear(y_end - 1, x_end) {
        y_end -= 1;
    }
    Some((x_end, y_end))
}

impl Canvas for RasterCanvas {
    type Layer = LayerId;

    fn create_blank_canvas(&mut self) -> Result<()> {
        self.layers.clear();
        self.size = (0, 0);
        self.open = true;
        self.push_layer("Background".into(), None);
        debug!(name = %self.name, "blank canvas created");
        Ok(())
    }

    fn load_images_as_layers(&mut self, paths: &[PathBuf]) -> Result<Vec<LayerInfo<LayerId>>> {
        self.ensure_open(CollaboratorOp::LoadImages)?;
        let bar = if self.progress {
            let b = ProgressBar::new(paths.len() as u64);
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
            ) {
                b.set_style(style);
            }
            Some(b)
        } else {
            None
        };
        for p in paths {
            let name = layer_name(p);
            if let Some(b) = &bar {
                b.set_message(name.clone());
            }
            let pixels = decode(p)?;
            debug!(?p, w = pixels.width(), h = pixels.height(), "layer loaded");
            self.push_layer(name, Some(pixels));
            if let Some(b) = &bar {
                b.inc(1);
            }
        }
        if let Some(b) = &bar {
            b.finish_and_clear();
        }
        let size = self.size;
        Ok(self
            .layers
            .iter()
            .rev()
            .map(|l| LayerInfo {
                handle: l.id,
                name: l.name.clone(),
                bounds: l.bounds(size),
            })
            .collect())
    }

    fn remove_layer(&mut self, layer: &LayerId) -> Result<()> {
        self.ensure_open(CollaboratorOp::RemoveLayer)?;
        let before = self.layers.len();
        self.layers.retain(|l| l.id != *layer);
        if self.layers.len() == before {
            return Err(SpriteError::collaborator(
                CollaboratorOp::RemoveLayer,
                format!("unknown layer {:?}", layer),
            ));
        }
        Ok(())
    }

    fn translate(&mut self, layer: &LayerId, dx: i64, dy: i64) -> Result<()> {
        self.ensure_open(CollaboratorOp::Placement)?;
        let l = self.layer_mut(*layer, CollaboratorOp::Placement)?;
        l.x += dx;
        l.y += dy;
        Ok(())
    }

    fn reveal_all(&mut self) -> Result<()> {
        self.ensure_open(CollaboratorOp::Reveal)?;
        let size = self.size;
        let document = (size.0 > 0 && size.1 > 0)
            .then(|| LayerBounds::new(0, 0, size.0 as i64, size.1 as i64));
        let union = self
            .layers
            .iter()
            .filter(|l| l.pixels.is_some())
            .map(|l| l.bounds(size))
            .chain(document)
            .reduce(|a, b| {
                LayerBounds::new(a.x0.min(b.x0), a.y0.min(b.y0), a.x1.max(b.x1), a.y1.max(b.y1))
            });
        let Some(u) = union else {
            return Ok(());
        };
        // Only grow towards negative coordinates; the origin stays the sprite's top-left.
        let (sx, sy) = ((-u.x0).max(0), (-u.y0).max(0));
        for l in &mut self.layers {
            l.x += sx;
            l.y += sy;
        }
        let w = u32::try_from(u.x1 + sx).map_err(|e| SpriteError::collaborator(CollaboratorOp::Reveal, e))?;
        let h = u32::try_from(u.y1 + sy).map_err(|e| SpriteError::collaborator(CollaboratorOp::Reveal, e))?;
        self.size = (w, h);
        Ok(())
    }

    fn trim_transparent(&mut self) -> Result<()> {
        self.ensure_open(CollaboratorOp::Trim)?;
        if let Some(extent) = content_extent(&self.compose()) {
            self.size = extent;
        }
        Ok(())
    }

    fn view_actual_size(&mut self) -> Result<()> {
        self.ensure_open(CollaboratorOp::ViewActualSize)?;
        info!(width = self.size.0, height = self.size.1, layers = self.layers.len(), "sprite canvas");
        Ok(())
    }

    fn export_png(&mut self, folder: &Path) -> Result<()> {
        self.ensure_open(CollaboratorOp::ExportImage)?;
        let png_path = folder.join(format!("{}.png", self.name));
        if self.dry_run {
            info!(?png_path, "dry run: sprite image not written");
            return Ok(());
        }
        fs::create_dir_all(folder).map_err(|e| SpriteError::collaborator(CollaboratorOp::ExportImage, e))?;
        self.compose()
            .save(&png_path)
            .map_err(|e| SpriteError::collaborator(CollaboratorOp::ExportImage, e))?;
        info!(?png_path, "wrote sprite image");
        Ok(())
    }

    fn close(&mut self, discard_changes: bool) -> Result<()> {
        self.ensure_open(CollaboratorOp::CloseDocument)?;
        if !discard_changes {
            debug!("documents are in-memory only; nothing to keep");
        }
        self.layers.clear();
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(rgba))
    }

    fn canvas_with(layers: Vec<(&str, RgbaImage)>) -> (RasterCanvas, Vec<LayerId>) {
        let mut c = RasterCanvas::new("t");
        c.create_blank_canvas().unwrap();
        let ids = layers
            .into_iter()
            .map(|(n, px)| c.push_layer(n.to_string(), Some(px)))
            .collect();
        (c, ids)
    }

    #[test]
    fn reveal_all_covers_translated_layers() {
        let (mut c, ids) = canvas_with(vec![("a", solid(4, 3, [255, 0, 0, 255])), ("b", solid(2, 5, [0, 255, 0, 255]))]);
        c.translate(&ids[1], 6, 1).unwrap();
        c.reveal_all().unwrap();
        assert_eq!(c.size(), (8, 6));
    }

    #[test]
    fn reveal_all_shifts_negative_layers_into_view() {
        let (mut c, ids) = canvas_with(vec![("a", solid(2, 2, [1, 1, 1, 255]))]);
        c.translate(&ids[0], -3, 0).unwrap();
        c.reveal_all().unwrap();
        assert_eq!(c.size(), (2, 2));
        assert_eq!(c.layers[1].x, 0);
    }

    #[test]
    fn trim_keeps_origin_and_drops_clear_margins() {
        let mut px = RgbaImage::new(6, 6);
        px.put_pixel(3, 2, Rgba([9, 9, 9, 255]));
        let (mut c, _) = canvas_with(vec![("a", px)]);
        c.reveal_all().unwrap();
        c.trim_transparent().unwrap();
        assert_eq!(c.size(), (4, 3));
    }

    #[test]
    fn compose_places_pixels_at_offsets() {
        let (mut c, ids) = canvas_with(vec![("a", solid(2, 2, [255, 0, 0, 255])), ("b", solid(2, 2, [0, 0, 255, 255]))]);
        c.translate(&ids[1], 2, 0).unwrap();
        c.reveal_all().unwrap();
        let out = c.compose();
        assert_eq!(out.dimensions(), (4, 2));
        assert_eq!(out.get_pixel(1, 1)[0], 255);
        assert_eq!(out.get_pixel(3, 0)[2], 255);
    }

    #[test]
    fn layers_are_reported_topmost_first() {
        let (mut c, _) = canvas_with(vec![("a", solid(1, 1, [0, 0, 0, 255])), ("b", solid(1, 1, [0, 0, 0, 255]))]);
        let listed = c.load_images_as_layers(&[]).unwrap();
        let names: Vec<&str> = listed.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "Background"]);
    }

    #[test]
    fn closed_canvas_rejects_calls() {
        let (mut c, ids) = canvas_with(vec![("a", solid(1, 1, [0, 0, 0, 255]))]);
        c.close(true).unwrap();
        let err = c.translate(&ids[0], 1, 1).unwrap_err();
        assert_eq!(err.operation(), Some(CollaboratorOp::Placement));
    }

    #[test]
    fn each_document_step_names_its_operation() {
        let mut c = RasterCanvas::new("t");
        assert_eq!(c.reveal_all().unwrap_err().operation(), Some(CollaboratorOp::Reveal));
        assert_eq!(c.trim_transparent().unwrap_err().operation(), Some(CollaboratorOp::Trim));
        assert_eq!(
            c.view_actual_size().unwrap_err().operation(),
            Some(CollaboratorOp::ViewActualSize)
        );
    }

    #[test]
    fn layer_name_is_the_file_stem() {
        assert_eq!(layer_name(Path::new("icons/arrow.left.png")), "arrow.left");
    }

    #[test]
    fn fully_transparent_canvas_has_no_extent() {
        assert_eq!(content_extent(&RgbaImage::new(3, 3)), None);
    }
}
