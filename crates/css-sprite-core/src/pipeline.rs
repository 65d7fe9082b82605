use crate::config::BuildSettings;
use crate::error::{CollaboratorOp, Result, SpriteError};
use crate::host::{Canvas, LayerInfo, Persistence};
use crate::layout::{build_layout, sheet_size};
use crate::model::{BuildResult, ImageGeometry, PositionedImage};
use crate::stylesheet::write_stylesheet;
use tracing::{debug, info, instrument, warn};

/// Output of the sprite stage: positioned images and the result record.
#[derive(Debug, Clone)]
pub struct SpriteOutput {
    pub positioned: Vec<PositionedImage>,
    /// Area covered by the placed images, before any canvas trimming.
    pub sheet_size: (u32, u32),
    pub result: BuildResult,
}

/// Output of a full build: the sprite stage plus the stylesheet text, if one was written.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub sprite: SpriteOutput,
    pub stylesheet: Option<String>,
}

/// Builds the composite on `canvas` and returns the per-image CSS data.
///
/// Order of collaborator calls:
/// - settings are validated first; a rejected build never touches the canvas
/// - sources are submitted to the canvas last-to-first so the first source ends up
///   topmost, and the canvas' empty base layer is removed
/// - each layer is translated to its computed offset, in source order
/// - the document is revealed, trimmed, optionally exported and closed
#[instrument(skip_all, fields(images = settings.source_images.len()))]
pub fn build_sprite<C: Canvas + ?Sized>(
    settings: &BuildSettings,
    canvas: &mut C,
) -> Result<SpriteOutput> {
    settings.validate()?;

    canvas.create_blank_canvas()?;
    let layers = load_layers(settings, canvas)?;

    let images: Vec<ImageGeometry<usize>> = layers
        .iter()
        .enumerate()
        .map(|(idx, layer)| {
            ImageGeometry::new(
                idx,
                layer.name.clone(),
                extent(layer.bounds.width()),
                extent(layer.bounds.height()),
            )
        })
        .collect();

    let positioned = build_layout(&settings.layout, &images, |&idx, offset| {
        let layer = &layers[idx];
        // Translation is relative; aim the layer's current top-left at the offset.
        canvas.translate(
            &layer.handle,
            i64::from(offset.x) - layer.bounds.x0,
            i64::from(offset.y) - layer.bounds.y0,
        )
    })?;
    let size = sheet_size(&images, &positioned);
    debug!(width = size.0, height = size.1, "sprite laid out");

    canvas.reveal_all()?;
    canvas.trim_transparent()?;
    canvas.view_actual_size()?;

    if settings.export_sprite_image {
        canvas.export_png(&settings.output_folder)?;
        info!(folder = ?settings.output_folder, "sprite image exported");
    }
    if settings.close_generated_document {
        canvas.close(true)?;
    }

    let result = BuildResult::new(&settings.layout, &settings.output_folder, &positioned);
    Ok(SpriteOutput {
        positioned,
        sheet_size: size,
        result,
    })
}

/// Runs [`build_sprite`], writes the stylesheet and optionally opens the output folder.
///
/// Opening the folder is best-effort: a failure is logged and the build still succeeds.
pub fn build<C, P>(settings: &BuildSettings, canvas: &mut C, persistence: &mut P) -> Result<BuildOutput>
where
    C: Canvas + ?Sized,
    P: Persistence + ?Sized,
{
    let sprite = build_sprite(settings, canvas)?;
    let stylesheet = write_stylesheet(&sprite.result, persistence)?;

    if settings.open_output_folder {
        if let Err(e) = persistence.open_folder(&settings.output_folder) {
            warn!(error = %e, folder = ?settings.output_folder, "could not open output folder");
        }
    }
    Ok(BuildOutput { sprite, stylesheet })
}

fn load_layers<C: Canvas + ?Sized>(
    settings: &BuildSettings,
    canvas: &mut C,
) -> Result<Vec<LayerInfo<C::Layer>>> {
    let reversed: Vec<_> = settings.source_images.iter().rev().cloned().collect();
    let mut layers = canvas.load_images_as_layers(&reversed)?;

    let base = layers.pop().ok_or_else(|| {
        SpriteError::collaborator(CollaboratorOp::LoadImages, "canvas reported no base layer")
    })?;
    canvas.remove_layer(&base.handle)?;

    if layers.len() != settings.source_images.len() {
        return Err(SpriteError::collaborator(
            CollaboratorOp::LoadImages,
            format!(
                "expected {} image layers, canvas reported {}",
                settings.source_images.len(),
                layers.len()
            ),
        ));
    }
    Ok(layers)
}

// Out-of-range extents map to 0 so geometry validation rejects them.
fn extent(v: i64) -> u32 {
    u32::try_from(v).unwrap_or(0)
}
