//! Sprite layout: where each image lands on the composite canvas and the CSS
//! values that address it.
//!
//! - `Horizontal` / `Vertical`: a single strip; image `k` sits at
//!   `sum(extent[0..k]) + k * offset_spacing` along the strip axis.
//! - `Tiled`: a grid of `max_width x max_height` cells walked row-major
//!   (`ArrangeBy::Rows`) or column-major (`ArrangeBy::Columns`), wrapping every
//!   `row_nums` images.
//!
//! [`compute_layout`] is pure. [`build_layout`] runs the same computation and only
//! then reports each offset to a placement callback, so invalid input never leads
//! to a partially placed canvas.

use tracing::{debug, instrument};

use crate::config::{ArrangeBy, BuildMethod, LayoutSettings};
use crate::error::{Result, SpriteError};
use crate::model::{ImageGeometry, Offset, PositionedImage, axis_position, px};

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// Computes the positioned record of every image, in input order.
#[instrument(skip_all, fields(method = ?settings.build_method, images = images.len()))]
pub fn compute_layout<K>(
    settings: &LayoutSettings,
    images: &[ImageGeometry<K>],
) -> Result<Vec<PositionedImage>> {
    settings.validate()?;
    validate_geometry(images)?;

    let offsets = match settings.build_method {
        BuildMethod::Horizontal => strip_offsets(images, settings.offset_spacing, Axis::X)?,
        BuildMethod::Vertical => strip_offsets(images, settings.offset_spacing, Axis::Y)?,
        BuildMethod::Tiled => tiled_offsets(images, settings)?,
    };
    debug!(count = offsets.len(), "offsets computed");

    Ok(images
        .iter()
        .zip(offsets)
        .map(|(img, off)| PositionedImage {
            selector: selector_for(settings, &img.name),
            width: px(img.width),
            height: px(img.height),
            background_position: format!("{} {}", axis_position(off.x), axis_position(off.y)),
            offset_x: off.x,
            offset_y: off.y,
        })
        .collect())
}

/// Computes the layout, then calls `place_at` once per image in input order.
///
/// Nothing is placed when settings or geometry are rejected.
pub fn build_layout<K, F>(
    settings: &LayoutSettings,
    images: &[ImageGeometry<K>],
    mut place_at: F,
) -> Result<Vec<PositionedImage>>
where
    F: FnMut(&K, Offset) -> Result<()>,
{
    let positioned = compute_layout(settings, images)?;
    for (img, pos) in images.iter().zip(&positioned) {
        place_at(&img.id, pos.offset())?;
    }
    debug!(placed = positioned.len(), "images placed");
    Ok(positioned)
}

/// Width and height of the area covered by the placed images.
pub fn sheet_size<K>(images: &[ImageGeometry<K>], positioned: &[PositionedImage]) -> (u32, u32) {
    images
        .iter()
        .zip(positioned)
        .fold((0u32, 0u32), |(w, h), (img, p)| {
            (
                w.max(p.offset_x.saturating_add(img.width)),
                h.max(p.offset_y.saturating_add(img.height)),
            )
        })
}

/// `selector_prefix + "." + class_prefix + name + selector_suffix`, with the name sanitized.
///
/// A class that would start with a digit (or `-` and a digit) gets that digit escaped.
pub fn selector_for(settings: &LayoutSettings, name: &str) -> String {
    let class = format!("{}{}", settings.class_prefix, sanitize_class_name(name));
    format!(
        "{}.{}{}",
        settings.selector_prefix,
        escape_leading_digit(&class),
        settings.selector_suffix
    )
}

/// Drops whitespace and escapes ASCII punctuation, symbols and control characters.
///
/// Position-dependent rules (a leading digit) are applied by [`selector_for`].
pub fn sanitize_class_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars().filter(|c| !c.is_whitespace()) {
        if c.is_ascii_control() {
            out.push_str(&format!("\\{:x} ", c as u32));
        } else if c.is_ascii() && !(c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            out.push('\\');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out
}

fn escape_leading_digit(class: &str) -> String {
    let start = usize::from(class.starts_with('-'));
    match class[start..].chars().next() {
        Some(c) if c.is_ascii_digit() => format!(
            "{}\\{:x} {}",
            &class[..start],
            c as u32,
            &class[start + 1..]
        ),
        _ => class.to_string(),
    }
}

fn validate_geometry<K>(images: &[ImageGeometry<K>]) -> Result<()> {
    match images.iter().find(|img| img.width == 0 || img.height == 0) {
        Some(img) => Err(SpriteError::InvalidGeometry {
            name: img.name.clone(),
            width: img.width,
            height: img.height,
        }),
        None => Ok(()),
    }
}

fn overflow() -> SpriteError {
    SpriteError::InvalidConfig("sprite sheet exceeds u32 pixel coordinates".into())
}

// `None` marks an overflowed cursor; it only becomes an error if another image needs it.
fn advance(from: u32, by: Option<u32>) -> Option<u32> {
    by.and_then(|b| from.checked_add(b))
}

fn strip_offsets<K>(images: &[ImageGeometry<K>], spacing: u32, axis: Axis) -> Result<Vec<Offset>> {
    let mut memo = Some(0u32);
    let mut out = Vec::with_capacity(images.len());
    for img in images {
        let m = memo.ok_or_else(overflow)?;
        let (offset, extent) = match axis {
            Axis::X => (Offset::new(m, 0), img.width),
            Axis::Y => (Offset::new(0, m), img.height),
        };
        out.push(offset);
        memo = advance(m, extent.checked_add(spacing));
    }
    Ok(out)
}

fn tiled_offsets<K>(images: &[ImageGeometry<K>], settings: &LayoutSettings) -> Result<Vec<Offset>> {
    let max_width = images.iter().map(|i| i.width).max().unwrap_or(0);
    let max_height = images.iter().map(|i| i.height).max().unwrap_or(0);
    let cell_w = max_width.checked_add(settings.horizontal_spacing);
    let cell_h = max_height.checked_add(settings.vertical_spacing);
    let per_line = settings.row_nums as usize;
    debug!(max_width, max_height, per_line, arrange_by = ?settings.arrange_by, "tiled grid");

    let mut x = Some(0u32);
    let mut y = Some(0u32);
    let mut out = Vec::with_capacity(images.len());
    for index in 0..images.len() {
        let cx = x.ok_or_else(overflow)?;
        let cy = y.ok_or_else(overflow)?;
        out.push(Offset::new(cx, cy));

        let line_end = index % per_line == per_line - 1;
        match settings.arrange_by {
            ArrangeBy::Rows if line_end => {
                x = Some(0);
                y = advance(cy, cell_h);
            }
            ArrangeBy::Rows => x = advance(cx, cell_w),
            ArrangeBy::Columns if line_end => {
                y = Some(0);
                x = advance(cx, cell_w);
            }
            ArrangeBy::Columns => y = advance(cy, cell_h),
        }
    }
    Ok(out)
}
