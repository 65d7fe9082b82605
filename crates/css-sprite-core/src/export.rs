use crate::model::{BuildResult, PositionedImage};
use serde_json::{Value, json};

/// Describe a sprite sheet as JSON: `{ sprites: [...], meta }`.
/// Each sprite carries its selector, CSS values and pixel offset; `meta.image` is the
/// sprite file name when one was written.
pub fn to_json(
    positioned: &[PositionedImage],
    result: &BuildResult,
    size: (u32, u32),
    image: Option<&str>,
) -> Value {
    let sprites = positioned
        .iter()
        .map(|p| {
            json!({
                "selector": p.selector,
                "width": p.width,
                "height": p.height,
                "backgroundPosition": p.background_position,
                "x": p.offset_x,
                "y": p.offset_y,
            })
        })
        .collect::<Vec<_>>();
    json!({
        "sprites": sprites,
        "meta": {
            "app": "css-sprite",
            "version": env!("CARGO_PKG_VERSION"),
            "image": image,
            "size": {"w": size.0, "h": size.1},
            "cssFormat": result.css_format,
            "includeWidthHeight": result.include_width_height,
        }
    })
}
