use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{CssFormat, LayoutSettings};

/// Size of one source image, plus the identifier the placement collaborator knows it by.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageGeometry<K = String> {
    /// Opaque identifier handed back to the placement callback.
    pub id: K,
    /// Display name; whitespace is stripped when building the selector.
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl<K> ImageGeometry<K> {
    pub fn new(id: K, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            name: name.into(),
            width,
            height,
        }
    }
}

impl ImageGeometry<String> {
    /// Geometry whose id doubles as its display name.
    pub fn named(name: impl Into<String>, width: u32, height: u32) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            width,
            height,
        }
    }
}

/// Top-left corner of an image on the composite canvas (pixels).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Offset {
    pub x: u32,
    pub y: u32,
}

impl Offset {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A laid-out image: CSS values plus its canvas offset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionedImage {
    pub selector: String,
    /// Width with unit, e.g. `"40px"`.
    pub width: String,
    /// Height with unit, e.g. `"20px"`.
    pub height: String,
    /// CSS `background-position` value, e.g. `"-40px 0"`.
    pub background_position: String,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl PositionedImage {
    pub fn offset(&self) -> Offset {
        Offset::new(self.offset_x, self.offset_y)
    }
}

/// Plain per-image record carried in [`BuildResult::css_info`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CssRecord {
    pub selector: String,
    pub width: String,
    pub height: String,
    #[serde(rename = "background-position")]
    pub background_position: String,
}

impl From<&PositionedImage> for CssRecord {
    fn from(p: &PositionedImage) -> Self {
        Self {
            selector: p.selector.clone(),
            width: p.width.clone(),
            height: p.height.clone(),
            background_position: p.background_position.clone(),
        }
    }
}

/// What a sprite build hands to the stylesheet stage (and to any outside caller).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildResult {
    #[serde(rename = "cssInfo")]
    pub css_info: Vec<CssRecord>,
    #[serde(rename = "exportCSSFile")]
    pub export_css_file: bool,
    #[serde(rename = "outputFolder")]
    pub output_folder: PathBuf,
    #[serde(rename = "cssFormat")]
    pub css_format: CssFormat,
    #[serde(rename = "includeWidthHeight")]
    pub include_width_height: bool,
}

impl BuildResult {
    /// Projects laid-out images and the stylesheet switches into a result record.
    pub fn new(
        settings: &LayoutSettings,
        output_folder: impl Into<PathBuf>,
        positioned: &[PositionedImage],
    ) -> Self {
        Self {
            css_info: positioned.iter().map(CssRecord::from).collect(),
            export_css_file: settings.export_css_file,
            output_folder: output_folder.into(),
            css_format: settings.css_format,
            include_width_height: settings.include_width_height,
        }
    }
}

/// One axis of a `background-position`: `"0"` at the origin, `"-<n>px"` elsewhere.
pub fn axis_position(offset: u32) -> String {
    if offset == 0 {
        "0".to_string()
    } else {
        format!("-{}px", offset)
    }
}

/// Pixel length with unit, e.g. `px(40) == "40px"`.
pub fn px(v: u32) -> String {
    format!("{}px", v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_has_no_unit() {
        assert_eq!(axis_position(0), "0");
        assert_eq!(axis_position(1), "-1px");
        assert_eq!(axis_position(40), "-40px");
    }

    #[test]
    fn css_record_uses_hyphenated_key() {
        let rec = CssRecord {
            selector: ".sp-a".into(),
            width: "1px".into(),
            height: "2px".into(),
            background_position: "0 0".into(),
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["background-position"], "0 0");
    }
}
