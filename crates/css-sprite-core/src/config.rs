use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, SpriteError};

/// Packing strategy for the composite image.
/// Key notes:
///   - `Horizontal` / `Vertical` lay images out in one strip, separated by `offset_spacing`
///   - `Tiled` uses a uniform grid of `max_width x max_height` cells, see [`ArrangeBy`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BuildMethod {
    /// Left to right, top edges aligned.
    Horizontal,
    /// Top to bottom, left edges aligned.
    Vertical,
    /// Grid of equally sized cells.
    Tiled,
}

impl FromStr for BuildMethod {
    type Err = SpriteError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "horizontal" | "h" => Ok(Self::Horizontal),
            "vertical" | "v" => Ok(Self::Vertical),
            "tiled" | "grid" => Ok(Self::Tiled),
            _ => Err(SpriteError::UnknownVariant {
                kind: "build method",
                value: s.to_string(),
            }),
        }
    }
}

/// Traversal order of the grid in tiled mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArrangeBy {
    /// Fill a row of `row_nums` cells, then wrap to the next row.
    Rows,
    /// Fill a column of `row_nums` cells, then wrap to the next column.
    Columns,
}

impl FromStr for ArrangeBy {
    type Err = SpriteError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rows" | "row" => Ok(Self::Rows),
            "columns" | "column" | "cols" => Ok(Self::Columns),
            _ => Err(SpriteError::UnknownVariant {
                kind: "arrange-by",
                value: s.to_string(),
            }),
        }
    }
}

/// Stylesheet block layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CssFormat {
    /// One declaration per line, tab indented.
    Expanded,
    /// Whole rule on a single line.
    Compact,
}

impl FromStr for CssFormat {
    type Err = SpriteError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "expanded" => Ok(Self::Expanded),
            "compact" => Ok(Self::Compact),
            _ => Err(SpriteError::UnknownVariant {
                kind: "css format",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutSettings {
    #[serde(default = "default_build_method")]
    pub build_method: BuildMethod,
    /// Gap in pixels between successive images (horizontal/vertical only).
    #[serde(default)]
    pub offset_spacing: u32,

    // tiled
    #[serde(default = "default_arrange_by")]
    pub arrange_by: ArrangeBy,
    /// Cells per row (`Rows`) or per column (`Columns`).
    #[serde(default = "default_row_nums")]
    pub row_nums: u32,
    #[serde(default)]
    pub horizontal_spacing: u32,
    #[serde(default)]
    pub vertical_spacing: u32,

    // selectors
    #[serde(default)]
    pub selector_prefix: String,
    #[serde(default = "default_class_prefix")]
    pub class_prefix: String,
    #[serde(default)]
    pub selector_suffix: String,

    // stylesheet
    #[serde(default = "default_true")]
    pub include_width_height: bool,
    #[serde(default = "default_css_format")]
    pub css_format: CssFormat,
    #[serde(default = "default_true")]
    pub export_css_file: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            build_method: default_build_method(),
            offset_spacing: 0,
            arrange_by: default_arrange_by(),
            row_nums: default_row_nums(),
            horizontal_spacing: 0,
            vertical_spacing: 0,
            selector_prefix: String::new(),
            class_prefix: default_class_prefix(),
            selector_suffix: String::new(),
            include_width_height: true,
            css_format: default_css_format(),
            export_css_file: true,
        }
    }
}

impl LayoutSettings {
    /// Validates the settings.
    ///
    /// Returns an error if the tiled grid would be degenerate (`row_nums == 0`).
    pub fn validate(&self) -> Result<()> {
        if self.build_method == BuildMethod::Tiled && self.row_nums == 0 {
            return Err(SpriteError::InvalidRowNums(self.row_nums));
        }
        Ok(())
    }

    /// Create a fluent builder for `LayoutSettings`.
    pub fn builder() -> LayoutSettingsBuilder {
        LayoutSettingsBuilder::new()
    }
}

/// Everything a build needs: layout settings plus the sources and output switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSettings {
    #[serde(flatten)]
    pub layout: LayoutSettings,
    /// Source image paths, in placement order.
    #[serde(default)]
    pub source_images: Vec<PathBuf>,
    #[serde(default = "default_output_folder")]
    pub output_folder: PathBuf,
    #[serde(default = "default_true")]
    pub export_sprite_image: bool,
    #[serde(default = "default_true")]
    pub close_generated_document: bool,
    #[serde(default)]
    pub open_output_folder: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            layout: LayoutSettings::default(),
            source_images: Vec::new(),
            output_folder: default_output_folder(),
            export_sprite_image: true,
            close_generated_document: true,
            open_output_folder: false,
        }
    }
}

impl BuildSettings {
    /// Validates layout settings and requires at least one source image.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        if self.source_images.is_empty() {
            return Err(SpriteError::Empty);
        }
        Ok(())
    }
}

fn default_build_method() -> BuildMethod {
    BuildMethod::Horizontal
}
fn default_arrange_by() -> ArrangeBy {
    ArrangeBy::Rows
}
fn default_row_nums() -> u32 {
    4
}
fn default_class_prefix() -> String {
    "sp-".into()
}
fn default_css_format() -> CssFormat {
    CssFormat::Expanded
}
fn default_output_folder() -> PathBuf {
    PathBuf::from("out")
}
fn default_true() -> bool {
    true
}

/// Builder for `LayoutSettings` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct LayoutSettingsBuilder {
    cfg: LayoutSettings,
}

impl LayoutSettingsBuilder {
    pub fn new() -> Self {
        Self {
            cfg: LayoutSettings::default(),
        }
    }
    pub fn build_method(mut self, v: BuildMethod) -> Self {
        self.cfg.build_method = v;
        self
    }
    pub fn offset_spacing(mut self, v: u32) -> Self {
        self.cfg.offset_spacing = v;
        self
    }
    pub fn arrange_by(mut self, v: ArrangeBy) -> Self {
        self.cfg.arrange_by = v;
        self
    }
    pub fn row_nums(mut self, v: u32) -> Self {
        self.cfg.row_nums = v;
        self
    }
    pub fn with_spacing(mut self, horizontal: u32, vertical: u32) -> Self {
        self.cfg.horizontal_spacing = horizontal;
        self.cfg.vertical_spacing = vertical;
        self
    }
    pub fn selector_prefix(mut self, v: impl Into<String>) -> Self {
        self.cfg.selector_prefix = v.into();
        self
    }
    pub fn class_prefix(mut self, v: impl Into<String>) -> Self {
        self.cfg.class_prefix = v.into();
        self
    }
    pub fn selector_suffix(mut self, v: impl Into<String>) -> Self {
        self.cfg.selector_suffix = v.into();
        self
    }
    pub fn include_width_height(mut self, v: bool) -> Self {
        self.cfg.include_width_height = v;
        self
    }
    pub fn css_format(mut self, v: CssFormat) -> Self {
        self.cfg.css_format = v;
        self
    }
    pub fn export_css_file(mut self, v: bool) -> Self {
        self.cfg.export_css_file = v;
        self
    }
    pub fn build(self) -> LayoutSettings {
        self.cfg
    }
}
