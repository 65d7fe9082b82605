//! Core library for building CSS sprite sheets.
//!
//! - Layouts: Horizontal / Vertical strips and a Tiled grid (row- or column-major)
//! - Stylesheets: Expanded or Compact rule blocks, optional width/height declarations
//! - Pipeline: `build` drives a [`Canvas`] and a [`Persistence`] collaborator around the layout
//! - Data model is serde-serializable; a JSON description is available via `to_json`.
//!
//! Quick example:
//! ```
//! use css_sprite_core::prelude::*;
//! # fn main() -> css_sprite_core::Result<()> {
//! let images = vec![
//!     ImageGeometry::named("a", 40, 20),
//!     ImageGeometry::named("b", 60, 20),
//! ];
//! let settings = LayoutSettings::builder().offset_spacing(10).build();
//! let positioned = compute_layout(&settings, &images)?;
//! assert_eq!(positioned[1].background_position, "-50px 0");
//! let css = render_stylesheet(&positioned, settings.css_format, settings.include_width_height);
//! assert!(css.starts_with(".sp-a {"));
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod host;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod stylesheet;

pub use config::*;
pub use error::*;
pub use export::*;
pub use host::*;
pub use layout::*;
pub use model::*;
pub use pipeline::*;
pub use stylesheet::*;

/// Convenience prelude for common types and functions.
/// Importing `css_sprite_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        ArrangeBy, BuildMethod, BuildSettings, CssFormat, LayoutSettings, LayoutSettingsBuilder,
    };
    pub use crate::host::{Canvas, LayerBounds, LayerInfo, Persistence};
    pub use crate::layout::{build_layout, compute_layout, sheet_size};
    pub use crate::model::{BuildResult, CssRecord, ImageGeometry, Offset, PositionedImage};
    pub use crate::pipeline::{BuildOutput, SpriteOutput, build, build_sprite};
    pub use crate::stylesheet::{StyleRule, render_rule, render_stylesheet, write_stylesheet};
    pub use crate::{CollaboratorOp, Result, SpriteError};
}
