use tracing::{debug, instrument};

use crate::config::CssFormat;
use crate::error::Result;
use crate::host::Persistence;
use crate::model::{BuildResult, CssRecord, PositionedImage};

/// Values a stylesheet rule is rendered from.
pub trait StyleRule {
    fn selector(&self) -> &str;
    fn width(&self) -> &str;
    fn height(&self) -> &str;
    fn background_position(&self) -> &str;
}

impl StyleRule for PositionedImage {
    fn selector(&self) -> &str {
        &self.selector
    }
    fn width(&self) -> &str {
        &self.width
    }
    fn height(&self) -> &str {
        &self.height
    }
    fn background_position(&self) -> &str {
        &self.background_position
    }
}

impl StyleRule for CssRecord {
    fn selector(&self) -> &str {
        &self.selector
    }
    fn width(&self) -> &str {
        &self.width
    }
    fn height(&self) -> &str {
        &self.height
    }
    fn background_position(&self) -> &str {
        &self.background_position
    }
}

/// Renders one rule block.
///
/// Expanded:
/// ```text
/// .sp-a {
/// 	width: 40px;
/// 	height: 20px;
/// 	background-position: 0 0;
/// }
/// ```
/// Compact: `.sp-a { width: 40px; height: 20px; background-position: 0 0; }`
pub fn render_rule<R: StyleRule + ?Sized>(
    rule: &R,
    format: CssFormat,
    include_width_height: bool,
) -> String {
    let mut s = String::new();
    match format {
        CssFormat::Expanded => {
            s.push_str(&format!("{} {{\n", rule.selector()));
            if include_width_height {
                s.push_str(&format!(
                    "\twidth: {};\n\theight: {};\n",
                    rule.width(),
                    rule.height()
                ));
            }
            s.push_str(&format!(
                "\tbackground-position: {};\n",
                rule.background_position()
            ));
            s.push_str("}\n");
        }
        CssFormat::Compact => {
            s.push_str(&format!("{} {{", rule.selector()));
            if include_width_height {
                s.push_str(&format!(
                    " width: {}; height: {};",
                    rule.width(),
                    rule.height()
                ));
            }
            s.push_str(&format!(
                " background-position: {}; }}",
                rule.background_position()
            ));
        }
    }
    s
}

/// Renders every record and joins the blocks with a newline.
pub fn render_stylesheet<R: StyleRule>(
    records: &[R],
    format: CssFormat,
    include_width_height: bool,
) -> String {
    records
        .iter()
        .map(|r| render_rule(r, format, include_width_height))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the stylesheet for `result` and hands it to `persistence`.
///
/// Returns `None` without touching `persistence` when CSS export is switched off.
#[instrument(skip_all)]
pub fn write_stylesheet<P: Persistence + ?Sized>(
    result: &BuildResult,
    persistence: &mut P,
) -> Result<Option<String>> {
    if !result.export_css_file {
        debug!("stylesheet export disabled");
        return Ok(None);
    }
    let contents = render_stylesheet(
        &result.css_info,
        result.css_format,
        result.include_width_height,
    );
    persistence.save_text_file(&contents, &result.output_folder)?;
    debug!(rules = result.css_info.len(), bytes = contents.len(), "stylesheet saved");
    Ok(Some(contents))
}
