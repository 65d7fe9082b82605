use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use css_sprite_core::config::{BuildSettings, LayoutSettings};
use css_sprite_core::{
    BuildResult, ImageGeometry, Persistence, PositionedImage, compute_layout, sheet_size,
    write_stylesheet,
};
use globset::{Glob, GlobSetBuilder};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use walkdir::WalkDir;

mod canvas;
mod persist;

use canvas::RasterCanvas;
use persist::FsPersistence;

#[derive(Parser, Debug)]
#[command(
    name = "css-sprite",
    about = "Combine images into a CSS sprite sheet",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the sprite image and its stylesheet
    Build(SpriteArgs),
    /// Layout-only: read image sizes and write the stylesheet (no PNG)
    Layout(SpriteArgs),
}

#[derive(Parser, Debug, Clone)]
struct SpriteArgs {
    // Input/Output
    /// Input file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Base name of generated files (name.png / name.css)
    #[arg(short, long, default_value = "sprite", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (overrides layout and stylesheet options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Build method: horizontal | vertical | tiled
    #[arg(long, value_parser = ["horizontal", "vertical", "tiled"], default_value = "horizontal", help_heading = "Layout")]
    build_method: String,
    /// Gap between images (horizontal/vertical)
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    offset_spacing: u32,
    /// Tiled traversal: rows | columns
    #[arg(long, value_parser = ["rows", "columns"], default_value = "rows", help_heading = "Layout")]
    arrange_by: String,
    /// Tiled: images per row (rows) or per column (columns)
    #[arg(long, default_value_t = 4, help_heading = "Layout")]
    row_nums: u32,
    /// Tiled: horizontal gap between cells
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    horizontal_spacing: u32,
    /// Tiled: vertical gap between cells
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    vertical_spacing: u32,

    // Selectors
    /// Text placed before the class selector (e.g. "#toolbar ")
    #[arg(long, default_value = "", allow_hyphen_values = true, help_heading = "Selectors")]
    selector_prefix: String,
    /// Prefix of every generated class name
    #[arg(long, default_value = "sp-", allow_hyphen_values = true, help_heading = "Selectors")]
    class_prefix: String,
    /// Text placed after the class selector (e.g. ":hover")
    #[arg(long, default_value = "", allow_hyphen_values = true, help_heading = "Selectors")]
    selector_suffix: String,

    // Stylesheet
    /// CSS format: expanded | compact
    #[arg(long, value_parser = ["expanded", "compact"], default_value = "expanded", help_heading = "Stylesheet")]
    css_format: String,
    /// Emit width/height declarations
    #[arg(long, default_value_t = true, action = ArgAction::Set, help_heading = "Stylesheet")]
    include_width_height: bool,
    /// Write the stylesheet (name.css)
    #[arg(long, default_value_t = true, action = ArgAction::Set, help_heading = "Stylesheet")]
    export_css: bool,

    // Export
    /// Write the sprite image (name.png); ignored by `layout`
    #[arg(long, default_value_t = true, action = ArgAction::Set, help_heading = "Export")]
    export_image: bool,
    /// Open the output directory when done
    #[arg(long, default_value_t = false, help_heading = "Export")]
    open: bool,
    /// Extra metadata file: json
    #[arg(long, value_parser = ["json"], help_heading = "Export")]
    metadata: Option<String>,
    /// Built-in template: scss | less
    #[arg(long, value_parser = ["scss", "less"], help_heading = "Export")]
    preset: Option<String>,
    /// External template file (handlebars); output extension is taken from `name.<ext>.hbs`
    #[arg(long, help_heading = "Export")]
    template: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stylesheet but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Build(args) => run_build(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => run_layout(args, cli.progress && !cli.quiet),
    }
}

fn run_build(args: &SpriteArgs, show_progress: bool) -> anyhow::Result<()> {
    let mut settings = settings_from_args(args)?;
    if args.print_config {
        return print_config(&settings, &args.print_config_format);
    }
    if !args.dry_run {
        fs::create_dir_all(&args.out_dir)
            .with_context(|| format!("create out_dir {}", args.out_dir.display()))?;
    }

    settings.source_images = gather_paths(&args.input, &args.include, &args.exclude)?;
    info!(count = settings.source_images.len(), "found source images");
    if settings.source_images.is_empty() {
        anyhow::bail!("no images found in {}", args.input.display());
    }

    let mut canvas = RasterCanvas::new(&args.name)
        .with_progress(show_progress)
        .with_dry_run(args.dry_run);
    let mut persistence = FsPersistence::new(&args.name, args.dry_run);
    let out = css_sprite_core::build(&settings, &mut canvas, &mut persistence)?;

    // The exported PNG is the trimmed canvas, not the laid-out area
    let size = canvas.size();
    info!(
        images = out.sprite.positioned.len(),
        width = size.0,
        height = size.1,
        laid_out = ?out.sprite.sheet_size,
        method = ?settings.layout.build_method,
        stylesheets = persistence.written().len(),
        "sprite built"
    );

    let image = settings
        .export_sprite_image
        .then(|| format!("{}.png", args.name));
    write_extras(
        args,
        &out.sprite.positioned,
        &out.sprite.result,
        size,
        image.as_deref(),
    )
}

fn run_layout(args: &SpriteArgs, show_progress: bool) -> anyhow::Result<()> {
    let settings = settings_from_args(args)?;
    if args.print_config {
        return print_config(&settings, &args.print_config_format);
    }

    let paths = gather_paths(&args.input, &args.include, &args.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("no images found in {}", args.input.display());
    }
    let images = read_geometry_with_progress(&paths, show_progress)?;
    info!(count = images.len(), "read image sizes");

    let positioned = compute_layout(&settings.layout, &images)?;
    let result = BuildResult::new(&settings.layout, &settings.output_folder, &positioned);
    let mut persistence = FsPersistence::new(&args.name, args.dry_run);
    write_stylesheet(&result, &mut persistence)?;

    let size = sheet_size(&images, &positioned);
    info!(width = size.0, height = size.1, "layout computed (no image written)");
    write_extras(args, &positioned, &result, size, None)?;

    if settings.open_output_folder {
        if let Err(e) = persistence.open_folder(&settings.output_folder) {
            warn!(error = %e, "could not open output folder");
        }
    }
    Ok(())
}

fn settings_from_args(args: &SpriteArgs) -> anyhow::Result<BuildSettings> {
    let layout = LayoutSettings {
        build_method: args.build_method.parse()?,
        offset_spacing: args.offset_spacing,
        arrange_by: args.arrange_by.parse()?,
        row_nums: args.row_nums,
        horizontal_spacing: args.horizontal_spacing,
        vertical_spacing: args.vertical_spacing,
        selector_prefix: args.selector_prefix.clone(),
        class_prefix: args.class_prefix.clone(),
        selector_suffix: args.selector_suffix.clone(),
        include_width_height: args.include_width_height,
        css_format: args.css_format.parse()?,
        export_css_file: args.export_css,
    };
    let cfg = BuildSettings {
        layout,
        source_images: Vec::new(),
        output_folder: args.out_dir.clone(),
        export_sprite_image: args.export_image,
        close_generated_document: true,
        open_output_folder: args.open,
    };

    // Config file settings win over flags
    let cfg = if let Some(path) = &args.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: SpriteConfigFile = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        y.into_build_settings(cfg)?
    } else {
        cfg
    };
    cfg.layout.validate()?;
    Ok(cfg)
}

fn print_config(cfg: &BuildSettings, format: &str) -> anyhow::Result<()> {
    match format {
        "yaml" => println!("{}", serde_yaml::to_string(cfg)?),
        _ => println!("{}", serde_json::to_string_pretty(cfg)?),
    }
    Ok(())
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    // Directory walk order is platform dependent; sprite order must not be
    list.sort();
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg")
    )
}

fn read_geometry_with_progress(
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<Vec<ImageGeometry<PathBuf>>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} reading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let name = canvas::layer_name(p);
        if let Some(b) = &bar {
            b.set_message(name.clone());
        }
        let (w, h) = image::image_dimensions(p)
            .with_context(|| format!("read size of {}", p.display()))?;
        list.push(ImageGeometry::new(p.clone(), name, w, h));
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn write_extras(
    args: &SpriteArgs,
    positioned: &[PositionedImage],
    result: &BuildResult,
    size: (u32, u32),
    image: Option<&str>,
) -> anyhow::Result<()> {
    if let Some(format) = &args.metadata {
        match format.as_str() {
            "json" => {
                let value = css_sprite_core::to_json(positioned, result, size, image);
                let json = serde_json::to_string_pretty(&value)?;
                write_output(args, &format!("{}.json", args.name), &json)?;
            }
            other => anyhow::bail!("unknown metadata format: {}", other),
        }
    }

    let tpl_owned_from_file: Option<String> = match &args.template {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("read template {}", path.display()))?,
        ),
        None => None,
    };
    let chosen: Option<(&str, String)> = if let Some(preset) = &args.preset {
        match preset.to_ascii_lowercase().as_str() {
            "scss" => Some((include_str!("templates/scss.hbs"), "scss".into())),
            "less" => Some((include_str!("templates/less.hbs"), "less".into())),
            other => anyhow::bail!("unknown template preset: {}", other),
        }
    } else if let (Some(src), Some(path)) = (&tpl_owned_from_file, &args.template) {
        Some((src.as_str(), template_extension(path)))
    } else {
        None
    };

    if let Some((tpl, ext)) = chosen {
        let image_name = image
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}.png", args.name));
        let ctx = build_template_context(positioned, size, image_name);
        let rendered = render_template(tpl, &ctx)?;
        write_output(args, &format!("{}.{}", args.name, ext), &rendered)?;
    }
    Ok(())
}

fn write_output(args: &SpriteArgs, file_name: &str, contents: &str) -> anyhow::Result<()> {
    let out_path = args.out_dir.join(file_name);
    if args.dry_run {
        info!(?out_path, "dry run: not written");
        return Ok(());
    }
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create out_dir {}", args.out_dir.display()))?;
    fs::write(&out_path, contents).with_context(|| format!("write {}", out_path.display()))?;
    info!(?out_path, "written");
    Ok(())
}

/// `icons.scss.hbs` -> `scss`; anything else -> `txt`.
fn template_extension(path: &Path) -> String {
    path.file_stem()
        .map(Path::new)
        .and_then(|stem| stem.extension())
        .and_then(|e| e.to_str())
        .unwrap_or("txt")
        .to_string()
}

fn render_template(tpl: &str, ctx: &TemplateContext) -> anyhow::Result<String> {
    let mut reg = Handlebars::new();
    reg.set_strict_mode(true);
    // stylesheets, not HTML
    reg.register_escape_fn(handlebars::no_escape);
    reg.register_template_string("tpl", tpl)?;
    Ok(reg.render("tpl", ctx)?)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Serialize)]
struct TemplateSprite {
    selector: String,
    width: String,
    height: String,
    background_position: String,
    x: u32,
    y: u32,
}

#[derive(Serialize)]
struct TemplateContext {
    image: String,
    size: serde_json::Value,
    sprites: Vec<TemplateSprite>,
    meta: serde_json::Value,
}

fn build_template_context(
    positioned: &[PositionedImage],
    size: (u32, u32),
    image: String,
) -> TemplateContext {
    let sprites = positioned
        .iter()
        .map(|p| TemplateSprite {
            selector: p.selector.clone(),
            width: p.width.clone(),
            height: p.height.clone(),
            background_position: p.background_position.clone(),
            x: p.offset_x,
            y: p.offset_y,
        })
        .collect();
    TemplateContext {
        image,
        size: serde_json::json!({"w": size.0, "h": size.1}),
        sprites,
        meta: serde_json::json!({
            "app": "css-sprite",
            "version": env!("CARGO_PKG_VERSION"),
        }),
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SpriteConfigFile {
    build_method: Option<String>,
    offset_spacing: Option<u32>,
    arrange_by: Option<String>,
    row_nums: Option<u32>,
    horizontal_spacing: Option<u32>,
    vertical_spacing: Option<u32>,
    selector_prefix: Option<String>,
    class_prefix: Option<String>,
    selector_suffix: Option<String>,
    include_width_height: Option<bool>,
    css_format: Option<String>,
    export_css_file: Option<bool>,
    export_sprite_image: Option<bool>,
    open_output_folder: Option<bool>,
}

impl SpriteConfigFile {
    fn into_build_settings(self, mut cfg: BuildSettings) -> anyhow::Result<BuildSettings> {
        if let Some(v) = self.build_method {
            cfg.layout.build_method = v.parse()?;
        }
        if let Some(v) = self.offset_spacing {
            cfg.layout.offset_spacing = v;
        }
        if let Some(v) = self.arrange_by {
            cfg.layout.arrange_by = v.parse()?;
        }
        if let Some(v) = self.row_nums {
            cfg.layout.row_nums = v;
        }
        if let Some(v) = self.horizontal_spacing {
            cfg.layout.horizontal_spacing = v;
        }
        if let Some(v) = self.vertical_spacing {
            cfg.layout.vertical_spacing = v;
        }
        if let Some(v) = self.selector_prefix {
            cfg.layout.selector_prefix = v;
        }
        if let Some(v) = self.class_prefix {
            cfg.layout.class_prefix = v;
        }
        if let Some(v) = self.selector_suffix {
            cfg.layout.selector_suffix = v;
        }
        if let Some(v) = self.include_width_height {
            cfg.layout.include_width_height = v;
        }
        if let Some(v) = self.css_format {
            cfg.layout.css_format = v.parse()?;
        }
        if let Some(v) = self.export_css_file {
            cfg.layout.export_css_file = v;
        }
        if let Some(v) = self.export_sprite_image {
            cfg.export_sprite_image = v;
        }
        if let Some(v) = self.open_output_folder {
            cfg.open_output_folder = v;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_sprite_core::config::{ArrangeBy, BuildMethod, CssFormat};
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn write_png(dir: &Path, name: &str, img: &RgbaImage) -> PathBuf {
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    fn sprite_args(input: &Path, out: &Path, extra: &[&str]) -> SpriteArgs {
        let mut argv = vec![
            "css-sprite".to_string(),
            input.display().to_string(),
            "--out-dir".to_string(),
            out.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        SpriteArgs::try_parse_from(argv).unwrap()
    }

    fn positioned() -> Vec<PositionedImage> {
        let images = vec![ImageGeometry::named("a", 40, 20), ImageGeometry::named("b", 60, 20)];
        let settings = LayoutSettings::builder().offset_spacing(10).build();
        compute_layout(&settings, &images).unwrap()
    }

    #[test]
    fn yaml_overrides_flag_values() {
        let yaml = "build_method: tiled\narrange_by: columns\nrow_nums: 2\ncss_format: compact\nclass_prefix: icon-\n";
        let y: SpriteConfigFile = serde_yaml::from_str(yaml).unwrap();
        let cfg = y.into_build_settings(BuildSettings::default()).unwrap();
        assert_eq!(cfg.layout.build_method, BuildMethod::Tiled);
        assert_eq!(cfg.layout.arrange_by, ArrangeBy::Columns);
        assert_eq!(cfg.layout.row_nums, 2);
        assert_eq!(cfg.layout.css_format, CssFormat::Compact);
        assert_eq!(cfg.layout.class_prefix, "icon-");
        assert!(cfg.layout.include_width_height);
    }

    #[test]
    fn yaml_rejects_unknown_values() {
        let y: SpriteConfigFile = serde_yaml::from_str("build_method: spiral\n").unwrap();
        assert!(y.into_build_settings(BuildSettings::default()).is_err());
        assert!(serde_yaml::from_str::<SpriteConfigFile>("colour: red\n").is_err());
    }

    #[test]
    fn template_extension_from_double_suffix() {
        assert_eq!(template_extension(Path::new("tpl/icons.scss.hbs")), "scss");
        assert_eq!(template_extension(Path::new("plain.hbs")), "txt");
    }

    #[test]
    fn scss_preset_renders_every_sprite() {
        let ctx = build_template_context(&positioned(), (110, 20), "sprite.png".into());
        let out = render_template(include_str!("templates/scss.hbs"), &ctx).unwrap();
        assert!(out.contains("$sprite-image: url(\"sprite.png\");"));
        assert!(out.contains(".sp-a {\n  @include sprite(40px, 20px, 0 0);\n}"));
        assert!(out.contains(".sp-b {\n  @include sprite(60px, 20px, -50px 0);\n}"));
    }

    #[test]
    fn less_preset_renders() {
        let ctx = build_template_context(&positioned(), (110, 20), "sprite.png".into());
        let out = render_template(include_str!("templates/less.hbs"), &ctx).unwrap();
        assert!(out.contains(".sp-b {\n  .sprite(60px; 20px; -50px 0);\n}"));
    }

    #[test]
    fn raster_build_puts_pixels_at_css_offsets() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let colours = [RED, BLUE, GREEN];
        let sources = vec![
            write_png(src.path(), "a.png", &RgbaImage::from_pixel(10, 10, Rgba(RED))),
            write_png(src.path(), "b.png", &RgbaImage::from_pixel(6, 8, Rgba(BLUE))),
            write_png(src.path(), "c.png", &RgbaImage::from_pixel(4, 4, Rgba(GREEN))),
        ];
        let settings = BuildSettings {
            layout: LayoutSettings::builder().offset_spacing(2).build(),
            source_images: sources,
            output_folder: out.path().to_path_buf(),
            ..BuildSettings::default()
        };

        let mut canvas = RasterCanvas::new("sprite");
        let mut persistence = FsPersistence::new("sprite", false);
        let built = css_sprite_core::build(&settings, &mut canvas, &mut persistence).unwrap();

        let sheet = image::open(out.path().join("sprite.png")).unwrap().to_rgba8();
        assert_eq!(sheet.dimensions(), (24, 10));
        let positions: Vec<&str> = built
            .sprite
            .positioned
            .iter()
            .map(|p| p.background_position.as_str())
            .collect();
        assert_eq!(positions, vec!["0 0", "-12px 0", "-20px 0"]);
        for ((record, colour), (w, h)) in built
            .sprite
            .positioned
            .iter()
            .zip(colours)
            .zip([(10, 10), (6, 8), (4, 4)])
        {
            let (x, y) = (record.offset_x, record.offset_y);
            assert_eq!(sheet.get_pixel(x, y).0, colour, "{}", record.selector);
            assert_eq!(sheet.get_pixel(x + w - 1, y + h - 1).0, colour, "{}", record.selector);
        }
        // spacing between images stays transparent
        assert_eq!(sheet.get_pixel(10, 0)[3], 0);

        let css_path = out.path().join("sprite.css");
        let css = fs::read_to_string(&css_path).unwrap();
        assert_eq!(built.stylesheet.as_deref(), Some(css.as_str()));
        assert_eq!(persistence.written(), &[css_path]);
    }

    #[test]
    fn disabled_stylesheet_writes_no_css_file() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let mut settings = BuildSettings {
            source_images: vec![write_png(src.path(), "a.png", &RgbaImage::from_pixel(3, 3, Rgba(RED)))],
            output_folder: out.path().to_path_buf(),
            ..BuildSettings::default()
        };
        settings.layout.export_css_file = false;

        let mut canvas = RasterCanvas::new("sprite");
        let mut persistence = FsPersistence::new("sprite", false);
        let built = css_sprite_core::build(&settings, &mut canvas, &mut persistence).unwrap();
        assert!(built.stylesheet.is_none());
        assert!(persistence.written().is_empty());
        assert!(!out.path().join("sprite.css").exists());
        assert!(out.path().join("sprite.png").exists());
    }

    #[test]
    fn metadata_reports_the_trimmed_png_size() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_png(src.path(), "a.png", &RgbaImage::from_pixel(10, 10, Rgba(RED)));
        let mut half = RgbaImage::new(10, 10);
        for y in 0..10 {
            for x in 0..4 {
                half.put_pixel(x, y, Rgba(BLUE));
            }
        }
        write_png(src.path(), "b.png", &half);

        let args = sprite_args(
            src.path(),
            out.path(),
            &["--metadata", "json", "--preset", "scss"],
        );
        run_build(&args, false).unwrap();

        let (w, h) = image::image_dimensions(out.path().join("sprite.png")).unwrap();
        assert_eq!((w, h), (14, 10));
        let json = fs::read_to_string(out.path().join("sprite.json")).unwrap();
        let meta: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(meta["meta"]["size"]["w"], w);
        assert_eq!(meta["meta"]["size"]["h"], h);
        let scss = fs::read_to_string(out.path().join("sprite.scss")).unwrap();
        assert!(scss.contains(&format!("$sprite-width: {}px;", w)));
        assert!(scss.contains(&format!("$sprite-height: {}px;", h)));
    }

    #[test]
    fn layout_command_keeps_the_laid_out_size() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_png(src.path(), "a.png", &RgbaImage::from_pixel(10, 10, Rgba(RED)));
        write_png(src.path(), "b.png", &RgbaImage::new(10, 10));

        let args = sprite_args(src.path(), out.path(), &["--metadata", "json"]);
        run_layout(&args, false).unwrap();

        assert!(!out.path().join("sprite.png").exists());
        let json = fs::read_to_string(out.path().join("sprite.json")).unwrap();
        let meta: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(meta["meta"]["size"]["w"], 20);
        let css = fs::read_to_string(out.path().join("sprite.css")).unwrap();
        assert!(css.contains(".sp-b {"));
    }

    #[cfg(unix)]
    #[test]
    fn both_commands_name_non_utf8_files_alike() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let src = TempDir::new().unwrap();
        let path = src.path().join(OsStr::from_bytes(b"ic\xffon.png"));
        RgbaImage::from_pixel(2, 2, Rgba(RED)).save(&path).unwrap();

        let read = read_geometry_with_progress(&[path.clone()], false).unwrap();
        assert_eq!(read[0].name, canvas::layer_name(&path));
        assert_eq!(read[0].name, "ic\u{FFFD}on");
    }

    #[test]
    fn image_extensions() {
        assert!(is_image(Path::new("a/b.PNG")));
        assert!(is_image(Path::new("c.jpeg")));
        assert!(!is_image(Path::new("notes.txt")));
    }
}
