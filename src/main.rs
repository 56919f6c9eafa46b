use clap::Parser;
use resvg::usvg;
use std::path::PathBuf;
use tiny_skia::{Pixmap, Transform};
use tracing_subscriber::EnvFilter;

use dayframe::{BorderEngine, Palette, StaticScene, SvgSurface};

/// Render day-group borders and badges for an event-grid scene
#[derive(Parser, Debug)]
#[command(name = "dayframe")]
#[command(about = "Compute day-group outlines for a grid scene and save the overlay", long_about = None)]
struct Args {
    /// Input scene file in JSON (use "-" for stdin)
    #[arg(value_name = "SCENE")]
    input: PathBuf,

    /// Output file path (extension determines format: .svg or .png)
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,

    /// Path to a TOML palette file overriding the weekday colors
    #[arg(short, long, value_name = "PALETTE")]
    palette: Option<PathBuf>,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// Margin around the overlay content in pixels
    #[arg(long, default_value_t = 20.0)]
    margin: f32,
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let scene = if args.input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        StaticScene::from_json(&buffer).map_err(|e| format!("Failed to parse scene: {}", e))?
    } else {
        StaticScene::from_file(&args.input)
            .map_err(|e| format!("Failed to load scene file: {}", e))?
    };

    // A broken palette file is not fatal: badges fall back to the built-in
    // weekday colors and the outlines render regardless.
    let palette = match args.palette {
        Some(ref path) => Palette::from_file(path).unwrap_or_else(|e| {
            tracing::warn!("ignoring palette file {}: {}", path.display(), e);
            Palette::default()
        }),
        None => Palette::default(),
    };

    let mut engine = BorderEngine::new(SvgSurface::new(), palette);
    let report = engine
        .render_pass(&scene)
        .map_err(|e| format!("Render pass failed: {}", e))?;
    eprintln!(
        "Drew {} outline(s) and {} badge(s) from {} group(s)",
        report.outlines, report.badges, report.groups
    );

    let svg = engine.surface().to_svg(args.margin);

    let output_ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .ok_or("Output file has no extension")?
        .to_ascii_lowercase();

    match output_ext.as_str() {
        "svg" => {
            std::fs::write(&args.output, svg).map_err(|e| format!("Failed to write SVG: {}", e))?;
            eprintln!("SVG saved to: {}", args.output.display());
        }
        "png" => {
            let png_data = svg_to_png(&svg, args.png_scale)?;
            std::fs::write(&args.output, png_data)
                .map_err(|e| format!("Failed to write PNG: {}", e))?;
            eprintln!("PNG saved to: {}", args.output.display());
        }
        _ => {
            return Err(format!(
                "Unsupported output format: .{} (use .svg or .png)",
                output_ext
            ));
        }
    }

    Ok(())
}

fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, String> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("Invalid --png-scale value: {}", scale));
    }

    let mut opts = usvg::Options::default();
    opts.fontdb_mut().load_system_fonts();

    let tree =
        usvg::Tree::from_str(svg, &opts).map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let svg_width = (tree.size().width() * scale).ceil() as u32;
    let svg_height = (tree.size().height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(svg_width, svg_height).ok_or("Failed to create pixmap")?;
    let transform = Transform::from_scale(scale, scale);

    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| format!("Failed to encode PNG: {}", e))
}
