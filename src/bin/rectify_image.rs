//! Command-line front end for the rectification pipeline.
//!
//! Decodes an image file, runs the pipeline, and writes the binarized
//! result. With `--debug-dir` every intermediate stage artifact is saved as
//! well, which is the quickest way to see where a difficult capture goes
//! wrong.
//!
//! Usage: `rectify_image <input> [output] [--debug-dir DIR]`

use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};

use receipt_rectify::config::RectifyConfig;
use receipt_rectify::pipeline::{
    binarize_region, build_edge_map, correct_tilt, crop_to_region, detect_bounding_region,
    enhance_text, estimate_tilt, normalize_orientation, rectify, transform_bounding_box,
};

struct CliArgs {
    input: PathBuf,
    output: PathBuf,
    debug_dir: Option<PathBuf>,
}

fn parse_args() -> Result<CliArgs> {
    let mut input = None;
    let mut output = None;
    let mut debug_dir = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--debug-dir" => {
                let dir = args
                    .next()
                    .context("--debug-dir requires a directory argument")?;
                debug_dir = Some(PathBuf::from(dir));
            }
            "--help" | "-h" => {
                eprintln!("Usage: rectify_image <input> [output] [--debug-dir DIR]");
                std::process::exit(0);
            }
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ if output.is_none() => output = Some(PathBuf::from(arg)),
            _ => anyhow::bail!("unexpected argument: {}", arg),
        }
    }

    let input = input.context("missing input image path")?;
    let output = output.unwrap_or_else(|| PathBuf::from("rectified.png"));

    Ok(CliArgs {
        input,
        output,
        debug_dir,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;

    let config = RectifyConfig::from_env()
        .context("invalid RECTIFY_* environment configuration")?;
    tracing::info!("{}", config.summary());

    let image = image::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    tracing::info!(
        "Loaded {} ({}x{})",
        args.input.display(),
        image.width(),
        image.height()
    );

    let result = match &args.debug_dir {
        Some(dir) => run_with_debug_artifacts(&image, &config, dir)?,
        None => {
            let rectified = rectify(&image, &config)?;
            DynamicImage::ImageLuma8(rectified.image)
        }
    };

    result
        .save(&args.output)
        .with_context(|| format!("failed to save {}", args.output.display()))?;
    tracing::info!("Wrote {}", args.output.display());

    Ok(())
}

/// Runs the stages one at a time, saving each intermediate artifact.
fn run_with_debug_artifacts(
    image: &DynamicImage,
    config: &RectifyConfig,
    dir: &Path,
) -> Result<DynamicImage> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let oriented = normalize_orientation(image)?;
    oriented.image.save(dir.join("01_oriented.png"))?;

    let edge_map = build_edge_map(&oriented.image, &config.edge)?;
    edge_map.image.save(dir.join("02_edges.png"))?;

    let mask = binarize_region(&edge_map.image, &config.binarize)?;
    mask.image.save(dir.join("03_mask.png"))?;

    let region = detect_bounding_region(&mask.image, &oriented.image)?;
    region.annotated.save(dir.join("04_annotated.png"))?;
    tracing::info!(
        "Detected region: {} contours, raw angle {:.2}",
        region.contour_count,
        region.min_rect.angle
    );

    let decision = estimate_tilt(region.min_rect.angle, &config.tilt);
    tracing::info!(
        "Tilt: uniform {:.2}, rotating {:.2} (residual {:.2})",
        decision.uniform_angle,
        decision.rotation_to_apply,
        decision.residual
    );

    let corrected = correct_tilt(&oriented.image, &decision)?;
    corrected.image.save(dir.join("05_rotated.png"))?;

    let crop_box = transform_bounding_box(
        &region.bbox,
        decision.rotation_to_apply,
        corrected.image.width(),
        corrected.image.height(),
    );
    let cropped = crop_to_region(&corrected.image, &crop_box)?;
    cropped.image.save(dir.join("06_cropped.png"))?;

    let enhanced = enhance_text(&cropped.image, &config.enhance)?;
    let final_image = DynamicImage::ImageLuma8(enhanced.image);
    final_image.save(dir.join("07_enhanced.png"))?;

    Ok(final_image)
}
