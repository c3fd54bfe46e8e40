// cargo test -p instafilter --test cli_test

use clap::Parser;
use image::{Rgba, RgbaImage};
use instafilter::{Cli, run};
use std::path::Path;

fn write_photo(path: &Path) {
    let img = RgbaImage::from_fn(24, 18, |x, y| Rgba([(x * 10) as u8, (y * 12) as u8, 70, 255]));
    img.save(path).unwrap();
}

fn run_args(args: &[&str]) -> anyhow::Result<()> {
    run(Cli::try_parse_from(args)?)
}

#[test]
fn test_apply_writes_filtered_image() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("in.png");
    let output = dir.path().join("out.jpg");
    write_photo(&input);

    run_args(&[
        "instafilter",
        "apply",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        "--filter",
        "crystallize",
        "--intensity",
        "0.1",
    ])?;

    let bytes = std::fs::read(&output)?;
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    Ok(())
}

#[test]
fn test_apply_accepts_out_of_range_intensity() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("in.png");
    let clamped = dir.path().join("clamped.png");
    let zero = dir.path().join("zero.png");
    write_photo(&input);

    for (output, intensity) in [(&clamped, "-0.3"), (&zero, "0")] {
        run_args(&[
            "instafilter",
            "apply",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "-f",
            "sepia-tone",
            "-i",
            intensity,
        ])?;
    }

    assert_eq!(std::fs::read(&clamped)?, std::fs::read(&zero)?);
    Ok(())
}

#[test]
fn test_apply_uses_config_defaults() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("in.png");
    let output = dir.path().join("out.png");
    let config = dir.path().join("config.toml");
    write_photo(&input);
    std::fs::write(&config, "[filter]\nname = \"edges\"\nintensity = 0.0\n")?;

    run_args(&[
        "instafilter",
        "--config",
        config.to_str().unwrap(),
        "apply",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
    ])?;

    // edges at zero intensity is all black
    let img = image::open(&output)?.to_rgba8();
    assert!(img.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    Ok(())
}

#[test]
fn test_sweep_writes_every_step() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("in.png");
    let out_dir = dir.path().join("sweep");
    write_photo(&input);

    run_args(&[
        "instafilter",
        "sweep",
        input.to_str().unwrap(),
        out_dir.to_str().unwrap(),
        "--filter",
        "motion-blur",
        "--steps",
        "2",
    ])?;

    for name in ["motion-blur_0.00.png", "motion-blur_0.50.png", "motion-blur_1.00.png"] {
        assert!(out_dir.join(name).exists(), "{name}");
    }
    Ok(())
}

#[test]
fn test_preview_saves_last_slider_position() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("in.png");
    let preview = dir.path().join("preview.png");
    let direct = dir.path().join("direct.png");
    write_photo(&input);

    run_args(&[
        "instafilter",
        "preview",
        input.to_str().unwrap(),
        preview.to_str().unwrap(),
        "--filter",
        "pixellate",
        "--intensities",
        "0.1,0.3,0.2",
    ])?;
    run_args(&[
        "instafilter",
        "apply",
        input.to_str().unwrap(),
        direct.to_str().unwrap(),
        "--filter",
        "pixellate",
        "--intensity",
        "0.2",
    ])?;

    assert_eq!(std::fs::read(&preview)?, std::fs::read(&direct)?);
    Ok(())
}

#[test]
fn test_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_args(&[
        "instafilter",
        "apply",
        dir.path().join("nope.png").to_str().unwrap(),
        dir.path().join("out.png").to_str().unwrap(),
    ]);
    assert!(result.is_err());
}

#[test]
fn test_unknown_filter_is_rejected_by_parser() {
    assert!(Cli::try_parse_from(["instafilter", "apply", "a.png", "b.png", "-f", "twirl"]).is_err());
}
