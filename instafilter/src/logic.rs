use crate::Config;
use anyhow::{Context, Result, bail};
use image_filter::{
    CpuEngine, FilterAdapter, FilterDescriptor, FilterSession, Intensity, SessionEvent,
    export::{self, ExportFormat},
    source,
};
use std::{
    fmt::Write,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(60);

fn adapter(config: &Config) -> FilterAdapter<CpuEngine> {
    FilterAdapter::with_engine(
        CpuEngine::new().with_motion_blur_angle(config.render.motion_blur_angle),
    )
}

fn pick_filter(config: &Config, filter: Option<FilterDescriptor>) -> Result<FilterDescriptor> {
    match filter {
        Some(filter) => Ok(filter),
        None => config.default_filter(),
    }
}

fn pick_format(config: &Config, output: &Path, format: Option<ExportFormat>) -> Result<ExportFormat> {
    match format.or_else(|| ExportFormat::from_path(output)) {
        Some(format) => Ok(format),
        None => config.export_format(),
    }
}

fn summary_line(filter_name: &str, intensity: Intensity, output: &Path) -> String {
    format!(
        "✓ {} {:.2} -> {}",
        filter_name.to_uppercase(),
        intensity.value(),
        output.display()
    )
}

/// Enough decimals that every step of the sweep gets its own file name.
fn sweep_file_name(slug: &str, step: usize, steps: usize, extension: &str) -> String {
    let decimals = steps.to_string().len().max(2);
    let intensity = step as f64 / steps as f64;
    format!("{slug}_{intensity:.decimals$}.{extension}")
}

fn load_input(input: &Path) -> Result<image_filter::RenderableImage> {
    source::load(input).with_context(|| format!("load {} failed", input.display()))
}

pub fn apply(
    config: &Config,
    input: &Path,
    output: &Path,
    filter: Option<FilterDescriptor>,
    intensity: Option<f32>,
    format: Option<ExportFormat>,
) -> Result<()> {
    let filter = pick_filter(config, filter)?;
    let intensity = intensity.unwrap_or(config.filter.intensity);
    let format = pick_format(config, output, format)?;

    let img = load_input(input)?;
    let filtered = adapter(config)
        .apply(filter, intensity, &img)
        .with_context(|| format!("apply {filter} failed"))?;

    export::save(&filtered, output, format, config.export.jpeg_quality)
        .with_context(|| format!("save {} failed", output.display()))?;

    println!("{}", summary_line(filter.name(), Intensity::new(intensity), output));
    Ok(())
}

pub fn filters_table() -> String {
    let mut table = String::new();

    for filter in FilterDescriptor::all() {
        let keys = filter
            .accepted_keys()
            .iter()
            .map(|key| key.name())
            .collect::<Vec<_>>()
            .join(", ");

        _ = writeln!(table, "{:<12} {}", filter.name(), keys);
    }

    table
}

/// Returns the written files, lowest intensity first.
pub fn sweep(
    config: &Config,
    input: &Path,
    out_dir: &Path,
    filter: Option<FilterDescriptor>,
    steps: usize,
) -> Result<Vec<PathBuf>> {
    if steps == 0 {
        bail!("steps must be at least 1");
    }

    let filter = pick_filter(config, filter)?;
    let format = config.export_format()?;
    let img = load_input(input)?;
    let adapter = adapter(config);

    fs::create_dir_all(out_dir)
        .with_context(|| format!("create {} failed", out_dir.display()))?;

    let slug = filter.name().to_lowercase().replace(' ', "-");
    let mut outputs = Vec::with_capacity(steps + 1);

    for step in 0..=steps {
        let intensity = step as f32 / steps as f32;
        let filtered = adapter
            .apply(filter, intensity, &img)
            .with_context(|| format!("apply {filter} at {intensity:.2} failed"))?;

        let path = out_dir.join(sweep_file_name(&slug, step, steps, format.extension()));
        export::save(&filtered, &path, format, config.export.jpeg_quality)?;

        println!("✓ Generated {}", path.display());
        outputs.push(path);
    }

    Ok(outputs)
}

pub fn preview(
    config: &Config,
    input: &Path,
    output: &Path,
    filter: Option<FilterDescriptor>,
    intensities: &[f32],
) -> Result<()> {
    let Some((first, drags)) = intensities.split_first() else {
        bail!("no intensities given");
    };

    let filter = pick_filter(config, filter)?;
    let format = pick_format(config, output, None)?;
    let img = load_input(input)?;

    let mut session = FilterSession::new(adapter(config), img, filter, *first);
    for intensity in drags {
        session.set_intensity(*intensity);
    }

    match session.wait_settled(SETTLE_TIMEOUT) {
        Some(SessionEvent::Rendered { generation, .. }) => {
            log::info!("session settled at request[{generation}]");
        }
        Some(SessionEvent::Failed { error, .. }) => bail!("render failed: {error}"),
        None => bail!("render did not finish within {SETTLE_TIMEOUT:?}"),
    }

    let frame = session
        .displayed()
        .context("session has no displayed frame")?;
    export::save(&frame.image, output, format, config.export.jpeg_quality)?;

    println!("{}", summary_line(session.filter_name(), frame.intensity, output));
    Ok(())
}
