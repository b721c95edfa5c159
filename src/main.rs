use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use crossterm::{queue, style};
use tracing_subscriber::EnvFilter;

use ascii_modeler::{
    camera::{CameraState, OrbitCamera},
    editor::{Editor, config::EditorConfig},
    pipeline::Viewport,
    types::HALF_BLOCK,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const EDIT_USAGE: &str = "ascii-modeler [edit] <model.json>";
const CHECK_USAGE: &str = "ascii-modeler check <model.json>";
const SNAPSHOT_USAGE: &str = "ascii-modeler snapshot <model.json> [cols rows]";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let command = args.next();
    if matches!(command.as_deref(), Some("check" | "snapshot")) {
        init_logging(None)?;
    }
    let config = EditorConfig::load();

    match command.as_deref() {
        Some("edit") => {
            let path = args.next().context(EDIT_USAGE)?;
            edit(&path, config)
        }
        Some("check") => {
            let path = args.next().context(CHECK_USAGE)?;
            check(&path, &config)
        }
        Some("snapshot") => {
            let path = args.next().context(SNAPSHOT_USAGE)?;
            let size = match (args.next(), args.next()) {
                (Some(cols), Some(rows)) => (
                    cols.parse().with_context(|| format!("bad column count `{cols}`"))?,
                    rows.parse().with_context(|| format!("bad row count `{rows}`"))?,
                ),
                (None, None) => (80, 24),
                _ => bail!("Usage: {SNAPSHOT_USAGE}"),
            };
            snapshot(&path, &config, size)
        }
        Some(path) if !path.starts_with('-') => edit(path, config),
        _ => bail!(
            "ASCII Modeler — live-edit a 3D scene in the terminal\n\nUsage:\n  {EDIT_USAGE}\n  {CHECK_USAGE}\n  {SNAPSHOT_USAGE}"
        ),
    }
}

/// Install the tracing subscriber. `RUST_LOG` overrides the default `info`.
/// With a file the TUI keeps the terminal to itself; without one, logs go
/// to stderr.
fn init_logging(file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match file {
        Some(path) => {
            let log = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(log)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn edit(path: &str, config: EditorConfig) -> Result<()> {
    // Logging to stderr would scribble over the TUI.
    if let Some(log_file) = config.log_file.clone() {
        init_logging(Some(&log_file))?;
    }
    let mut editor = Editor::open(Path::new(path), config)?;
    editor.run()
}

fn headless_viewport(config: &EditorConfig, cols: usize, rows: usize) -> Viewport {
    let camera = OrbitCamera::new(
        CameraState {
            distance: config.camera_distance,
            // One frozen frame at angle zero.
            auto_rotate: false,
            ..CameraState::default()
        },
        config.mouse_sensitivity,
        cols as i32,
    );
    Viewport::new(camera, cols, rows, config.field_of_view)
}

fn check(path: &str, config: &EditorConfig) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let mut viewport = headless_viewport(config, 80, 24);
    let report = viewport.tick(&text);

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    if let Some(banner) = report.banner {
        bail!("{path}: {banner}");
    }
    eprintln!(
        "{path}: ok ({} instructions)",
        viewport.compiler().scene().instructions.len()
    );
    Ok(())
}

fn snapshot(path: &str, config: &EditorConfig, (cols, rows): (usize, usize)) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let mut viewport = headless_viewport(config, cols, rows);
    let report = viewport.tick(&text);
    if let Some(banner) = &report.banner {
        eprintln!("warning: {banner}");
    }

    let mut stdout = io::stdout().lock();
    for row in viewport.cells().rows() {
        for cell in row {
            queue!(
                stdout,
                style::PrintStyledContent(style::StyledContent::new(cell.content_style(), HALF_BLOCK))
            )?;
        }
        queue!(stdout, style::ResetColor, style::Print("\n"))?;
    }
    stdout.flush()?;
    Ok(())
}
