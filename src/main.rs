#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::Result;
use rect_overlay::{Config, OverlayConfig, log_error, log_info};
use std::path::PathBuf;

const STATS_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5);

struct Args {
    stream_logs: bool,
    config_path: Option<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        stream_logs: false,
        config_path: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stream-logs" => parsed.stream_logs = true,
            "--config" => {
                if i + 1 < args.len() {
                    parsed.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    parsed
}

fn main() -> Result<()> {
    let result = run_app();
    if let Err(e) = &result {
        log_error!("Fatal: {:#}", e);
    }
    let _ = rect_overlay::logger::finalize_logs();
    result
}

fn run_app() -> Result<()> {
    let args = parse_args();

    let config = Config::new()?;
    let settings = match &args.config_path {
        Some(path) => Config::load_required(path)?,
        None => config.load()?,
    };

    rect_overlay::logger::init_logger(
        config.log_dir.clone(),
        "rect-overlay",
        settings.log_retention_count,
        args.stream_logs,
    )?;

    if let Some(log_path) = rect_overlay::logger::get_log_path() {
        log_info!("Log file: {}", log_path.display());
    }
    log_info!(
        "Configuration: {}x{}, {} rectangles, capacity {} vertices, {} ms frames",
        settings.window.width,
        settings.window.height,
        settings.rectangles.len(),
        settings.max_vertices,
        settings.frame_interval_ms
    );

    run_overlay(&settings)
}

#[cfg(windows)]
fn run_overlay(settings: &OverlayConfig) -> Result<()> {
    use rect_overlay::shader::resolve_shader_path;
    use rect_overlay::{
        log_warn, FramePacer, OverlayRenderer, OverlayWindow, PipelineOptions, ShaderSource, Viewport,
    };

    let shader_path = resolve_shader_path(&settings.shader_path);
    let shader = ShaderSource::load(&shader_path, &settings.shader)?;
    // declared before the renderer so it is dropped after it
    let window = OverlayWindow::new(
        &settings.window.title,
        settings.window.width,
        settings.window.height,
    )?;
    let (width, height) = window.size();
    let viewport = Viewport::new(width, height)?;

    let mut renderer = OverlayRenderer::new(
        window.hwnd(),
        viewport,
        &shader,
        PipelineOptions {
            max_vertices: settings.max_vertices,
            debug_device: settings.debug_device,
        },
    )?;
    log_info!("Renderer initialized");

    let mut pacer = FramePacer::new(settings.frame_interval());
    let mut last_stats = std::time::Instant::now();
    let mut frames: u64 = 0;
    let mut capacity_warned = false;

    while window.process_messages() {
        renderer.begin_frame();

        for rect in &settings.rectangles {
            if let Err(e) = renderer.add_rectangle(rect) {
                if !e.is_recoverable() {
                    return Err(e.into());
                }
                if !capacity_warned {
                    log_warn!("Skipping rectangles that do not fit the batch: {}", e);
                    capacity_warned = true;
                }
                break;
            }
        }

        renderer.render()?;
        pacer.wait();
        frames += 1;

        if last_stats.elapsed() >= STATS_INTERVAL {
            log_info!(
                "Frame stats: {:.1} fps, {:.2} ms/frame (target {} ms)",
                pacer.fps(),
                pacer.frame_time_ms(),
                pacer.interval().as_millis()
            );
            last_stats = std::time::Instant::now();
        }
    }

    log_info!("Overlay closed after {} frames", frames);
    Ok(())
}

#[cfg(not(windows))]
fn run_overlay(_settings: &OverlayConfig) -> Result<()> {
    anyhow::bail!("The overlay requires Windows (Direct3D 11)")
}
