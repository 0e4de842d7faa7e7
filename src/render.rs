//! Headless rendering to PNG, ASCII, or JSON frame statistics

use crate::canvas::GreyCanvas;
use crate::config::RenderConfig;
use crate::driver::FrameDriver;
use crate::scroll::Rotation;
use crate::torus::FrameStats;
use serde::Serialize;
use std::io::{self, Write};

/// Summary of a headless render
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub width: u32,
    pub height: u32,
    pub ticks: u32,
    pub scroll_target: f64,
    pub scroll_current: f64,
    pub settled: bool,
    pub rotation_a: f32,
    pub rotation_b: f32,
    pub k1: f32,
    pub painted: usize,
    pub stats: FrameStats,
}

/// Render the configured frame into a fresh canvas.
///
/// With `ticks == 0` the scroll position starts settled on the target and one
/// frame is drawn; otherwise the smoothing runs `ticks` frames from rest at 0.
pub fn render_frame(config: &RenderConfig) -> (GreyCanvas, RenderReport) {
    let mut driver = FrameDriver::new(config.torus, config.scroll, config.width, config.height)
        .with_cell_aspect(config.cell_aspect);
    let mut canvas = GreyCanvas::new(config.width, config.height);

    let stats = if config.ticks == 0 {
        driver.jump_to(config.scroll_offset);
        driver.tick(&mut canvas)
    } else {
        driver.set_scroll_target(config.scroll_offset);
        driver.run_ticks(config.ticks, &mut canvas)
    };

    let scroll = driver.scroll_state();
    let Rotation { a, b } = driver.rotation();
    let report = RenderReport {
        width: config.width,
        height: config.height,
        ticks: config.ticks,
        scroll_target: scroll.target,
        scroll_current: scroll.current,
        settled: scroll.is_settled(1e-3),
        rotation_a: a,
        rotation_b: b,
        k1: driver.viewport().k1(),
        painted: canvas.painted_count(),
        stats,
    };
    (canvas, report)
}

pub fn run(config: RenderConfig) -> io::Result<()> {
    let (canvas, report) = render_frame(&config);
    tracing::info!(
        width = report.width,
        height = report.height,
        painted = report.painted,
        "rendered frame"
    );

    let mut stdout = io::stdout().lock();

    if let Some(path) = &config.output {
        canvas.to_image().save(path).map_err(io::Error::other)?;
        tracing::info!(path = %path.display(), "wrote png");
    }

    if config.ascii || (config.output.is_none() && !config.stats) {
        stdout.write_all(canvas.to_ascii().as_bytes())?;
    }

    if config.stats {
        let json = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
        writeln!(stdout, "{}", json)?;
    }

    stdout.flush()
}
