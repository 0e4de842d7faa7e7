mod canvas;
mod colors;
mod config;
mod depth;
mod driver;
mod help;
mod live;
mod logging;
mod render;
mod scroll;
mod settings;
mod terminal;
mod torus;
mod viewport;

use clap::{Args, Parser, Subcommand};
use config::{LiveConfig, RenderConfig};
use logging::LogTarget;
use settings::Settings;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scrolltorus")]
#[command(author = "Terminal Art Generator")]
#[command(version)]
#[command(about = "Scroll-driven rotating torus: interactive in the terminal or rendered headless", long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Settings that override the config file
#[derive(Args)]
struct Overrides {
    /// Config file (default: <config dir>/scrolltorus/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tube radius
    #[arg(long, global = true)]
    r1: Option<f32>,

    /// Radius of revolution
    #[arg(long, global = true)]
    r2: Option<f32>,

    /// Distance from viewer
    #[arg(long, global = true)]
    k2: Option<f32>,

    /// Sweep step around the tube (radians)
    #[arg(long, global = true)]
    theta_spacing: Option<f32>,

    /// Sweep step around the revolution (radians)
    #[arg(long, global = true)]
    phi_spacing: Option<f32>,

    /// Fraction of the remaining scroll distance covered per frame (0-1]
    #[arg(long, global = true)]
    smoothing: Option<f32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive viewer: scroll with the mouse wheel or arrow keys
    Live {
        /// Target frames per second
        #[arg(short, long)]
        fps: Option<u32>,

        /// Color scheme (0-9, 7 = true greyscale)
        #[arg(short, long)]
        scheme: Option<u8>,

        /// Scroll distance per wheel notch or key press
        #[arg(long)]
        step: Option<f32>,

        /// Write logs to this file (the terminal is taken over while running)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Render a single frame without a terminal
    Render {
        /// Canvas width in pixels
        #[arg(short = 'W', long, default_value = "80")]
        width: u32,

        /// Canvas height in pixels
        #[arg(short = 'H', long, default_value = "40")]
        height: u32,

        /// Scroll offset to render at
        #[arg(short, long, default_value = "0")]
        scroll: f64,

        /// Smoothing ticks to run from rest (0 = start settled on the offset)
        #[arg(short, long, default_value = "0")]
        ticks: u32,

        /// Vertical scale of a pixel (0.5 suits terminal text)
        #[arg(long, default_value = "1.0")]
        cell_aspect: f32,

        /// Write a greyscale PNG
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the frame as ASCII art (default when no other output is chosen)
        #[arg(short, long)]
        ascii: bool,

        /// Print frame statistics as JSON
        #[arg(long)]
        stats: bool,
    },
}

impl Overrides {
    fn load_settings(&self) -> io::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load_from(path)?,
            None => Settings::load(),
        };

        let torus = &mut settings.torus;
        if let Some(v) = self.r1 {
            torus.r1 = v;
        }
        if let Some(v) = self.r2 {
            torus.r2 = v;
        }
        if let Some(v) = self.k2 {
            torus.k2 = v;
        }
        if let Some(v) = self.theta_spacing {
            torus.theta_spacing = v;
        }
        if let Some(v) = self.phi_spacing {
            torus.phi_spacing = v;
        }
        if let Some(v) = self.smoothing {
            settings.scroll.smoothing = v;
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Live {
            fps,
            scheme,
            step,
            log_file,
        } => {
            match &log_file {
                Some(path) => logging::init(LogTarget::File(path))?,
                None => logging::init(LogTarget::Discard)?,
            }
            let settings = cli.overrides.load_settings()?;
            let mut live = settings.live;
            if let Some(fps) = fps {
                live.fps = fps.clamp(1, 240);
            }
            if let Some(scheme) = scheme {
                live.color_scheme = scheme.min(9);
            }
            if let Some(step) = step {
                live.scroll_step = step;
            }
            live.validate()?;
            let config = LiveConfig {
                torus: settings.torus,
                scroll: settings.scroll,
                live,
            };
            live::run(config)?;
        }
        Commands::Render {
            width,
            height,
            scroll,
            ticks,
            cell_aspect,
            output,
            ascii,
            stats,
        } => {
            logging::init(LogTarget::Stderr)?;
            let settings = cli.overrides.load_settings()?;
            config::validate_cell_aspect("--cell-aspect", cell_aspect)?;
            let config = RenderConfig {
                torus: settings.torus,
                scroll: settings.scroll,
                width,
                height,
                scroll_offset: scroll,
                ticks,
                cell_aspect,
                output,
                ascii,
                stats,
            };
            render::run(config)?;
        }
    }

    Ok(())
}
