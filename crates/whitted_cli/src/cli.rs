use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use image::ImageFormat;
use log::LevelFilter;
use whitted_renderer::Calibration;

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Shading calibration names
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CalibrationArg {
    Classic,
    Soft,
}

impl From<CalibrationArg> for Calibration {
    fn from(arg: CalibrationArg) -> Self {
        match arg {
            CalibrationArg::Classic => Calibration::Classic,
            CalibrationArg::Soft => Calibration::Soft,
        }
    }
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "whitted")]
#[command(about = "Recursive ray tracer for OBJ scenes")]
pub struct Args {
    /// Scene configuration file (text format, or JSON with a .json extension)
    pub config: PathBuf,

    /// Override the recursion depth from the configuration
    #[arg(short = 'k', long)]
    pub depth: Option<u32>,

    /// Shade first hits with ambient + diffuse only
    #[arg(long)]
    pub preview: bool,

    #[arg(long, value_enum, default_value = "classic", help = "Attenuation and highlight constants")]
    pub calibration: CalibrationArg,

    /// Cull back faces for visibility rays
    #[arg(long)]
    pub cull: bool,

    /// Keep model units instead of scaling the scene to unit size
    #[arg(long)]
    pub no_normalize: bool,

    /// Worker threads (defaults to one per core)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Override the output image path (.jpg is added unless the extension names an image format)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the effective configuration to this path
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "info", help = "Set the logging level")]
    pub log_level: LogLevel,
}

/// Directory that relative paths in the configuration file are relative to.
pub fn config_dir(config: &Path) -> &Path {
    config.parent().unwrap_or(Path::new(""))
}

/// `path`, with `.jpg` appended unless its extension names an image format.
pub fn image_path(path: &Path) -> PathBuf {
    if ImageFormat::from_path(path).is_ok() {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".jpg");
        PathBuf::from(name)
    }
}
