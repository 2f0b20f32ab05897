use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use settings::{parse_duration, PowerPreference};

#[derive(Parser, Debug)]
#[command(
    name = "bulbmarch",
    author,
    version,
    about = "Real-time Mandelbulb raymarcher",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Configuration file (defaults to `config.toml` in the platform config directory).
    #[arg(long, global = true, value_name = "PATH", env = "BULBMARCH_CONFIG")]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Initial window size in physical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<SurfaceSize>,

    /// Cap the frame rate (0 = once per display refresh).
    #[arg(long, value_name = "FPS", value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Present without waiting for vblank.
    #[arg(long)]
    pub no_vsync: bool,

    /// Milliseconds of wall-clock time per unit of shader time.
    #[arg(long, value_name = "MILLISECONDS", value_parser = parse_time_divisor)]
    pub time_divisor: Option<f32>,

    /// Close the window after this long (e.g. `30s`, `2m`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub run_for: Option<Duration>,

    /// Render every frame at a fixed timestamp instead of the live clock.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub freeze: Option<Duration>,

    /// Keep the camera at its idle distance regardless of cursor or touch input.
    #[arg(long)]
    pub ignore_pointer: bool,

    /// GPU adapter preference: `low` or `high`.
    #[arg(long, value_name = "POWER", value_parser = parse_gpu_power)]
    pub gpu_power: Option<PowerPreference>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render one frame on the CPU and write it as PNG.
    Still(StillArgs),
    /// Inspect the configuration file.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct StillArgs {
    /// Destination PNG path.
    #[arg(long, short, value_name = "PATH")]
    pub output: PathBuf,

    /// Image size in pixels (e.g. `800x600`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<SurfaceSize>,

    /// Host timestamp to evaluate (e.g. `4.5`, `1m 30s`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub timestamp: Option<Duration>,

    /// Pointer position in pixels from the bottom-left corner (e.g. `320,200`).
    #[arg(long, value_name = "X,Y", value_parser = parse_pointer)]
    pub pointer: Option<[f32; 2]>,

    /// Milliseconds per unit of shader time.
    #[arg(long, value_name = "MILLISECONDS", value_parser = parse_time_divisor)]
    pub time_divisor: Option<f32>,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved configuration file path.
    Where,
    /// Print the effective configuration as TOML.
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<SurfaceSize, String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if width == 0 || height == 0 {
        return Err("size must be greater than zero in both dimensions".into());
    }
    Ok(SurfaceSize { width, height })
}

pub fn parse_pointer(value: &str) -> Result<[f32; 2], String> {
    let (x, y) = value
        .trim()
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{value}'"))?;
    let parse_axis = |axis: &str, name: &str| {
        axis.trim()
            .parse::<f32>()
            .ok()
            .filter(|coordinate| coordinate.is_finite())
            .ok_or_else(|| format!("invalid pointer {name} '{}'", axis.trim()))
    };
    Ok([parse_axis(x, "x")?, parse_axis(y, "y")?])
}

pub fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid FPS '{value}'"))?;
    if !fps.is_finite() || fps < 0.0 {
        return Err(format!("FPS must be zero or positive (got {fps})"));
    }
    Ok(fps)
}

pub fn parse_time_divisor(value: &str) -> Result<f32, String> {
    let divisor: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid time divisor '{value}'"))?;
    if !divisor.is_finite() || divisor <= 0.0 {
        return Err(format!("time divisor must be positive (got {divisor})"));
    }
    Ok(divisor)
}

pub fn parse_gpu_power(value: &str) -> Result<PowerPreference, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "low" | "low-power" | "integrated" => Ok(PowerPreference::Low),
        "high" | "high-performance" | "discrete" => Ok(PowerPreference::High),
        other => Err(format!("unknown GPU power preference '{other}'; expected low or high")),
    }
}
