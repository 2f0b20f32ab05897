use std::time::Duration;

use raymarch::DEFAULT_TIME_DIVISOR;

/// GPU power preference for adapter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    /// Prefer integrated / low-power GPUs.
    Low,
    /// Prefer discrete / high-performance GPUs.
    #[default]
    High,
}

/// Summary of the adapter wgpu picked, kept for logging and throttling.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub driver: String,
    pub max_texture_dimension: u32,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            driver: info.driver.clone(),
            max_texture_dimension: limits.max_texture_dimension_2d,
        }
    }

    /// Whether the adapter rasterizes on the CPU (llvmpipe, softpipe, WARP...).
    pub fn is_software(&self) -> bool {
        if self.device_type == wgpu::DeviceType::Cpu {
            return true;
        }
        let name = self.name.to_ascii_lowercase();
        let driver = self.driver.to_ascii_lowercase();
        ["llvmpipe", "softpipe", "swiftshader", "lavapipe"]
            .iter()
            .any(|marker| name.contains(marker) || driver.contains(marker))
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` is assembled by the binary from the config file and CLI
/// flags; the renderer itself never reads either.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Initial window size in physical pixels.
    pub surface_size: (u32, u32),
    pub title: String,
    /// Milliseconds per unit of shader time.
    pub time_divisor: f32,
    /// Optional FPS cap; `None` renders once per vsync.
    pub target_fps: Option<f32>,
    pub vsync: bool,
    pub gpu_power: GpuPowerPreference,
    /// When false the pointer uniform stays at the origin.
    pub track_pointer: bool,
    /// Close the window after this long.
    pub run_for: Option<Duration>,
    /// Render every frame at this timestamp instead of the live clock.
    pub frozen_timestamp: Option<Duration>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            title: "bulbmarch".to_string(),
            time_divisor: DEFAULT_TIME_DIVISOR,
            target_fps: None,
            vsync: true,
            gpu_power: GpuPowerPreference::default(),
            track_pointer: true,
            run_for: None,
            frozen_timestamp: None,
        }
    }
}
