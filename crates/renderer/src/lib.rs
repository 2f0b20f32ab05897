//! GPU frame driver for the Mandelbulb raymarcher.
//!
//! The renderer opens a `winit` window, compiles the GLSL version of the
//! `raymarch` shading function through wgpu's naga frontend, and redraws a
//! full-screen quad whenever the [`FrameScheduler`] says a frame is due.
//!
//! ```text
//!   RendererConfig ─▶ Renderer::run ─▶ winit event loop
//!                                        │
//!                    FrameScheduler ◀────┤ AboutToWait: request redraw / wait
//!                    TimeSource     ◀────┤ RedrawRequested: sample clock
//!                                        └─▶ GpuState::render
//!                                              resize? ─▶ uniforms ─▶ draw(6)
//! ```
//!
//! Each frame uploads `iResolution`, `iTime` (timestamp in milliseconds divided
//! by the configured divisor) and `iMouse`, then issues one draw call. Nothing
//! else persists between frames.

mod compile;
mod gpu;
mod runtime;
mod types;
mod window;

use anyhow::Result;

pub use runtime::{
    time_source_for, BoxedTimeSource, FixedTimeSource, FrameScheduler, StopHandle,
    SystemTimeSource, TimeSample, TimeSource,
};
pub use types::{AdapterProfile, GpuPowerPreference, RendererConfig};

/// Entry point used by the binary.
///
/// ```no_run
/// use renderer::{Renderer, RendererConfig};
///
/// let mut renderer = Renderer::new(RendererConfig::default());
/// renderer.run()?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct Renderer {
    config: RendererConfig,
    stop: StopHandle,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            stop: StopHandle::new(),
        }
    }

    /// Handle that ends [`Renderer::run`] from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Opens the window and renders until it is closed, Escape is pressed,
    /// the run duration elapses, or the stop handle fires.
    ///
    /// Fails once, up front, when no adapter, device, surface or valid shader
    /// pipeline can be created.
    pub fn run(&mut self) -> Result<()> {
        window::run(&self.config, self.stop.clone())
    }
}
