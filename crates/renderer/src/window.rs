use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use raymarch::Vec2;
use tracing::{error, info, warn};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::runtime::{time_source_for, BoxedTimeSource, FrameScheduler, StopHandle};
use crate::types::{AdapterProfile, RendererConfig};

const SOFTWARE_FPS_CAP: f32 = 15.0;

/// Window plus the GPU state drawing into it.
struct WindowState {
    window: Arc<Window>,
    gpu: GpuState,
    pointer: PointerState,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let gpu = GpuState::new(
            window.as_ref(),
            window.inner_size(),
            config.gpu_power,
            config.vsync,
            config.time_divisor,
        )?;
        Ok(Self {
            window,
            gpu,
            pointer: PointerState::new(config.track_pointer),
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn adapter_profile(&self) -> &AdapterProfile {
        self.gpu.adapter_profile()
    }

    fn render_frame(&mut self, time_source: &mut BoxedTimeSource) -> Result<(), wgpu::SurfaceError> {
        let window_size = self.window.inner_size();
        let pointer = self.pointer.as_uniform(window_size);
        self.gpu.render(window_size, time_source.sample(), pointer)
    }
}

/// Opens the window and drives frames until the stop handle fires.
pub(crate) fn run(config: &RendererConfig, stop: StopHandle) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let (width, height) = config.surface_size;
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(PhysicalSize::new(width.max(1), height.max(1)))
        .build(&event_loop)
        .context("failed to create window")?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, config).context("failed to initialise renderer")?;

    let profile = state.adapter_profile().clone();
    let mut target_fps = config.target_fps;
    if profile.is_software() && target_fps.is_none() {
        target_fps = Some(SOFTWARE_FPS_CAP);
        warn!(
            adapter = %profile.name,
            backend = ?profile.backend,
            cap = SOFTWARE_FPS_CAP,
            "software rasterizer detected; capping to {SOFTWARE_FPS_CAP} FPS (override with --fps)"
        );
    }

    let mut scheduler = FrameScheduler::new(target_fps, stop);
    if let Some(duration) = config.run_for {
        scheduler.stop_after(duration, Instant::now());
    }
    let mut time_source = time_source_for(config.frozen_timestamp);
    info!(
        adapter = %profile.name,
        width,
        height,
        fps = ?target_fps,
        "starting render loop"
    );

    if scheduler.ready_for_frame(Instant::now()) {
        state.window().request_redraw();
    }

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        scheduler.stop_handle().stop();
                        elwt.exit();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state == ElementState::Pressed
                            && event.logical_key == Key::Named(NamedKey::Escape)
                        {
                            scheduler.stop_handle().stop();
                            elwt.exit();
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        state.pointer.handle_moved(position);
                    }
                    WindowEvent::Touch(touch) => {
                        state.pointer.handle_moved(touch.location);
                    }
                    WindowEvent::Resized(new_size) => {
                        state.gpu.resize(new_size);
                    }
                    WindowEvent::RedrawRequested => {
                        if scheduler.is_finished(Instant::now()) {
                            elwt.exit();
                            return;
                        }
                        match state.render_frame(&mut time_source) {
                            Ok(()) => scheduler.mark_rendered(),
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                let size = state.gpu.size();
                                state.gpu.resize(size);
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                error!("surface out of memory; exiting");
                                elwt.exit();
                            }
                            Err(wgpu::SurfaceError::Timeout) => {
                                warn!("surface timeout; retrying next frame");
                            }
                            Err(other) => {
                                warn!("surface error: {other:?}; retrying next frame");
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                if scheduler.is_finished(now) {
                    elwt.exit();
                } else if scheduler.ready_for_frame(now) {
                    tracing::trace!("scheduler: issuing redraw now");
                    state.window().request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if let Some(deadline) = scheduler.next_deadline() {
                    let ms = deadline.saturating_duration_since(now).as_millis();
                    tracing::trace!(deadline_ms = ms, "scheduler: waiting until next frame");
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                } else {
                    elwt.set_control_flow(ControlFlow::Wait);
                }
            }
            _ => {}
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

/// Last pointer or touch position, in window pixels with a top-left origin.
#[derive(Debug, Default)]
struct PointerState {
    enabled: bool,
    position: Option<PhysicalPosition<f64>>,
}

impl PointerState {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            position: None,
        }
    }

    fn handle_moved(&mut self, position: PhysicalPosition<f64>) {
        if self.enabled {
            self.position = Some(position);
        }
    }

    /// Pointer in fragment coordinates (bottom-left origin); origin when unseen.
    ///
    /// `window_size` must be the size the frame's resolution uniform is taken
    /// from, so the flip and `iResolution.y` agree.
    fn as_uniform(&self, window_size: PhysicalSize<u32>) -> Vec2 {
        match self.position {
            Some(pos) => Vec2::new(pos.x as f32, window_size.height as f32 - pos.y as f32),
            None => Vec2::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_starts_at_origin() {
        assert_eq!(PointerState::new(true).as_uniform(PhysicalSize::new(640, 480)), Vec2::ZERO);
    }

    #[test]
    fn pointer_is_flipped_to_bottom_left() {
        let mut pointer = PointerState::new(true);
        pointer.handle_moved(PhysicalPosition::new(100.0, 30.0));
        assert_eq!(pointer.as_uniform(PhysicalSize::new(640, 480)), Vec2::new(100.0, 450.0));
    }

    #[test]
    fn latest_position_wins() {
        let mut pointer = PointerState::new(true);
        pointer.handle_moved(PhysicalPosition::new(1.0, 2.0));
        pointer.handle_moved(PhysicalPosition::new(64.0, 10.0));
        assert_eq!(pointer.as_uniform(PhysicalSize::new(100, 100)), Vec2::new(64.0, 90.0));
    }

    #[test]
    fn disabled_pointer_stays_at_origin() {
        let mut pointer = PointerState::new(false);
        pointer.handle_moved(PhysicalPosition::new(100.0, 30.0));
        assert_eq!(pointer.as_uniform(PhysicalSize::new(640, 480)), Vec2::ZERO);
    }

    #[test]
    fn flip_follows_current_window_height() {
        let mut pointer = PointerState::new(true);
        pointer.handle_moved(PhysicalPosition::new(20.0, 100.0));
        assert_eq!(pointer.as_uniform(PhysicalSize::new(800, 600)), Vec2::new(20.0, 500.0));
        assert_eq!(pointer.as_uniform(PhysicalSize::new(800, 300)), Vec2::new(20.0, 200.0));
    }
}
