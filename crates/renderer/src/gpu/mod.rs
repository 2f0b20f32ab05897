//! GPU side of the frame driver.
//!
//! - `context` owns the wgpu instance/device/surface and reconfigures the
//!   swapchain when the window resizes.
//! - `pipeline` compiles the wrapped bulb shader and uploads the static quad.
//! - `uniforms` mirrors the std140 block the shader reads every frame.
//! - `state` ties them together behind `GpuState::render`.

mod context;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
