use std::time::{Duration, Instant};

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use raymarch::{FrameUniforms, Vec2};
use tracing::debug;
use winit::dpi::PhysicalSize;

use crate::runtime::TimeSample;
use crate::types::{AdapterProfile, GpuPowerPreference};

use super::context::GpuContext;
use super::pipeline::BulbPipeline;
use super::uniforms::FrameUniformBlock;

/// Everything needed to present one Mandelbulb frame.
///
/// ```text
///   Window ─▶ Surface ─▶ Device ─▶ Queue
///                          │
///                          ├─▶ RenderPipeline (quad + bulb shader)
///                          ├─▶ Vertex buffer (six clip-space corners)
///                          └─▶ Uniform buffer ─▶ bind group
/// ```
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: BulbPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: FrameUniformBlock,
    time_divisor: f32,
    frame_count: u64,
    frames_since_last_update: u32,
    last_fps_update: Instant,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        size: PhysicalSize<u32>,
        gpu_power: GpuPowerPreference,
        vsync: bool,
        time_divisor: f32,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, size, gpu_power, vsync)?;
        let pipeline = BulbPipeline::new(&context.device, context.surface_format)?;

        let uniforms = FrameUniformBlock::new(context.size.width, context.size.height);
        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame uniforms"),
            size: std::mem::size_of::<FrameUniformBlock>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame uniform bind group"),
            layout: &pipeline.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            context,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            time_divisor,
            frame_count: 0,
            frames_since_last_update: 0,
            last_fps_update: Instant::now(),
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
        self.uniforms
            .set_resolution(self.context.size.width, self.context.size.height);
    }

    /// Draws and presents one frame.
    ///
    /// `window_size` is the window's current physical size; a mismatch with
    /// the configured surface triggers a reconfigure before drawing.
    pub(crate) fn render(
        &mut self,
        window_size: PhysicalSize<u32>,
        time_sample: TimeSample,
        pointer: Vec2,
    ) -> Result<(), wgpu::SurfaceError> {
        if window_size != self.context.size {
            self.resize(window_size);
        }

        let size = self.context.size;
        let frame_uniforms = FrameUniforms::from_timestamp(
            size.width,
            size.height,
            time_sample.timestamp_ms,
            self.time_divisor,
        )
        .with_pointer(pointer);
        self.uniforms = FrameUniformBlock::from(&frame_uniforms);

        let frame = self.context.surface.get_current_texture()?;
        self.record_stats();

        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, self.uniforms.as_bytes());

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("bulb pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_viewport(
                0.0,
                0.0,
                size.width as f32,
                size.height as f32,
                0.0,
                1.0,
            );
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.pipeline.quad_buffer.slice(..));
            render_pass.draw(0..self.pipeline.vertex_count(), 0..1);
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        self.frame_count = self.frame_count.saturating_add(1);
        Ok(())
    }

    fn record_stats(&mut self) {
        let now = Instant::now();
        self.frames_since_last_update += 1;
        let elapsed = now.saturating_duration_since(self.last_fps_update);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_since_last_update as f32 / elapsed.as_secs_f32();
            self.frames_since_last_update = 0;
            self.last_fps_update = now;
            debug!(
                fps = fps.round(),
                frame_count = self.frame_count,
                time = self.uniforms.i_time,
                "render stats"
            );
        }
    }
}
