use bytemuck::{Pod, Zeroable};
use raymarch::FrameUniforms;

/// CPU mirror of the `FrameParams` std140 block declared in the shader prelude.
///
/// `vec3 iResolution` occupies 12 bytes and `float iTime` packs into its
/// trailing slot, so `iMouse` starts on the next 16-byte boundary.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub(crate) struct FrameUniformBlock {
    pub i_resolution: [f32; 3],
    pub i_time: f32,
    pub i_mouse: [f32; 4],
}

impl FrameUniformBlock {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            i_resolution: [width as f32, height as f32, 0.0],
            ..Self::default()
        }
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.i_resolution = [width as f32, height as f32, 0.0];
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl From<&FrameUniforms> for FrameUniformBlock {
    fn from(uniforms: &FrameUniforms) -> Self {
        Self {
            i_resolution: uniforms.resolution.extend(0.0).to_array(),
            i_time: uniforms.elapsed_time,
            i_mouse: [uniforms.pointer.x, uniforms.pointer.y, 0.0, 0.0],
        }
    }
}
