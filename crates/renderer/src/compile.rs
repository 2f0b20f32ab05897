use std::borrow::Cow;

use anyhow::{bail, Result};
use wgpu::naga::ShaderStage;

/// Body of the Mandelbulb fragment shader, written against the ShaderToy
/// `mainImage` entry point.
pub(crate) const BULB_FRAGMENT: &str = include_str!("shaders/bulb.frag");

/// Compiles the full-screen quad vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    compile_checked(device, "quad vertex", Cow::Borrowed(VERTEX_SHADER_GLSL), ShaderStage::Vertex)
}

/// Wraps `source` with the uniform prelude and compiles it as GLSL.
///
/// Validation errors surface here rather than on the first frame, so a broken
/// shader aborts start-up with the compiler message.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    source: &str,
) -> Result<wgpu::ShaderModule> {
    let wrapped = wrap_fragment(source);
    tracing::trace!(bytes = wrapped.len(), "compiling wrapped fragment shader");
    compile_checked(device, "bulb fragment", Cow::Owned(wrapped), ShaderStage::Fragment)
}

fn compile_checked(
    device: &wgpu::Device,
    label: &str,
    shader: Cow<'static, str>,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader,
            stage,
            defines: &[],
        },
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        bail!("failed to compile {label} shader: {err}");
    }
    Ok(module)
}

/// Produces a self-contained GLSL 450 fragment shader from a `mainImage` body.
///
/// [`HEADER`] declares the uniform block and aliases the ShaderToy names onto
/// it. `#line 1` keeps compiler diagnostics pointing at the body's own lines.
/// [`FOOTER`] converts the framebuffer coordinate to a bottom-left origin and
/// calls `mainImage`.
pub(crate) fn wrap_fragment(source: &str) -> String {
    let mut body = String::with_capacity(source.len());
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("#version") {
            continue;
        }
        if trimmed.starts_with("uniform ")
            && ["iResolution", "iTime", "iMouse"]
                .iter()
                .any(|name| trimmed.contains(name))
        {
            continue;
        }
        body.push_str(line);
        body.push('\n');
    }

    format!("{HEADER}\n#line 1\n{body}{FOOTER}")
}

/// Uniform block layout must match `FrameUniformBlock` in `gpu/uniforms.rs`.
const HEADER: &str = r"#version 450
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform FrameParams {
    vec3 _iResolution;
    float _iTime;
    vec4 _iMouse;
} ubo;

#define iResolution ubo._iResolution
#define iTime ubo._iTime
#define iMouse ubo._iMouse
";

const FOOTER: &str = r"
void main() {
    vec2 fragCoord = vec2(gl_FragCoord.x, iResolution.y - gl_FragCoord.y);
    vec4 color = vec4(0.0);
    mainImage(color, fragCoord);
    outColor = color;
}
";

/// Passes the quad corners straight through in clip space.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 a_position;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_strips_version_and_duplicate_uniforms() {
        let source = r#"
            #version 300 es
            uniform float iTime;
            uniform vec3 iResolution;
            uniform vec4 iMouse;
            uniform float brightness;
            void mainImage(out vec4 fragColor, in vec2 fragCoord) {
                fragColor = vec4(fragCoord, 0.0, 1.0);
            }
        "#;

        let wrapped = wrap_fragment(source);
        assert!(!wrapped.contains("#version 300 es"));
        assert!(!wrapped.contains("uniform float iTime"));
        assert!(!wrapped.contains("uniform vec3 iResolution"));
        assert!(!wrapped.contains("uniform vec4 iMouse"));
        assert!(wrapped.contains("uniform float brightness"));
        assert!(wrapped.contains("void mainImage"));
    }

    #[test]
    fn wrapped_shader_has_single_version_and_entry_point() {
        let wrapped = wrap_fragment(BULB_FRAGMENT);
        assert!(wrapped.starts_with("#version 450"));
        assert_eq!(wrapped.matches("#version").count(), 1);
        assert_eq!(wrapped.matches("void main()").count(), 1);
        assert!(wrapped.contains("#line 1\n"));
    }

    #[test]
    fn body_precedes_footer() {
        let wrapped = wrap_fragment(BULB_FRAGMENT);
        let body = wrapped.find("void mainImage").expect("mainImage present");
        let entry = wrapped.find("void main()").expect("main present");
        assert!(body < entry);
    }

    fn validate(source: &str, stage: ShaderStage) {
        use wgpu::naga::front::glsl::{Frontend, Options};
        use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};

        let module = Frontend::default()
            .parse(&Options::from(stage), source)
            .unwrap_or_else(|err| panic!("{stage:?} shader failed to parse: {err:?}"));
        Validator::new(ValidationFlags::all(), Capabilities::default())
            .validate(&module)
            .unwrap_or_else(|err| panic!("{stage:?} shader failed validation: {err:?}"));
    }

    #[test]
    fn wrapped_bulb_shader_passes_naga_validation() {
        validate(&wrap_fragment(BULB_FRAGMENT), ShaderStage::Fragment);
    }

    #[test]
    fn vertex_shader_passes_naga_validation() {
        validate(VERTEX_SHADER_GLSL, ShaderStage::Vertex);
    }

    /// Values of the `const` declarations at the top of the shader body.
    fn shader_constants() -> Vec<(&'static str, f32)> {
        BULB_FRAGMENT
            .lines()
            .filter_map(|line| line.trim().strip_prefix("const "))
            .filter_map(|decl| {
                let (_ty, rest) = decl.split_once(' ')?;
                let (name, value) = rest.split_once(" = ")?;
                let value = value.trim_end_matches(';').parse().ok()?;
                Some((name, value))
            })
            .collect()
    }

    #[test]
    fn shader_constants_match_cpu_reference() {
        use raymarch::camera::{CAMERA_DISTANCE, IDLE_DISTANCE_FACTOR};
        use raymarch::estimator::{ESCAPE_RADIUS, ITERATIONS, MIN_RADIUS};
        use raymarch::march::{CONVERGENCE_SIGNAL, MARCH_STEPS, STEP_SCALE};

        let expected = [
            ("MARCH_STEPS", MARCH_STEPS as f32),
            ("STEP_SCALE", STEP_SCALE),
            ("CONVERGENCE_SIGNAL", CONVERGENCE_SIGNAL),
            ("CAMERA_DISTANCE", CAMERA_DISTANCE),
            ("IDLE_DISTANCE_FACTOR", IDLE_DISTANCE_FACTOR),
            ("BULB_ITERATIONS", ITERATIONS as f32),
            ("ESCAPE_RADIUS", ESCAPE_RADIUS),
            ("MIN_RADIUS", MIN_RADIUS),
        ];
        let constants = shader_constants();
        assert_eq!(constants.len(), expected.len(), "{constants:?}");
        for (name, value) in expected {
            let found = constants.iter().find(|(shader_name, _)| *shader_name == name);
            assert_eq!(found.map(|(_, v)| *v), Some(value), "{name}");
        }
    }

    #[test]
    fn shader_literals_match_cpu_reference() {
        use raymarch::camera::{BASE_ANGLE, POINTER_TURN, TIME_TO_ANGLE};
        use raymarch::estimator::{SIGNAL_SCALE, SIGNAL_SPREAD};
        use raymarch::palette::{CosinePalette, TWO_PI};
        use raymarch::shade::FOG_DENSITY;

        let palette = CosinePalette::BULB;
        let expressions = [
            format!("{TWO_PI:?} * (c * t + d)"),
            format!(
                "vec3({:?}), vec3({:?}), vec3({:?}), vec3({:?}, {:?}, {:?})",
                palette.offset.x,
                palette.amplitude.x,
                palette.frequency.x,
                palette.phase.x,
                palette.phase.y,
                palette.phase.z
            ),
            format!("{SIGNAL_SCALE:?} * pow(dr, {SIGNAL_SPREAD:?} / float(MARCH_STEPS))"),
            format!("{BASE_ANGLE:?} + iTime / {TIME_TO_ANGLE:?} + {POINTER_TURN:?} * iMouse.x"),
            format!("depth.x * depth.x * {FOG_DENSITY:?}"),
        ];
        for expression in expressions {
            assert!(BULB_FRAGMENT.contains(&expression), "missing `{expression}`");
        }
    }

    #[test]
    fn bulb_shader_uses_all_frame_uniforms() {
        for name in ["iResolution", "iTime", "iMouse"] {
            assert!(BULB_FRAGMENT.contains(name), "{name} unused");
        }
    }
}
