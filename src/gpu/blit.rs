//! Letterboxed blit of the canvas texture onto the surface.

use crate::input::Viewport;
use bytemuck::{Pod, Zeroable};

/// Draws the canvas texture as a 4-vertex triangle strip covering `rect`.
pub const BLIT_SHADER: &str = r#"
struct Blit {
    // left, bottom, right, top in clip space
    rect: vec4<f32>,
};

@group(0) @binding(0) var<uniform> blit: Blit;
@group(0) @binding(1) var canvas_texture: texture_2d<f32>;
@group(0) @binding(2) var canvas_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    let uv = vec2<f32>(f32(index & 1u), f32(index >> 1u));
    let x = mix(blit.rect.x, blit.rect.z, uv.x);
    let y = mix(blit.rect.w, blit.rect.y, uv.y);

    var out: VertexOutput;
    out.position = vec4<f32>(x, y, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(canvas_texture, canvas_sampler, in.uv);
}
"#;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct BlitUniforms {
    rect: [f32; 4],
}

impl BlitUniforms {
    /// Clip-space rectangle the canvas occupies inside the window.
    pub(crate) fn for_viewport(viewport: &Viewport) -> Self {
        let (w, h) = viewport.window;
        if w == 0 || h == 0 {
            return Self {
                rect: [-1.0, -1.0, 1.0, 1.0],
            };
        }
        let (scale, offset) = viewport.fit();
        let size = glam::Vec2::new(viewport.canvas.0 as f32, viewport.canvas.1 as f32) * scale;
        let window = glam::Vec2::new(w as f32, h as f32);

        let min = offset / window * 2.0 - 1.0;
        let max = (offset + size) / window * 2.0 - 1.0;
        // Window y grows down, clip y grows up.
        Self {
            rect: [min.x, -max.y, max.x, -min.y],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::validate_wgsl;

    #[test]
    fn test_blit_shader_is_valid() {
        validate_wgsl(BLIT_SHADER).expect("Blit WGSL should be valid");
    }

    #[test]
    fn test_full_window_rect() {
        let uniforms = BlitUniforms::for_viewport(&Viewport::new((800, 600), (800, 600)));
        assert_eq!(uniforms.rect, [-1.0, -1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_pillarbox_rect() {
        let uniforms = BlitUniforms::for_viewport(&Viewport::new((1600, 600), (800, 600)));
        assert_eq!(uniforms.rect, [-0.5, -1.0, 0.5, 1.0]);
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<BlitUniforms>(), 16);
    }
}
