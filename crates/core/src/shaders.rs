//! Built-in shader library for the offscreen harness.
//!
//! The backend context is constructed from a fixed set of named shader
//! payloads. The built-in set carries the GLSL ES 1.00 sources the harness
//! itself uses: a pass-through blit pair and a solid-fill fragment stage.

/// A named shader payload.
///
/// Payloads are opaque to the core; the backend that consumes them decides
/// whether they are source text or precompiled bytecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderBlob {
    pub name: &'static str,
    pub data: &'static [u8],
}

impl ShaderBlob {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

/// GLSL ES 1.00 vertex shader that forwards clip-space positions and
/// derives UVs, for blitting a texture across the surface.
pub const BLIT_VERTEX_SHADER: &str = r#"#version 100
attribute vec2 a_position;
varying vec2 v_uv;
void main() {
    v_uv = a_position * 0.5 + 0.5;
    gl_Position = vec4(a_position, 0.0, 1.0);
}
"#;

/// GLSL ES 1.00 fragment shader sampling the blit source texture.
pub const BLIT_FRAGMENT_SHADER: &str = r#"#version 100
precision mediump float;
varying vec2 v_uv;
uniform sampler2D u_source;
void main() {
    gl_FragColor = texture2D(u_source, v_uv);
}
"#;

/// GLSL ES 1.00 fragment shader writing a uniform solid color.
pub const FILL_FRAGMENT_SHADER: &str = r#"#version 100
precision mediump float;
uniform vec4 u_color;
void main() {
    gl_FragColor = u_color;
}
"#;

/// The fixed shader library the factory hands to the backend context.
pub fn builtin_shader_blobs() -> Vec<ShaderBlob> {
    vec![
        ShaderBlob {
            name: "blit_vertex",
            data: BLIT_VERTEX_SHADER.as_bytes(),
        },
        ShaderBlob {
            name: "blit_fragment",
            data: BLIT_FRAGMENT_SHADER.as_bytes(),
        },
        ShaderBlob {
            name: "fill_fragment",
            data: FILL_FRAGMENT_SHADER.as_bytes(),
        },
    ]
}
