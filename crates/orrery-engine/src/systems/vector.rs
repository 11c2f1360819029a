//! Orbit-guide geometry.
//!
//! Orbit paths lie in the XZ plane, so they are tessellated in 2D with Lyon
//! (x → x, z → y) and lifted back to 3D. The result is a flat triangle list
//! built once when the scene is composed.
//!
//! Without the `vectors` feature the guides are emitted as a line list
//! (two vertices per segment) and the host draws them as hairlines.

use bytemuck::{Pod, Zeroable};
use glam::DVec3;

use crate::core::orbit::OrbitPath;

/// Per-vertex data for orbit guides.
/// 7 floats = 28 bytes per vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GuideVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl GuideVertex {
    /// Number of floats per vertex.
    pub const FLOATS: usize = 7;
    /// Stride in bytes.
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4; // 28
}

/// RGBA color for guide strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl GuideColor {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Faint white, the default guide look.
    pub const GUIDE: Self = Self::WHITE.with_alpha(0.25);
}

impl Default for GuideColor {
    fn default() -> Self {
        Self::GUIDE
    }
}

fn vertex(x: f32, z: f32, color: GuideColor) -> GuideVertex {
    GuideVertex {
        x,
        y: 0.0,
        z,
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

/// Builds the guide vertex buffer for a set of orbit paths.
pub struct GuideMesh {
    #[cfg(feature = "vectors")]
    stroke_tess: lyon::tessellation::StrokeTessellator,
    buffer: Vec<GuideVertex>,
}

impl GuideMesh {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "vectors")]
            stroke_tess: lyon::tessellation::StrokeTessellator::new(),
            buffer: Vec::new(),
        }
    }

    /// Append the guide for one closed path.
    pub fn add_path(&mut self, path: &OrbitPath, width: f32, color: GuideColor) {
        if path.points().len() < 3 {
            return;
        }
        self.stroke_closed(path.points(), width, color);
    }

    #[cfg(feature = "vectors")]
    fn stroke_closed(&mut self, points: &[DVec3], width: f32, color: GuideColor) {
        use lyon::math::point;
        use lyon::path::Path;
        use lyon::tessellation::{
            BuffersBuilder, StrokeOptions, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
        };

        struct Ctor {
            color: GuideColor,
        }

        impl StrokeVertexConstructor<GuideVertex> for Ctor {
            fn new_vertex(&mut self, v: StrokeVertex) -> GuideVertex {
                vertex(v.position().x, v.position().y, self.color)
            }
        }

        let mut builder = Path::builder();
        builder.begin(point(points[0].x as f32, points[0].z as f32));
        for p in &points[1..] {
            builder.line_to(point(p.x as f32, p.z as f32));
        }
        builder.close();
        let path = builder.build();

        let mut geometry: VertexBuffers<GuideVertex, u32> = VertexBuffers::new();
        let result = self.stroke_tess.tessellate_path(
            &path,
            &StrokeOptions::tolerance(0.05).with_line_width(width),
            &mut BuffersBuilder::new(&mut geometry, Ctor { color }),
        );

        match result {
            Ok(()) => self
                .buffer
                .extend(geometry.indices.iter().map(|&i| geometry.vertices[i as usize])),
            Err(e) => log::warn!("orbit guide tessellation failed: {e:?}"),
        }
    }

    #[cfg(not(feature = "vectors"))]
    fn stroke_closed(&mut self, points: &[DVec3], _width: f32, color: GuideColor) {
        let next = points.iter().cycle().skip(1);
        for (a, b) in points.iter().zip(next) {
            self.buffer.push(vertex(a.x as f32, a.z as f32, color));
            self.buffer.push(vertex(b.x as f32, b.z as f32, color));
        }
    }

    /// Append every vertex of `other`.
    pub fn append(&mut self, other: &GuideMesh) {
        self.buffer.extend_from_slice(&other.buffer);
    }

    pub fn vertex_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn vertices(&self) -> &[GuideVertex] {
        &self.buffer
    }

    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.buffer)
    }
}

impl Default for GuideMesh {
    fn default() -> Self {
        Self::new()
    }
}
