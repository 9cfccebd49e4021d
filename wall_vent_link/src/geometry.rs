//! Procedural geometry.
//!
//! Builds the tapered connector quad (trapezoid) drawn where a wall meets a
//! vent or a dissimilar wall, and computes the transforms of the thin edge
//! quads that outline it.
//!
//! # Trapezoid layout (top view, local space)
//!
//! ```text
//!        2 ---------- 3        north edge, width 0.55   (z = +0.1125)
//!       /              \
//!      0 -------------- 1      south edge, width 1.0    (z = -0.1125)
//! ```
//!
//! Triangles: {0, 2, 1} and {2, 3, 1}.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec2, Vec3};

// ===== TRAPEZOID CONSTANTS =====

/// Width of the south (wall-side) edge
pub const TRAPEZOID_SOUTH_WIDTH: f32 = 1.0;
/// Width of the north (neighbor-side) edge
pub const TRAPEZOID_NORTH_WIDTH: f32 = 0.55;
/// North-south extent
pub const TRAPEZOID_DEPTH: f32 = 0.225;

/// Atlas tile size in UV space
const ATLAS_TILE_SIZE: f32 = 0.25;
/// Atlas dimension in pixels
const ATLAS_PIXELS: f32 = 320.0;
/// Inset against texel bleed, in pixels
const ATLAS_MARGIN_PIXELS: f32 = 10.0;
/// Atlas tile used for the connector
const ATLAS_TILE_COLUMN: u32 = 1;
const ATLAS_TILE_ROW: u32 = 1;
/// V extent of the connector inside its tile
const ATLAS_V_SPAN: f32 = 0.0421875;

/// Triangle list of the trapezoid
pub const TRAPEZOID_INDICES: [u32; 6] = [0, 2, 1, 2, 3, 1];

// ===== MESH DATA =====

/// Interleaved vertex as uploaded to the host
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Axis-aligned bounding box in local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Tight bounds of a point set. `None` for an empty set.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// CPU-side indexed triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
    bounds: Bounds,
}

impl MeshData {
    /// Build a mesh from positions, uvs and a triangle list.
    ///
    /// Normals are accumulated per face and normalized per vertex; bounds
    /// are recomputed from the positions. Returns `None` if the attribute
    /// counts disagree, the index count is not a multiple of three, or an
    /// index is out of range.
    pub fn from_triangles(positions: &[Vec3], uvs: &[Vec2], indices: &[u32]) -> Option<Self> {
        if positions.is_empty() || positions.len() != uvs.len() || indices.len() % 3 != 0 {
            return None;
        }
        if indices.iter().any(|&i| i as usize >= positions.len()) {
            return None;
        }

        let normals = recalculate_normals(positions, indices);
        let bounds = Bounds::from_points(positions.iter().copied())?;

        let vertices = positions
            .iter()
            .zip(uvs)
            .zip(&normals)
            .map(|((p, uv), n)| MeshVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: uv.to_array(),
            })
            .collect();

        Some(Self {
            vertices,
            indices: indices.to_vec(),
            bounds,
        })
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position of vertex `i`
    pub fn position(&self, i: usize) -> Option<Vec3> {
        self.vertices.get(i).map(|v| Vec3::from_array(v.position))
    }

    /// Texture coordinate of vertex `i`
    pub fn uv(&self, i: usize) -> Option<Vec2> {
        self.vertices.get(i).map(|v| Vec2::from_array(v.uv))
    }

    /// Vertex buffer contents, tightly packed
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer contents (u32)
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Area-weighted vertex normals of a triangle list.
///
/// Face normal of (a, b, c) is `(b - a) x (c - a)`. Vertices not referenced
/// by any triangle get +Y.
pub fn recalculate_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

// ===== TRAPEZOID =====

/// The four corners of the trapezoid in local space (0..4 vertex order)
pub fn trapezoid_corners() -> [Vec3; 4] {
    let half_depth = TRAPEZOID_DEPTH * 0.5;
    [
        Vec3::new(-TRAPEZOID_SOUTH_WIDTH * 0.5, 0.0, -half_depth),
        Vec3::new(TRAPEZOID_SOUTH_WIDTH * 0.5, 0.0, -half_depth),
        Vec3::new(-TRAPEZOID_NORTH_WIDTH * 0.5, 0.0, half_depth),
        Vec3::new(TRAPEZOID_NORTH_WIDTH * 0.5, 0.0, half_depth),
    ]
}

/// Texture coordinates of the four corners.
///
/// The south edge spans the inset tile (column 1, row 1). The north edge
/// span is the south span scaled by the width ratio, centered on it, so the
/// texture tapers with the geometry.
pub fn trapezoid_uvs() -> [Vec2; 4] {
    let margin = ATLAS_MARGIN_PIXELS / ATLAS_PIXELS;

    let u_start = ATLAS_TILE_COLUMN as f32 * ATLAS_TILE_SIZE + margin;
    let u_end = (ATLAS_TILE_COLUMN + 1) as f32 * ATLAS_TILE_SIZE - margin;
    let south_uv_width = u_end - u_start;
    let north_uv_width = south_uv_width * TRAPEZOID_NORTH_WIDTH / TRAPEZOID_SOUTH_WIDTH;
    let u_north_start = u_start + (south_uv_width - north_uv_width) * 0.5;
    let u_north_end = u_north_start + north_uv_width;

    let v_start = ATLAS_TILE_ROW as f32 * ATLAS_TILE_SIZE + margin;
    let v_end = v_start + ATLAS_V_SPAN;

    [
        Vec2::new(u_start, v_start),
        Vec2::new(u_end, v_start),
        Vec2::new(u_north_start, v_end),
        Vec2::new(u_north_end, v_end),
    ]
}

/// Build the trapezoid connector mesh
pub fn trapezoid_mesh() -> Option<MeshData> {
    MeshData::from_triangles(&trapezoid_corners(), &trapezoid_uvs(), &TRAPEZOID_INDICES)
}

// ===== EDGE QUADS =====

/// Parameters shared by every outline edge quad
#[derive(Debug, Clone, Copy)]
pub struct EdgeQuadParams {
    /// Quad thickness (world units)
    pub thickness: f32,
    /// Added to the edge azimuth, degrees
    pub rotation_offset_degrees: f32,
    /// Edges shorter than this produce no quad
    pub min_length: f32,
}

/// Transform of a thin quad lying along the edge `a -> b`.
///
/// `a_local` and `b_local` are offsets from `center`. The quad is centered
/// on the edge midpoint, pushed half a thickness along the inward
/// perpendicular (the edge direction rotated 90 degrees about +Y, negated
/// when `invert_inward`), rotated to the edge azimuth plus the offset, and
/// scaled to (length, 1, thickness). Returns `None` for degenerate edges.
pub fn edge_quad_transform(
    a_local: Vec3,
    b_local: Vec3,
    center: Vec3,
    invert_inward: bool,
    params: &EdgeQuadParams,
) -> Option<Mat4> {
    let a_world = center + a_local;
    let b_world = center + b_local;
    let mut mid_point = (a_world + b_world) * 0.5;

    let mut edge_dir = b_world - a_world;
    edge_dir.y = 0.0;
    let edge_length = edge_dir.length();
    if edge_length < params.min_length {
        return None;
    }

    let dir = edge_dir / edge_length;
    let mut inward = Vec3::new(-dir.z, 0.0, dir.x);
    if invert_inward {
        inward = -inward;
    }
    mid_point += inward * (params.thickness * 0.5);

    let angle = edge_dir.x.atan2(edge_dir.z).to_degrees() + params.rotation_offset_degrees;
    let rotation = Quat::from_rotation_y(angle.to_radians());
    let scale = Vec3::new(edge_length, 1.0, params.thickness);

    Some(Mat4::from_scale_rotation_translation(scale, rotation, mid_point))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
