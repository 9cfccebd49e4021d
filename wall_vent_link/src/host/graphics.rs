/// Graphics-side host types.
///
/// The host renderer owns every graphics resource. This crate only holds
/// handles; anything it asks the host to create (material clones, solid
/// materials, the trapezoid mesh) must be released through the same host.

use glam::Mat4;
use slotmap::new_key_type;

new_key_type! {
    /// Handle to a host material (render surface)
    pub struct MaterialHandle;

    /// Handle to a host mesh
    pub struct MeshHandle;
}

/// Draw-order tier of a material (host render queue)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderTier(pub i32);

impl RenderTier {
    pub const VENT: RenderTier = RenderTier(2450);
    pub const TRAPEZOID: RenderTier = RenderTier(2460);
    pub const OUTLINE: RenderTier = RenderTier(2470);
}

/// Linear RGBA color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Bit pattern, for use as part of a hash key
    pub fn to_bits(self) -> [u32; 4] {
        [self.r.to_bits(), self.g.to_bits(), self.b.to_bits(), self.a.to_bits()]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Shader family requested for atlas materials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Cutout,
}

/// One immediate-mode draw request. Valid for the current frame only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub mesh: MeshHandle,
    pub transform: Mat4,
    pub material: MaterialHandle,
    pub submesh: u32,
}
