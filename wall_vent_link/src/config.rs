/// Overlay configuration.
///
/// Every offset, draw tier, and atlas path the overlay uses. `Default`
/// reproduces the stock look; hosts with a different altitude scale or
/// atlas layout override individual fields.

use glam::Vec3;
use crate::host::{Color, RenderTier};

/// Atlas paths used to texture trapezoid connectors
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasPaths {
    /// Smoothed natural stone
    pub rock_smooth: String,
    /// Stuff names containing "blocks" or "brick"
    pub bricks: String,
    /// Stuff names containing "plank" or "wood"
    pub planks: String,
    /// Any other stuff
    pub smooth: String,
}

impl Default for AtlasPaths {
    fn default() -> Self {
        Self {
            rock_smooth: "Things/Building/Linked/RockSmooth_Atlas".to_string(),
            bricks: "Things/Building/Linked/Wall/Wall_Atlas_Bricks".to_string(),
            planks: "Things/Building/Linked/Wall/Wall_Atlas_Planks".to_string(),
            smooth: "Things/Building/Linked/Wall/Wall_Atlas_Smooth".to_string(),
        }
    }
}

/// Overlay configuration descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    /// Height of the first vent in a column above the building layer
    pub vent_base_y_offset: f32,
    /// Extra height per vent further north in the same column
    pub vent_y_increment: f32,
    /// Northward shift of vent overlays
    pub vent_north_offset: f32,
    /// Scale of the vent overlay quad (x, y, z)
    pub vent_scale: Vec3,

    /// Height of trapezoids above the building layer
    pub trapezoid_y_offset: f32,
    /// Extra height of outlines above their trapezoid
    pub outline_y_increment: f32,
    /// Outline edge thickness
    pub outline_thickness: f32,
    /// Added to each edge's azimuth, degrees
    pub outline_rotation_offset_degrees: f32,
    /// Shorter outline edges are skipped
    pub min_edge_length: f32,
    pub outline_color: Color,

    pub vent_tier: RenderTier,
    pub trapezoid_tier: RenderTier,
    pub outline_tier: RenderTier,

    pub atlas: AtlasPaths,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            vent_base_y_offset: 0.02,
            vent_y_increment: 0.001,
            vent_north_offset: 0.125,
            vent_scale: Vec3::new(1.0, 1.0, 1.25),

            trapezoid_y_offset: 0.03,
            outline_y_increment: 0.0015,
            outline_thickness: 3.0 / 64.0,
            outline_rotation_offset_degrees: 90.0,
            min_edge_length: 1e-4,
            outline_color: Color::BLACK,

            vent_tier: RenderTier::VENT,
            trapezoid_tier: RenderTier::TRAPEZOID,
            outline_tier: RenderTier::OUTLINE,

            atlas: AtlasPaths::default(),
        }
    }
}

impl LinkConfig {
    /// Vertical offset of the vent at `index` within its column
    pub fn vent_y_offset(&self, index: usize) -> f32 {
        self.vent_base_y_offset + index as f32 * self.vent_y_increment
    }
}
