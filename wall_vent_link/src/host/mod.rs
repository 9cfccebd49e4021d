//! Host collaborator interface
//!
//! The simulation that embeds this crate is a black box. It answers
//! spatial and metadata queries through `MapView`, creates and draws
//! graphics resources through `GraphicsHost`, and drives the overlay by
//! delivering lifecycle and render-tick notifications to a `HostListener`.

pub mod entity;
pub mod graphics;
pub mod mock;

pub use entity::{
    EntityId, MapId, Cell, Rot4,
    Category, LinkFlags, EntityDef,
    EntityKind, GraphicRep, EntityDesc,
};
pub use graphics::{
    MaterialHandle, MeshHandle, RenderTier, Color, ShaderKind, DrawCall,
};

use crate::error::Result;
use crate::geometry::MeshData;

/// Read-only view of one host map
pub trait MapView {
    /// Identifier of this map
    fn id(&self) -> MapId;

    /// Whether this map is the one currently shown to the player
    fn is_current(&self) -> bool;

    /// Resolve a handle to a spawned entity on this map
    fn entity(&self, id: EntityId) -> Option<&EntityDesc>;

    /// Every entity spawned on this map (order unspecified)
    fn all_entities(&self) -> Box<dyn Iterator<Item = &EntityDesc> + '_>;

    /// Entities occupying a grid cell, in the host's own order
    fn entities_at(&self, cell: Cell) -> Box<dyn Iterator<Item = &EntityDesc> + '_>;

    /// Whether the cell lies inside the map
    fn in_bounds(&self, cell: Cell) -> bool;

    /// World-space height of the building draw layer
    fn building_altitude(&self) -> f32;
}

/// Resource factory and immediate-mode renderer of the host
pub trait GraphicsHost {
    /// Clone `source` into a new material drawn at `tier`. The clone is
    /// owned by the caller and must be released with `destroy_material`.
    fn clone_material(&mut self, source: MaterialHandle, tier: RenderTier) -> Result<MaterialHandle>;

    /// Create a new solid-color material drawn at `tier` (caller-owned)
    fn create_solid_material(&mut self, color: Color, tier: RenderTier) -> Result<MaterialHandle>;

    /// Pooled material for a texture atlas path. Pool-owned: never destroy it.
    fn atlas_material(&mut self, path: &str, shader: ShaderKind, tint: Color) -> Option<MaterialHandle>;

    /// Designated "bad/missing" material. Host-owned.
    fn bad_material(&self) -> MaterialHandle;

    /// Release a caller-owned material
    fn destroy_material(&mut self, material: MaterialHandle);

    /// Upload procedural geometry (caller-owned)
    fn upload_mesh(&mut self, data: &MeshData) -> Result<MeshHandle>;

    /// Release a caller-owned mesh
    fn destroy_mesh(&mut self, mesh: MeshHandle);

    /// Host-owned 1x1 quad on the XZ plane, centered on the origin
    fn unit_plane(&self) -> MeshHandle;

    /// Draw for the current frame only
    fn draw_mesh(&mut self, call: &DrawCall) -> Result<()>;
}

/// Notifications the host delivers to the overlay.
///
/// All calls happen on the host's render/update thread, in call order.
pub trait HostListener {
    /// A map finished loading
    fn on_map_finalized(&mut self, map: &dyn MapView);

    /// An entity was spawned on `map`
    fn on_entity_spawned(&mut self, map: &dyn MapView, entity: EntityId);

    /// An entity is about to be despawned from `map`
    fn on_entity_despawning(&mut self, map: &dyn MapView, entity: EntityId);

    /// An entity is about to be destroyed on `map`
    fn on_entity_destroying(&mut self, map: &dyn MapView, entity: EntityId);

    /// Once per rendered frame, with every loaded map
    fn on_render_tick(&mut self, maps: &[&dyn MapView], graphics: &mut dyn GraphicsHost);

    /// A map is being unloaded
    fn on_map_removed(&mut self, map: MapId, graphics: &mut dyn GraphicsHost);
}
