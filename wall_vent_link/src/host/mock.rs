/// In-memory host for tests and tooling (no game or GPU required)
///
/// `MockMap` stores entity snapshots in a `SlotMap` with a per-cell index.
/// `MockGraphics` tracks every material and mesh it hands out, records
/// draw calls, and can be told to fail specific operations.

use std::cell::Cell as CallCounter;
use std::sync::Arc;
use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use crate::error::{Error, Result};
use crate::geometry::MeshData;
use crate::wvl_bail;
use super::{
    MapView, GraphicsHost,
    EntityId, MapId, Cell, Rot4, EntityDef, EntityKind, GraphicRep, EntityDesc,
    MaterialHandle, MeshHandle, RenderTier, Color, ShaderKind, DrawCall,
};

// ============================================================================
// Mock Map
// ============================================================================

/// Spawn request for `MockMap::spawn`
#[derive(Debug, Clone)]
pub struct Spawn {
    pub def: Arc<EntityDef>,
    pub kind: EntityKind,
    pub stuff: Option<String>,
    pub cell: Cell,
    pub rotation: Rot4,
    pub draw_color: Color,
    pub graphic: GraphicRep,
}

impl Spawn {
    /// A finished building at `cell`, facing north, white, no graphic
    pub fn new(def: &Arc<EntityDef>, cell: Cell) -> Self {
        Self {
            def: Arc::clone(def),
            kind: EntityKind::Building,
            stuff: None,
            cell,
            rotation: Rot4::North,
            draw_color: Color::WHITE,
            graphic: GraphicRep::None,
        }
    }

    pub fn stuff(mut self, stuff: &str) -> Self {
        self.stuff = Some(stuff.to_string());
        self
    }

    pub fn kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn rotation(mut self, rotation: Rot4) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.draw_color = color;
        self
    }

    pub fn graphic(mut self, graphic: GraphicRep) -> Self {
        self.graphic = graphic;
        self
    }
}

/// In-memory map
pub struct MockMap {
    id: MapId,
    current: bool,
    width: i32,
    height: i32,
    building_altitude: f32,
    entities: SlotMap<EntityId, EntityDesc>,
    grid: FxHashMap<Cell, Vec<EntityId>>,
    full_scans: CallCounter<usize>,
}

impl MockMap {
    /// Create an empty, current map of `width` x `height` cells
    pub fn new(id: MapId, width: i32, height: i32) -> Self {
        Self {
            id,
            current: true,
            width,
            height,
            building_altitude: 0.0,
            entities: SlotMap::with_key(),
            grid: FxHashMap::default(),
            full_scans: CallCounter::new(0),
        }
    }

    pub fn set_current(&mut self, current: bool) {
        self.current = current;
    }

    pub fn set_building_altitude(&mut self, altitude: f32) {
        self.building_altitude = altitude;
    }

    /// Spawn an entity and return its handle
    pub fn spawn(&mut self, spawn: Spawn) -> EntityId {
        let map = self.id;
        let id = self.entities.insert_with_key(|id| EntityDesc {
            id,
            map,
            kind: spawn.kind,
            def: spawn.def,
            stuff: spawn.stuff,
            cell: spawn.cell,
            rotation: spawn.rotation,
            true_center: spawn.cell.center(),
            draw_color: spawn.draw_color,
            graphic: spawn.graphic,
        });
        self.grid.entry(spawn.cell).or_default().push(id);
        id
    }

    /// Remove an entity. Its handle becomes stale.
    pub fn despawn(&mut self, id: EntityId) -> Option<EntityDesc> {
        let desc = self.entities.remove(id)?;
        if let Some(ids) = self.grid.get_mut(&desc.cell) {
            ids.retain(|&other| other != id);
        }
        Some(desc)
    }

    /// Swap the type metadata of a spawned entity in place
    pub fn replace_def(&mut self, id: EntityId, def: &Arc<EntityDef>) -> bool {
        match self.entities.get_mut(id) {
            Some(desc) => {
                desc.def = Arc::clone(def);
                true
            }
            None => false,
        }
    }

    /// Number of `all_entities` calls so far
    pub fn full_scan_count(&self) -> usize {
        self.full_scans.get()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

impl MapView for MockMap {
    fn id(&self) -> MapId {
        self.id
    }

    fn is_current(&self) -> bool {
        self.current
    }

    fn entity(&self, id: EntityId) -> Option<&EntityDesc> {
        self.entities.get(id)
    }

    fn all_entities(&self) -> Box<dyn Iterator<Item = &EntityDesc> + '_> {
        self.full_scans.set(self.full_scans.get() + 1);
        Box::new(self.entities.values())
    }

    fn entities_at(&self, cell: Cell) -> Box<dyn Iterator<Item = &EntityDesc> + '_> {
        match self.grid.get(&cell) {
            Some(ids) => Box::new(ids.iter().filter_map(|&id| self.entities.get(id))),
            None => Box::new(std::iter::empty()),
        }
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.z >= 0 && cell.x < self.width && cell.z < self.height
    }

    fn building_altitude(&self) -> f32 {
        self.building_altitude
    }
}

// ============================================================================
// Mock Graphics
// ============================================================================

/// Where a mock material came from
#[derive(Debug, Clone, PartialEq)]
pub enum MockMaterialOrigin {
    /// The designated bad/missing material
    Bad,
    /// A surface the host already had (entity graphics)
    Host(String),
    /// Pooled atlas material
    Atlas { path: String, shader: ShaderKind, tint: Color },
    /// Caller-owned clone
    Clone { source: MaterialHandle },
    /// Caller-owned solid color
    Solid { color: Color },
}

/// A material known to the mock
#[derive(Debug, Clone)]
pub struct MockMaterial {
    pub origin: MockMaterialOrigin,
    pub tier: Option<RenderTier>,
}

impl MockMaterial {
    /// Created for (and owned by) the caller
    pub fn is_caller_owned(&self) -> bool {
        matches!(self.origin, MockMaterialOrigin::Clone { .. } | MockMaterialOrigin::Solid { .. })
    }
}

/// A mesh known to the mock
#[derive(Debug, Clone)]
pub struct MockMesh {
    pub vertex_count: usize,
    pub index_count: usize,
    /// Uploaded by the caller (as opposed to the host's unit plane)
    pub procedural: bool,
}

/// Recording graphics host
pub struct MockGraphics {
    materials: SlotMap<MaterialHandle, MockMaterial>,
    meshes: SlotMap<MeshHandle, MockMesh>,
    atlas_pool: FxHashMap<(String, ShaderKind, [u32; 4]), MaterialHandle>,
    missing_atlases: FxHashSet<String>,
    bad_material: MaterialHandle,
    unit_plane: MeshHandle,
    draws: Vec<DrawCall>,
    fail_clones: bool,
    fail_draws: bool,
    fail_uploads: bool,
    clone_count: usize,
    upload_count: usize,
    rejected_destroys: usize,
}

impl MockGraphics {
    pub fn new() -> Self {
        let mut materials = SlotMap::with_key();
        let bad_material = materials.insert(MockMaterial {
            origin: MockMaterialOrigin::Bad,
            tier: None,
        });
        let mut meshes = SlotMap::with_key();
        let unit_plane = meshes.insert(MockMesh {
            vertex_count: 4,
            index_count: 6,
            procedural: false,
        });

        Self {
            materials,
            meshes,
            atlas_pool: FxHashMap::default(),
            missing_atlases: FxHashSet::default(),
            bad_material,
            unit_plane,
            draws: Vec::new(),
            fail_clones: false,
            fail_draws: false,
            fail_uploads: false,
            clone_count: 0,
            upload_count: 0,
            rejected_destroys: 0,
        }
    }

    /// Register a host-owned surface (as an entity graphic would hold)
    pub fn host_material(&mut self, name: &str) -> MaterialHandle {
        self.materials.insert(MockMaterial {
            origin: MockMaterialOrigin::Host(name.to_string()),
            tier: None,
        })
    }

    /// Make `atlas_material` return `None` for this path
    pub fn mark_atlas_missing(&mut self, path: &str) {
        self.missing_atlases.insert(path.to_string());
    }

    pub fn set_fail_clones(&mut self, fail: bool) {
        self.fail_clones = fail;
    }

    pub fn set_fail_draws(&mut self, fail: bool) {
        self.fail_draws = fail;
    }

    pub fn set_fail_uploads(&mut self, fail: bool) {
        self.fail_uploads = fail;
    }

    /// Draw calls recorded since the last `take_draws`
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Drain the recorded draw calls
    pub fn take_draws(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.draws)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&MockMaterial> {
        self.materials.get(handle)
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&MockMesh> {
        self.meshes.get(handle)
    }

    /// Live caller-owned materials (clones and solids)
    pub fn owned_material_count(&self) -> usize {
        self.materials.values().filter(|m| m.is_caller_owned()).count()
    }

    /// Live caller-owned meshes
    pub fn procedural_mesh_count(&self) -> usize {
        self.meshes.values().filter(|m| m.procedural).count()
    }

    pub fn clone_count(&self) -> usize {
        self.clone_count
    }

    pub fn upload_count(&self) -> usize {
        self.upload_count
    }

    /// Destroy requests for unknown or host-owned resources
    pub fn rejected_destroys(&self) -> usize {
        self.rejected_destroys
    }
}

impl Default for MockGraphics {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsHost for MockGraphics {
    fn clone_material(&mut self, source: MaterialHandle, tier: RenderTier) -> Result<MaterialHandle> {
        if self.fail_clones {
            wvl_bail!("wvl::MockGraphics", "Material clone rejected");
        }
        if !self.materials.contains_key(source) {
            return Err(Error::InvalidResource(format!("Cannot clone unknown material {:?}", source)));
        }
        self.clone_count += 1;
        Ok(self.materials.insert(MockMaterial {
            origin: MockMaterialOrigin::Clone { source },
            tier: Some(tier),
        }))
    }

    fn create_solid_material(&mut self, color: Color, tier: RenderTier) -> Result<MaterialHandle> {
        if self.fail_clones {
            wvl_bail!("wvl::MockGraphics", "Solid material creation rejected");
        }
        Ok(self.materials.insert(MockMaterial {
            origin: MockMaterialOrigin::Solid { color },
            tier: Some(tier),
        }))
    }

    fn atlas_material(&mut self, path: &str, shader: ShaderKind, tint: Color) -> Option<MaterialHandle> {
        if self.missing_atlases.contains(path) {
            return None;
        }
        let key = (path.to_string(), shader, tint.to_bits());
        if let Some(&handle) = self.atlas_pool.get(&key) {
            return Some(handle);
        }
        let handle = self.materials.insert(MockMaterial {
            origin: MockMaterialOrigin::Atlas { path: path.to_string(), shader, tint },
            tier: None,
        });
        self.atlas_pool.insert(key, handle);
        Some(handle)
    }

    fn bad_material(&self) -> MaterialHandle {
        self.bad_material
    }

    fn destroy_material(&mut self, material: MaterialHandle) {
        let owned = self.materials.get(material).is_some_and(MockMaterial::is_caller_owned);
        if owned {
            self.materials.remove(material);
        } else {
            self.rejected_destroys += 1;
        }
    }

    fn upload_mesh(&mut self, data: &MeshData) -> Result<MeshHandle> {
        if self.fail_uploads {
            wvl_bail!("wvl::MockGraphics", "Mesh upload rejected");
        }
        self.upload_count += 1;
        Ok(self.meshes.insert(MockMesh {
            vertex_count: data.vertex_count(),
            index_count: data.indices().len(),
            procedural: true,
        }))
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) {
        let owned = self.meshes.get(mesh).is_some_and(|m| m.procedural);
        if owned {
            self.meshes.remove(mesh);
        } else {
            self.rejected_destroys += 1;
        }
    }

    fn unit_plane(&self) -> MeshHandle {
        self.unit_plane
    }

    fn draw_mesh(&mut self, call: &DrawCall) -> Result<()> {
        if self.fail_draws {
            wvl_bail!("wvl::MockGraphics", "Draw submission rejected");
        }
        if !self.meshes.contains_key(call.mesh) {
            return Err(Error::InvalidResource(format!("Draw with unknown mesh {:?}", call.mesh)));
        }
        if !self.materials.contains_key(call.material) {
            return Err(Error::InvalidResource(format!("Draw with unknown material {:?}", call.material)));
        }
        self.draws.push(*call);
        Ok(())
    }
}

/// World-space translation of a draw call
pub fn draw_position(call: &DrawCall) -> Vec3 {
    call.transform.w_axis.truncate()
}
