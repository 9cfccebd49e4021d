//! Per-frame draw orchestration.
//!
//! Runs once per render tick for one map:
//! 1. Skip unless the map is the one currently shown
//! 2. Build the shared trapezoid mesh if absent
//! 3. Rescan any tracked set found empty
//! 4. Vent pass: side-mounted vents, staggered per column to avoid z-fighting
//! 5. Wall pass: connector trapezoid toward the northern neighbor, plus an
//!    outline when that neighbor is a vent
//!
//! Walls that no longer qualify are collected during the wall pass and
//! removed from the tracked set only after it completes.

use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;
use crate::classifier;
use crate::config::LinkConfig;
use crate::error::Result;
use crate::geometry::{self, EdgeQuadParams, TRAPEZOID_DEPTH};
use crate::host::{
    Category, DrawCall, EntityDesc, EntityId, EntityKind, GraphicsHost, MapView, MeshHandle,
};
use crate::material_cache::MaterialCache;
use crate::registry::{TrackedSet, TrackedSets};
use crate::runtime::Runtime;

/// Outline edges as (from corner, to corner, invert inward). The south
/// edge is omitted: it abuts the wall itself.
const OUTLINE_EDGES: [(usize, usize, bool); 3] = [
    (2, 3, true),  // north
    (0, 2, true),  // west
    (1, 3, false), // east
];

/// What one frame did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Map was not current; nothing ran
    pub skipped: bool,
    /// Full rescans of the vent set
    pub vent_rescans: usize,
    /// Full rescans of the wall set
    pub wall_rescans: usize,
    pub vents_drawn: usize,
    pub trapezoids_drawn: usize,
    pub outline_edges_drawn: usize,
    /// Walls removed from tracking this frame
    pub walls_pruned: usize,
}

// ===== VENT PLANNING =====

/// One vent overlay to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VentPlacement {
    pub id: EntityId,
    /// Index within its column (0 = southernmost)
    pub column_index: usize,
    /// Height above the building layer
    pub y_offset: f32,
}

/// Side-mounted vents grouped by column and staggered by height.
///
/// Only finished buildings facing east or west qualify. Within a column,
/// vents are ordered by z ascending; equal z keeps registration order.
pub fn plan_vents(map: &dyn MapView, vents: &TrackedSet, config: &LinkConfig) -> Vec<VentPlacement> {
    let mut columns: FxHashMap<i32, Vec<(i32, u64, EntityId)>> = FxHashMap::default();
    for (id, seq) in vents.iter_with_sequence() {
        let Some(vent) = map.entity(id) else {
            continue;
        };
        if vent.map != map.id() || vent.kind != EntityKind::Building || !vent.rotation.is_horizontal() {
            continue;
        }
        columns.entry(vent.cell.x).or_default().push((vent.cell.z, seq, id));
    }

    let mut placements = Vec::new();
    for column in columns.values_mut() {
        column.sort_by_key(|&(z, seq, _)| (z, seq));
        placements.extend(column.iter().enumerate().map(|(i, &(_, _, id))| VentPlacement {
            id,
            column_index: i,
            y_offset: config.vent_y_offset(i),
        }));
    }
    placements
}

// ===== JUNCTIONS =====

/// What to draw where a wall meets its northern neighbor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Junction {
    pub north_has_vent: bool,
    pub draw_trapezoid: bool,
}

impl Junction {
    /// Connector at vent junctions and at wall junctions of a different
    /// variant; none between identical walls or toward anything else.
    pub fn between(wall: &EntityDesc, north: Option<&EntityDesc>) -> Self {
        let Some(north) = north else {
            return Self::default();
        };
        let north_has_vent = classifier::is_vent_or_cooler(north);
        let dissimilar_wall = classifier::is_wall_like(north) && !classifier::same_variant(wall, north);
        Self {
            north_has_vent,
            draw_trapezoid: north_has_vent || dissimilar_wall,
        }
    }
}

/// First building occupying the cell north of `wall`, if in bounds
pub fn north_neighbor<'a>(map: &'a dyn MapView, wall: &EntityDesc) -> Option<&'a EntityDesc> {
    let cell = wall.cell.north();
    if !map.in_bounds(cell) {
        return None;
    }
    map.entities_at(cell).find(|e| e.def.category == Category::Building)
}

// ===== FRAME =====

/// Borrowed state for one frame
struct FramePass<'a> {
    map: &'a dyn MapView,
    graphics: &'a mut dyn GraphicsHost,
    cache: &'a mut MaterialCache,
    config: &'a LinkConfig,
    altitude: f32,
    stats: FrameStats,
}

/// Draw every overlay for `map` this frame
///
/// # Errors
///
/// Propagates the first host draw failure. A failure in the wall pass stops
/// further wall draws, but stale walls are still pruned before it returns.
/// Missing materials, stale handles and a failed mesh upload degrade (skip
/// the affected overlay) instead.
pub fn draw_frame(
    map: &dyn MapView,
    graphics: &mut dyn GraphicsHost,
    sets: &mut TrackedSets,
    cache: &mut MaterialCache,
    config: &LinkConfig,
) -> Result<FrameStats> {
    if !map.is_current() {
        return Ok(FrameStats { skipped: true, ..FrameStats::default() });
    }

    let trapezoid_mesh = match Runtime::trapezoid_mesh(graphics) {
        Ok(mesh) => Some(mesh),
        Err(e) => {
            crate::wvl_warn!("wvl::draw", "Trapezoid mesh unavailable, connectors skipped: {}", e);
            None
        }
    };

    let mut pass = FramePass {
        map,
        graphics,
        cache,
        config,
        altitude: map.building_altitude(),
        stats: FrameStats::default(),
    };

    if sets.vents().is_empty() {
        let found = sets.refresh_vents(map);
        pass.stats.vent_rescans += 1;
        crate::wvl_debug!("wvl::draw", "Vent set empty, rescanned map {:?}: {} found", map.id(), found);
    }
    if sets.walls().is_empty() {
        let found = sets.refresh_walls(map);
        pass.stats.wall_rescans += 1;
        crate::wvl_debug!("wvl::draw", "Wall set empty, rescanned map {:?}: {} found", map.id(), found);
    }

    for placement in plan_vents(map, sets.vents(), config) {
        pass.draw_vent(&placement)?;
    }

    // After a failed draw the pass keeps scanning so stale walls are still pruned
    let mut stale = Vec::new();
    let mut failure = None;
    for id in sets.walls().iter() {
        let wall = match map.entity(id) {
            Some(wall) if wall.map == map.id() && classifier::is_wall_like(wall) => wall,
            _ => {
                stale.push(id);
                continue;
            }
        };
        if failure.is_none() {
            if let Err(e) = pass.draw_wall(wall, trapezoid_mesh) {
                failure = Some(e);
            }
        }
    }

    if !stale.is_empty() {
        crate::wvl_trace!("wvl::draw", "Pruning {} walls from map {:?}", stale.len(), map.id());
        sets.prune_walls(&stale);
        pass.stats.walls_pruned = stale.len();
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(pass.stats),
    }
}

impl FramePass<'_> {
    fn draw_vent(&mut self, placement: &VentPlacement) -> Result<()> {
        let Some(vent) = self.map.entity(placement.id) else {
            return Ok(());
        };
        let Some(surface) = vent.graphic.material_at(vent.rotation) else {
            crate::wvl_trace!("wvl::draw", "Vent {} has no surface for {:?}", vent.def_name(), vent.rotation);
            return Ok(());
        };
        let material = match self.cache.get_or_create_cached_material(
            self.graphics, surface, self.config.vent_tier,
        ) {
            Ok(material) => material,
            Err(e) => {
                crate::wvl_warn!("wvl::draw", "Vent overlay skipped for {}: {}", vent.def_name(), e);
                return Ok(());
            }
        };

        let mut position = vent.true_center;
        position.y = self.altitude + placement.y_offset;
        position.z += self.config.vent_north_offset;

        let plane = self.graphics.unit_plane();
        self.graphics.draw_mesh(&DrawCall {
            mesh: plane,
            transform: Mat4::from_scale_rotation_translation(
                self.config.vent_scale, Quat::IDENTITY, position,
            ),
            material,
            submesh: 0,
        })?;
        self.stats.vents_drawn += 1;
        Ok(())
    }

    fn draw_wall(&mut self, wall: &EntityDesc, trapezoid_mesh: Option<MeshHandle>) -> Result<()> {
        let junction = Junction::between(wall, north_neighbor(self.map, wall));
        if !junction.draw_trapezoid {
            return Ok(());
        }

        let mut center = wall.true_center;
        center.y = self.altitude + self.config.trapezoid_y_offset;
        center.z += 0.5 + TRAPEZOID_DEPTH * 0.5;

        if let Some(mesh) = trapezoid_mesh {
            let material = self.cache.trapezoid_material_for_wall(self.graphics, wall, self.config);
            self.graphics.draw_mesh(&DrawCall {
                mesh,
                transform: Mat4::from_translation(center),
                material,
                submesh: 0,
            })?;
            self.stats.trapezoids_drawn += 1;
        }

        if junction.north_has_vent {
            let outline_center = center + Vec3::Y * self.config.outline_y_increment;
            self.draw_outline(outline_center)?;
        }
        Ok(())
    }

    fn draw_outline(&mut self, center: Vec3) -> Result<()> {
        let material = match self.cache.outline_material(self.graphics, self.config) {
            Ok(material) => material,
            Err(e) => {
                crate::wvl_warn!("wvl::draw", "Outline skipped: {}", e);
                return Ok(());
            }
        };

        let plane = self.graphics.unit_plane();
        let corners = geometry::trapezoid_corners();
        let params = EdgeQuadParams {
            thickness: self.config.outline_thickness,
            rotation_offset_degrees: self.config.outline_rotation_offset_degrees,
            min_length: self.config.min_edge_length,
        };

        for (from, to, invert_inward) in OUTLINE_EDGES {
            let Some(transform) =
                geometry::edge_quad_transform(corners[from], corners[to], center, invert_inward, &params)
            else {
                continue;
            };
            self.graphics.draw_mesh(&DrawCall {
                mesh: plane,
                transform,
                material,
                submesh: 0,
            })?;
            self.stats.outline_edges_drawn += 1;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "draw_tests.rs"]
mod tests;
