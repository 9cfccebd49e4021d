/// Per-map overlay controller.
///
/// One `WallVentLink` exists per loaded map. It owns the map's tracked
/// sets and material cache and exposes the operations the host drives:
/// initialization, registration, the per-frame draw, and cache teardown.

use crate::config::LinkConfig;
use crate::draw::{self, FrameStats};
use crate::error::Result;
use crate::host::{EntityId, GraphicsHost, MapId, MapView};
use crate::material_cache::{MaterialCache, ReleaseStats};
use crate::registry::TrackedSets;
use crate::runtime::Runtime;

/// Overlay state of one map
#[derive(Debug)]
pub struct WallVentLink {
    map_id: MapId,
    config: LinkConfig,
    sets: TrackedSets,
    cache: MaterialCache,
}

impl WallVentLink {
    /// Create a controller for `map_id` with the default configuration
    pub fn new(map_id: MapId) -> Self {
        Self::with_config(map_id, LinkConfig::default())
    }

    pub fn with_config(map_id: MapId, config: LinkConfig) -> Self {
        Self {
            map_id,
            config,
            sets: TrackedSets::new(),
            cache: MaterialCache::new(),
        }
    }

    // ===== LIFECYCLE =====

    /// Populate both tracked sets from a full scan of the loaded map
    pub fn finalize_init(&mut self, map: &dyn MapView) {
        let walls = self.sets.refresh_walls(map);
        let vents = self.sets.refresh_vents(map);
        crate::wvl_info!("wvl::WallVentLink",
            "Map {:?} initialized: {} walls, {} vents", self.map_id, walls, vents);
    }

    /// Destroy every material and the shared trapezoid mesh
    ///
    /// Idempotent. The mesh is process-wide: any map drawn afterwards
    /// rebuilds it.
    pub fn clear_caches(&mut self, graphics: &mut dyn GraphicsHost) -> ReleaseStats {
        let stats = self.cache.release(graphics);
        let mesh_released = Runtime::release_trapezoid_mesh(graphics);
        crate::wvl_info!("wvl::WallVentLink",
            "Caches cleared for map {:?}: {} materials, {} trapezoid entries, mesh {}",
            self.map_id, stats.materials, stats.trapezoid_entries,
            if mesh_released { "released" } else { "absent" });
        stats
    }

    // ===== REGISTRATION =====

    pub fn register_wall(&mut self, id: EntityId) {
        if self.sets.register_wall(id) {
            crate::wvl_trace!("wvl::WallVentLink", "Wall {:?} registered", id);
        }
    }

    pub fn unregister_wall(&mut self, id: EntityId) {
        if self.sets.unregister_wall(id) {
            crate::wvl_trace!("wvl::WallVentLink", "Wall {:?} unregistered", id);
        }
    }

    pub fn register_vent(&mut self, id: EntityId) {
        if self.sets.register_vent(id) {
            crate::wvl_trace!("wvl::WallVentLink", "Vent {:?} registered", id);
        }
    }

    pub fn unregister_vent(&mut self, id: EntityId) {
        if self.sets.unregister_vent(id) {
            crate::wvl_trace!("wvl::WallVentLink", "Vent {:?} unregistered", id);
        }
    }

    // ===== DRAW =====

    /// Draw this map's overlays for the current frame
    ///
    /// # Errors
    ///
    /// Returns the host's error if a draw submission fails. Callers on the
    /// render path should log and drop it.
    pub fn draw_all_custom(
        &mut self,
        map: &dyn MapView,
        graphics: &mut dyn GraphicsHost,
    ) -> Result<FrameStats> {
        draw::draw_frame(map, graphics, &mut self.sets, &mut self.cache, &self.config)
    }

    // ===== ACCESSORS =====

    pub fn map_id(&self) -> MapId {
        self.map_id
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn tracked(&self) -> &TrackedSets {
        &self.sets
    }

    pub fn cache(&self) -> &MaterialCache {
        &self.cache
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
