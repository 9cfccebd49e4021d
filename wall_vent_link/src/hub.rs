/// Host integration boundary.
///
/// `LinkHub` receives every host notification, keeps one `WallVentLink`
/// per map, and routes each event to the right one. Failures inside a
/// map's frame (errors or panics) stop at this boundary: they are logged
/// and the next map still draws.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use rustc_hash::FxHashMap;
use crate::classifier;
use crate::config::LinkConfig;
use crate::host::{Cell, EntityDesc, EntityId, GraphicsHost, HostListener, MapId, MapView};
use crate::link::WallVentLink;

/// Routes host events to per-map overlay controllers
#[derive(Debug, Default)]
pub struct LinkHub {
    config: LinkConfig,
    links: FxHashMap<MapId, WallVentLink>,
}

impl LinkHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hub whose maps all use `config`
    pub fn with_config(config: LinkConfig) -> Self {
        Self {
            config,
            links: FxHashMap::default(),
        }
    }

    pub fn link(&self, map: MapId) -> Option<&WallVentLink> {
        self.links.get(&map)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    fn link_mut(&mut self, map: MapId) -> &mut WallVentLink {
        let config = &self.config;
        self.links
            .entry(map)
            .or_insert_with(|| WallVentLink::with_config(map, config.clone()))
    }

    /// Override of the host's wall-link decision.
    ///
    /// A wall (or smoothed stone) also links toward a cardinally adjacent
    /// cell holding a vent or cooler. Otherwise the host's decision stands.
    pub fn should_link_with(
        map: &dyn MapView,
        parent: &EntityDesc,
        cell: Cell,
        host_decision: bool,
    ) -> bool {
        if host_decision {
            return true;
        }
        if parent.cell.manhattan(cell) != 1 || !map.in_bounds(cell) {
            return false;
        }
        if !classifier::links_as_wall(parent) && !classifier::is_smoothed_stone(parent) {
            return false;
        }
        map.entities_at(cell).any(classifier::is_vent_or_cooler)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl HostListener for LinkHub {
    fn on_map_finalized(&mut self, map: &dyn MapView) {
        self.link_mut(map.id()).finalize_init(map);
    }

    fn on_entity_spawned(&mut self, map: &dyn MapView, entity: EntityId) {
        let Some(desc) = map.entity(entity) else {
            crate::wvl_trace!("wvl::LinkHub", "Spawned entity {:?} not found on map {:?}", entity, map.id());
            return;
        };
        let wall = classifier::is_wall_like(desc);
        let vent = classifier::is_vent_or_cooler(desc);
        if !wall && !vent {
            return;
        }

        let link = self.link_mut(map.id());
        if wall {
            link.register_wall(entity);
        }
        if vent {
            link.register_vent(entity);
        }
    }

    fn on_entity_despawning(&mut self, map: &dyn MapView, entity: EntityId) {
        if let Some(link) = self.links.get_mut(&map.id()) {
            link.unregister_wall(entity);
            link.unregister_vent(entity);
        }
    }

    fn on_entity_destroying(&mut self, map: &dyn MapView, entity: EntityId) {
        self.on_entity_despawning(map, entity);
    }

    fn on_render_tick(&mut self, maps: &[&dyn MapView], graphics: &mut dyn GraphicsHost) {
        for &map in maps {
            let link = self.link_mut(map.id());
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                link.draw_all_custom(map, &mut *graphics)
            }));
            match outcome {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    crate::wvl_error!("wvl::LinkHub", "Overlay draw failed on map {:?}: {}", map.id(), e);
                }
                Err(payload) => {
                    crate::wvl_error!("wvl::LinkHub", "Overlay draw panicked on map {:?}: {}",
                        map.id(), panic_message(payload.as_ref()));
                }
            }
        }
    }

    fn on_map_removed(&mut self, map: MapId, graphics: &mut dyn GraphicsHost) {
        if let Some(mut link) = self.links.remove(&map) {
            link.clear_caches(graphics);
            crate::wvl_debug!("wvl::LinkHub", "Map {:?} removed", map);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
