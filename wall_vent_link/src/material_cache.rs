/// Material cache.
///
/// Deduplicates the materials this overlay derives from host surfaces.
/// Every derived material is owned by the cache that created it and is
/// only freed by `MaterialCache::release`; the host never collects them.
///
/// Three stores:
/// - derived: (source surface, draw tier) -> clone drawn at that tier
/// - trapezoid: wall variant key -> derived material for its connector
/// - outline: one solid-black material at the outline tier

use rustc_hash::{FxHashMap, FxHashSet};
use crate::classifier::{self, VariantKey};
use crate::config::{AtlasPaths, LinkConfig};
use crate::error::Result;
use crate::host::{EntityDesc, GraphicRep, GraphicsHost, MaterialHandle, RenderTier, Rot4, ShaderKind};

/// Counts reported by `MaterialCache::release`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseStats {
    /// Derived materials destroyed (including the outline)
    pub materials: usize,
    /// Trapezoid cache entries dropped
    pub trapezoid_entries: usize,
}

/// Per-map material cache
#[derive(Debug, Default)]
pub struct MaterialCache {
    derived: FxHashMap<(MaterialHandle, RenderTier), MaterialHandle>,
    trapezoid: FxHashMap<VariantKey, MaterialHandle>,
    outline: Option<MaterialHandle>,
}

impl MaterialCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of `source` drawn at `tier`, created on first request.
    ///
    /// Keyed by handle identity, never by contents: two distinct sources
    /// with identical settings get distinct clones.
    pub fn get_or_create_cached_material(
        &mut self,
        graphics: &mut dyn GraphicsHost,
        source: MaterialHandle,
        tier: RenderTier,
    ) -> Result<MaterialHandle> {
        if let Some(&cached) = self.derived.get(&(source, tier)) {
            return Ok(cached);
        }
        let derived = graphics.clone_material(source, tier)?;
        self.derived.insert((source, tier), derived);
        Ok(derived)
    }

    /// Connector material for a wall, cached per variant key.
    ///
    /// Never fails: an unresolvable wall uses the host's bad material, and
    /// a rejected clone returns the bad material uncached so the next frame
    /// retries.
    pub fn trapezoid_material_for_wall(
        &mut self,
        graphics: &mut dyn GraphicsHost,
        wall: &EntityDesc,
        config: &LinkConfig,
    ) -> MaterialHandle {
        let key = classifier::variant_key(wall);
        if let Some(&cached) = self.trapezoid.get(&key) {
            return cached;
        }

        let base = resolve_wall_material(graphics, wall, &config.atlas);
        match self.get_or_create_cached_material(graphics, base, config.trapezoid_tier) {
            Ok(material) => {
                crate::wvl_debug!("wvl::MaterialCache", "Trapezoid material cached for {}", key);
                self.trapezoid.insert(key, material);
                material
            }
            Err(e) => {
                crate::wvl_warn!("wvl::MaterialCache",
                    "Trapezoid material for {} unavailable, using bad material: {}", key, e);
                graphics.bad_material()
            }
        }
    }

    /// Shared solid-color outline material, created on first request
    pub fn outline_material(
        &mut self,
        graphics: &mut dyn GraphicsHost,
        config: &LinkConfig,
    ) -> Result<MaterialHandle> {
        if let Some(outline) = self.outline {
            return Ok(outline);
        }
        let outline = graphics.create_solid_material(config.outline_color, config.outline_tier)?;
        self.outline = Some(outline);
        Ok(outline)
    }

    /// Destroy every material this cache created and empty it
    pub fn release(&mut self, graphics: &mut dyn GraphicsHost) -> ReleaseStats {
        // Trapezoid entries alias derived entries; destroy each handle once.
        let mut destroyed = FxHashSet::default();
        let owned = self
            .derived
            .drain()
            .map(|(_, m)| m)
            .chain(self.trapezoid.values().copied())
            .chain(self.outline.take());
        for material in owned {
            if destroyed.insert(material) {
                graphics.destroy_material(material);
            }
        }

        let trapezoid_entries = self.trapezoid.len();
        self.trapezoid.clear();

        ReleaseStats {
            materials: destroyed.len(),
            trapezoid_entries,
        }
    }

    pub fn derived_count(&self) -> usize {
        self.derived.len()
    }

    pub fn trapezoid_count(&self) -> usize {
        self.trapezoid.len()
    }

    pub fn has_outline(&self) -> bool {
        self.outline.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.derived.is_empty() && self.trapezoid.is_empty() && self.outline.is_none()
    }
}

// ===== WALL MATERIAL RESOLUTION =====

/// Atlas a wall's connector should be textured from, if any.
///
/// Smoothed stone first; otherwise the stuff name picks bricks
/// ("blocks"/"brick"), planks ("plank"/"wood"), or the generic smooth
/// atlas, checked in that order. Walls without stuff get `None`.
pub fn wall_atlas_path<'a>(wall: &EntityDesc, atlas: &'a AtlasPaths) -> Option<&'a str> {
    if classifier::is_smoothed_stone(wall) {
        return Some(&atlas.rock_smooth);
    }
    let stuff = wall.stuff.as_deref()?.to_ascii_lowercase();
    if stuff.contains("blocks") || stuff.contains("brick") {
        Some(&atlas.bricks)
    } else if stuff.contains("plank") || stuff.contains("wood") {
        Some(&atlas.planks)
    } else {
        Some(&atlas.smooth)
    }
}

/// Base surface for a wall's connector (before tier override).
///
/// Atlas material tinted by the wall's draw color when an atlas applies;
/// otherwise the wall's own resolved graphic (north face of a per-facing
/// graphic, or its single surface); otherwise the host's bad material.
pub fn resolve_wall_material(
    graphics: &mut dyn GraphicsHost,
    wall: &EntityDesc,
    atlas: &AtlasPaths,
) -> MaterialHandle {
    if let Some(path) = wall_atlas_path(wall, atlas) {
        return graphics
            .atlas_material(path, ShaderKind::Cutout, wall.draw_color)
            .unwrap_or_else(|| graphics.bad_material());
    }

    match wall.graphic {
        GraphicRep::Multi(_) => wall.graphic.material_at(Rot4::North),
        GraphicRep::Single(material) => Some(material),
        GraphicRep::Other | GraphicRep::None => None,
    }
    .unwrap_or_else(|| graphics.bad_material())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "material_cache_tests.rs"]
mod tests;
