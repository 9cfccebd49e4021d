/// Spatial classifier.
///
/// Pure predicates over entity snapshots. Nothing here touches host state;
/// every decision is made from the `EntityDesc` passed in.

use std::fmt;
use crate::host::{EntityDesc, EntityKind, LinkFlags};

/// Type identifier of the canonical wall
pub const WALL_DEF_NAME: &str = "Wall";
/// Type identifier of the canonical vent
pub const VENT_DEF_NAME: &str = "Vent";
/// Type identifier matched (case-insensitive) as a cooler
pub const COOLER_DEF_NAME: &str = "Cooler";

/// Atlas marker of smoothed natural stone
const SMOOTH_STONE_ATLAS_MARKER: &str = "RockSmooth_Atlas";
/// Type-name prefix of smoothed natural stone
const SMOOTHED_PREFIX: &str = "Smoothed";

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len()
        && haystack.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Smoothed natural stone: atlas path mentions the smooth-rock atlas, or the
/// type name starts with "Smoothed"
pub fn is_smoothed_stone(entity: &EntityDesc) -> bool {
    let atlas_match = entity
        .def
        .tex_path
        .as_deref()
        .is_some_and(|tex| contains_ignore_case(tex, SMOOTH_STONE_ATLAS_MARKER));
    atlas_match || starts_with_ignore_case(entity.def_name(), SMOOTHED_PREFIX)
}

/// Graphic metadata declares the wall link flag
pub fn links_as_wall(entity: &EntityDesc) -> bool {
    entity.def.link_flags.contains(LinkFlags::WALL)
}

/// Wall-like: a finished edifice that is the canonical wall, smoothed
/// natural stone, or links as a wall
pub fn is_wall_like(entity: &EntityDesc) -> bool {
    if entity.kind.is_placeholder() {
        return false;
    }
    if !entity.def.is_edifice {
        return false;
    }
    entity.def_name() == WALL_DEF_NAME || is_smoothed_stone(entity) || links_as_wall(entity)
}

/// Vent or cooler: a physical building whose type is the canonical vent,
/// is named "cooler", or whose name contains "vent" (case-insensitive).
///
/// The substring match also accepts vent variants added by content packs.
pub fn is_vent_or_cooler(entity: &EntityDesc) -> bool {
    if entity.kind != EntityKind::Building {
        return false;
    }
    let def_name = entity.def_name();
    def_name == VENT_DEF_NAME
        || def_name.eq_ignore_ascii_case(COOLER_DEF_NAME)
        || contains_ignore_case(def_name, VENT_DEF_NAME)
}

// ===== VARIANT KEY =====

/// Type identifier plus optional material variant.
///
/// Two walls with equal keys render identically, so no seam is drawn
/// between them. Displays as `Def` or `Def_Stuff`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey {
    pub def_name: String,
    pub stuff: Option<String>,
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stuff {
            Some(stuff) => write!(f, "{}_{}", self.def_name, stuff),
            None => write!(f, "{}", self.def_name),
        }
    }
}

/// Variant key of an entity
pub fn variant_key(entity: &EntityDesc) -> VariantKey {
    VariantKey {
        def_name: entity.def_name().to_string(),
        stuff: entity.stuff.clone(),
    }
}

/// Same type and same material variant
pub fn same_variant(a: &EntityDesc, b: &EntityDesc) -> bool {
    a.def_name() == b.def_name() && a.stuff == b.stuff
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
