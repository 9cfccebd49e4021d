/// Tests for the material cache
///
/// Uses MockGraphics to observe clones, pooled atlas lookups, and releases.

use super::*;
use crate::host::mock::{MockGraphics, MockMap, MockMaterialOrigin, Spawn};
use crate::host::{Cell, Color, EntityDef, LinkFlags, MapId, MapView};
use std::sync::Arc;

// ============================================================================
// Helper Functions
// ============================================================================

fn wall_desc(def_name: &str, configure: impl FnOnce(Spawn) -> Spawn) -> EntityDesc {
    let mut map = MockMap::new(MapId(0), 4, 4);
    let def = Arc::new(EntityDef::building(def_name).with_link_flags(LinkFlags::WALL));
    let id = map.spawn(configure(Spawn::new(&def, Cell::new(0, 0))));
    map.entity(id).unwrap().clone()
}

fn atlas_of(gfx: &MockGraphics, material: MaterialHandle) -> Option<String> {
    match &gfx.material(material)?.origin {
        MockMaterialOrigin::Atlas { path, .. } => Some(path.clone()),
        _ => None,
    }
}

/// Source of a derived material
fn source_of(gfx: &MockGraphics, material: MaterialHandle) -> MaterialHandle {
    match gfx.material(material).unwrap().origin {
        MockMaterialOrigin::Clone { source } => source,
        ref other => panic!("not a clone: {:?}", other),
    }
}

// ============================================================================
// Tests: Generic cache
// ============================================================================

#[test]
fn test_cached_material_idempotent() {
    let mut gfx = MockGraphics::new();
    let mut cache = MaterialCache::new();
    let source = gfx.host_material("vent_east");

    let a = cache.get_or_create_cached_material(&mut gfx, source, RenderTier::VENT).unwrap();
    let b = cache.get_or_create_cached_material(&mut gfx, source, RenderTier::VENT).unwrap();

    assert_eq!(a, b);
    assert_eq!(gfx.clone_count(), 1);
    assert_eq!(gfx.material(a).unwrap().tier, Some(RenderTier::VENT));
}

#[test]
fn test_cached_material_distinct_per_tier() {
    let mut gfx = MockGraphics::new();
    let mut cache = MaterialCache::new();
    let source = gfx.host_material("vent_east");

    let vent = cache.get_or_create_cached_material(&mut gfx, source, RenderTier::VENT).unwrap();
    let trap = cache.get_or_create_cached_material(&mut gfx, source, RenderTier::TRAPEZOID).unwrap();

    assert_ne!(vent, trap);
    assert_eq!(cache.derived_count(), 2);
    assert_eq!(gfx.material(trap).unwrap().tier, Some(RenderTier::TRAPEZOID));
}

#[test]
fn test_cached_material_keyed_by_identity() {
    let mut gfx = MockGraphics::new();
    let mut cache = MaterialCache::new();
    // Same name, different surfaces
    let a = gfx.host_material("same");
    let b = gfx.host_material("same");

    let da = cache.get_or_create_cached_material(&mut gfx, a, RenderTier::VENT).unwrap();
    let db = cache.get_or_create_cached_material(&mut gfx, b, RenderTier::VENT).unwrap();
    assert_ne!(da, db);
}

#[test]
fn test_failed_clone_is_not_cached() {
    let mut gfx = MockGraphics::new();
    let mut cache = MaterialCache::new();
    let source = gfx.host_material("vent");

    gfx.set_fail_clones(true);
    assert!(cache.get_or_create_cached_material(&mut gfx, source, RenderTier::VENT).is_err());
    assert_eq!(cache.derived_count(), 0);

    gfx.set_fail_clones(false);
    assert!(cache.get_or_create_cached_material(&mut gfx, source, RenderTier::VENT).is_ok());
}

// ============================================================================
// Tests: Wall material resolution
// ============================================================================

#[test]
fn test_atlas_selection_by_stuff() {
    let atlas = AtlasPaths::default();
    let cases = [
        ("BlocksGranite", &atlas.bricks),
        ("RedBrick", &atlas.bricks),
        ("WoodLog", &atlas.planks),
        ("OakPlanks", &atlas.planks),
        ("Steel", &atlas.smooth),
    ];
    for (stuff, expected) in cases {
        let wall = wall_desc("Wall", |s| s.stuff(stuff));
        assert_eq!(wall_atlas_path(&wall, &atlas), Some(expected.as_str()), "stuff {}", stuff);
    }
}

#[test]
fn test_smoothed_stone_wins_over_stuff() {
    let atlas = AtlasPaths::default();
    let wall = wall_desc("SmoothedGranite", |s| s.stuff("WoodLog"));
    assert_eq!(wall_atlas_path(&wall, &atlas), Some(atlas.rock_smooth.as_str()));
}

#[test]
fn test_no_stuff_no_atlas() {
    let wall = wall_desc("Wall", |s| s);
    assert_eq!(wall_atlas_path(&wall, &AtlasPaths::default()), None);
}

#[test]
fn test_resolve_tints_atlas_with_draw_color() {
    let mut gfx = MockGraphics::new();
    let tint = Color::rgba(0.5, 0.4, 0.3, 1.0);
    let wall = wall_desc("Wall", |s| s.stuff("BlocksMarble").color(tint));

    let material = resolve_wall_material(&mut gfx, &wall, &AtlasPaths::default());
    match &gfx.material(material).unwrap().origin {
        MockMaterialOrigin::Atlas { path, shader, tint: t } => {
            assert_eq!(path, "Things/Building/Linked/Wall/Wall_Atlas_Bricks");
            assert_eq!(*shader, ShaderKind::Cutout);
            assert_eq!(*t, tint);
        }
        other => panic!("expected atlas material, got {:?}", other),
    }
}

#[test]
fn test_resolve_falls_back_to_graphic() {
    let mut gfx = MockGraphics::new();
    let north = gfx.host_material("north");
    let east = gfx.host_material("east");
    let single = gfx.host_material("single");

    let multi_wall = wall_desc("Wall", |s| s.graphic(GraphicRep::Multi([north, east, east, east])));
    let single_wall = wall_desc("Wall", |s| s.graphic(GraphicRep::Single(single)));
    let linked_wall = wall_desc("Wall", |s| s.graphic(GraphicRep::Other));

    let atlas = AtlasPaths::default();
    assert_eq!(resolve_wall_material(&mut gfx, &multi_wall, &atlas), north);
    assert_eq!(resolve_wall_material(&mut gfx, &single_wall, &atlas), single);
    assert_eq!(resolve_wall_material(&mut gfx, &linked_wall, &atlas), gfx.bad_material());
}

#[test]
fn test_resolve_missing_atlas_uses_bad_material() {
    let mut gfx = MockGraphics::new();
    let atlas = AtlasPaths::default();
    gfx.mark_atlas_missing(&atlas.planks);
    let wall = wall_desc("Wall", |s| s.stuff("WoodLog"));
    assert_eq!(resolve_wall_material(&mut gfx, &wall, &atlas), gfx.bad_material());
}

// ============================================================================
// Tests: Trapezoid cache
// ============================================================================

#[test]
fn test_trapezoid_material_cached_per_variant() {
    let mut gfx = MockGraphics::new();
    let mut cache = MaterialCache::new();
    let config = LinkConfig::default();

    let wood_a = wall_desc("Wall", |s| s.stuff("WoodLog"));
    let wood_b = wall_desc("Wall", |s| s.stuff("WoodLog"));
    let steel = wall_desc("Wall", |s| s.stuff("Steel"));

    let a = cache.trapezoid_material_for_wall(&mut gfx, &wood_a, &config);
    let b = cache.trapezoid_material_for_wall(&mut gfx, &wood_b, &config);
    let c = cache.trapezoid_material_for_wall(&mut gfx, &steel, &config);

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(cache.trapezoid_count(), 2);
    assert_eq!(gfx.material(a).unwrap().tier, Some(RenderTier::TRAPEZOID));
    assert_eq!(atlas_of(&gfx, source_of(&gfx, a)).unwrap(), config.atlas.planks);
}

#[test]
fn test_trapezoid_material_unresolvable_wraps_bad_material() {
    let mut gfx = MockGraphics::new();
    let mut cache = MaterialCache::new();
    let wall = wall_desc("Wall", |s| s);

    let material = cache.trapezoid_material_for_wall(&mut gfx, &wall, &LinkConfig::default());
    assert_eq!(source_of(&gfx, material), gfx.bad_material());
}

#[test]
fn test_trapezoid_material_rejected_clone_degrades() {
    let mut gfx = MockGraphics::new();
    let mut cache = MaterialCache::new();
    let wall = wall_desc("Wall", |s| s.stuff("Steel"));

    gfx.set_fail_clones(true);
    let material = cache.trapezoid_material_for_wall(&mut gfx, &wall, &LinkConfig::default());
    assert_eq!(material, gfx.bad_material());
    assert_eq!(cache.trapezoid_count(), 0);
}

// ============================================================================
// Tests: Outline and release
// ============================================================================

#[test]
fn test_outline_material_created_once() {
    let mut gfx = MockGraphics::new();
    let mut cache = MaterialCache::new();
    let config = LinkConfig::default();

    let a = cache.outline_material(&mut gfx, &config).unwrap();
    let b = cache.outline_material(&mut gfx, &config).unwrap();
    assert_eq!(a, b);

    let outline = gfx.material(a).unwrap();
    assert_eq!(outline.tier, Some(RenderTier::OUTLINE));
    assert_eq!(outline.origin, MockMaterialOrigin::Solid { color: Color::BLACK });
}

#[test]
fn test_release_destroys_everything_once() {
    let mut gfx = MockGraphics::new();
    let mut cache = MaterialCache::new();
    let config = LinkConfig::default();
    let vent_surface = gfx.host_material("vent");

    cache.get_or_create_cached_material(&mut gfx, vent_surface, RenderTier::VENT).unwrap();
    cache.trapezoid_material_for_wall(&mut gfx, &wall_desc("Wall", |s| s.stuff("Steel")), &config);
    cache.trapezoid_material_for_wall(&mut gfx, &wall_desc("Wall", |s| s.stuff("WoodLog")), &config);
    cache.outline_material(&mut gfx, &config).unwrap();
    assert_eq!(gfx.owned_material_count(), 4);

    let stats = cache.release(&mut gfx);

    assert_eq!(stats, ReleaseStats { materials: 4, trapezoid_entries: 2 });
    assert_eq!(gfx.owned_material_count(), 0);
    assert_eq!(gfx.rejected_destroys(), 0);
    assert!(cache.is_empty());
    assert!(!cache.has_outline());
}

#[test]
fn test_release_empty_cache() {
    let mut gfx = MockGraphics::new();
    let mut cache = MaterialCache::new();
    assert_eq!(cache.release(&mut gfx), ReleaseStats::default());
    assert_eq!(gfx.rejected_destroys(), 0);
}
