/// Entity snapshot types.
///
/// The host owns every game object. What crosses the boundary is a small
/// immutable description of the facts the classifier and the draw pass
/// need: type metadata, material variant, placement, and graphic.

use std::sync::Arc;
use bitflags::bitflags;
use glam::Vec3;
use slotmap::new_key_type;
use super::graphics::{Color, MaterialHandle};

// ===== HANDLES =====

new_key_type! {
    /// Non-owning handle to a host-managed entity.
    ///
    /// Hosts typically hand these out from their own `SlotMap`; a stale key
    /// simply fails to resolve through `MapView::entity`.
    pub struct EntityId;
}

/// Identifier of a host map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapId(pub u32);

// ===== GRID =====

/// Grid cell on the horizontal plane. `z` grows northward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

impl Cell {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The cell immediately north of this one
    pub fn north(self) -> Self {
        Self { x: self.x, z: self.z + 1 }
    }

    /// Manhattan distance between two cells
    pub fn manhattan(self, other: Cell) -> i32 {
        (self.x - other.x).abs() + (self.z - other.z).abs()
    }

    /// World-space center of the cell at ground level
    pub fn center(self) -> Vec3 {
        Vec3::new(self.x as f32 + 0.5, 0.0, self.z as f32 + 0.5)
    }
}

/// Facing of a placed entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rot4 {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rot4 {
    /// East or West facing (side-mounted)
    pub fn is_horizontal(self) -> bool {
        matches!(self, Rot4::East | Rot4::West)
    }

    /// Index 0..4 in North, East, South, West order
    pub fn index(self) -> usize {
        match self {
            Rot4::North => 0,
            Rot4::East => 1,
            Rot4::South => 2,
            Rot4::West => 3,
        }
    }
}

// ===== TYPE METADATA =====

/// Broad category of an entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Building,
    Item,
    Pawn,
    Plant,
    Other,
}

bitflags! {
    /// Link flags declared by a type's graphic metadata
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LinkFlags: u32 {
        const WALL = 1 << 0;
        const ROCK = 1 << 1;
        const SANDBAGS = 1 << 2;
        const FENCE = 1 << 3;
        const BARRICADE = 1 << 4;
    }
}

/// Static metadata shared by every instance of a type
#[derive(Debug, Clone)]
pub struct EntityDef {
    /// Type identifier (e.g. "Wall", "Vent", "Cooler")
    pub def_name: String,
    /// Broad category
    pub category: Category,
    /// Solid structural placement occupying its cell
    pub is_edifice: bool,
    /// Texture-atlas path of the type's graphic, if any
    pub tex_path: Option<String>,
    /// Link flags from the graphic metadata
    pub link_flags: LinkFlags,
}

impl EntityDef {
    /// A building type with no link flags and no texture path
    pub fn building(def_name: impl Into<String>) -> Self {
        Self {
            def_name: def_name.into(),
            category: Category::Building,
            is_edifice: true,
            tex_path: None,
            link_flags: LinkFlags::empty(),
        }
    }

    /// Set the texture-atlas path
    pub fn with_tex_path(mut self, tex_path: impl Into<String>) -> Self {
        self.tex_path = Some(tex_path.into());
        self
    }

    /// Set the link flags
    pub fn with_link_flags(mut self, link_flags: LinkFlags) -> Self {
        self.link_flags = link_flags;
        self
    }

    /// Mark the type as a non-edifice (floor overlay, furniture on top, ...)
    pub fn non_edifice(mut self) -> Self {
        self.is_edifice = false;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }
}

// ===== INSTANCE =====

/// What kind of object the instance is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A finished, physical building
    Building,
    /// Placement plan, not yet started
    Blueprint,
    /// Under construction
    Frame,
    /// Anything else (items, pawns, plants)
    Other,
}

impl EntityKind {
    /// Blueprint or frame
    pub fn is_placeholder(self) -> bool {
        matches!(self, EntityKind::Blueprint | EntityKind::Frame)
    }
}

/// Graphic representation already resolved by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GraphicRep {
    /// One surface per facing (North, East, South, West)
    Multi([MaterialHandle; 4]),
    /// One surface regardless of facing
    Single(MaterialHandle),
    /// Linked/atlas or otherwise unsupported graphic
    Other,
    /// No graphic at all
    None,
}

impl GraphicRep {
    /// Surface drawn for the given facing, if the representation has one
    pub fn material_at(&self, rotation: Rot4) -> Option<MaterialHandle> {
        match self {
            GraphicRep::Multi(mats) => Some(mats[rotation.index()]),
            GraphicRep::Single(mat) => Some(*mat),
            GraphicRep::Other | GraphicRep::None => None,
        }
    }
}

/// Immutable snapshot of one spawned entity
#[derive(Debug, Clone)]
pub struct EntityDesc {
    pub id: EntityId,
    /// Map the entity is spawned on
    pub map: MapId,
    pub kind: EntityKind,
    pub def: Arc<EntityDef>,
    /// Material/stuff variant identifier (e.g. "WoodLog", "BlocksGranite")
    pub stuff: Option<String>,
    pub cell: Cell,
    pub rotation: Rot4,
    /// World-space geometric center
    pub true_center: Vec3,
    pub draw_color: Color,
    pub graphic: GraphicRep,
}

impl EntityDesc {
    /// Shorthand for the type identifier
    pub fn def_name(&self) -> &str {
        &self.def.def_name
    }
}
