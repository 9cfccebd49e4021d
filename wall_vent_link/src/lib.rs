/*!
# Wall Vent Link

Visual adjacency overlay for wall-mounted vents in a tile-based building
simulation.

The host simulation renders walls and vents as separate tiles. This crate
draws the missing pieces on top: side-mounted vent overlays staggered to
avoid z-fighting, a tapered trapezoid connector where a wall meets a vent
or a wall of a different material, and a thin black outline around the
connector when the neighbor is a vent.

The host is reached only through traits.

## Architecture

- **MapView / GraphicsHost**: host queries and immediate-mode drawing
- **HostListener**: lifecycle and render-tick notifications
- **LinkHub**: routes notifications to one `WallVentLink` per map
- **WallVentLink**: tracked sets, material cache, and the per-frame draw
- **Runtime**: process-wide logger and shared trapezoid mesh
*/

// Internal modules
mod error;
mod runtime;
pub mod log;
pub mod config;
pub mod host;
pub mod geometry;
pub mod classifier;
pub mod registry;
pub mod material_cache;
pub mod draw;
pub mod link;
pub mod hub;

// Main wvl namespace module
pub mod wvl {
    // Error types
    pub use crate::error::{Error, Result};

    // Process-wide state
    pub use crate::runtime::Runtime;

    // Overlay entry points
    pub use crate::config::{AtlasPaths, LinkConfig};
    pub use crate::draw::FrameStats;
    pub use crate::hub::LinkHub;
    pub use crate::link::WallVentLink;

    // Logging sub-module (types only; the wvl_* macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Host collaborator sub-module
    pub mod host {
        pub use crate::host::*;
    }
}

// Re-export math library at crate root
pub use glam;
