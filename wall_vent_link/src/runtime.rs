/// WallVentLink runtime - process-wide state
///
/// Holds the two pieces of state shared by every map: the active logger
/// and the uploaded trapezoid mesh. The mesh is built lazily on first use
/// and must be released explicitly through the host that uploaded it;
/// nothing here frees graphics resources on drop.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock};
use std::time::SystemTime;
use crate::error::{Error, Result};
use crate::geometry::{self, MeshData};
use crate::host::{GraphicsHost, MeshHandle};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Shared trapezoid mesh, `None` until first use or after release
static TRAPEZOID_MESH: Mutex<Option<SharedMesh>> = Mutex::new(None);

/// Uploaded trapezoid plus the CPU data it was built from
struct SharedMesh {
    handle: MeshHandle,
    data: Arc<MeshData>,
}

/// Lock the mesh slot, recovering from a panic inside a host upload.
///
/// The slot is only written after a successful upload, so a poisoned
/// slot still holds either nothing or a complete mesh.
fn lock_mesh() -> MutexGuard<'static, Option<SharedMesh>> {
    TRAPEZOID_MESH.lock().unwrap_or_else(|poisoned| {
        crate::wvl_warn!("wvl::Runtime", "Trapezoid mesh lock recovered after a host panic");
        TRAPEZOID_MESH.clear_poison();
        PoisonError::into_inner(poisoned)
    })
}

// ===== PUBLIC API =====

/// Process-wide state manager
pub struct Runtime;

impl Runtime {
    // ===== TRAPEZOID MESH =====

    /// Get the shared trapezoid mesh, building and uploading it if absent
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if the host rejects the upload. The
    /// slot stays empty so the next call retries.
    pub fn trapezoid_mesh(graphics: &mut dyn GraphicsHost) -> Result<MeshHandle> {
        let mut slot = lock_mesh();
        if let Some(mesh) = slot.as_ref() {
            return Ok(mesh.handle);
        }

        let data = geometry::trapezoid_mesh().map(Arc::new).ok_or_else(|| {
            Error::InitializationFailed("Trapezoid mesh data rejected".to_string())
        })?;
        let handle = graphics.upload_mesh(&data).map_err(|e| {
            Error::InitializationFailed(format!("Trapezoid mesh upload failed: {}", e))
        })?;

        crate::wvl_debug!("wvl::Runtime", "Trapezoid mesh built ({} vertices)", data.vertex_count());
        *slot = Some(SharedMesh { handle, data });
        Ok(handle)
    }

    /// Handle of the shared trapezoid mesh, if built
    pub fn trapezoid_mesh_handle() -> Option<MeshHandle> {
        lock_mesh().as_ref().map(|mesh| mesh.handle)
    }

    /// CPU data of the shared trapezoid mesh, if built
    pub fn trapezoid_mesh_data() -> Option<Arc<MeshData>> {
        lock_mesh().as_ref().map(|mesh| Arc::clone(&mesh.data))
    }

    /// Release the shared trapezoid mesh through `graphics`
    ///
    /// Returns true if a mesh was released. The next `trapezoid_mesh` call
    /// rebuilds it.
    pub fn release_trapezoid_mesh(graphics: &mut dyn GraphicsHost) -> bool {
        match lock_mesh().take() {
            Some(mesh) => {
                graphics.destroy_mesh(mesh.handle);
                crate::wvl_debug!("wvl::Runtime", "Trapezoid mesh released");
                true
            }
            None => false,
        }
    }

    /// Forget process-wide state without touching the host
    ///
    /// For process exit, when the host has already torn down its graphics.
    pub fn shutdown() {
        *lock_mesh() = None;
    }

    // ===== LOGGING API =====

    /// Replace the active logger
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Log without file:line (used by wvl_trace! .. wvl_warn!)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        });
    }

    /// Log with file:line (used by wvl_error! and wvl_err!)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }

    fn dispatch(entry: LogEntry) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&entry);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
