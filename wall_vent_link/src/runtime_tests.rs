//! Unit tests for the Runtime process-wide state
//!
//! IMPORTANT: the trapezoid mesh slot and the logger are process-wide.
//! All tests are marked with #[serial] and start from `setup()`.

use crate::runtime::Runtime;
use crate::host::mock::MockGraphics;
use crate::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        // Other tests may log concurrently; keep only this module's entries
        if entry.source == "wvl::test" {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

fn setup() {
    Runtime::shutdown();
    Runtime::reset_logger();
}

// ============================================================================
// TRAPEZOID MESH TESTS
// ============================================================================

#[test]
#[serial]
fn test_trapezoid_mesh_built_once() {
    setup();
    let mut gfx = MockGraphics::new();

    let first = Runtime::trapezoid_mesh(&mut gfx).unwrap();
    let second = Runtime::trapezoid_mesh(&mut gfx).unwrap();

    assert_eq!(first, second);
    assert_eq!(gfx.upload_count(), 1);
    assert_eq!(gfx.procedural_mesh_count(), 1);
    assert_eq!(Runtime::trapezoid_mesh_handle(), Some(first));
    assert_eq!(gfx.mesh(first).unwrap().index_count, 6);
}

#[test]
#[serial]
fn test_release_then_rebuild() {
    setup();
    let mut gfx = MockGraphics::new();

    let first = Runtime::trapezoid_mesh(&mut gfx).unwrap();
    assert!(Runtime::release_trapezoid_mesh(&mut gfx));
    assert!(gfx.mesh(first).is_none());
    assert!(Runtime::trapezoid_mesh_handle().is_none());
    assert!(Runtime::trapezoid_mesh_data().is_none());

    // Second release is a no-op
    assert!(!Runtime::release_trapezoid_mesh(&mut gfx));

    let rebuilt = Runtime::trapezoid_mesh(&mut gfx).unwrap();
    assert_ne!(first, rebuilt);
    assert_eq!(gfx.upload_count(), 2);
    assert_eq!(gfx.procedural_mesh_count(), 1);
    assert_eq!(gfx.rejected_destroys(), 0);
}

#[test]
#[serial]
fn test_failed_upload_leaves_slot_empty() {
    setup();
    let mut gfx = MockGraphics::new();
    gfx.set_fail_uploads(true);

    let err = Runtime::trapezoid_mesh(&mut gfx).unwrap_err();
    assert!(format!("{}", err).contains("Initialization failed"));
    assert!(Runtime::trapezoid_mesh_handle().is_none());

    gfx.set_fail_uploads(false);
    assert!(Runtime::trapezoid_mesh(&mut gfx).is_ok());
}

#[test]
#[serial]
fn test_mesh_data_shared() {
    setup();
    let mut gfx = MockGraphics::new();
    Runtime::trapezoid_mesh(&mut gfx).unwrap();

    let a = Runtime::trapezoid_mesh_data().unwrap();
    let b = Runtime::trapezoid_mesh_data().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.vertex_count(), 4);
}

#[test]
#[serial]
fn test_shutdown_forgets_without_release() {
    setup();
    let mut gfx = MockGraphics::new();
    let handle = Runtime::trapezoid_mesh(&mut gfx).unwrap();

    Runtime::shutdown();
    assert!(Runtime::trapezoid_mesh_handle().is_none());
    // The host still owns the mesh: shutdown never calls into it
    assert!(gfx.mesh(handle).is_some());
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_custom_logger_receives_entries() {
    setup();
    let (logger, entries) = TestLogger::new();
    Runtime::set_logger(logger);

    crate::wvl_info!("wvl::test", "map {} ready", 3);
    crate::wvl_error!("wvl::test", "frame failed");

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].severity, LogSeverity::Info);
        assert_eq!(captured[0].message, "map 3 ready");
        assert!(captured[0].file.is_none());
        assert_eq!(captured[1].severity, LogSeverity::Error);
        assert!(captured[1].file.is_some());
        assert!(captured[1].line.is_some());
    }

    Runtime::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    setup();
    let (logger, entries) = TestLogger::new();
    Runtime::set_logger(logger);
    Runtime::reset_logger();

    crate::wvl_warn!("wvl::test", "not captured");
    assert!(entries.lock().unwrap().is_empty());
}
