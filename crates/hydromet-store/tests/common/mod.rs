// hydromet-store/tests/common/mod.rs
// ============================================================================
// Module: Store Test Fixtures
// Description: Shared helpers for provisioning versioned test databases.
// Purpose: One call to get a connected database at an exact schema version.
// Dependencies: hydromet-store, hydromet-config, rusqlite, tempfile,
//               tracing, tracing-subscriber
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    dead_code,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::sync::Arc;
use std::sync::Mutex;

use hydromet_config::DateEncoding;
use hydromet_config::Settings;
use hydromet_store::Database;
use hydromet_store::provision;
use rusqlite::Connection;
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Provisions an on-disk database at `version` and connects to it.
///
/// The temp dir must outlive the database.
pub fn provisioned(version: i32) -> (TempDir, Database) {
    provisioned_with(version, DateEncoding::Text)
}

/// Provisions a database at `version` with an explicit date encoding.
pub fn provisioned_with(version: i32, encoding: DateEncoding) -> (TempDir, Database) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("hydromet.db");
    let conn = Connection::open(&path).expect("open for provisioning");
    provision(&conn, version).expect("provision schema");
    drop(conn);
    let settings = Settings {
        database_location: path.to_string_lossy().into_owned(),
        date_encoding: encoding,
        ..Settings::default()
    };
    let db = Database::connect(settings).expect("connect");
    (dir, db)
}

// ============================================================================
// SECTION: Log Capture
// ============================================================================

/// Shared byte sink the fmt subscriber writes formatted events into.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Runs `f` with warnings captured and returns the formatted log output.
pub fn captured_warnings<F: FnOnce()>(f: F) -> String {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(buffer.clone())
        .with_ansi(false)
        .without_time()
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().expect("log buffer").clone();
    String::from_utf8(bytes).expect("utf8 log output")
}

// ============================================================================
// SECTION: Row Counts
// ============================================================================

/// Counts the rows of one table through the primary session.
pub fn count_rows(db: &Database, table: &str) -> i64 {
    let session = db.session();
    let guard = session.conn().expect("lock");
    guard
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .expect("count")
}
