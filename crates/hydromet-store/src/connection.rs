// hydromet-store/src/connection.rs
// ============================================================================
// Module: Connection Coordinator
// Description: Owns connections, sessions, and shared per-database state.
// Purpose: One primary mutex-guarded connection plus checked-out isolates.
// Dependencies: rusqlite, hydromet-config, hydromet-core, tracing
// ============================================================================

//! ## Overview
//! [`Database::connect`] establishes the primary connection with a bounded
//! retry loop (the server may still be starting), applies the per-connection
//! session parameters, resolves the schema version once, and fixes the
//! temporal codec to the configured zone. DAOs run on a [`Session`]: either
//! the shared primary session (mutex-guarded) or an isolated checked-out
//! connection returned to a pool when its lease drops. Two tasks never share
//! one physical connection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use hydromet_config::AuthFile;
use hydromet_config::Settings;
use hydromet_core::DataSource;
use hydromet_core::PlatformConfig;
use hydromet_core::Site;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use tracing::info;
use tracing::warn;

use crate::error::DbError;
use crate::keygen::KeyGenerator;
use crate::keygen::KeyGeneratorRegistry;
use crate::temporal::TemporalCodec;
use crate::version::DatabaseVersion;
use crate::version::resolve;

// ============================================================================
// SECTION: Identity Cache
// ============================================================================

/// Identity cache for aggregate roots referenced from other aggregates.
///
/// Complete reads of platforms and routing specs resolve their site, config,
/// and data source references through this cache so one logical entity has
/// one in-memory identity. A poisoned cache lock degrades to a cache miss.
#[derive(Debug, Default)]
pub struct DbCache {
    /// Sites by surrogate key.
    sites: Mutex<HashMap<i64, Arc<Site>>>,
    /// Platform configurations by surrogate key.
    configs: Mutex<HashMap<i64, Arc<PlatformConfig>>>,
    /// Data sources by surrogate key.
    data_sources: Mutex<HashMap<i64, Arc<DataSource>>>,
}

impl DbCache {
    /// Looks up a cached site.
    #[must_use]
    pub fn site(&self, key: i64) -> Option<Arc<Site>> {
        self.sites.lock().ok()?.get(&key).cloned()
    }

    /// Caches a site, replacing any previous identity for the key.
    pub fn put_site(&self, key: i64, site: Arc<Site>) {
        if let Ok(mut guard) = self.sites.lock() {
            guard.insert(key, site);
        }
    }

    /// Removes a site from the cache.
    pub fn evict_site(&self, key: i64) {
        if let Ok(mut guard) = self.sites.lock() {
            guard.remove(&key);
        }
    }

    /// Looks up a cached platform configuration.
    #[must_use]
    pub fn config(&self, key: i64) -> Option<Arc<PlatformConfig>> {
        self.configs.lock().ok()?.get(&key).cloned()
    }

    /// Caches a platform configuration.
    pub fn put_config(&self, key: i64, config: Arc<PlatformConfig>) {
        if let Ok(mut guard) = self.configs.lock() {
            guard.insert(key, config);
        }
    }

    /// Removes a platform configuration from the cache.
    pub fn evict_config(&self, key: i64) {
        if let Ok(mut guard) = self.configs.lock() {
            guard.remove(&key);
        }
    }

    /// Looks up a cached data source.
    #[must_use]
    pub fn data_source(&self, key: i64) -> Option<Arc<DataSource>> {
        self.data_sources.lock().ok()?.get(&key).cloned()
    }

    /// Caches a data source.
    pub fn put_data_source(&self, key: i64, source: Arc<DataSource>) {
        if let Ok(mut guard) = self.data_sources.lock() {
            guard.insert(key, source);
        }
    }

    /// Removes a data source from the cache.
    pub fn evict_data_source(&self, key: i64) {
        if let Ok(mut guard) = self.data_sources.lock() {
            guard.remove(&key);
        }
    }
}

// ============================================================================
// SECTION: Store Context
// ============================================================================

/// Read-only per-database state shared by every session.
pub struct StoreContext {
    /// Resolved schema version; fixed for the database's lifetime.
    pub version: DatabaseVersion,
    /// Temporal codec fixed to the configured session zone.
    pub codec: TemporalCodec,
    /// Key generation strategy resolved from configuration.
    pub keygen: Arc<dyn KeyGenerator>,
    /// Identity cache for cross-aggregate references.
    pub cache: DbCache,
}

impl std::fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreContext")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// A DAO execution handle: one physical connection plus the shared context.
///
/// Deliberately not `Clone`: a clone could outlive a [`SessionLease`] and
/// keep using a connection after it returned to the pool.
#[derive(Debug)]
pub struct Session {
    /// The physical connection, serialized by mutex.
    conn: Arc<Mutex<Connection>>,
    /// Shared per-database state.
    ctx: Arc<StoreContext>,
}

impl Session {
    /// Locks the underlying connection for a statement sequence.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] when the connection mutex is poisoned.
    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.conn
            .lock()
            .map_err(|_| DbError::Statement("connection mutex poisoned".to_string()))
    }

    /// Returns the shared per-database context.
    #[must_use]
    pub fn context(&self) -> &StoreContext {
        &self.ctx
    }
}

/// A checked-out session lease; the connection returns to the pool on drop.
#[derive(Debug)]
pub struct SessionLease<'a> {
    /// Owning database, receives the connection back.
    db: &'a Database,
    /// The leased session.
    session: Session,
}

impl SessionLease<'_> {
    /// Returns the leased session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl Drop for SessionLease<'_> {
    fn drop(&mut self) {
        self.db.return_connection(Arc::clone(&self.session.conn));
    }
}

// ============================================================================
// SECTION: Database
// ============================================================================

/// Connection coordinator: owns the primary connection, the checkout pool,
/// and the shared store context.
#[derive(Debug)]
pub struct Database {
    /// Primary mutex-guarded connection.
    primary: Arc<Mutex<Connection>>,
    /// Shared per-database state.
    ctx: Arc<StoreContext>,
    /// Settings the database was opened with.
    settings: Settings,
    /// Returned connections available for checkout reuse.
    pool: Mutex<Vec<Arc<Mutex<Connection>>>>,
    /// Set once [`close`](Database::close) has run.
    closed: AtomicBool,
}

impl Database {
    /// Connects to the configured database.
    ///
    /// Retries a failing open on `connect_retry_ms` spacing until the
    /// `connect_timeout_ms` budget expires, then resolves credentials,
    /// session parameters, the schema version, and the key generator.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connect`] when the settings are unusable, the
    /// credential store cannot be read when required, or the retry budget
    /// expires; [`DbError::Invalid`] for an unknown key generator name.
    pub fn connect(settings: Settings) -> Result<Self, DbError> {
        settings
            .validate()
            .map_err(|err| DbError::Connect(err.to_string()))?;
        resolve_credentials(&settings)?;
        let conn = open_with_retry(&settings)?;
        let version = resolve(&conn);
        info!(
            location = %settings.database_location,
            version = version.version,
            "database connected"
        );
        let codec = TemporalCodec::new(&settings.sql_time_zone, settings.date_encoding)?;
        let registry =
            KeyGeneratorRegistry::with_defaults(&settings.sequence_suffix, settings.sequence_start);
        let keygen = registry.resolve(&settings.key_generator)?;
        let ctx = Arc::new(StoreContext {
            version,
            codec,
            keygen,
            cache: DbCache::default(),
        });
        Ok(Self {
            primary: Arc::new(Mutex::new(conn)),
            ctx,
            settings,
            pool: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }

    /// Returns the shared primary session.
    #[must_use]
    pub fn session(&self) -> Session {
        Session {
            conn: Arc::clone(&self.primary),
            ctx: Arc::clone(&self.ctx),
        }
    }

    /// Checks out an isolated session on its own physical connection.
    ///
    /// The connection is reused from the pool when one is available, else
    /// freshly opened. It returns to the pool when the lease drops.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connect`] when the database is closed or a fresh
    /// connection cannot be opened.
    pub fn checkout_session(&self) -> Result<SessionLease<'_>, DbError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DbError::Connect("database is closed".to_string()));
        }
        let pooled = self.pool.lock().ok().and_then(|mut pool| pool.pop());
        let conn = match pooled {
            Some(conn) => conn,
            None => Arc::new(Mutex::new(open_with_retry(&self.settings)?)),
        };
        Ok(SessionLease {
            db: self,
            session: Session {
                conn,
                ctx: Arc::clone(&self.ctx),
            },
        })
    }

    /// Returns the resolved schema version.
    #[must_use]
    pub fn version(&self) -> &DatabaseVersion {
        &self.ctx.version
    }

    /// Returns the shared store context.
    #[must_use]
    pub fn context(&self) -> &StoreContext {
        &self.ctx
    }

    /// Closes the database: best-effort and idempotent.
    ///
    /// Pooled connections are dropped; the primary connection closes when
    /// the last session holding it drops.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Ok(mut pool) = self.pool.lock() {
            pool.clear();
        }
    }

    /// Accepts a connection back from a dropped lease.
    fn return_connection(&self, conn: Arc<Mutex<Connection>>) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        if let Ok(mut pool) = self.pool.lock() {
            pool.push(conn);
        }
    }
}

// ============================================================================
// SECTION: Connection Establishment
// ============================================================================

/// Resolves credentials per the trust policy.
///
/// The local driver performs a credential-less open; credentials are still
/// required to *exist* when OS trust is disabled, matching the behavior of
/// the server-backed deployments this layer was written against.
fn resolve_credentials(settings: &Settings) -> Result<Option<AuthFile>, DbError> {
    if settings.trust_os_auth {
        return Ok(None);
    }
    let Some(path) = settings.auth_file.as_deref() else {
        return Err(DbError::Connect(
            "trusted authentication is disabled and no auth_file is configured; \
             run the credential setup first"
                .to_string(),
        ));
    };
    let auth = AuthFile::from_path(path).map_err(|err| {
        DbError::Connect(format!(
            "credential store unusable ({err}); run the credential setup first"
        ))
    })?;
    info!(username = %auth.username, "database credentials resolved");
    Ok(Some(auth))
}

/// Opens a connection, retrying on `connect_retry_ms` spacing until the
/// `connect_timeout_ms` budget expires.
fn open_with_retry(settings: &Settings) -> Result<Connection, DbError> {
    let deadline = Instant::now() + Duration::from_millis(settings.connect_timeout_ms);
    let spacing = Duration::from_millis(settings.connect_retry_ms);
    loop {
        match open_once(settings) {
            Ok(conn) => return Ok(conn),
            Err(err) => {
                if Instant::now() + spacing > deadline {
                    return Err(DbError::Connect(format!(
                        "could not open '{}' within {} ms: {err}",
                        settings.database_location, settings.connect_timeout_ms
                    )));
                }
                warn!(
                    location = %settings.database_location,
                    error = %err,
                    "database open failed, retrying"
                );
                thread::sleep(spacing);
            }
        }
    }
}

/// Opens one connection and applies the per-connection session parameters.
fn open_once(settings: &Settings) -> Result<Connection, rusqlite::Error> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let conn = Connection::open_with_flags(&settings.database_location, flags)?;
    // Cascades are performed manually, deepest-first, by the DAOs.
    conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
    conn.busy_timeout(Duration::from_millis(settings.busy_timeout_ms))?;
    Ok(conn)
}
