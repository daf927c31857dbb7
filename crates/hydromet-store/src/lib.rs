// hydromet-store/src/lib.rs
// ============================================================================
// Module: hydromet Store Library
// Description: Version-aware relational persistence for the hydromet model.
// Purpose: Schema gate, temporal codec, key generation, sessions, DAOs.
// Dependencies: rusqlite, hydromet-core, hydromet-config, thiserror, time,
//               tracing
// ============================================================================

//! ## Overview
//! This crate persists the hydromet configuration model to a relational
//! database whose schema has evolved across a decade of deployed versions.
//! A schema version gate resolves the database's era once per connection;
//! every generated statement then includes exactly the columns that era
//! defines. Timestamps survive several historical encodings through an
//! ordered decode chain that degrades to `None` instead of failing.
//! Surrogate keys come from per-table sequences behind a swappable
//! [`KeyGenerator`] strategy. Each aggregate root has one DAO implementing
//! the uniform write (natural-key upsert, children replaced in full) and
//! delete (manual cascade, deepest-first) algorithms, each inside one
//! explicit transaction.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod connection;
pub mod dao;
pub mod error;
pub mod keygen;
pub mod schema;
pub mod temporal;
pub mod version;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use connection::Database;
pub use connection::DbCache;
pub use connection::Session;
pub use connection::SessionLease;
pub use connection::StoreContext;
pub use dao::config::ConfigDao;
pub use dao::data_source::DataSourceDao;
pub use dao::enums::EnumDao;
pub use dao::network_list::NetworkListDao;
pub use dao::platform::PlatformDao;
pub use dao::presentation::PresentationGroupDao;
pub use dao::properties::PropertiesDao;
pub use dao::routing_spec::RoutingSpecDao;
pub use dao::site::SiteDao;
pub use dao::units::UnitDao;
pub use error::DbError;
pub use keygen::KeyGenerator;
pub use keygen::KeyGeneratorRegistry;
pub use keygen::SEQUENCE_STRATEGY;
pub use keygen::SequenceKeyGenerator;
pub use schema::provision;
pub use temporal::TemporalCodec;
pub use version::DatabaseVersion;
pub use version::VERSION_5;
pub use version::VERSION_6;
pub use version::VERSION_7;
pub use version::VERSION_8;
pub use version::VERSION_9;
pub use version::VERSION_10;
pub use version::VERSION_11;
pub use version::VERSION_12;
pub use version::VERSION_13;
pub use version::VERSION_14;
pub use version::VERSION_15;
