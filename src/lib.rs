//! Identity and secret custody core.
//!
//! Everything a privileged-access platform needs between its transport layer
//! and its database: credential derivation and verification (Argon2id),
//! TOTP second factor, signed bearer tokens (HS256), envelope encryption for
//! stored secrets (AES-256-GCM), role-based authorization and an append-only
//! audit trail.
//!
//! The crate is transport-agnostic. A hosting process builds the services
//! from a [`config::Settings`] and a connection pool, then calls them from
//! whatever protocol layer it exposes:
//!
//! ```no_run
//! use std::sync::Arc;
//! use custody_core::config::Settings;
//! use custody_core::db::{self, PgAuditStore, PgIdentityStore, PgRoleStore};
//! use custody_core::security::token::TokenIssuer;
//! use custody_core::services::{AccessGate, AuditRecorder, AuthService};
//!
//! # async fn build() -> anyhow::Result<()> {
//! let settings = Settings::load()?;
//! let pool = sqlx::postgres::PgPoolOptions::new()
//!     .max_connections(settings.database.max_connections)
//!     .connect(&settings.database.url)
//!     .await?;
//! db::run_migrations(&pool).await?;
//!
//! let audit = AuditRecorder::new(Arc::new(PgAuditStore::new(pool.clone())));
//! let gate = AccessGate::new(Arc::new(PgRoleStore::new(pool.clone())));
//! let auth = AuthService::new(
//!     Arc::new(PgIdentityStore::new(pool.clone())),
//!     Arc::new(TokenIssuer::new(&settings.jwt)),
//!     audit.clone(),
//!     settings.totp.issuer.clone(),
//! );
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod models;
pub mod security;
pub mod services;
pub mod validators;

pub use error::{CustodyError, ErrorResponse, Result};
