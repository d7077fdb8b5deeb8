//! # Deskpet - durable state core for a desktop companion
//!
//! Deskpet persists the mutable state of a small simulated companion (its attributes,
//! inventory, and the app's settings) as JSON records on local disk, keeps a bounded
//! history of backup snapshots, and implements the deterministic rules that mutate that
//! state: experience and leveling, feeding, and inventory depletion.
//!
//! ## Features
//!
//! - **Atomic records**: temp file, verify, rename. A reader never sees a torn write.
//! - **Seeding**: a record that does not exist yet is created from compiled-in defaults.
//! - **Backups**: timestamped snapshots taken after feeding, swept after 7 days.
//! - **Repositories**: single-slot cached access per record with schema-aware operations.
//! - **Tagged replies**: [`service::PetService`] turns every failure into a `Reply`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deskpet::service::PetService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut service = PetService::open("./deskpet-data");
//!     let reply = service.feed_with_item("food_apple").await;
//!     println!("fed: {}", reply.success);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`storage`] - atomic JSON record store, backups, and retention
//! - [`repository`] - cached pet, inventory, and settings repositories
//! - [`service`] - reply-returning facade used by the hosting shell
//! - [`types`] - persisted record types and defaults
//! - [`config`] - host configuration (storage root, logging)
//! - [`validation`] - record and backup name checks
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   PetService    │ ← Request surface (Reply<T>)
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Repositories   │ ← Cache + simulation rules
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   FileStore     │ ← Atomic writes, backups
//! └─────────────────┘
//! ```

pub mod config;
pub mod errors;
pub mod repository;
pub mod service;
pub mod storage;
pub mod types;
pub mod validation;

pub use errors::{StoreError, StoreResult};
