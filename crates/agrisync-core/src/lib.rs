//! Agrisync Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Calendar`, `Event`, `PendingChange`
//! - **Port definitions** - Traits for adapters: `IRemoteApi`, `ILocalStore`, `IChangeLog`
//! - **Configuration** - Typed config with YAML loading and defaults
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no external dependencies.
//! Ports define trait interfaces that adapter crates implement.
//! The sync orchestrator (in `agrisync-engine`) drives domain entities
//! through the port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
