//! Runtime composition for the combat layer.
//!
//! This crate wires the `combat-core` components to concrete services and
//! exposes [`CombatWorld`] as the single entry point for hosts: input
//! handlers, AI controllers and animation callbacks all call into it.
//!
//! Modules are organized by responsibility:
//! - [`world`] hosts the composition root and its external entry points
//! - [`character`] composes components per archetype and implements the
//!   capability traits
//! - [`spatial`], [`animation`] and [`projectiles`] implement the collaborator
//!   interfaces consumed by the core
//! - [`config`] and [`logging`] bootstrap a host process
pub mod animation;
pub mod character;
pub mod config;
pub mod error;
pub mod logging;
pub mod projectiles;
pub mod spatial;
pub mod world;

pub use animation::{AnimNotify, AnimationDriver, NotifyMode};
pub use character::{Character, TimerOutcome};
pub use config::{LoggingConfig, RuntimeConfig};
pub use error::{Result, RuntimeError};
pub use logging::{LoggingGuard, init_logging};
pub use projectiles::{Projectile, ProjectileHit, ProjectileSystem};
pub use spatial::SpatialIndex;
pub use world::CombatWorld;
