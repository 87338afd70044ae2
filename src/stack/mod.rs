//! Technology tables: frameworks, database engines and workspace managers.
//!
//! Identifiers are closed enums generated by [`define_id_enum!`](crate::define_id_enum)
//! with a `Custom(String)` escape hatch, so analysis output naming a technology outside
//! the built-in tables still round-trips through serde.
//!
//! All precedence decisions live in explicit ordered tables:
//! [`framework::default_signatures`] and [`workspace::default_managers`]. Both can be
//! replaced through the detector constructors.

#[macro_use]
pub mod id_enum_macro;

pub mod database;
pub mod framework;
pub mod framework_id;
pub mod workspace;

pub use database::{DatabaseType, EngineCategory};
pub use framework::{DependencyPattern, DependencyPatternType, FrameworkSignature};
pub use framework_id::FrameworkId;
pub use workspace::{WorkspaceManager, WorkspaceManagerId};
