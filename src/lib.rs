//! Rolescope library crate.
//!
//! Turns a captured Azure activity-log export into a grouped permission
//! analysis and a minimal custom-role definition. Exposes the core
//! aggregation, sources, and artifact formats for the CLI.

pub mod core;
pub mod formats;
pub mod sources;

pub use self::core::aggregate;
pub use self::core::config;
pub use self::core::event;
pub use self::core::resource;
pub use self::core::role;
pub use self::core::traits;
