pub mod aggregate;
pub mod config;
pub mod event;
pub mod resource;
pub mod role;
pub mod traits;
