//! Public library modules for the CLI crate
pub mod page;
pub mod server;
