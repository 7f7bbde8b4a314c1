pub mod action;
pub mod activation;
pub mod config;
pub mod errors;
mod handlers;
mod layout;
pub mod output;
pub mod pending;
pub mod policy;
pub mod protocols;
pub mod render_helpers;
pub mod replay;
mod resolver;
pub mod scene;
pub mod state;
pub mod surface;

#[cfg(test)]
mod tests;

pub use errors::{Result, ShellError};
pub use handlers::Event;
pub use state::Shell;
