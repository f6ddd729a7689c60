pub mod command;
pub mod config;
pub mod deploy;
pub mod error;
pub mod io;
pub mod language;
pub mod log;
pub mod paths;
pub mod post;
pub mod site;
pub mod theme;

pub use error::{BuddyError, Result};
