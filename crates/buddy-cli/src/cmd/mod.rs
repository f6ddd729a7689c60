pub mod config;
pub mod deploy;
pub mod lang;
pub mod post;
pub mod status;
pub mod theme;
