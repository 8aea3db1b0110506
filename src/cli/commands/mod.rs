//! Subcommand implementations

pub mod render;
pub mod select;

pub use render::RenderArgs;
pub use select::SelectArgs;
