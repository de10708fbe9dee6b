//! CLI subcommands.

pub mod common;
pub mod inspect;
pub mod render;
pub mod sprites;
