//! Output of the finished table.
//!
//! This module handles writing the table:
//! - [`conf`] - line rendering and the atomic write
//! - [`place`] - moving the finished file onto its destination

mod conf;
mod place;

pub use conf::{render, write_lines, write_table};
pub use place::place_file;
