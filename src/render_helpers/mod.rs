//! Solid colour content for views the shell draws itself.

pub mod solid_color;

pub use solid_color::{Color, SolidColorBuffer};
