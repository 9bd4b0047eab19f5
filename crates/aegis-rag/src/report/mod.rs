//! HTML report rendering

pub mod renderer;

pub use renderer::{CommandRenderer, ReportRenderer};
