//! Chart rendering: Plotters SVG wrapped in an interactive HTML page.

pub mod chart;
pub mod html;

pub use chart::{AxisRange, PlotArea, RenderedChart, render_svg};
pub use html::{render_html, write_html};
