//! HTML and SVG output.
//!
//! Templates live under `templates/` and are compiled into the binary.

pub mod icons;
pub mod page;
pub mod template;

pub use page::{ForecastCard, escape_html, fmt_scale, render_dashboard, render_debug, render_error};
