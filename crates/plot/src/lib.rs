//! Chart building and PNG rendering for aggregated experiment metrics.

pub mod chart;
pub mod palette;
pub mod render;

pub use chart::{charts, group_by_batch_size, ChartKind, ChartSpec, X_LABEL};
pub use palette::{bar_palette, Rgb};
pub use render::{render, render_all, DEFAULT_PLOTS_DIR};
