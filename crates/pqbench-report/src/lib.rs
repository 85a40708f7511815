pub mod render;
pub mod summary;


pub use render::{render, render_summary};
pub use summary::{summarize, AlgorithmSummary, Summary, TimingStats};
