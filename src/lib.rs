#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod language;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig};
pub use error::DiagramError;
pub use language::Language;
pub use layout::{compute_layout, DiagramLayout};
pub use model::Model;
pub use render::render_svg;
pub use theme::Theme;
