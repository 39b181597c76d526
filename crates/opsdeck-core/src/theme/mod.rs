//! Theme preferences and partial updates.

mod model;

pub use model::{ThemeConfig, ThemePatch};
