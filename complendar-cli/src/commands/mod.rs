pub mod convert;
pub mod preview;

pub use crate::utils::tui::create_spinner;
