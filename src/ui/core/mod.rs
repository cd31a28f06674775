pub mod alerts;
pub mod format;
pub mod state;
