pub mod catalog;
pub mod history;
pub mod indicators;
pub mod signals;
