pub mod components;
pub mod layout;
pub mod runner;

pub use runner::run_app;
