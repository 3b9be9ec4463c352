pub mod event;
pub mod handler;
pub mod refresh_runtime;
pub mod settings;
pub mod state;
