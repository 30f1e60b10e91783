//! Session core: actions, reducers and the store, plus the asynchronous
//! edges (autosave, sensors, project loading).

pub mod action;
pub mod autosave;
pub mod config;
pub mod event_bus;
pub mod input;
pub mod loader;
pub mod reduce;
pub mod render;
pub mod select;
pub mod sensors;
pub mod setup;
pub mod state;
pub mod store;

pub use action::*;
pub use autosave::*;
pub use config::*;
pub use event_bus::*;
pub use loader::*;
pub use reduce::*;
pub use render::*;
pub use sensors::*;
pub use setup::*;
pub use state::*;
pub use store::*;
