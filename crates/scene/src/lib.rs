pub mod anchor;
pub mod light;
pub mod lights;
pub mod model;
pub mod placement;
pub mod state;
pub mod transform;

pub use anchor::*;
pub use light::*;
pub use lights::*;
pub use model::*;
pub use placement::*;
pub use state::*;
pub use transform::*;
