mod behavior;
mod systems;
mod types;

pub use behavior::*;
pub use systems::*;
pub use types::*;
