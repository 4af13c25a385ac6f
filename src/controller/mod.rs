// CONTROLLER: Input, walk logic, and update loop
pub mod input;
pub mod look;
pub mod movement;
pub mod walk_state;
pub mod frame_loop;

pub use input::{InputEvent, InputState, InputProcessor};
pub use look::LookController;
pub use movement::MovementResolver;
pub use walk_state::WalkState;
pub use frame_loop::FrameLoop;
