pub mod cursor;
pub mod timer;

pub use cursor::CycleCursor;
pub use timer::{CycleTimer, TimerHandle};
