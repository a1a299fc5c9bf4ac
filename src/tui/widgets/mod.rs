pub mod step_progress;
pub mod sticker;
