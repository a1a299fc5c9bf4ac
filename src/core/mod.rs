pub mod credentials;
pub mod diffusion;
pub mod gemini;
pub mod logging;
pub mod prompt;
pub mod sticker;
pub mod wizard;
