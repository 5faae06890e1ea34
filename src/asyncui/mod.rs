mod controller;
mod error;
mod renderer;

pub use controller::{AsyncUi, UpdateSender};
pub use error::{ControllerError, ErrorKind, RenderError};
pub use renderer::PhaseRenderer;
