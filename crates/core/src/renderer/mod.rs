//! Render trigger.
//!
//! A renderer instructs an external browser automation service to visit the
//! render endpoint for a request identifier and returns the screenshot.

mod error;
mod traits;
mod webdriver;

pub use error::RenderError;
pub use traits::Renderer;
pub use webdriver::WebDriverRenderer;
