//! HTTP surface of the textshot service: the render endpoint loaded by the
//! headless browser, plus health and metrics.

pub mod api;
pub mod metrics;
pub mod state;
