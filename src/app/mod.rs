// Presentation layer: per-session screen state and output rendering.

pub mod render;
pub mod session;

pub use session::{BidForm, Notice, Screen, Session};
