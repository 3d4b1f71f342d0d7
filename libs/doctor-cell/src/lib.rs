pub mod handlers;
pub mod router;
pub mod models;
pub mod schedule;
pub mod services;

pub use models::*;
pub use schedule::{HourWindow, SlotPolicy};
pub use services::*;
