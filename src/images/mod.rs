mod capture_date;
mod manager;

pub use capture_date::format_capture_date;
pub use manager::{ImageHandle, ImageManager};
