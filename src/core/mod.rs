pub mod dispatch;
pub mod error;
pub mod format;
pub mod params;
