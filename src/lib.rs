//! Broadcast overlay: clock, weather, travel times, transit status, a
//! scrolling ticker and a spoken summary, all driven by one JSON config.

pub mod config;
pub mod overlay;
pub mod speaker;
pub mod surface;
pub mod util;
pub mod weather;
pub mod widget;
