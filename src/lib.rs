//! Rig TestKit - input device measurement toolkit
//!
//! Measures pointer polling rate, click speed, reaction time (input lag),
//! keyboard rollover and pointer DPI. The measurement core is driven purely
//! by timestamped input events and explicit ticks, so every tool can be
//! exercised deterministically; the bundled terminal front end feeds it
//! real mouse and keyboard input.

pub mod config;
pub mod input;
pub mod report;
pub mod timer;
pub mod tools;
pub mod ui;
pub mod utils;

pub use config::Config;
