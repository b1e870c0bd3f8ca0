mod config;
mod defaults;

pub use self::config::{ClientDefaults, ConfigLoader};
