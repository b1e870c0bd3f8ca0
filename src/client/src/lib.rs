pub mod config_manager;
pub mod constants;
pub mod diagnostics;
pub mod dsn;
pub mod error;
pub mod events;
pub mod exporters;
pub mod panic_hook;
pub mod utils;

pub mod raven_client;

pub use config_manager::{ClientDefaults, ConfigLoader};
pub use dsn::Dsn;
pub use error::{RavenError, Result};
pub use exporters::transport::Delivery;
pub use raven_client::RavenClient;
