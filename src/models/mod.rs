pub mod asset;
pub mod notification;
pub mod watch_config;

pub use asset::Asset;
pub use notification::Notification;
pub use watch_config::WatchConfig;
