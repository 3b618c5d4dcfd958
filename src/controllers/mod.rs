pub mod home_controller;
pub mod monitor_controller;
pub mod assets_controller;
pub mod config_controller;
pub mod realtime_controller;
