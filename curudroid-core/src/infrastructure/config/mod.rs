pub mod app_config;

pub use app_config::{config_summary, mask_secret, AppConfig};
