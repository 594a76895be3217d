//! LubanKit Settings Crate
//!
//! Handles editor configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{
    Config, HistorySettings, MachineSettings, MachineSize, NoticeSettings, NoticeTemplates,
    PROGRESS_PLACEHOLDER,
};
pub use error::{SettingsError, SettingsResult};
