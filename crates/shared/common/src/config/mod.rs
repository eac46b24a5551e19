//! Application configuration types.
//!
//! Settings records, override layers and constants.

mod constants;
mod settings;

pub use constants::*;
pub use settings::{
    DatabaseOverrides, DatabaseSettings, MailOverrides, MailSettings, PaginationOverrides,
    PaginationSettings, SettingValue, Settings, SettingsOverrides,
};
