//! Shared terminal output helpers.

use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};

/// Table with the preset used by every command.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table
}

/// `on` / `off` / `unset` for a tri-state directive value.
pub fn format_flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "on",
        Some(false) => "off",
        None => "unset",
    }
}
