//! Host-facing input contracts: the tabular data view and the
//! configuration bag delivered on every update.

pub mod data_view;
pub mod settings;

pub use data_view::{CellValue, Column, ColumnKind, DataView, format_trimmed};
pub use settings::{ColorSetting, SettingValue, SettingsBag};
