//! Inspection Common Library
//!
//! CLIと帳票生成で共有される型とユーティリティ

pub mod types;
pub mod table;
pub mod layout;
pub mod error;
pub mod export;

pub use types::{ColumnConfig, InspectionRecord, parse_label_lines};
pub use table::{RecordTable, TableRow};
pub use error::{Error, Result};
