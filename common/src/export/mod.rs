//! Export core modules shared by the CLI and its tests.

#[cfg(feature = "excel")]
pub mod excel_core;
