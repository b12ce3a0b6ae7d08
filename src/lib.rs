//! 製品受入検査の記録と写真付き報告書の生成
//!
//! - 列設定（チェック項目・写真枠）の読み書き
//! - 検査記録CSVへの追記と写真の保存
//! - EXIFの向きを補正した写真を埋め込んだExcel報告書の生成

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod form;
pub mod imaging;
pub mod paths;
pub mod session;
pub mod store;

pub use error::{InspectionError, Recovered, Result};
pub use paths::DataPaths;
pub use session::Session;
