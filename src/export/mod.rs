pub mod excel;

pub use excel::{render_report, render_report_with_progress};
pub use inspection_common::export::excel_core::{EmbeddedImage, ExcelReport};

use crate::error::{InspectionError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use inspection_common::layout::DEFAULT_REPORT_FILE_NAME;
use std::path::{Path, PathBuf};
use tracing::info;

/// 出力先を決定（ディレクトリ・拡張子なしなら既定のファイル名を付ける）
pub fn output_path(output: Option<&Path>) -> PathBuf {
    match output {
        None => PathBuf::from(DEFAULT_REPORT_FILE_NAME),
        Some(path) if path.is_dir() || path.extension().is_none() => {
            path.join(DEFAULT_REPORT_FILE_NAME)
        }
        Some(path) => path.to_path_buf(),
    }
}

/// 写真準備の進捗バー（`visible` が false なら何も描画しない）
pub fn progress_bar(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} 写真を準備中")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

/// 生成済みの報告書をファイルに書き出す
pub fn write_report(report: &ExcelReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &report.buffer)
        .map_err(|e| InspectionError::ExcelGeneration(format!("{}: {}", path.display(), e)))?;
    info!(path = %path.display(), bytes = report.buffer.len(), "報告書を出力");
    Ok(())
}
