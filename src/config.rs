//! 列設定の読み書き（config_cols.json）

use crate::error::{InspectionError, Recovered, Result};
use crate::paths::write_atomic;
use inspection_common::ColumnConfig;
use std::path::Path;
use tracing::{info, warn};

/// 設定を読み込む
///
/// ファイルがなければ既定値。壊れていれば既定値と警告を返す（パニックしない）。
pub fn load(path: &Path) -> Recovered<ColumnConfig> {
    if !path.exists() {
        return Recovered::ok(ColumnConfig::default());
    }

    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| ColumnConfig::from_json(&content).map_err(|e| e.to_string()));

    match parsed {
        Ok(config) => Recovered::ok(config),
        Err(reason) => {
            warn!(path = %path.display(), %reason, "列設定の読み込みに失敗、既定値を使用");
            Recovered::with_warning(
                ColumnConfig::default(),
                InspectionError::ConfigRead(format!("{}: {}", path.display(), reason)),
            )
        }
    }
}

/// 設定を丸ごと書き換える
pub fn save(path: &Path, config: &ColumnConfig) -> Result<()> {
    let content = config
        .to_json_pretty()
        .map_err(|e| InspectionError::ConfigWrite(e.to_string()))?;

    write_atomic(path, content.as_bytes())
        .map_err(|e| InspectionError::ConfigWrite(format!("{}: {}", path.display(), e)))?;

    info!(
        path = %path.display(),
        conditions = config.conditions.len(),
        photo_slots = config.photo_slots.len(),
        "列設定を保存"
    );
    Ok(())
}

/// 既定値に戻す
pub fn reset(path: &Path) -> Result<ColumnConfig> {
    let config = ColumnConfig::default();
    save(path, &config)?;
    Ok(config)
}
