//! 1回のコマンド実行で使う状態（設定・記録・保存先）

use crate::config;
use crate::error::{InspectionError, Result};
use crate::export::{self, ExcelReport};
use crate::paths::DataPaths;
use crate::store::{ClearSummary, RecordStore, Submission};
use indicatif::ProgressBar;
use inspection_common::{ColumnConfig, InspectionRecord};

#[derive(Debug)]
pub struct Session {
    paths: DataPaths,
    config: ColumnConfig,
    store: RecordStore,
    /// 読み込み時に回復した失敗（既定値・空の一覧で続行している）
    warnings: Vec<InspectionError>,
}

impl Session {
    /// 設定 → 記録 の順に読み込む
    pub fn open(paths: DataPaths) -> Self {
        let mut warnings = Vec::new();

        let loaded_config = config::load(&paths.config_file());
        warnings.extend(loaded_config.warning);
        let config = loaded_config.value;

        let loaded_store = RecordStore::load_all(paths.clone(), &config);
        warnings.extend(loaded_store.warning);

        Self {
            paths,
            config,
            store: loaded_store.value,
            warnings,
        }
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    pub fn config(&self) -> &ColumnConfig {
        &self.config
    }

    pub fn records(&self) -> &[InspectionRecord] {
        self.store.records()
    }

    pub fn warnings(&self) -> &[InspectionError] {
        &self.warnings
    }

    /// フォームの内容を記録する（撮影時刻は現在のローカル時刻）
    pub fn submit(&mut self, submission: Submission) -> Result<InspectionRecord> {
        let now = chrono::Local::now().naive_local();
        self.store.append(submission, &self.config, now)
    }

    pub fn render_report(&self, progress: Option<&ProgressBar>) -> Result<ExcelReport> {
        export::render_report_with_progress(
            self.store.records(),
            &self.config,
            self.paths.root(),
            progress,
        )
    }

    pub fn clear_all(&mut self) -> Result<ClearSummary> {
        self.store.clear()
    }

    /// 設定を保存してから差し替える（保存に失敗したら現在の設定のまま）
    pub fn update_config(&mut self, config: ColumnConfig) -> Result<()> {
        config::save(&self.paths.config_file(), &config)?;
        self.config = config;
        Ok(())
    }

    pub fn reset_config(&mut self) -> Result<()> {
        self.config = config::reset(&self.paths.config_file())?;
        Ok(())
    }
}
