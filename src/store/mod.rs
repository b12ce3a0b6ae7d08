//! 検査記録の保存
//!
//! 記録は追記のみ。追記のたびにCSV全体を書き直す。
//! 写真のパスはデータディレクトリからの相対パス（`imagenes_persistentes/...`）で持つ。

pub mod capture;
pub mod csv_table;

pub use capture::PhotoUpload;

use crate::error::{InspectionError, Recovered, Result};
use crate::paths::{DataPaths, IMAGE_DIR_NAME};
use chrono::NaiveDateTime;
use inspection_common::types::condition_mark;
use inspection_common::{ColumnConfig, InspectionRecord};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// 入力フォームの送信内容
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub model: String,
    pub serial: String,
    /// チェックされた項目（それ以外の設定項目は "NO"）
    pub checked: Vec<String>,
    pub observations: String,
    /// 写真枠 → アップロード
    pub photos: BTreeMap<String, PhotoUpload>,
}

impl Submission {
    /// 必須項目の確認（前後の空白は除いて判定）
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(InspectionError::Validation("MODELO".to_string()));
        }
        if self.serial.trim().is_empty() {
            return Err(InspectionError::Validation("SERIE".to_string()));
        }
        Ok(())
    }
}

/// 全削除の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearSummary {
    pub records: usize,
    pub image_files: usize,
}

/// 記録の一覧（メモリ上）とその保存先
#[derive(Debug)]
pub struct RecordStore {
    paths: DataPaths,
    records: Vec<InspectionRecord>,
    /// 読めなかったCSVが残っている（次の保存前に退避する）
    unreadable: bool,
}

impl RecordStore {
    /// CSVから全記録を読み込む
    ///
    /// ファイルがなければ空。読めなければ空の一覧と警告を返し、ファイルには触れない。
    /// 読めなかったファイルは次の `append` の前に別名へ退避される。
    pub fn load_all(paths: DataPaths, config: &ColumnConfig) -> Recovered<Self> {
        let file = paths.records_file();
        if !file.exists() {
            return Recovered::ok(Self {
                paths,
                records: Vec::new(),
                unreadable: false,
            });
        }

        match csv_table::read_records(&file, config) {
            Ok(records) => {
                debug!(path = %file.display(), count = records.len(), "記録を読み込み");
                Recovered::ok(Self {
                    paths,
                    records,
                    unreadable: false,
                })
            }
            Err(e) => {
                warn!(path = %file.display(), error = %e, "記録ファイルの読み込みに失敗");
                Recovered::with_warning(
                    Self {
                        paths,
                        records: Vec::new(),
                        unreadable: true,
                    },
                    InspectionError::PersistenceRead(format!("{}: {}", file.display(), e)),
                )
            }
        }
    }

    pub fn records(&self) -> &[InspectionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// 記録を1件追加して保存
    ///
    /// 必須項目が空なら何も書かない。CSVの書き直しに失敗した場合、記録はメモリに残る。
    /// 読めなかったCSVがあれば上書きせず `*.corrupt-{YYYYmmddHHMMSS}` に退避してから書く。
    pub fn append(
        &mut self,
        submission: Submission,
        config: &ColumnConfig,
        now: NaiveDateTime,
    ) -> Result<InspectionRecord> {
        submission.validate()?;
        if self.unreadable {
            self.set_aside_unreadable(now)?;
        }

        let model = submission.model.trim().to_string();
        let serial = submission.serial.trim().to_string();

        for label in &submission.checked {
            if !config.is_condition(label) {
                warn!(label = %label, "設定にないチェック項目を無視");
            }
        }

        let mut record = InspectionRecord {
            model: model.clone(),
            serial: serial.clone(),
            observations: submission.observations,
            ..Default::default()
        };
        for label in &config.conditions {
            let checked = submission.checked.iter().any(|c| c == label);
            record
                .conditions
                .insert(label.clone(), condition_mark(checked).to_string());
        }

        let stored = self.store_photos(&submission.photos, config, &model, &serial, now)?;
        for slot in &config.photo_slots {
            record.photos.insert(slot.clone(), stored.get(slot).cloned());
        }

        self.records.push(record.clone());
        csv_table::write_records(&self.paths.records_file(), &self.records, config)?;

        info!(
            model = %record.model,
            serial = %record.serial,
            photos = record.photo_count(),
            total = self.records.len(),
            "記録を保存"
        );
        Ok(record)
    }

    /// 読めなかったCSVを別名に移す（失敗したら何も書かずにエラー）
    fn set_aside_unreadable(&mut self, now: NaiveDateTime) -> Result<()> {
        let file = self.paths.records_file();
        let base = format!(
            "{}.corrupt-{}",
            file.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            now.format("%Y%m%d%H%M%S")
        );

        let mut backup = file.with_file_name(&base);
        let mut n = 1;
        while backup.exists() {
            backup = file.with_file_name(format!("{}-{}", base, n));
            n += 1;
        }

        if file.exists() {
            std::fs::rename(&file, &backup).map_err(|e| {
                InspectionError::PersistenceWrite(format!(
                    "{} を退避できません: {}",
                    file.display(),
                    e
                ))
            })?;
            warn!(
                path = %file.display(),
                backup = %backup.display(),
                "読めなかった記録ファイルを退避"
            );
        }
        self.unreadable = false;
        Ok(())
    }

    /// 写真を保存し、写真枠 → 相対パス を返す（途中で失敗したら保存済みの分を消す）
    fn store_photos(
        &self,
        uploads: &BTreeMap<String, PhotoUpload>,
        config: &ColumnConfig,
        model: &str,
        serial: &str,
        now: NaiveDateTime,
    ) -> Result<BTreeMap<String, String>> {
        let image_dir = self.paths.image_dir();
        let mut written: Vec<PathBuf> = Vec::new();
        let mut stored = BTreeMap::new();

        for (slot, upload) in uploads {
            if !config.is_photo_slot(slot) {
                warn!(slot = %slot, "設定にない写真枠のアップロードを無視");
                continue;
            }

            match capture::store_photo(&image_dir, model, serial, slot, upload, now) {
                Ok(path) => {
                    stored.insert(slot.clone(), relative_photo_path(&path));
                    written.push(path);
                }
                Err(e) => {
                    for path in &written {
                        std::fs::remove_file(path).ok();
                    }
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    /// 全記録と全画像を削除（元に戻せない）
    pub fn clear(&mut self) -> Result<ClearSummary> {
        let image_dir = self.paths.image_dir();
        let summary = ClearSummary {
            records: self.records.len(),
            image_files: count_files(&image_dir),
        };

        let records_file = self.paths.records_file();
        if records_file.exists() {
            std::fs::remove_file(&records_file)?;
        }
        if image_dir.exists() {
            std::fs::remove_dir_all(&image_dir)?;
        }
        self.records.clear();
        self.unreadable = false;

        info!(
            records = summary.records,
            image_files = summary.image_files,
            "全記録を削除"
        );
        Ok(summary)
    }
}

/// `imagenes_persistentes/{file}` の形に変換
fn relative_photo_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}/{}", IMAGE_DIR_NAME, file_name)
}

fn count_files(dir: &Path) -> usize {
    if !dir.exists() {
        return 0;
    }
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}
