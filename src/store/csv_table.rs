//! 記録CSV（datos_maestro.csv）の読み書き
//!
//! すべての値を文字列として扱う。列の並びは「文字列列 → 写真枠」。

use crate::error::{InspectionError, Result};
use crate::paths::write_atomic;
use csv::StringRecord;
use inspection_common::types::{
    normalize_photo_cell, MODEL_HEADER, OBSERVATIONS_HEADER, SERIAL_HEADER,
};
use inspection_common::{ColumnConfig, InspectionRecord, RecordTable};
use std::path::Path;

/// CSVを読み込み、現在の設定の列を補完した記録を返す
pub fn read_records(path: &Path, config: &ColumnConfig) -> Result<Vec<InspectionRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(record_from_row(&headers, &row, config));
    }
    Ok(records)
}

fn record_from_row(
    headers: &StringRecord,
    row: &StringRecord,
    config: &ColumnConfig,
) -> InspectionRecord {
    let mut record = InspectionRecord::default();

    for (header, value) in headers.iter().zip(row.iter()) {
        match header {
            MODEL_HEADER => record.model = value.to_string(),
            SERIAL_HEADER => record.serial = value.to_string(),
            OBSERVATIONS_HEADER => record.observations = value.to_string(),
            h if config.is_photo_slot(h) => {
                record.photos.insert(h.to_string(), normalize_photo_cell(value));
            }
            h if config.is_condition(h) => {
                record.conditions.insert(h.to_string(), value.to_string());
            }
            h => {
                record.extra.insert(h.to_string(), value.to_string());
            }
        }
    }

    record.backfill(config);
    record
}

/// 記録全体を現在の設定の列だけで書き直す（追記ではなく全置換）
pub fn write_records(path: &Path, records: &[InspectionRecord], config: &ColumnConfig) -> Result<()> {
    let table = RecordTable::reconcile(records, config);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.headers())?;
    for index in 0..table.len() {
        if let Some(row) = table.flat_row(index) {
            writer.write_record(row)?;
        }
    }
    let buffer = writer
        .into_inner()
        .map_err(|e| InspectionError::PersistenceWrite(e.to_string()))?;

    write_atomic(path, &buffer)
        .map_err(|e| InspectionError::PersistenceWrite(format!("{}: {}", path.display(), e)))
}
