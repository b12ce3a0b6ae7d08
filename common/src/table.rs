//! 列の整合
//!
//! 記録ごとに列がばらついていても（設定変更前の古い記録など）、
//! 現在の設定に沿った列の揃った表に変換する。CSV書き出しと帳票生成の両方がこの表を使う。

use crate::types::{ColumnConfig, InspectionRecord, OBSERVATIONS_HEADER};

/// 1行分（列の揃った値）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// 文字列列の値（text_headers と同じ並び）
    pub text: Vec<String>,
    /// 写真枠のパス（photo_headers と同じ並び）
    pub photos: Vec<Option<String>>,
}

/// 列の揃った記録表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTable {
    pub text_headers: Vec<String>,
    pub photo_headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl RecordTable {
    /// 記録を現在の設定の列に揃える
    ///
    /// 設定にない列は落とし、記録にない列は空で埋める。
    pub fn reconcile(records: &[InspectionRecord], config: &ColumnConfig) -> Self {
        let text_headers = config.text_headers();
        let photo_headers = config.photo_slots.clone();

        let rows = records
            .iter()
            .map(|record| TableRow {
                text: text_headers
                    .iter()
                    .map(|h| record.text_value(h).to_string())
                    .collect(),
                photos: photo_headers
                    .iter()
                    .map(|slot| record.photo_path(slot).map(str::to_string))
                    .collect(),
            })
            .collect();

        Self {
            text_headers,
            photo_headers,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 全列のヘッダー（文字列列 + 写真枠）
    pub fn headers(&self) -> Vec<&str> {
        self.text_headers
            .iter()
            .chain(self.photo_headers.iter())
            .map(String::as_str)
            .collect()
    }

    /// OBSERVACIONES 列の位置
    pub fn observations_column(&self) -> Option<usize> {
        self.text_headers.iter().position(|h| h == OBSERVATIONS_HEADER)
    }

    /// 参照されている写真パス（重複あり、行・列順）
    pub fn photo_paths(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .flat_map(|row| row.photos.iter().filter_map(|p| p.as_deref()))
    }

    /// CSV用の1行（写真なしは空文字）
    pub fn flat_row(&self, index: usize) -> Option<Vec<&str>> {
        let row = self.rows.get(index)?;
        Some(
            row.text
                .iter()
                .map(String::as_str)
                .chain(row.photos.iter().map(|p| p.as_deref().unwrap_or("")))
                .collect(),
        )
    }
}
