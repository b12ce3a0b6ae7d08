//! 検査記録の型定義
//!
//! CLIと帳票生成で共有される型:
//! - ColumnConfig: チェック項目・写真枠のラベル設定（config_cols.json）
//! - InspectionRecord: 1台分の検査記録（CSVの1行）

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 固定列のヘッダー
pub const MODEL_HEADER: &str = "MODELO";
pub const SERIAL_HEADER: &str = "SERIE";
pub const OBSERVATIONS_HEADER: &str = "OBSERVACIONES";

/// チェック項目の値
pub const MARK_YES: &str = "SÍ";
pub const MARK_NO: &str = "NO";

/// 既定のチェック項目
pub const DEFAULT_CONDITIONS: &[&str] = &[
    "DAÑO EN EMPAQUE",
    "DAÑO FISICO",
    "ACCESORIOS COMPLETOS",
    "PARILLA EN MAL ESTADO",
    "PRESENTA RESTOS METALICOS (VIRUTAS)",
    "TAPAS PRESENTAN OXIDO",
    "PRESENTA RAYAS",
    "TARJETA DE GARANTÍA",
    "TIENE ETIQUETA DE EFICIENCIA ENERGETICA",
];

/// 既定の写真枠
pub const DEFAULT_PHOTO_SLOTS: &[&str] = &[
    "FOTO DE SERIE",
    "FOTO DEL EMPAQUE",
    "FOTO DE PRODUCTO COMPLETO",
    "FOTO PARTE TRASERA",
    "FOTO DE OBSERVACIONES A 50 CM (VIRUTAS)",
    "FOTO DE OBSERVACIONES CERCA (VIRUTAS)",
    "FOTO DE OBSERVACIONES A 50 CM (OXIDO EN TAPILLAS)",
    "FOTO DE OBSERVACIONES CERCA (OXIDO EN TAPILLAS)",
    "FOTO DE OBSERVACIONES A 50 CM (MANCHAS)",
    "FOTO DE OBSERVACIONES CERCA (MANCHAS)",
    "FOTO DE OBSERVACIONES A 50 CM (RAYAS)",
    "FOTO DE OBSERVACIONES CERCA (RAYAS)",
    "FOTO DE ACCESORIOS",
];

/// 列設定
///
/// JSONのキー名は既存の config_cols.json と互換
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    #[serde(rename = "CONDICIONES_INSPECCION")]
    pub conditions: Vec<String>,

    #[serde(rename = "COLUMNAS_IMAGEN")]
    pub photo_slots: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            conditions: DEFAULT_CONDITIONS.iter().map(|s| s.to_string()).collect(),
            photo_slots: DEFAULT_PHOTO_SLOTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ColumnConfig {
    pub fn new(conditions: Vec<String>, photo_slots: Vec<String>) -> Self {
        Self { conditions, photo_slots }
    }

    /// 文字列列のヘッダー（MODELO, SERIE, チェック項目..., OBSERVACIONES）
    pub fn text_headers(&self) -> Vec<String> {
        let mut headers = Vec::with_capacity(self.conditions.len() + 3);
        headers.push(MODEL_HEADER.to_string());
        headers.push(SERIAL_HEADER.to_string());
        headers.extend(self.conditions.iter().cloned());
        headers.push(OBSERVATIONS_HEADER.to_string());
        headers
    }

    /// 全列のヘッダー（文字列列 + 写真枠）
    pub fn all_headers(&self) -> Vec<String> {
        let mut headers = self.text_headers();
        headers.extend(self.photo_slots.iter().cloned());
        headers
    }

    pub fn is_photo_slot(&self, label: &str) -> bool {
        self.photo_slots.iter().any(|s| s == label)
    }

    pub fn is_condition(&self, label: &str) -> bool {
        self.conditions.iter().any(|c| c == label)
    }

    /// JSON文字列から読み込み
    pub fn from_json(content: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// 4スペースインデントのJSONに変換（非ASCII文字はそのまま）
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        // serde_json は常に有効なUTF-8を出力する
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// 1行1ラベルのテキストを分解（前後の空白を除去し、空行は捨てる。重複はそのまま）
pub fn parse_label_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// チェック結果を表記に変換
pub fn condition_mark(checked: bool) -> &'static str {
    if checked { MARK_YES } else { MARK_NO }
}

/// CSVの写真セルを解釈（空・"none"・"nan" は写真なし）
pub fn normalize_photo_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nan")
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 検査記録
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub model: String,

    pub serial: String,

    /// チェック項目 → "SÍ"/"NO"（後から追加された列は空）
    #[serde(default)]
    pub conditions: BTreeMap<String, String>,

    #[serde(default)]
    pub observations: String,

    /// 写真枠 → 画像ファイルのパス
    #[serde(default)]
    pub photos: BTreeMap<String, Option<String>>,

    /// 現在の設定にない列（次回の書き出しで落ちる）
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl InspectionRecord {
    /// チェック項目の値（列がなければ空）
    pub fn condition(&self, label: &str) -> &str {
        self.conditions.get(label).map(String::as_str).unwrap_or("")
    }

    /// 写真枠のパス（未登録・空なら None）
    pub fn photo_path(&self, slot: &str) -> Option<&str> {
        self.photos
            .get(slot)
            .and_then(|p| p.as_deref())
            .filter(|p| !p.trim().is_empty())
    }

    /// ヘッダー名で文字列列の値を取得
    pub fn text_value(&self, header: &str) -> &str {
        match header {
            MODEL_HEADER => &self.model,
            SERIAL_HEADER => &self.serial,
            OBSERVATIONS_HEADER => &self.observations,
            other => self.condition(other),
        }
    }

    /// 設定にある列のうち欠けているものを空値で補う
    pub fn backfill(&mut self, config: &ColumnConfig) {
        for label in &config.conditions {
            self.conditions.entry(label.clone()).or_default();
        }
        for slot in &config.photo_slots {
            self.photos.entry(slot.clone()).or_insert(None);
        }
    }

    /// 写真が1枚以上あるか
    pub fn photo_count(&self) -> usize {
        self.photos.values().filter(|p| p.as_deref().is_some_and(|s| !s.is_empty())).count()
    }
}
