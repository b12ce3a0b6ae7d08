//! 写真の保存
//!
//! アップロードされたバイト列をそのまま画像フォルダに書き出す（検証・縮小・再圧縮はしない）。

use crate::error::{InspectionError, Result};
use crate::imaging::sniff_extension;
use chrono::NaiveDateTime;
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};

/// アップロードされた写真
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// 元のファイル名（拡張子の決定に使う）
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// ディスク上のファイルから読み込む
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(InspectionError::InvalidPhotoArg(format!(
                "ファイルが見つかりません: {}",
                path.display()
            )));
        }
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }

    /// 保存時の拡張子（ファイル名 → 内容から推定 → "bin"）
    pub fn extension(&self) -> String {
        lazy_static::lazy_static! {
            static ref EXT_RE: Regex = Regex::new(r"^[A-Za-z0-9]{1,5}$").unwrap();
        }

        let from_name = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| EXT_RE.is_match(ext));

        match from_name {
            Some(ext) => ext.to_lowercase(),
            None => sniff_extension(&self.bytes).unwrap_or("bin").to_string(),
        }
    }
}

/// ファイル名の部品から空白・パス区切り等を除去
pub fn sanitize_component(value: &str) -> String {
    lazy_static::lazy_static! {
        static ref UNSAFE_RE: Regex = Regex::new(r#"[\s/\\:*?"<>|]"#).unwrap();
    }
    let cleaned = UNSAFE_RE.replace_all(value.trim(), "_").into_owned();
    // "." や ".." だけの部品は親ディレクトリ参照になりうる
    if cleaned.chars().all(|c| c == '.') {
        cleaned.replace('.', "_")
    } else {
        cleaned
    }
}

/// 保存ファイル名の基部 `{model}_{serial}_{slot}_{YYYYmmddHHMMSS}`
pub fn photo_file_stem(model: &str, serial: &str, slot: &str, now: NaiveDateTime) -> String {
    format!(
        "{}_{}_{}_{}",
        sanitize_component(model),
        sanitize_component(serial),
        sanitize_component(slot),
        now.format("%Y%m%d%H%M%S")
    )
}

/// 写真を画像フォルダに保存し、保存先のパスを返す
///
/// 同名ファイルがあれば `_1`, `_2`, … を付けて上書きを避ける。
pub fn store_photo(
    image_dir: &Path,
    model: &str,
    serial: &str,
    slot: &str,
    upload: &PhotoUpload,
    now: NaiveDateTime,
) -> Result<PathBuf> {
    std::fs::create_dir_all(image_dir)?;

    let stem = photo_file_stem(model, serial, slot, now);
    let ext = upload.extension();

    let mut attempt = 0u32;
    loop {
        let file_name = if attempt == 0 {
            format!("{}.{}", stem, ext)
        } else {
            format!("{}_{}.{}", stem, attempt, ext)
        };
        let path = image_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut file) => {
                if let Err(e) = file.write_all(&upload.bytes) {
                    drop(file);
                    std::fs::remove_file(&path).ok();
                    return Err(e.into());
                }
                return Ok(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}
