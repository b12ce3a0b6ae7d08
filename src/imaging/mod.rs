mod exif;
pub mod orientation;

pub use self::exif::read_orientation;
pub use self::orientation::{correct_orientation, Orientation};

use crate::error::{InspectionError, Result};
use image::ImageFormat;
use inspection_common::export::excel_core::PhotoLoad;
use std::io::Cursor;
use std::path::Path;

/// 向きを補正して PNG（可逆）に再エンコード
pub fn prepare_photo(bytes: &[u8]) -> Result<Vec<u8>> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| InspectionError::ImageProcess(format!("デコード失敗: {}", e)))?;

    let orientation = read_orientation(bytes)
        .map(Orientation::from_exif)
        .map_err(|e| InspectionError::ImageProcess(format!("EXIF読み込み失敗: {}", e)))?;

    let corrected = correct_orientation(image, orientation);

    let mut png = Vec::new();
    corrected
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| InspectionError::ImageProcess(format!("PNG変換失敗: {}", e)))?;
    Ok(png)
}

/// 帳票用に写真を読み込む
///
/// ファイルがなければ Missing。補正できたら元バイト列は捨て、失敗したときだけ元バイト列を返す。
pub fn load_photo(path: &Path) -> PhotoLoad {
    if !path.is_file() {
        return PhotoLoad::Missing;
    }

    // 読み込み後すぐにファイルを閉じる
    let original = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return PhotoLoad::Unreadable(e.to_string()),
    };

    match prepare_photo(&original) {
        Ok(png) => PhotoLoad::Corrected(png),
        Err(e) => PhotoLoad::Uncorrected {
            original,
            reason: e.to_string(),
        },
    }
}

/// バイト列から拡張子を推定
pub fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
}
