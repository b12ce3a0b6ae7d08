//! レイアウト設定モジュール
//!
//! 検査帳票（xlsx）の寸法・配色の定義

// ============================================
// シート
// ============================================

/// シート名
pub const SHEET_NAME: &str = "Sheet1";

/// ダウンロード時の既定ファイル名
pub const DEFAULT_REPORT_FILE_NAME: &str = "Inspeccion_Reporte_Mobil.xlsx";

// ============================================
// 行・列（pt / Excel幅単位）
// ============================================

/// ヘッダー行の高さ（pt）
pub const HEADER_ROW_HEIGHT_PT: f64 = 60.0;

/// データ行の高さ（pt）。写真を載せるためヘッダーより高い
pub const DATA_ROW_HEIGHT_PT: f64 = 75.0;

/// 通常列の幅
pub const NORMAL_COL_WIDTH: f64 = 14.0;

/// OBSERVACIONES 列の幅
pub const OBSERVATIONS_COL_WIDTH: f64 = 28.0;

/// 1セルに書ける文字数の上限（Excelの仕様）
pub const MAX_CELL_CHARS: usize = 32_767;

// ============================================
// 写真（px）
// ============================================

/// 埋め込み画像の幅（px）
pub const IMAGE_WIDTH_PX: u32 = 150;

/// 埋め込み画像の高さ（px）
pub const IMAGE_HEIGHT_PX: u32 = 150;

// ============================================
// 配色
// ============================================

/// ヘッダーの塗りつぶし（LightSeaGreen）
pub const HEADER_FILL_RGB: u32 = 0x20B2AA;

/// ヘッダーの文字色
pub const HEADER_FONT_RGB: u32 = 0xFFFFFF;

/// 列の幅
pub fn column_width(is_observations: bool) -> f64 {
    if is_observations {
        OBSERVATIONS_COL_WIDTH
    } else {
        NORMAL_COL_WIDTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_row_taller_than_header() {
        assert!(DATA_ROW_HEIGHT_PT > HEADER_ROW_HEIGHT_PT);
    }

    #[test]
    fn test_observations_wider() {
        assert!(column_width(true) > column_width(false));
        assert_eq!(column_width(false), 14.0);
    }
}
