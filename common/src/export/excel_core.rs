//! Excel生成（共通ライブラリ）
//!
//! layout.rs の定義を使用して検査記録の一覧表を生成する。
//! 画像の読み込み・向き補正は呼び出し側（PhotoSource）に任せ、ここではセルへの配置だけを行う。
//! 個々のセルの失敗は警告に回し、報告書全体は止めない。

use crate::error::{Error, Result};
use crate::layout::{
    column_width, DATA_ROW_HEIGHT_PT, HEADER_FILL_RGB, HEADER_FONT_RGB, HEADER_ROW_HEIGHT_PT,
    IMAGE_HEIGHT_PX, IMAGE_WIDTH_PX, MAX_CELL_CHARS, SHEET_NAME,
};
use crate::table::RecordTable;
use rust_xlsxwriter::*;
use std::borrow::Cow;
use std::collections::BTreeSet;

/// 画像ローダーの結果
#[derive(Debug, Clone)]
pub enum PhotoLoad {
    /// ファイルが存在しない（セルは空のまま、警告なし）
    Missing,
    /// 向き補正済みのPNG
    Corrected(Vec<u8>),
    /// 向き補正できなかった画像（元バイト列をそのまま使う）
    Uncorrected { original: Vec<u8>, reason: String },
    /// 存在するが読み込めない
    Unreadable(String),
}

/// 写真の供給元
///
/// `load` はセルごとに1回呼ばれる。呼び出し側は返した画像を保持し続けなくてよい。
pub trait PhotoSource {
    fn load(&mut self, path: &str) -> PhotoLoad;

    /// 補正済み画像を挿入できなかったときに元のバイト列を取り直す
    fn original(&mut self, path: &str) -> std::result::Result<Vec<u8>, String>;
}

/// クロージャを PhotoSource として使う（元画像の再取得はできない）
struct LoaderFn<F>(F);

impl<F> PhotoSource for LoaderFn<F>
where
    F: FnMut(&str) -> PhotoLoad,
{
    fn load(&mut self, path: &str) -> PhotoLoad {
        (self.0)(path)
    }

    fn original(&mut self, _path: &str) -> std::result::Result<Vec<u8>, String> {
        Err("元画像を再取得できません".to_string())
    }
}

/// 埋め込んだ画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub row: u32,
    pub col: u16,
    pub slot: String,
    pub path: String,
    /// 埋め込んだビットマップの幅（px）
    pub width_px: u32,
    /// 埋め込んだビットマップの高さ（px）
    pub height_px: u32,
    /// 補正済み画像を使えず元画像で代替した場合の理由
    pub fallback: Option<String>,
}

/// 生成結果
#[derive(Debug, Clone)]
pub struct ExcelReport {
    pub buffer: Vec<u8>,
    pub images: Vec<EmbeddedImage>,
    /// 挿入できなかった画像・切り詰めた文字列などの警告
    pub warnings: Vec<String>,
}

impl ExcelReport {
    /// 画像を埋め込んだセル位置
    pub fn image_cells(&self) -> BTreeSet<(u32, u16)> {
        self.images.iter().map(|img| (img.row, img.col)).collect()
    }
}

/// セルの上限を超える文字列を切り詰める（超えていなければ借用のまま）
pub fn fit_cell_text(value: &str) -> Cow<'_, str> {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => Cow::Owned(value[..cut].to_string()),
        None => Cow::Borrowed(value),
    }
}

/// Excelをバッファに生成
///
/// # Arguments
/// * `table` - 列を揃えた記録表
/// * `image_loader` - 写真パスから画像を取得するクロージャ
pub fn generate_excel_buffer<F>(table: &RecordTable, image_loader: F) -> Result<ExcelReport>
where
    F: FnMut(&str) -> PhotoLoad,
{
    generate_excel_with_source(table, &mut LoaderFn(image_loader))
}

/// PhotoSource から写真を取りながらExcelを生成
pub fn generate_excel_with_source<S>(table: &RecordTable, source: &mut S) -> Result<ExcelReport>
where
    S: PhotoSource + ?Sized,
{
    let mut workbook = Workbook::new();

    // フォーマット定義
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(HEADER_FONT_RGB))
        .set_background_color(Color::RGB(HEADER_FILL_RGB))
        .set_pattern(FormatPattern::Solid)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();

    let cell_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|e| Error::Excel(format!("シート名設定エラー: {}", e)))?;

    let text_cols = table.text_headers.len();
    let observations_col = table.observations_column();

    let mut images = Vec::new();
    let mut warnings = Vec::new();

    // ヘッダー行（文字列列 → 写真枠の順）
    worksheet
        .set_row_height(0, HEADER_ROW_HEIGHT_PT)
        .map_err(|e| Error::Excel(format!("行高さ設定エラー: {}", e)))?;
    for (idx, header) in table.headers().into_iter().enumerate() {
        let col = idx as u16;
        write_text(worksheet, 0, col, header, &header_format, &mut warnings);
        worksheet
            .set_column_width(col, column_width(observations_col == Some(idx)))
            .map_err(|e| Error::Excel(format!("列幅設定エラー: {}", e)))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let excel_row = row_idx as u32 + 1;
        if let Err(e) = worksheet.set_row_height(excel_row, DATA_ROW_HEIGHT_PT) {
            warnings.push(format!("{}行目を書き込めません: {}", excel_row + 1, e));
            continue;
        }

        for (col_idx, value) in row.text.iter().enumerate() {
            write_text(worksheet, excel_row, col_idx as u16, value, &cell_format, &mut warnings);
        }

        for (slot_idx, path) in row.photos.iter().enumerate() {
            let Some(path) = path.as_deref() else {
                continue;
            };
            let col = (text_cols + slot_idx) as u16;
            let slot = &table.photo_headers[slot_idx];

            let placed = match source.load(path) {
                PhotoLoad::Missing => None,
                PhotoLoad::Unreadable(reason) => {
                    warnings.push(format!("画像を読み込めません '{}': {}", path, reason));
                    None
                }
                PhotoLoad::Corrected(png) => {
                    let first = embed_image(worksheet, excel_row, col, &png);
                    drop(png);
                    match first {
                        Ok(size) => Some((size, None)),
                        // 補正済み画像が使えなければ元画像で再試行
                        Err(reason) => source
                            .original(path)
                            .and_then(|original| embed_image(worksheet, excel_row, col, &original))
                            .map(|size| (size, Some(reason.clone())))
                            .map_err(|retry| {
                                warnings.push(format!(
                                    "画像の挿入に失敗 '{}': {}（向き補正: {}）",
                                    path, retry, reason
                                ));
                            })
                            .ok(),
                    }
                }
                PhotoLoad::Uncorrected { original, reason } => {
                    match embed_image(worksheet, excel_row, col, &original) {
                        Ok(size) => Some((size, Some(reason))),
                        Err(retry) => {
                            warnings.push(format!(
                                "画像の挿入に失敗 '{}': {}（向き補正: {}）",
                                path, retry, reason
                            ));
                            None
                        }
                    }
                }
            };

            if let Some(((width_px, height_px), fallback)) = placed {
                images.push(EmbeddedImage {
                    row: excel_row,
                    col,
                    slot: slot.clone(),
                    path: path.to_string(),
                    width_px,
                    height_px,
                    fallback,
                });
            }
        }
    }

    // バッファに書き出し
    let buffer = workbook
        .save_to_buffer()
        .map_err(|e| Error::Excel(format!("Excel保存エラー: {}", e)))?;

    Ok(ExcelReport {
        buffer,
        images,
        warnings,
    })
}

/// 文字列セルを書く（長すぎる値は切り詰め、書けなければ警告）
fn write_text(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &str,
    format: &Format,
    warnings: &mut Vec<String>,
) {
    let text = fit_cell_text(value);
    if let Cow::Owned(_) = text {
        warnings.push(format!(
            "{}行{}列目の文字列が{}文字を超えるため切り詰めました",
            row + 1,
            col + 1,
            MAX_CELL_CHARS
        ));
    }
    if let Err(e) = worksheet.write_string_with_format(row, col, text.as_ref(), format) {
        warnings.push(format!("{}行{}列目を書き込めません: {}", row + 1, col + 1, e));
    }
}

/// 画像を固定サイズでセルに配置し、元のビットマップ寸法を返す
fn embed_image(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    data: &[u8],
) -> std::result::Result<(u32, u32), String> {
    let image =
        Image::new_from_buffer(data).map_err(|e| format!("画像読み込みエラー: {}", e))?;
    let size = (image.width().round() as u32, image.height().round() as u32);

    let image = image
        .set_scale_to_size(IMAGE_WIDTH_PX, IMAGE_HEIGHT_PX, false)
        .set_object_movement(ObjectMovement::MoveButDontSizeWithCells);

    worksheet
        .insert_image(row, col, &image)
        .map_err(|e| format!("画像埋め込みエラー: {}", e))?;

    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnConfig, InspectionRecord, MARK_NO, MARK_YES};
    use calamine::{Reader, Xlsx};
    use std::io::Cursor;

    /// 1x1 PNG
    const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
        0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78,
        0x9C, 0x63, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00,
        0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    fn config() -> ColumnConfig {
        ColumnConfig::new(
            vec!["DAÑO FISICO".to_string(), "PRESENTA RAYAS".to_string()],
            vec!["FOTO DE SERIE".to_string(), "FOTO DEL EMPAQUE".to_string()],
        )
    }

    fn record(serial: &str, photo: Option<&str>) -> InspectionRecord {
        let mut record = InspectionRecord {
            model: "RF28".to_string(),
            serial: serial.to_string(),
            observations: "sin novedad".to_string(),
            ..Default::default()
        };
        record.conditions.insert("DAÑO FISICO".to_string(), MARK_YES.to_string());
        record.conditions.insert("PRESENTA RAYAS".to_string(), MARK_NO.to_string());
        record
            .photos
            .insert("FOTO DE SERIE".to_string(), photo.map(str::to_string));
        record
    }

    fn read_cells(buffer: &[u8]) -> Vec<Vec<String>> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(buffer.to_vec())).expect("xlsx読み込み失敗");
        let range = workbook.worksheet_range(SHEET_NAME).expect("シート取得失敗");
        range
            .rows()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_headers_and_text_cells() {
        let table = RecordTable::reconcile(&[record("SN001", None)], &config());
        let report = generate_excel_buffer(&table, |_| PhotoLoad::Missing).unwrap();

        let cells = read_cells(&report.buffer);
        assert_eq!(
            cells[0],
            vec![
                "MODELO", "SERIE", "DAÑO FISICO", "PRESENTA RAYAS", "OBSERVACIONES",
                "FOTO DE SERIE", "FOTO DEL EMPAQUE"
            ]
        );
        assert_eq!(&cells[1][..5], &["RF28", "SN001", "SÍ", "NO", "sin novedad"]);
        assert!(report.images.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_photo_headers_without_records() {
        let table = RecordTable::reconcile(&[], &config());
        let report = generate_excel_buffer(&table, |_| PhotoLoad::Missing).unwrap();

        let cells = read_cells(&report.buffer);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0][5], "FOTO DE SERIE");
    }

    #[test]
    fn test_embeds_corrected_image() {
        let table = RecordTable::reconcile(&[record("SN001", Some("a.png"))], &config());
        let report =
            generate_excel_buffer(&table, |_| PhotoLoad::Corrected(TINY_PNG.to_vec())).unwrap();

        assert_eq!(report.images.len(), 1);
        let image = &report.images[0];
        assert_eq!((image.row, image.col), (1, 5));
        assert_eq!(image.slot, "FOTO DE SERIE");
        assert_eq!((image.width_px, image.height_px), (1, 1));
        assert!(image.fallback.is_none());
    }

    #[test]
    fn test_falls_back_to_original() {
        let table = RecordTable::reconcile(&[record("SN001", Some("a.png"))], &config());
        let report = generate_excel_buffer(&table, |_| PhotoLoad::Uncorrected {
            original: TINY_PNG.to_vec(),
            reason: "EXIF破損".to_string(),
        })
        .unwrap();

        assert_eq!(report.images.len(), 1);
        assert_eq!(report.images[0].fallback.as_deref(), Some("EXIF破損"));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_bad_image_does_not_abort() {
        let records = vec![record("SN001", Some("bad.png")), record("SN002", Some("good.png"))];
        let table = RecordTable::reconcile(&records, &config());
        let report = generate_excel_buffer(&table, |path| {
            if path == "bad.png" {
                PhotoLoad::Uncorrected {
                    original: b"not an image".to_vec(),
                    reason: "decode".to_string(),
                }
            } else {
                PhotoLoad::Corrected(TINY_PNG.to_vec())
            }
        })
        .unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("bad.png"));
        assert_eq!(report.image_cells(), BTreeSet::from([(2, 5)]));
    }

    #[test]
    fn test_unreadable_reports_warning() {
        let table = RecordTable::reconcile(&[record("SN001", Some("a.png"))], &config());
        let report =
            generate_excel_buffer(&table, |_| PhotoLoad::Unreadable("permiso".to_string()))
                .unwrap();

        assert!(report.images.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    /// 補正済みPNGが挿入できないときは元画像を取り直す
    struct RefetchSource {
        refetched: Vec<String>,
    }

    impl PhotoSource for RefetchSource {
        fn load(&mut self, _path: &str) -> PhotoLoad {
            PhotoLoad::Corrected(b"broken png".to_vec())
        }

        fn original(&mut self, path: &str) -> std::result::Result<Vec<u8>, String> {
            self.refetched.push(path.to_string());
            Ok(TINY_PNG.to_vec())
        }
    }

    #[test]
    fn test_refetches_original_when_corrected_fails() {
        let table = RecordTable::reconcile(&[record("SN001", Some("a.png"))], &config());
        let mut source = RefetchSource { refetched: Vec::new() };

        let report = generate_excel_with_source(&table, &mut source).unwrap();

        assert_eq!(source.refetched, vec!["a.png"]);
        assert_eq!(report.images.len(), 1);
        assert!(report.images[0].fallback.is_some());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_corrected_failure_without_original_warns() {
        let table = RecordTable::reconcile(&[record("SN001", Some("a.png"))], &config());
        let report =
            generate_excel_buffer(&table, |_| PhotoLoad::Corrected(b"broken".to_vec())).unwrap();

        assert!(report.images.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_fit_cell_text() {
        assert_eq!(fit_cell_text("sin novedad"), "sin novedad");
        assert!(matches!(fit_cell_text("sin novedad"), Cow::Borrowed(_)));

        let long = "ñ".repeat(MAX_CELL_CHARS + 10);
        let fitted = fit_cell_text(&long);
        assert_eq!(fitted.chars().count(), MAX_CELL_CHARS);
    }

    #[test]
    fn test_overlong_text_is_truncated_not_fatal() {
        let mut long = record("SN001", None);
        long.observations = "x".repeat(40_000);
        let table = RecordTable::reconcile(&[long, record("SN002", None)], &config());

        let report = generate_excel_buffer(&table, |_| PhotoLoad::Missing).unwrap();

        let cells = read_cells(&report.buffer);
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[1][4].chars().count(), MAX_CELL_CHARS);
        assert_eq!(cells[2][1], "SN002");
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("切り詰め"));
    }
}
