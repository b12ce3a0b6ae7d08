//! 検査報告書（Excel）の生成
//!
//! 写真の読み込みと向き補正は rayon で並列に行い、ワークブックの組み立ては直列で行う。
//! 写真は使う直前に一定枚数ずつ先読みし、最後のセルに渡したら手放す。

use crate::error::{InspectionError, Result};
use crate::imaging::load_photo;
use indicatif::ProgressBar;
use inspection_common::export::excel_core::{
    generate_excel_with_source, ExcelReport, PhotoLoad, PhotoSource,
};
use inspection_common::{ColumnConfig, InspectionRecord, RecordTable};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// 一度に先読みする写真の枚数
const PREFETCH_WINDOW: usize = 32;

/// 報告書用の写真キャッシュ
///
/// 参照順に先読みし、同じパスの残り参照数が0になった時点で破棄する。
struct PhotoCache<'a> {
    base_dir: &'a Path,
    /// 重複を除いた参照順
    order: Vec<&'a str>,
    next: usize,
    remaining: HashMap<&'a str, usize>,
    loaded: HashMap<&'a str, PhotoLoad>,
    progress: Option<&'a ProgressBar>,
}

impl<'a> PhotoCache<'a> {
    fn new(table: &'a RecordTable, base_dir: &'a Path, progress: Option<&'a ProgressBar>) -> Self {
        let mut order = Vec::new();
        let mut remaining: HashMap<&str, usize> = HashMap::new();
        for path in table.photo_paths() {
            let count = remaining.entry(path).or_insert(0);
            if *count == 0 {
                order.push(path);
            }
            *count += 1;
        }

        Self {
            base_dir,
            order,
            next: 0,
            remaining,
            loaded: HashMap::new(),
            progress,
        }
    }

    fn unique_len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    fn resident(&self) -> usize {
        self.loaded.len()
    }

    fn prefetch(&mut self) {
        let end = (self.next + PREFETCH_WINDOW).min(self.order.len());
        let base_dir = self.base_dir;
        let progress = self.progress;

        let batch: Vec<(&'a str, PhotoLoad)> = self.order[self.next..end]
            .par_iter()
            .map(|&path| {
                let photo = load_photo(&base_dir.join(path));
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                (path, photo)
            })
            .collect();

        self.loaded.extend(batch);
        self.next = end;
    }
}

impl PhotoSource for PhotoCache<'_> {
    fn load(&mut self, path: &str) -> PhotoLoad {
        if !self.remaining.contains_key(path) {
            return PhotoLoad::Missing;
        }
        while !self.loaded.contains_key(path) && self.next < self.order.len() {
            self.prefetch();
        }

        let last_use = match self.remaining.get_mut(path) {
            Some(count) => {
                *count -= 1;
                *count == 0
            }
            None => true,
        };

        if last_use {
            self.remaining.remove(path);
            self.loaded.remove(path).unwrap_or(PhotoLoad::Missing)
        } else {
            self.loaded.get(path).cloned().unwrap_or(PhotoLoad::Missing)
        }
    }

    fn original(&mut self, path: &str) -> std::result::Result<Vec<u8>, String> {
        std::fs::read(self.base_dir.join(path)).map_err(|e| e.to_string())
    }
}

/// 記録から報告書を生成（記録・ファイルは変更しない）
///
/// 相対パスの写真は `base_dir` を起点に解決する。
pub fn render_report(
    records: &[InspectionRecord],
    config: &ColumnConfig,
    base_dir: &Path,
) -> Result<ExcelReport> {
    render_report_with_progress(records, config, base_dir, None)
}

pub fn render_report_with_progress(
    records: &[InspectionRecord],
    config: &ColumnConfig,
    base_dir: &Path,
    progress: Option<&ProgressBar>,
) -> Result<ExcelReport> {
    let table = RecordTable::reconcile(records, config);

    let mut cache = PhotoCache::new(&table, base_dir, progress);
    if let Some(pb) = progress {
        pb.set_length(cache.unique_len() as u64);
    }
    debug!(photos = cache.unique_len(), "写真を準備中");

    let report = generate_excel_with_source(&table, &mut cache)
        .map_err(|e| InspectionError::ExcelGeneration(e.to_string()))?;

    for image in report.images.iter().filter(|img| img.fallback.is_some()) {
        debug!(
            slot = %image.slot,
            path = %image.path,
            reason = image.fallback.as_deref().unwrap_or(""),
            "補正済み画像を使えず元画像を挿入"
        );
    }
    for warning in &report.warnings {
        warn!("{}", warning);
    }
    info!(
        rows = table.len(),
        images = report.images.len(),
        warnings = report.warnings.len(),
        "報告書を生成"
    );

    Ok(report)
}
