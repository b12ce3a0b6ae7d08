//! 入力フォーム
//!
//! 引数で渡された値、または対話入力（dialoguer）から送信内容を組み立てる。

use crate::error::{InspectionError, Result};
use crate::store::{PhotoUpload, Submission};
use dialoguer::{Input, MultiSelect};
use inspection_common::ColumnConfig;
use std::path::{Path, PathBuf};

/// 引数から送信内容を組み立てる（写真はここで読み込む）
pub fn build_submission(
    model: String,
    serial: String,
    checked: Vec<String>,
    observations: String,
    photos: &[(String, PathBuf)],
) -> Result<Submission> {
    let mut submission = Submission {
        model,
        serial,
        checked,
        observations,
        ..Default::default()
    };
    submission.validate()?;

    for (slot, path) in photos {
        if submission.photos.contains_key(slot) {
            return Err(InspectionError::InvalidPhotoArg(format!(
                "写真枠が重複しています: {}",
                slot
            )));
        }
        submission
            .photos
            .insert(slot.clone(), PhotoUpload::from_path(path)?);
    }
    Ok(submission)
}

/// 対話入力でフォームを埋める
pub fn prompt_submission(config: &ColumnConfig) -> Result<Submission> {
    let model = prompt_required("MODELO")?;
    let serial = prompt_required("SERIE")?;

    let checked = if config.conditions.is_empty() {
        Vec::new()
    } else {
        let selected = MultiSelect::new()
            .with_prompt("該当する項目を選択 (Space:選択 Enter:確定)")
            .items(&config.conditions)
            .interact()
            .map_err(|e| InspectionError::Prompt(e.to_string()))?;
        selected
            .into_iter()
            .map(|idx| config.conditions[idx].clone())
            .collect()
    };

    let observations: String = Input::new()
        .with_prompt("OBSERVACIONES")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| InspectionError::Prompt(e.to_string()))?;

    let mut submission = Submission {
        model,
        serial,
        checked,
        observations,
        ..Default::default()
    };

    println!("\n写真のパスを入力（空欄でスキップ）");
    for slot in &config.photo_slots {
        if let Some(upload) = prompt_photo(slot)? {
            submission.photos.insert(slot.clone(), upload);
        }
    }

    Ok(submission)
}

fn prompt_required(label: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(label)
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            if input.trim().is_empty() {
                Err("入力してください")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(|e| InspectionError::Prompt(e.to_string()))
}

/// 1枠分の写真。読み込めなければ入力し直す
fn prompt_photo(slot: &str) -> Result<Option<PhotoUpload>> {
    loop {
        let input: String = Input::new()
            .with_prompt(slot)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| InspectionError::Prompt(e.to_string()))?;

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        match PhotoUpload::from_path(Path::new(trimmed)) {
            Ok(upload) => return Ok(Some(upload)),
            Err(e) => println!("  ⚠ {}", e),
        }
    }
}
