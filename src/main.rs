use anyhow::Context;
use clap::Parser;
use dialoguer::Confirm;
use inspection_common::{parse_label_lines, ColumnConfig};
use inspection_report::cli::{Cli, Commands, ConfigAction};
use inspection_report::{export, form, DataPaths, InspectionError, Session};
use std::io::{IsTerminal, Read};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = DataPaths::resolve(cli.data_dir);
    let mut session = Session::open(paths);
    for warning in session.warnings() {
        println!("⚠ {}", warning);
    }

    match cli.command {
        Commands::Submit {
            interactive,
            model,
            serial,
            check,
            observations,
            photo,
        } => {
            let submission = if interactive {
                println!("📝 検査記録の入力\n");
                form::prompt_submission(session.config())?
            } else {
                let photos: Vec<_> = photo.into_iter().map(|p| (p.slot, p.path)).collect();
                form::build_submission(
                    model.unwrap_or_default(),
                    serial.unwrap_or_default(),
                    check,
                    observations.unwrap_or_default(),
                    &photos,
                )?
            };

            let record = session.submit(submission)?;
            println!(
                "✔ 登録しました: {} / {}（写真 {}枚、合計 {}件）",
                record.model,
                record.serial,
                record.photo_count(),
                session.records().len()
            );
        }

        Commands::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(session.records())?);
            } else {
                print_records(&session);
            }
        }

        Commands::Report { output } => {
            println!("📄 報告書を生成中...");
            let output_path = export::output_path(output.as_deref());

            // 端末でなければ描画しない（リダイレクト先を汚さない）
            let pb = export::progress_bar(std::io::stderr().is_terminal());
            let report = session.render_report(Some(&pb));
            pb.finish_and_clear();
            let report = report?;

            export::write_report(&report, &output_path)?;

            for warning in &report.warnings {
                println!("⚠ {}", warning);
            }
            println!(
                "✔ Excel出力: {}（{}件、写真 {}枚）",
                output_path.display(),
                session.records().len(),
                report.images.len()
            );
        }

        Commands::Clear { yes } => {
            if !yes && !confirm_clear(session.records().len())? {
                return Err(InspectionError::ConfirmationRequired.into());
            }
            let summary = session.clear_all()?;
            println!(
                "✔ 削除しました: 記録 {}件、画像 {}枚",
                summary.records, summary.image_files
            );
        }

        Commands::Config { action } => match action {
            ConfigAction::Show { json } => {
                let config = session.config();
                if json {
                    println!("{}", config.to_json_pretty()?);
                } else {
                    print_config(config);
                }
            }

            ConfigAction::Set {
                conditions,
                photo_slots,
            } => {
                if conditions.is_none() && photo_slots.is_none() {
                    anyhow::bail!("--conditions または --photo-slots を指定してください");
                }

                let mut config = session.config().clone();
                if let Some(source) = conditions {
                    config.conditions = parse_label_lines(&read_label_source(&source)?);
                }
                if let Some(source) = photo_slots {
                    config.photo_slots = parse_label_lines(&read_label_source(&source)?);
                }

                session.update_config(config)?;
                println!(
                    "✔ 設定を保存しました（チェック項目 {}件、写真枠 {}件）",
                    session.config().conditions.len(),
                    session.config().photo_slots.len()
                );
            }

            ConfigAction::Reset => {
                session.reset_config()?;
                println!("✔ 既定の設定に戻しました");
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// 対話端末なら削除の確認を取る（端末でなければ確認できないので false）
fn confirm_clear(records: usize) -> anyhow::Result<bool> {
    if !std::io::stdin().is_terminal() {
        return Ok(false);
    }
    Confirm::new()
        .with_prompt(format!(
            "記録 {}件と全画像を削除します。元に戻せません。よろしいですか？",
            records
        ))
        .default(false)
        .interact()
        .map_err(|e| InspectionError::Prompt(e.to_string()).into())
}

/// ラベルファイルを読む（"-" は標準入力）
fn read_label_source(source: &Path) -> anyhow::Result<String> {
    if source.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("標準入力の読み込みに失敗")?;
        return Ok(buf);
    }
    std::fs::read_to_string(source)
        .with_context(|| format!("ラベルファイルを読み込めません: {}", source.display()))
}

fn print_records(session: &Session) {
    let records = session.records();
    let config = session.config();
    if records.is_empty() {
        println!("記録はありません");
        return;
    }

    println!("{:>4}  {:<16} {:<16} {:>6} {:>6}  OBSERVACIONES", "#", "MODELO", "SERIE", "SÍ", "写真");
    for (idx, record) in records.iter().enumerate() {
        let marked = config
            .conditions
            .iter()
            .filter(|label| record.condition(label) == inspection_common::types::MARK_YES)
            .count();
        let observations: String = record.observations.replace('\n', " ").chars().take(40).collect();
        println!(
            "{:>4}  {:<16} {:<16} {:>6} {:>6}  {}",
            idx + 1,
            record.model,
            record.serial,
            format!("{}/{}", marked, config.conditions.len()),
            record.photo_count(),
            observations
        );
    }

    let photos: usize = records.iter().map(|r| r.photo_count()).sum();
    println!("\n合計 {}件、写真 {}枚", records.len(), photos);
}

fn print_config(config: &ColumnConfig) {
    println!("チェック項目 ({}件):", config.conditions.len());
    for label in &config.conditions {
        println!("  - {}", label);
    }
    println!("写真枠 ({}件):", config.photo_slots.len());
    for slot in &config.photo_slots {
        println!("  - {}", slot);
    }
}
