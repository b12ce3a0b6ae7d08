use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inspect")]
#[command(about = "製品受入検査の記録・写真付き報告書（Excel）生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// データディレクトリ（設定・記録CSV・画像フォルダの置き場所）
    /// 未指定なら環境変数 INSPECTION_DATA_DIR、それもなければカレントディレクトリ
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 検査記録を1件登録
    Submit {
        /// 対話入力で登録
        #[arg(short, long, conflicts_with_all = ["model", "serial", "check", "observations", "photo"])]
        interactive: bool,

        /// 型式（MODELO）
        #[arg(short, long, required_unless_present = "interactive")]
        model: Option<String>,

        /// シリアル番号（SERIE）
        #[arg(short, long, required_unless_present = "interactive")]
        serial: Option<String>,

        /// 該当するチェック項目（複数指定可、未指定の項目は NO）
        #[arg(short, long)]
        check: Vec<String>,

        /// 備考（OBSERVACIONES）
        #[arg(short, long)]
        observations: Option<String>,

        /// 写真 "写真枠=ファイルパス"（複数指定可）
        #[arg(short, long)]
        photo: Vec<PhotoArg>,
    },

    /// 登録済みの記録を表示
    List {
        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 写真付き報告書（Excel）を生成
    Report {
        /// 出力ファイル/ディレクトリ（デフォルト: Inspeccion_Reporte_Mobil.xlsx）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 全記録と全画像を削除（元に戻せません）
    Clear {
        /// 確認せずに削除
        #[arg(short, long)]
        yes: bool,
    },

    /// 列設定（チェック項目・写真枠）の管理
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// 現在の設定を表示
    Show {
        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 1行1ラベルのファイルから設定を更新（"-" で標準入力）
    Set {
        /// チェック項目のファイル
        #[arg(long)]
        conditions: Option<PathBuf>,

        /// 写真枠のファイル
        #[arg(long)]
        photo_slots: Option<PathBuf>,
    },

    /// 既定の設定に戻す
    Reset,
}

/// `--photo` の値（"写真枠=パス"）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotoArg {
    pub slot: String,
    pub path: PathBuf,
}

impl std::str::FromStr for PhotoArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 写真枠名に "=" は含まれない前提で最初の "=" で分割
        let (slot, path) = s
            .split_once('=')
            .ok_or_else(|| format!("Invalid photo: {}. Use \"SLOT=path\"", s))?;

        let slot = slot.trim();
        let path = path.trim();
        if slot.is_empty() || path.is_empty() {
            return Err(format!("Invalid photo: {}. Use \"SLOT=path\"", s));
        }

        Ok(PhotoArg {
            slot: slot.to_string(),
            path: PathBuf::from(path),
        })
    }
}
