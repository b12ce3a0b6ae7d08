use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspectionError {
    #[error("必須項目が未入力です: {0}")]
    Validation(String),

    #[error("設定ファイルを読み込めません（既定の列設定を使用します）: {0}")]
    ConfigRead(String),

    #[error("設定ファイルを保存できません（設定は変更されていません）: {0}")]
    ConfigWrite(String),

    #[error("記録ファイルを読み込めません（空の一覧で開始します）: {0}")]
    PersistenceRead(String),

    #[error("記録ファイルを保存できません: {0}")]
    PersistenceWrite(String),

    #[error("画像処理エラー: {0}")]
    ImageProcess(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("写真の指定が不正です: {0}")]
    InvalidPhotoArg(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("削除を中止しました。確認なしで実行するには `inspect clear --yes` を指定してください")]
    ConfirmationRequired,

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] inspection_common::Error),
}

pub type Result<T> = std::result::Result<T, InspectionError>;

/// 失敗しても既定値で続行できる読み込みの結果
#[derive(Debug)]
pub struct Recovered<T> {
    pub value: T,
    /// 利用者に通知すべき警告
    pub warning: Option<InspectionError>,
}

impl<T> Recovered<T> {
    pub fn ok(value: T) -> Self {
        Self { value, warning: None }
    }

    pub fn with_warning(value: T, warning: InspectionError) -> Self {
        Self {
            value,
            warning: Some(warning),
        }
    }
}
