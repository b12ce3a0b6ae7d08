//! データ保存先
//!
//! 設定ファイル・記録CSV・画像フォルダはすべて1つのデータディレクトリの下に置く。

use std::io::Write;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config_cols.json";
pub const RECORDS_FILE_NAME: &str = "datos_maestro.csv";
pub const IMAGE_DIR_NAME: &str = "imagenes_persistentes";

/// データディレクトリを指定する環境変数
pub const DATA_DIR_ENV: &str = "INSPECTION_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// CLI指定 → 環境変数 → カレントディレクトリ の順で決定
    pub fn resolve(cli_dir: Option<PathBuf>) -> Self {
        let root = cli_dir
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn records_file(&self) -> PathBuf {
        self.root.join(RECORDS_FILE_NAME)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.root.join(IMAGE_DIR_NAME)
    }
}

/// 一時ファイルに書いてから置き換える（読み手には旧版か新版の完全な内容だけが見える）
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp_path = parent.join(format!(".tmp_{}", file_name));

    let written = (|| {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()
    })();

    if let Err(e) = written.and_then(|_| std::fs::rename(&tmp_path, path)) {
        std::fs::remove_file(&tmp_path).ok();
        return Err(e);
    }
    Ok(())
}
