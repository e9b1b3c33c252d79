use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tastecheck")]
#[command(about = "Music taste scoring server for streaming recap screenshots", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// HTTPサーバーを起動
    Serve {
        /// 待ち受けポート（省略時は設定値）
        #[arg(short, long)]
        port: Option<u16>,

        /// 静的ファイルのディレクトリ（省略時は設定値）
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// ゲストの1日あたり解析回数
        #[arg(long)]
        guest_limit: Option<u32>,
    },

    /// ローカルの画像・回答で1回だけ解析してJSONを出力
    Analyze {
        /// 解析モード
        #[arg(value_enum)]
        mode: CliMode,

        /// 画像ファイル（evolutionは古い順、battleは2枚）
        files: Vec<PathBuf>,

        /// 講評スタイル (roasting/encouraging/sarcastic/analytical/podcast)
        #[arg(short, long, default_value = "analytical")]
        style: String,

        /// 名前（single/evolution/manual）
        #[arg(long)]
        user_name: Option<String>,

        /// battleの1人目
        #[arg(long)]
        name_a: Option<String>,

        /// battleの2人目
        #[arg(long)]
        name_b: Option<String>,

        /// manualの回答 (例: favoriteArtist=Radiohead)
        #[arg(short, long = "answer", value_parser = parse_answer)]
        answers: Vec<(String, String)>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliMode {
    Single,
    Evolution,
    Battle,
    Manual,
}

impl CliMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CliMode::Single => "single",
            CliMode::Evolution => "evolution",
            CliMode::Battle => "battle",
            CliMode::Manual => "manual",
        }
    }
}

/// `key=value` 形式の回答をパース
pub fn parse_answer(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid answer: {}. Use key=value", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid answer: {}. Key is empty", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
