use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "doc-snap")]
#[command(about = "Read prescription images with a generative vision model", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 処方箋画像を解析
    Analyze {
        /// 画像ファイルまたはフォルダ（複数可、1回のリクエストにまとめて送信）
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// 説明文の言語（省略時は設定の既定言語）
        #[arg(short, long)]
        language: Option<String>,

        /// 言語を対話的に選択
        #[arg(long, conflicts_with = "language")]
        pick_language: bool,

        /// 出力形式
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// 出力ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// キャッシュを使用（同じ画像・言語の再解析をスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// APIキーを保持するプロキシサーバを起動
    Serve {
        /// 待ち受けアドレス（省略時は設定値）
        #[arg(long)]
        host: Option<String>,

        /// 待ち受けポート（省略時は設定値）
        #[arg(short, long)]
        port: Option<u16>,

        /// CORSを許可（別オリジンのWeb UIから使う場合）
        #[arg(long)]
        allow_cors: bool,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 既定の言語を設定
        #[arg(long)]
        set_language: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },

    /// 選択可能な言語を表示
    Languages,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// 端末向けテキスト
    #[default]
    Text,
    /// エスケープ済みHTML
    Html,
    /// 解析結果JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "doc-snap", "analyze", "rx.jpg", "scans", "--language", "Hindi", "--format", "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze { paths, language, format, use_cache, .. } => {
                assert_eq!(paths.len(), 2);
                assert_eq!(language.as_deref(), Some("Hindi"));
                assert_eq!(format, OutputFormat::Json);
                assert!(!use_cache);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_analyze_requires_path() {
        assert!(Cli::try_parse_from(["doc-snap", "analyze"]).is_err());
    }

    #[test]
    fn test_language_conflicts_with_pick() {
        let result = Cli::try_parse_from([
            "doc-snap", "analyze", "rx.jpg", "--language", "Hindi", "--pick-language",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["doc-snap", "-v", "serve", "--port", "9000", "--allow-cors"])
            .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Serve { host, port, allow_cors } => {
                assert!(host.is_none());
                assert_eq!(port, Some(9000));
                assert!(allow_cors);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Html.to_string(), "html");
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }
}
