use clap::Parser;
use doc_snap::{analyzer, cli, config, error, output, scanner, server};
use cli::{Cli, Commands};
use config::Config;
use doc_snap_common::LANGUAGES;
use error::{DocSnapError, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let config = Config::load()?;

    match cli.command {
        Commands::Analyze { paths, language, pick_language, format, output, use_cache } => {
            let images = scanner::collect_images(&paths)?;
            if images.is_empty() {
                let joined = paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(DocSnapError::NoImagesFound(joined));
            }

            let language = doc_snap::language::resolve_language(language, pick_language, &config.default_language)?;
            let client = analyzer::GeminiClient::from_config(&config)?;

            let cache_dir = if use_cache { Some(analyzer::CacheFile::default_dir()?) } else { None };
            let options = analyzer::AnalyzeOptions {
                cache_dir: cache_dir.as_deref(),
                show_progress: true,
            };

            eprintln!("📄 {}枚の画像を解析 (言語: {})", images.len(), language);
            let report = analyzer::analyze_images(&client, &images, &language, options).await?;
            if report.from_cache {
                eprintln!("✔ キャッシュから取得");
            }

            output::write_report(&report, format, output.as_deref())?;
        }

        Commands::Serve { host, port, allow_cors } => {
            let mut config = config;
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }

            let client = analyzer::GeminiClient::from_config(&config)?;
            let http = server::HttpConfig::from_config(&config, allow_cors)
                .map_err(|e| DocSnapError::Config(e.to_string()))?;
            server::WebServer::new(client)
                .start(http)
                .await
                .map_err(|e| DocSnapError::Server(format!("{:#}", e)))?;
        }

        Commands::Config { set_api_key, set_language, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if let Some(language) = set_language {
                config.set_default_language(language)?;
                println!("✔ 既定の言語を設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  既定の言語: {}", config.default_language);
                println!("  temperature: {}", config.temperature);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  サーバ: {}:{}", config.server_host, config.server_port);
                println!("  APIキー: {}", config.masked_api_key());
            }
        }

        Commands::Cache { clear, info } => {
            let dir = analyzer::CacheFile::default_dir()?;
            let cache_path = analyzer::CacheFile::cache_path(&dir);

            if info || !clear {
                // デフォルトまたは--info: 情報表示
                if cache_path.exists() {
                    let cache = analyzer::CacheFile::load(&dir);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match analyzer::CacheFile::clear(&dir) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }

        Commands::Languages => {
            for language in LANGUAGES {
                let marker = if language.eq_ignore_ascii_case(&config.default_language) { " (既定)" } else { "" };
                println!("{}{}", language, marker);
            }
        }
    }

    Ok(())
}
