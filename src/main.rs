use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tastecheck::analyzer::{self, ClaudeClient};
use tastecheck::cli::{Cli, Commands};
use tastecheck::config::{Config, API_KEY_ENV};
use tastecheck::error::TasteCheckError;
use tastecheck::rate_limit::{DailyUsageLimiter, Unlimited, UsageLimiter};
use tastecheck::server::{build_router, AppState};
use tastecheck_common::{AnalyzeRequest, ManualAnswers};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Serve { port, static_dir, guest_limit } => {
            let port = port.unwrap_or(config.port);
            let static_dir = static_dir.unwrap_or_else(|| config.static_dir.clone());
            let guest_limit = guest_limit.or(config.guest_daily_limit);

            let client = ClaudeClient::from_config(&config)?;
            info!(
                model = client.model(),
                timeout_seconds = config.timeout_seconds,
                "Claude クライアント準備完了"
            );

            // APIキーが無くても起動する（解析時にエラー結果を返す）
            if !client.has_api_key() {
                warn!("{} が未設定です。解析はすべて失敗結果になります", API_KEY_ENV);
            }

            let limiter: Arc<dyn UsageLimiter> = match guest_limit {
                Some(limit) => {
                    info!(limit, "ゲスト利用制限: {}回/日", limit);
                    Arc::new(DailyUsageLimiter::new(limit))
                }
                None => Arc::new(Unlimited),
            };

            let state = AppState::new(client, limiter).with_body_limit(config.max_body_bytes);
            let app = build_router(state, &static_dir);

            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {}", addr))?;
            info!("TasteCheck listening on http://localhost:{}", port);
            info!("静的ファイル: {}", static_dir.display());

            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(shutdown_signal())
            .await?;

            info!("サーバーを停止しました");
        }

        Commands::Analyze { mode, files, style, user_name, name_a, name_b, answers } => {
            let images = files
                .iter()
                .map(|path| encode_file(path))
                .collect::<Result<Vec<_>>>()?;

            let request = AnalyzeRequest {
                mode: Some(mode.as_str().to_string()),
                style: Some(style),
                images,
                answers: answers.into_iter().collect::<ManualAnswers>(),
                user_name,
                name_a,
                name_b,
                ..Default::default()
            };
            let task = request.into_task()?;

            let client = ClaudeClient::from_config(&config)?;
            let result = analyzer::analyze(&client, &task).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  ポート: {}", config.port);
                println!("  静的ファイル: {}", config.static_dir.display());
                println!("  ボディ上限: {}バイト", config.max_body_bytes);
                match config.guest_daily_limit {
                    Some(limit) => println!("  ゲスト上限: {}回/日", limit),
                    None => println!("  ゲスト上限: なし"),
                }
                println!(
                    "  APIキー: {}",
                    if config.get_api_key().is_ok() { "設定済み" } else { "未設定" }
                );
            }
        }
    }

    Ok(())
}

fn encode_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(TasteCheckError::FileNotFound(path.display().to_string()).into());
    }
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(STANDARD.encode(bytes))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("シグナル待機に失敗: {}", e);
    }
}
