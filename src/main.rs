use api_helpers::utils::error::ErrorSeverity;
use api_helpers::utils::{logger, validation::Validate};
use api_helpers::{ApiClient, CliConfig, FileSource, Formatted, HelperError, HttpSource, KeyMap, ReshapeEngine};
use clap::Parser;
use std::time::Duration;

async fn reshape(config: &CliConfig, key_map: KeyMap) -> Result<Formatted, HelperError> {
    match (&config.url, &config.input) {
        (Some(url), _) => {
            let client = match config.timeout {
                Some(secs) => ApiClient::with_timeout(Duration::from_secs(secs))?,
                None => ApiClient::new(),
            };
            ReshapeEngine::new(HttpSource::new(client, url.clone()), key_map)
                .run()
                .await
        }
        (None, Some(path)) => ReshapeEngine::new(FileSource::new(path), key_map).run().await,
        (None, None) => Err(HelperError::ConfigError {
            message: "Either --url or --input is required".to_string(),
        }),
    }
}

async fn run(config: &CliConfig) -> Result<String, HelperError> {
    let key_map = config.load_key_map()?;
    tracing::debug!("Loaded key-map with {} entries from {}", key_map.len(), config.key_map);

    let formatted = reshape(config, key_map).await?;
    let output = if config.pretty {
        serde_json::to_string_pretty(&formatted)?
    } else {
        serde_json::to_string(&formatted)?
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 驗證配置
    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    // 初始化日誌
    logger::init_cli_logger(config.verbose, config.log_format()?)?;
    tracing::debug!("CLI config: {:?}", config);

    match run(&config).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            tracing::error!(
                "❌ Reshape failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
