use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use repeater_bot::application::errors::BotError;
use repeater_bot::application::messaging::{AllowedChats, CommandParser, Dispatcher, LoggingMiddleware};
use repeater_bot::application::services::RepeatHandler;
use repeater_bot::domain::traits::{ChatClient, HistoryStore};
use repeater_bot::infrastructure::adapters::{ConsoleAdapter, TelegramAdapter};
use repeater_bot::infrastructure::config::Config;
use repeater_bot::infrastructure::storage::MemoryHistory;
use repeater_bot::plugins::default_plugins;

#[derive(Parser)]
#[command(name = "repeater-bot")]
#[command(about = "A chat bot that repeats messages on request", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_bot(&cli.config, cli.token);
        }
        Commands::Version => {
            println!("repeater-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn load_config(config_path: &str) -> Config {
    if !std::path::Path::new(config_path).exists() {
        return Config::load_env();
    }

    match Config::load(config_path) {
        Ok(config) => config.apply_env(),
        Err(e) => {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        }
    }
}

fn build_dispatcher(config: &Config, bot_username: Option<&str>, allowed_chats: &[i64]) -> Result<Dispatcher, BotError> {
    let plugins = default_plugins(RepeatHandler::new(config.repeat.limits()))?;

    let mut parser = CommandParser::new(config.bot.prefixes.clone());
    if let Some(username) = bot_username {
        parser = parser.with_bot_username(username);
    }

    Ok(Dispatcher::new(parser, plugins)
        .with_middleware(LoggingMiddleware)
        .with_middleware(AllowedChats::new(allowed_chats.iter().copied())))
}

fn run_bot(config_path: &str, token_override: Option<String>) {
    let config = load_config(config_path);
    tracing::info!("Starting {}", config.bot.name);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            return;
        }
    };

    match token_override.or_else(|| config.telegram.token.clone()) {
        Some(token) => rt.block_on(run_telegram_bot(config, token)),
        // Run console bot (dev mode)
        None => rt.block_on(run_console_bot(config)),
    }
}

async fn run_telegram_bot(config: Config, token: String) {
    let history: Arc<dyn HistoryStore> = Arc::new(MemoryHistory::new(config.history.capacity));
    let mut bot = TelegramAdapter::new(token, history);

    // Fetch bot info
    if let Err(e) = bot.fetch_bot_info().await {
        tracing::error!("Failed to fetch bot info: {}", e);
        return;
    }

    let info = bot.bot_info();
    tracing::info!("Bot started: @{}", info.username);

    let dispatcher = match build_dispatcher(&config, Some(&info.username), &config.chats.allowed) {
        Ok(dispatcher) => Arc::new(dispatcher),
        Err(e) => {
            tracing::error!("Failed to register commands: {}", e);
            return;
        }
    };

    tracing::info!("Loaded {} commands", dispatcher.plugins().len());
    if let Err(e) = bot.register_commands(&dispatcher.plugins().list_plugins()).await {
        tracing::warn!("Failed to register commands: {}", e);
    }

    if config.chats.allowed.is_empty() {
        tracing::info!("Answering in all chats");
    } else {
        tracing::info!("Answering in {} allowed chat(s)", config.chats.allowed.len());
    }

    let bot = Arc::new(bot);
    let mut offset: i64 = 0;

    tracing::info!("Starting message loop...");

    loop {
        let updates = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                return;
            }
            updates = bot.get_updates(offset, config.telegram.poll_timeout) => updates,
        };

        match updates {
            Ok(updates) => {
                if !updates.is_empty() {
                    tracing::debug!("Received {} updates", updates.len());
                }
                for update in &updates {
                    let Some(message) = bot.observe(update).await else {
                        continue;
                    };

                    // One task per message; chats never wait on each other
                    let bot = Arc::clone(&bot);
                    let dispatcher = Arc::clone(&dispatcher);
                    tokio::spawn(async move {
                        dispatcher.dispatch(&*bot, &message).await;
                    });
                }

                offset = TelegramAdapter::get_next_offset(&updates, offset);
            }
            Err(e) => {
                tracing::error!("Failed to get updates: {}", e);
                tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
            }
        }
    }
}

async fn run_console_bot(config: Config) {
    let bot = ConsoleAdapter::new(config.history.capacity);

    let dispatcher = match build_dispatcher(&config, None, &[]) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            tracing::error!("Failed to register commands: {}", e);
            return;
        }
    };

    let info = bot.bot_info();
    tracing::info!("Bot started: @{} (console mode)", info.username);
    println!("Type messages. '>>N text' replies to message N, a leading '!' marks content as protected.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let message = bot.ingest(&line).await;
                dispatcher.dispatch(&bot, &message).await;
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                break;
            }
        }
    }
}

fn init_config() {
    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => tracing::error!("Failed to render default config: {}", e),
    }
}
