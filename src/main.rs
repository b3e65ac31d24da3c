use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use multibot::infrastructure::adapters::console::split_addressed;
use multibot::infrastructure::adapters::{ConsoleConnection, ConsoleInput};
use multibot::infrastructure::config::Config;
use multibot::{
    ArgumentCatalog, BotConnection, BotRegistry, CatalogEntry, CommandError, CommandRouter, CommandService,
    Message, RegistrationError, RouteOutcome, User,
};

#[derive(Parser)]
#[command(name = "multibot")]
#[command(about = "Run several chat bots and route their text commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "multibot.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the console bots
    Run,
    /// Show version
    Version,
    /// Print the default config
    InitConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (config, load_error) = load_config(&cli.config);
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();
    if let Some(e) = load_error {
        tracing::warn!("Failed to load config: {}, using defaults", e);
    }

    match cli.command {
        Commands::Run => run_bots(config).await,
        Commands::Version => {
            println!("multibot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => init_config(),
    }
}

fn load_config(path: &str) -> (Config, Option<String>) {
    if !std::path::Path::new(path).exists() {
        return (Config::load_env(), None);
    }
    match Config::load(path) {
        Ok(config) => (config, None),
        Err(e) => (Config::load_env(), Some(e.to_string())),
    }
}

async fn run_bots(config: Config) {
    if let Err(e) = config.validate() {
        tracing::error!("Invalid config: {}", e);
        return;
    }

    let options = match config.router_options() {
        Ok(options) => options,
        Err(e) => {
            tracing::error!("Invalid router config: {}", e);
            return;
        }
    };

    tracing::info!("Starting {}", config.app.name);

    let registry = Arc::new(BotRegistry::new());
    let catalog = Arc::new(ArgumentCatalog::with_builtins());
    catalog.insert(CatalogEntry::choice("mode", ["off", "slow", "strict"]));
    let commands = CommandService::new(registry.clone(), catalog);

    for bot in config.enabled_bots() {
        let connection = Arc::new(ConsoleConnection::new(&bot.name));
        registry.register(BotConnection::new(&bot.name, connection));
        if let Err(e) = register_commands(&commands, &bot.name) {
            tracing::error!("Failed to register commands for {}: {}", bot.name, e);
        }
    }

    if registry.is_empty() {
        tracing::warn!("No bots enabled, nothing to do");
        return;
    }
    tracing::info!("Bots running: {}", registry.names().join(", "));

    let router = CommandRouter::new(registry.clone()).with_options(options);
    let sender = User::new("console").with_username(std::env::var("USER").unwrap_or_else(|_| "console".to_string()));
    let mut input = ConsoleInput::new();

    while let Some(line) = input.read_line().await {
        if line.is_empty() {
            continue;
        }
        if line == "/exit" {
            break;
        }
        if let Some(name) = line.strip_prefix("/disable ") {
            registry.disable(name.trim());
            continue;
        }
        if line == "/bots" {
            println!("{}", registry.names().join(", "));
            continue;
        }

        let (target, text) = split_addressed(&line);
        let bot = match target {
            Some(name) => registry.get(name),
            None => registry.first(),
        };
        let Some(bot) = bot else {
            tracing::warn!("No bot to receive: {}", line);
            continue;
        };

        let message = Message::new(bot.handle_id(), "console", text).with_sender(sender.clone());
        drop(bot);
        match router.route(message) {
            RouteOutcome::Dispatched(dispatch) => {
                // Wait here so console output stays in order.
                if let Err(e) = dispatch.join().await {
                    tracing::debug!("Dispatch ended with error: {}", e);
                }
            }
            RouteOutcome::Rejected(e) => tracing::debug!("Rejected: {}", e),
            RouteOutcome::Ignored(reason) => tracing::debug!("Ignored ({:?}): {}", reason, text),
        }
    }

    registry.disable_all();
    tracing::info!("All bots shut down");
}

fn register_commands(commands: &CommandService, bot: &str) -> Result<(), RegistrationError> {
    commands.register_defaults(bot)?;

    commands.register(
        bot,
        commands
            .define("ping", &[])?
            .with_description("Check the bot is alive")
            .with_handler(|_| Ok(Some("pong".to_string()))),
    )?;

    commands.register(
        bot,
        commands
            .define("echo", &["string"])?
            .with_description("Repeat one word")
            .with_handler(|inv| Ok(inv.args.text(0).map(str::to_string))),
    )?;

    commands.register(
        bot,
        commands
            .define("ban", &["user-id", "duration"])?
            .with_description("Ban a user for a while")
            .with_handler(|inv| {
                let (Some(user), Some(duration)) = (inv.args.user_id(0), inv.args.duration(1)) else {
                    return Err(CommandError::InvalidArgs("expected a user and a duration".to_string()));
                };
                Ok(Some(format!("Banned {} for {}s", user, duration.as_secs())))
            }),
    )?;

    commands.register(
        bot,
        commands
            .define("slowmode", &["mode"])?
            .with_description("Set slow mode")
            .with_handler(|inv| Ok(Some(format!("Slow mode set to {}", inv.args.text(0).unwrap_or("?"))))),
    )?;

    commands.register(
        bot,
        commands
            .define("whoami", &[])?
            .with_handler(|inv| {
                Ok(Some(match &inv.message.sender {
                    Some(user) => format!("You are {} on {}", user, inv.bot),
                    None => format!("Unknown sender on {}", inv.bot),
                }))
            }),
    )?;

    commands.register(
        bot,
        commands
            .define("quit", &[])?
            .with_description("Leave the current game")
            .with_handler(|_| Ok(Some("Left the game".to_string()))),
    )?;

    commands.register(
        bot,
        commands
            .define("quit now", &[])?
            .with_description("Leave immediately")
            .with_handler(|_| Ok(Some("Left the game immediately".to_string()))),
    )
}

fn init_config() {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to multibot.yaml and adjust as needed.");
        }
        Err(e) => tracing::error!("Failed to render config: {}", e),
    }
}
