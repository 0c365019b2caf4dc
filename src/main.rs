use clap::{Parser, Subcommand};
use std::io::Write;

use ticker::CliContext;
use ticker::commands;
use ticker::logging;
use ticker::readline;
use ticker_core::{TickerConfig, TickerConfigExt};

#[derive(Parser)]
#[command(version, about = "Interactive timer scheduler")]
struct Args {
    /// Override the configured driver tick, in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Schedule the demo timers on startup
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    let mut config = TickerConfig::load();
    if let Some(tick_ms) = args.tick_ms {
        config = config.with_tick_interval_ms(tick_ms);
    }
    config.validate().map_err(|e| e.to_string())?;

    // Held until exit so buffered file logs get flushed
    let _log_guard = logging::init(config.log_to_file);

    let ctx = CliContext::new(config);
    ctx.start_driver().await;

    if args.demo {
        commands::run_demo(&ctx).await;
    }

    while let Some(line) = readline()? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    return Ok(());
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    commands::exit(&ctx).await;
    Ok(())
}

#[derive(Parser)]
#[command(version, about = "cli")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Add {
        #[arg(short, long)]
        label: String,
        /// Seconds from now until the first firing
        #[arg(short, long, default_value_t = 0)]
        delay: u64,
        /// Seconds between firings (0 = once)
        #[arg(short, long, default_value_t = 0)]
        interval: u64,
    },
    Remove {
        #[arg(long)]
        id: u64,
    },
    List,
    Demo,
    Config,
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "ticker".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Some(Commands::Add {
            label,
            delay,
            interval,
        }) => {
            let id = commands::add_timer(ctx, label, delay, interval).await;
            println!("added timer {id}");
        }
        Some(Commands::Remove { id }) => commands::remove_timer(ctx, id).await,
        Some(Commands::List) => commands::list_timers(ctx).await,
        Some(Commands::Demo) => {
            let ids = commands::run_demo(ctx).await;
            println!("added {} demo timers", ids.len());
        }
        Some(Commands::Config) => commands::show_settings(ctx).await,
        Some(Commands::Exit) => {
            commands::exit(ctx).await;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
