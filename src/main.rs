//! Binary entrypoint for the mudquest administrative CLI.
//!
//! Commands:
//! - `validate [--file <path>]` - parse the quest definition file and report the count
//! - `show <id> [--json]` - print one quest definition
//! - `tempqm [--file <path>]` - list a temporary questmaster save file
//! - `init` - create a starter configuration file
//!
//! See the library crate docs for module-level details: `mudquest::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{error, info};

use mudquest::config::Config;
use mudquest::logutil::escape_log;
use mudquest::quest::temp_questmaster::read_save_file;
use mudquest::quest::{QuestDefinition, QuestId, QuestRegistry, TimeLimit};

#[derive(Parser)]
#[command(name = "mudquest")]
#[command(about = "Quest definition tooling for text MUD servers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "mudquest.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the quest definition file; exits non-zero on any error
    Validate {
        /// Definition file (defaults to `quests.definitions` from the config)
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Show a single quest definition
    Show {
        /// Quest id
        id: i32,
        /// Definition file (defaults to `quests.definitions` from the config)
        #[arg(short, long)]
        file: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the assignments in a temporary questmaster save file
    Tempqm {
        /// Save file (defaults to `quests.temp_questmasters` from the config)
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Write a default configuration file
    Init,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Early load only feeds logging; Init writes the config, so it must not require one.
    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).ok(),
    };
    init_logging(&pre_config, cli.verbose);
    let config = match (pre_config, &cli.command) {
        (Some(config), _) => config,
        (None, Commands::Init) => Config::default(),
        (None, _) => Config::load_or_default(&cli.config)?,
    };

    match cli.command {
        Commands::Validate { file } => {
            let path = file.unwrap_or(config.quests.definitions);
            let registry = QuestRegistry::load_file(&path)
                .map_err(|e| anyhow!("Quest file {} rejected: {}", path, e))?;
            println!("{}: {} quests OK", path, registry.len());
            for qm in registry.questmasters() {
                println!(
                    "  questmaster {}: {} quests",
                    qm,
                    registry.for_questmaster(qm).count()
                );
            }
        }
        Commands::Show { id, file, json } => {
            let path = file.unwrap_or(config.quests.definitions);
            let registry = QuestRegistry::load_file(&path)
                .map_err(|e| anyhow!("Quest file {} rejected: {}", path, e))?;
            let def = registry
                .by_id(QuestId(id))
                .ok_or_else(|| anyhow!("Quest {} not found in {}", id, path))?;
            if json {
                println!("{}", serde_json::to_string_pretty(def)?);
            } else {
                print_definition(def);
            }
        }
        Commands::Tempqm { file } => {
            let path = file.unwrap_or(config.quests.temp_questmasters);
            let entries = read_save_file(&path).map_err(|e| anyhow!("Failed to read {}: {}", path, e))?;
            if entries.is_empty() {
                println!("{}: no temporary questmasters", path);
            }
            for entry in entries {
                let room = entry
                    .room
                    .map_or_else(|| "anywhere".to_string(), |r| format!("room {}", r));
                let ids: Vec<String> = entry.quests.iter().map(|q| q.to_string()).collect();
                println!("npc {} ({}): {}", entry.vnum, room, ids.join(", "));
            }
        }
        Commands::Init => {
            info!("Initializing new mudquest configuration");
            Config::create_default(&cli.config)?;
            info!("Configuration file created at {}", cli.config);
        }
    }

    Ok(())
}

fn print_definition(def: &QuestDefinition) {
    println!("Quest {}: {}", def.id, def.name);
    println!("  type:        {} (code {})", def.kind, def.kind.code());
    println!("  questmaster: {}", def.questmaster);
    println!("  target:      {} x{}", def.target, def.quantity());
    println!("  levels:      {}-{}", def.min_level(), def.max_level());
    match def.time_limit() {
        TimeLimit::Unlimited => println!("  time limit:  none"),
        TimeLimit::Ticks(t) => println!("  time limit:  {} ticks", t),
    }
    println!("  flags:       {}", def.flags.to_letters());
    println!(
        "  reward:      {} points, {} gold, {} exp, item {}",
        def.reward.points,
        def.reward.gold,
        def.reward.experience,
        def.reward
            .item
            .map_or_else(|| "none".to_string(), |v| v.to_string())
    );
    println!("  description: {}", escape_log(&def.description));
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .map_or(log::LevelFilter::Info, |c| c.logging.level_filter()),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    let log_file = config.as_ref().and_then(|c| c.logging.file.clone());
    if let Some(file) = log_file {
        if let Ok(f) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file)
        {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));

            // Echo to the console only when someone is watching
            let is_tty = atty::is(atty::Stream::Stdout);

            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
            let _ = builder.try_init();
            return;
        }
    }
    builder.format(|fmt, record| {
        writeln!(
            fmt,
            "{} [{}] {}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            record.level(),
            record.args()
        )
    });
    let _ = builder.try_init();
}
