use std::path::PathBuf;

use clap::{Parser, Subcommand};

use prefstore_cli::{execute, Command};
use prefstore_json::{JsonFilePrefStore, StoreConfig};

/// prefs - Inspect and edit prefstore preference files
#[derive(Parser, Debug)]
#[command(name = "prefs")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the preference file [default: the user config dir for "prefs"]
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Store name; the file is <name>.preferences.json
    #[arg(long, default_value = StoreConfig::DEFAULT_NAME)]
    name: String,

    /// Log store activity to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Show every stored preference
    List,
    /// Show one preference
    Get { name: String },
    /// Store a value: int, long, float, double, bool, string, string_set or bytes
    Set {
        name: String,
        #[arg(value_name = "TYPE")]
        type_name: String,
        value: String,
    },
    /// Delete a preference
    Remove { name: String },
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> prefstore_core::Result<()> {
    let config = match args.dir {
        Some(dir) => StoreConfig::new(dir),
        None => StoreConfig::for_app("prefs")?,
    }
    .with_name(args.name);

    let command = match args.command {
        Action::List => Command::List,
        Action::Get { name } => Command::Get { name },
        Action::Set {
            name,
            type_name,
            value,
        } => Command::set(name, &type_name, &value)?,
        Action::Remove { name } => Command::Remove { name },
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let output = runtime.block_on(async {
        let store = JsonFilePrefStore::open(&config)?;
        tracing::debug!(path = %store.path().display(), "opened preference file");
        execute(&store, command).await
    })?;

    println!("{}", output.trim_end());
    Ok(())
}
