use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod tui;

#[derive(Parser)]
#[command(
    name = "tomatui",
    version,
    about = "Pomodoro timer for the terminal",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Work duration override, e.g. "25m" or "1h30m"
    #[arg(value_name = "WORK")]
    work: Option<String>,

    /// Break duration override, e.g. "5m"
    #[arg(value_name = "BREAK")]
    break_duration: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a work session
    Work {
        /// Duration override, e.g. "25m"
        duration: Option<String>,
    },
    /// Start a break session
    Break {
        /// Duration override, e.g. "5m"
        duration: Option<String>,
    },
    /// Show recorded statistics
    Stats,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init();

    let result = match cli.command {
        Some(Commands::Work { duration }) => commands::session::work(duration),
        Some(Commands::Break { duration }) => commands::session::break_session(duration),
        Some(Commands::Stats) => commands::stats::run(),
        Some(Commands::Config { action }) => commands::config::run(action),
        Some(Commands::Completions { shell }) => commands::completions::run(shell),
        None => commands::session::start(cli.work, cli.break_duration),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
