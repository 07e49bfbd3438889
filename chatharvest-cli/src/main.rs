//! chatharvest CLI - export conversations from AI chat web apps
//!
//! Drives the front tab of a running browser through `osascript`:
//! - `export`: discover every conversation of a provider and write md/json files
//! - `discover`: list the conversations in the sidebar
//! - `extract`: print the conversation currently displayed
//! - `providers`: list supported chat apps

use std::path::PathBuf;

use anyhow::Result;
use chatharvest_core::HarvestOptions;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod config;
mod tracing_setup;
mod ui;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "chatharvest",
    author,
    version,
    about = "Export conversations from Gemini and ChatGPT through a signed-in browser tab",
    long_about = "Scrolls the chat sidebar until every conversation is loaded, then visits each \
                  one and extracts its messages with progressively weaker DOM heuristics."
)]
struct Cli {
    /// Suppress progress spinners and bars (also CHATHARVEST_QUIET=1)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Debug logging; page parse failures are reported as warnings
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Config file (default: ~/.chatharvest/config.toml)
    #[arg(long, global = true, value_name = "PATH", env = "CHATHARVEST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export every conversation of a provider to files
    Export(commands::export::ExportArgs),
    /// List the conversations found in the sidebar
    Discover(commands::discover::DiscoverArgs),
    /// Print the conversation currently open in the browser
    Extract(commands::extract::ExtractArgs),
    /// List supported providers
    Providers,
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init_tracing(cli.verbose).ok();
    ui::init_quiet_mode(cli.quiet);

    let opts = HarvestOptions {
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Providers => commands::run_providers()?,
        Commands::Completions(args) => run_completions(args)?,
        Commands::Export(args) => {
            let config = Config::load(cli.config.as_deref())?;
            commands::run_export(args, &config, opts).await?
        }
        Commands::Discover(args) => {
            let config = Config::load(cli.config.as_deref())?;
            commands::run_discover(args, &config, opts).await?
        }
        Commands::Extract(args) => {
            let config = Config::load(cli.config.as_deref())?;
            commands::run_extract(args, &config, opts).await?
        }
    }
    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
