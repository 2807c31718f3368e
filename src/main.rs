use anyhow::Result;
use clap::{Parser, Subcommand};

use bak_archiver::cli::{handle_archive_command, handle_config_command, ArchiveArgs, ConfigCommands};
use bak_archiver::config::{ArchiverPaths, Settings};
use bak_archiver::logging;

#[derive(Parser)]
#[command(
    name = "bak-archive",
    version,
    about = "Collect backup files into a single ZIP archive with a manifest",
    long_about = "bak-archive finds every file with a given extension under a directory, \
                  hashes each one, and packs them into a single ZIP archive that keeps \
                  their relative paths. A text manifest is embedded in the archive and a \
                  CSV manifest can be written next to it. Source files can optionally be \
                  deleted afterwards, behind three confirmations."
)]
struct Cli {
    /// Log debug diagnostics to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive matching files under a directory
    Archive(ArchiveArgs),

    /// Show or initialize the settings file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let paths = ArchiverPaths::new()?;
    let settings = Settings::load_or_default(&paths)?;

    match cli.command {
        Commands::Archive(args) => handle_archive_command(&settings, args)?,
        Commands::Config(cmd) => handle_config_command(&paths, &settings, cmd)?,
    }

    Ok(())
}
