//! `bak-archive config` commands

use clap::Subcommand;

use crate::config::{ArchiverPaths, Settings};
use crate::error::ArchiveResult;

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show the settings file location and the effective settings
    Show,

    /// Write the default settings file
    Init {
        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a config command
pub fn handle_config_command(
    paths: &ArchiverPaths,
    settings: &Settings,
    cmd: ConfigCommands,
) -> ArchiveResult<()> {
    match cmd {
        ConfigCommands::Show => {
            let file = paths.settings_file();
            println!("bak-archiver Configuration");
            println!("==========================");
            println!("Config directory: {}", paths.base_dir().display());
            println!(
                "Settings file:    {}{}",
                file.display(),
                if file.exists() { "" } else { " (not created, using defaults)" }
            );
            println!();
            println!("Settings:");
            println!("  Extension:          {}", settings.extension);
            println!("  Batch size:         {}", settings.batch_size);
            println!("  Compression level:  {}", settings.compression_level);
            println!("  CSV manifest:       {}", settings.generate_manifest_csv);
            println!("  Verify archive:     {}", settings.verify_archive);
            println!("  Preview rows:       {}", settings.preview_rows);
        }

        ConfigCommands::Init { force } => {
            let file = paths.settings_file();
            if file.exists() && !force {
                println!("Settings file already exists: {}", file.display());
                println!("Use --force to overwrite it with the defaults.");
                return Ok(());
            }
            Settings::default().save(paths)?;
            println!("Wrote default settings to {}", file.display());
        }
    }

    Ok(())
}
