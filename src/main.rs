use anyhow::Result;
use ccs::{
    cli::{Cli, Commands},
    commands,
    config::Paths,
    logging::{self, LogTarget},
    switch::Switcher,
    tui,
};
use clap::{CommandFactory, Parser};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = Paths::from_env();

    let target = match cli.command {
        Some(Commands::Ui) => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    logging::init(target, &paths.log_file);

    let switcher = Switcher::new(&paths);

    match &cli.command {
        Some(Commands::Add { name, env }) => {
            commands::add_profile_interactive(&switcher, name, env)?;
        }
        Some(Commands::Ls) => commands::list_profiles(&switcher)?,
        Some(Commands::Use { name }) => commands::switch_to_profile(&switcher, name)?,
        Some(Commands::Rm { name }) => commands::remove_profile(&switcher, name)?,
        Some(Commands::Rename { origin, new }) => {
            commands::rename_profile(&switcher, origin, new)?
        }
        Some(Commands::Show { name, reveal }) => {
            commands::show_profile(&switcher, name, *reveal)?
        }
        Some(Commands::Set { name, key, value }) => {
            commands::edit_profile_value(&switcher, name, key, Some(value.as_str()))?
        }
        Some(Commands::Unset { name, key }) => {
            commands::edit_profile_value(&switcher, name, key, None)?
        }
        Some(Commands::Import { name }) => commands::import_current_profile(&switcher, name)?,
        Some(Commands::Current) => commands::show_current(&switcher)?,
        Some(Commands::Backups) => commands::list_backups(&switcher)?,
        Some(Commands::Ui) => tui::launch_tui(switcher)?,
        None => {
            // If no subcommand is provided, print help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
