mod cli;
mod paths;
mod run;
mod still;

use std::path::Path;

use anyhow::Result;
use cli::{Command, ConfigAction};
use still::StillRequest;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let config_path = paths::resolve_config_file(cli.config.as_deref())?;
    match cli.command {
        Some(Command::Config(config_cmd)) => handle_config_command(config_cmd.action, &config_path),
        Some(Command::Still(args)) => {
            let config = run::load_config(&config_path)?;
            still::export(&StillRequest::resolve(&config, args))
        }
        None => {
            let config = run::load_config(&config_path)?;
            run::run(&config, cli.run)
        }
    }
}

fn handle_config_command(action: ConfigAction, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Where => {
            let status = if config_path.exists() {
                "present"
            } else {
                "missing; defaults apply"
            };
            println!("{} ({status})", config_path.display());
            Ok(())
        }
        ConfigAction::Show => {
            let config = run::load_config(config_path)?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}
