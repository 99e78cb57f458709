use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, Exporter, ImportedTree, Importer};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{RenderStyle, TreeError, TreeRender};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    // Completions must work even with a broken config.
    if let Some(Commands::Completion { shell }) = &cli.command {
        return completion(*shell);
    }

    let settings = effective_settings(cli)?;
    match &cli.command {
        Some(Commands::Render { file, names }) => render(&settings, file, *names),
        Some(Commands::Ids { file }) => ids(&settings, file),
        Some(Commands::Export { file }) => export(&settings, file),
        Some(Commands::Config { command }) => config(&settings, command),
        Some(Commands::Completion { .. }) => Ok(()),
        None => Err(CliError::Usage("no command given, try --help".to_string())),
    }
}

/// Config files and environment, then command line flags.
fn effective_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(separator) = &cli.separator {
        settings.separator = separator.clone();
    }
    if let Some(policy) = cli.id_policy {
        settings.id_policy = policy;
    }
    settings.validate()?;
    debug!(?settings, "effective settings");
    Ok(settings)
}

fn tree_err(e: TreeError) -> CliError {
    CliError::Application(ApplicationError::from(e))
}

fn import(settings: &Settings, file: &Path) -> CliResult<ImportedTree> {
    Ok(Importer::new(settings).import_path(file)?)
}

#[instrument(level = "debug", skip(settings))]
fn render(settings: &Settings, file: &Path, names: bool) -> CliResult<()> {
    let ImportedTree { tree, root } = import(settings, file)?;
    let style = if names {
        RenderStyle::Name
    } else {
        settings.render_style
    };
    let rendered = tree.to_tree_string(root, style).map_err(tree_err)?;
    output::info(rendered.to_string().trim_end());
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn ids(settings: &Settings, file: &Path) -> CliResult<()> {
    let ImportedTree { tree, root } = import(settings, file)?;
    for (idx, node) in tree.subtree(root).map_err(tree_err)? {
        let path = tree.path_string(idx).map_err(tree_err)?;
        output::id_line(node.id(), &path);
    }
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn export(settings: &Settings, file: &Path) -> CliResult<()> {
    let ImportedTree { tree, root } = import(settings, file)?;
    output::info(Exporter::export_string(&tree, root)?.trim_end());
    Ok(())
}

fn config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::header("Effective settings");
            output::info(settings.to_toml()?.trim_end());
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => return Err(CliError::Usage("no home directory found".to_string())),
        },
    }
    Ok(())
}

fn completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
