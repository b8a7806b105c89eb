//! Command handlers

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::Shell;
use itertools::{Either, Itertools};
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, OutputFormat, Settings};
use crate::domain::{Contract, NondisclosureRequest};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::{load_request, InfraError};

/// Dispatch a parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, run with --help for usage".into(),
        ));
    };

    match command {
        Commands::Generate {
            requests,
            format,
            output_dir,
        } => cmd_generate(cli, requests, *format, output_dir.as_deref()),
        Commands::Validate { request } => cmd_validate(cli, request),
        Commands::Context { request } => cmd_context(cli, request),
        Commands::Fragments => cmd_fragments(cli),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cmd_config_show(cli),
            ConfigCommands::Path => cmd_config_path(),
        },
        Commands::Completion { shell } => {
            cmd_completion(*shell);
            Ok(())
        }
    }
}

fn current_dir() -> CliResult<PathBuf> {
    std::env::current_dir()
        .map_err(|e| CliError::from(InfraError::io("determine working directory", e)))
}

/// Layered settings with the `--fragments` override applied last.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let cwd = current_dir()?;
    let mut settings = Settings::load(Some(cwd.as_path()))?;
    if let Some(dir) = &cli.fragments {
        settings.fragments_dir = dir.clone();
    }
    debug!("settings: fragments_dir={}", settings.fragments_dir.display());
    Ok(settings)
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    Ok(ServiceContainer::new(load_settings(cli)?))
}

fn load(container: &ServiceContainer, path: &Path) -> CliResult<NondisclosureRequest> {
    Ok(load_request(container.fs.as_ref(), path)?)
}

// ============================================================
// Generation
// ============================================================

#[instrument(skip(cli))]
fn cmd_generate(
    cli: &Cli,
    requests: &[PathBuf],
    format: Option<OutputFormat>,
    output_dir: Option<&Path>,
) -> CliResult<()> {
    let container = container(cli)?;
    let format = format.unwrap_or(container.settings.output_format);
    let batch = requests.len() > 1;

    if let Some(dir) = output_dir {
        prepare_output_dir(&container, dir, requests, format)?;
    }

    // A request that cannot be read is a failure of that request only.
    let (ready, mut failures): (Vec<_>, Vec<_>) = requests
        .iter()
        .enumerate()
        .partition_map(|(index, path)| match load(&container, path) {
            Ok(request) => Either::Left(((index, path), request)),
            Err(e) => {
                report_failure(batch, path, &e);
                Either::Right((index, e))
            }
        });
    let (slots, loaded): (Vec<(usize, &PathBuf)>, Vec<NondisclosureRequest>) =
        ready.into_iter().unzip();

    let results = container.nondisclosure.generate_batch(&loaded);
    for ((index, path), result) in slots.into_iter().zip(results) {
        let outcome = result
            .map_err(CliError::from)
            .and_then(|contract| emit(&container, &contract, path, format, output_dir, batch));
        if let Err(e) = outcome {
            report_failure(batch, path, &e);
            failures.push((index, e));
        }
    }

    match failures.into_iter().min_by_key(|(index, _)| *index) {
        Some((_, e)) => Err(e),
        None => Ok(()),
    }
}

/// Refuse targets that are not directories or that two requests would share.
fn prepare_output_dir(
    container: &ServiceContainer,
    dir: &Path,
    requests: &[PathBuf],
    format: OutputFormat,
) -> CliResult<()> {
    if container.fs.exists(dir) && !container.fs.is_dir(dir) {
        return Err(CliError::InvalidArgs(format!(
            "--output-dir {} is not a directory",
            dir.display()
        )));
    }

    if let Some(target) = requests
        .iter()
        .map(|path| output_path(dir, path, format))
        .duplicates()
        .next()
    {
        return Err(CliError::InvalidArgs(format!(
            "several requests would be written to {}",
            target.display()
        )));
    }

    container
        .fs
        .create_dir_all(dir)
        .map_err(|e| InfraError::io(format!("create {}", dir.display()), e))?;
    Ok(())
}

fn report_failure(batch: bool, path: &Path, e: &CliError) {
    if batch {
        output::failure(&format!("{}: {}", path.display(), e));
    }
}

/// Write one contract to its target file, or to stdout.
fn emit(
    container: &ServiceContainer,
    contract: &Contract,
    request: &Path,
    format: OutputFormat,
    output_dir: Option<&Path>,
    batch: bool,
) -> CliResult<()> {
    let rendered = render_contract(contract, format)?;
    match output_dir {
        Some(dir) => {
            let target = output_path(dir, request, format);
            container
                .fs
                .write(&target, &rendered)
                .map_err(|e| InfraError::io(format!("write {}", target.display()), e))?;
            output::action("Generated", &target.display());
        }
        None => {
            if batch {
                output::header(&request.display());
            }
            output::info(&rendered);
        }
    }
    Ok(())
}

fn render_contract(contract: &Contract, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Text => Ok(contract.to_string()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(contract).map_err(|e| CliError::Output(e.to_string()))
        }
        OutputFormat::Outline => Ok(contract.outline().to_string()),
    }
}

/// `<dir>/<request stem>.<format extension>`
fn output_path(dir: &Path, request: &Path, format: OutputFormat) -> PathBuf {
    let stem = request
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "contract".to_string());
    dir.join(format!("{}.{}", stem, format.extension()))
}

// ============================================================
// Inspection
// ============================================================

fn cmd_validate(cli: &Cli, path: &Path) -> CliResult<()> {
    let container = container(cli)?;
    let request = load(&container, path)?;
    container.nondisclosure.context(&request)?;

    output::success(&format!(
        "{}: valid {} request with {} parties",
        path.display(),
        request.contract_variant,
        request.parties.len()
    ));
    Ok(())
}

fn cmd_context(cli: &Cli, path: &Path) -> CliResult<()> {
    let container = container(cli)?;
    let request = load(&container, path)?;
    let context = container.nondisclosure.context(&request)?;

    let json =
        serde_json::to_string_pretty(&context).map_err(|e| CliError::Output(e.to_string()))?;
    output::info(&json);
    Ok(())
}

fn cmd_fragments(cli: &Cli) -> CliResult<()> {
    let container = container(cli)?;
    for key in container.fragments.keys()? {
        output::info(&key);
    }
    Ok(())
}

// ============================================================
// Config & completion
// ============================================================

fn cmd_config_show(cli: &Cli) -> CliResult<()> {
    let settings = load_settings(cli)?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path() -> CliResult<()> {
    let cwd = current_dir()?;

    output::header("Config paths");
    match global_config_path() {
        Some(path) => print_config_path("global", &path),
        None => output::detail("global: (no config directory on this platform)"),
    }
    print_config_path("local", &local_config_path(&cwd));
    Ok(())
}

fn print_config_path(label: &str, path: &Path) {
    let marker = if path.exists() { "" } else { " (not found)" };
    output::detail(&format!("{}: {}{}", label, path.display(), marker));
}

fn cmd_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_uses_request_stem_and_format_extension() {
        let dir = Path::new("/out");

        assert_eq!(
            output_path(dir, Path::new("requests/acme.toml"), OutputFormat::Json),
            PathBuf::from("/out/acme.json")
        );
        assert_eq!(
            output_path(dir, Path::new("acme.json"), OutputFormat::Outline),
            PathBuf::from("/out/acme.txt")
        );
    }
}
