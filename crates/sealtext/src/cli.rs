//! CLI command definitions and handlers

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

use sealtext::{
    command, locate_binary, Buffer, Kubeseal, Mode, SealError, Selection, TransformInput,
    Transformed,
};
use sealtext_core::{Config, DecryptOutput, Paths};

/// sealtext - Seal and unseal Kubernetes secret values with kubeseal
///
/// "Select, seal, done."
#[derive(Parser)]
#[command(name = "sealtext")]
#[command(version)]
#[command(about = "Seal and unseal Kubernetes secret values with kubeseal")]
#[command(after_help = "\
EXAMPLES:
    echo -n hunter2 | sealtext encrypt -n payments --name db
                                     Seal a value from stdin
    sealtext encrypt -f secret.yaml -r 112:119 -i
                                     Seal bytes 112..119 of a manifest in place
    sealtext decrypt -f sealed.yaml -r 140:512 --output print
                                     Unseal offline and print the Secret
    sealtext status                  Show kubeseal, certificate and key state
    sealtext config init             Create the settings file

METADATA:
    Namespace and name come from the buffer's metadata: block unless
    --namespace / --name are given.

SETTINGS:
    ~/.config/sealtext/config.toml, or --config / SEALTEXT_CONFIG.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// kubeseal executable (name on PATH or path)
    #[arg(long, global = true)]
    pub kubeseal: Option<String>,

    /// Seconds to wait for kubeseal before killing it
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seal the selection with the public certificate
    Encrypt {
        #[command(flatten)]
        target: TargetArgs,

        /// Public certificate (overrides cert_path)
        #[arg(long)]
        cert: Option<PathBuf>,
    },

    /// Unseal the selection offline with the controller private key
    Decrypt {
        #[command(flatten)]
        target: TargetArgs,

        /// Private key (overrides private_key_path)
        #[arg(long)]
        private_key: Option<PathBuf>,

        /// replace the selection, or print the unsealed Secret
        #[arg(long)]
        output: Option<DecryptOutput>,
    },

    /// Show kubeseal, certificate and key state
    Status,

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the settings in effect
    Show,
    /// Print the settings file location
    Path,
    /// Create the settings file with defaults
    Init,
}

/// Where the text comes from and which secret it belongs to
#[derive(Args)]
pub struct TargetArgs {
    /// File to read (default: stdin)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Byte range to transform, START:END (default: whole buffer)
    #[arg(short, long)]
    pub range: Option<Selection>,

    /// Write the result back to --file
    #[arg(short, long, requires = "file")]
    pub in_place: bool,

    /// Namespace (default: from the buffer's metadata)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Secret name (default: from the buffer's metadata)
    #[arg(long)]
    pub name: Option<String>,
}

/// Run the CLI
pub async fn run(cli: Cli) -> Result<()> {
    let config_path = Paths::new().resolve_config_file(cli.config.clone());
    let mut config = Config::load(&config_path)?;

    if let Some(ref kubeseal) = cli.kubeseal {
        config.kubeseal = kubeseal.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    match cli.command {
        Commands::Encrypt { ref target, ref cert } => {
            if let Some(cert) = cert {
                config.cert_path = Some(cert.clone());
            }
            cmd_transform(&cli, &config, Mode::Encrypt, target).await
        }
        Commands::Decrypt {
            ref target,
            ref private_key,
            output,
        } => {
            if let Some(key) = private_key {
                config.private_key_path = Some(key.clone());
            }
            if let Some(output) = output {
                config.decrypt_output = output;
            }
            cmd_transform(&cli, &config, Mode::Decrypt, target).await
        }
        Commands::Status => cmd_status(&config, &config_path, cli.json),
        Commands::Config { ref action } => match action {
            ConfigAction::Show => cmd_config_show(&config, cli.json),
            ConfigAction::Path => {
                println!("{}", config_path.display());
                Ok(())
            }
            ConfigAction::Init => cmd_config_init(&config_path),
        },
    }
}

/// Encrypt or decrypt a selection
async fn cmd_transform(cli: &Cli, config: &Config, mode: Mode, target: &TargetArgs) -> Result<()> {
    let view = View {
        json: cli.json,
        quiet: cli.quiet,
        print_only: mode == Mode::Decrypt && config.decrypt_output == DecryptOutput::Print,
    };

    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let report = transform(config, &view, mode, target, cancel).await?;
    report.commit()?;
    report.emit();

    if report.exit_code != 0 {
        std::process::exit(report.exit_code);
    }
    Ok(())
}

/// How a finished transform is presented
struct View {
    json: bool,
    quiet: bool,
    /// Decrypt prints the result instead of replacing the selection
    print_only: bool,
}

/// Everything a transform writes, prints and exits with
#[derive(Debug, Default)]
struct Report {
    write: Option<(PathBuf, String)>,
    stdout: String,
    stderr: String,
    exit_code: i32,
}

impl Report {
    /// Write the transformed buffer back, if there is one to write
    fn commit(&self) -> Result<()> {
        if let Some((ref file, ref text)) = self.write {
            std::fs::write(file, text)
                .with_context(|| format!("Failed to write {}", file.display()))?;
        }
        Ok(())
    }

    fn emit(&self) {
        print!("{}", self.stdout);
        eprint!("{}", self.stderr);
    }
}

/// Read the target, run the transform and build its report
async fn transform<C>(
    config: &Config,
    view: &View,
    mode: Mode,
    target: &TargetArgs,
    cancel: C,
) -> Result<Report>
where
    C: std::future::Future<Output = ()>,
{
    let text = read_input(target.file.as_deref())?;

    let input = TransformInput {
        mode,
        buffer: Buffer::new(text),
        selection: target.range,
        namespace: target.namespace.clone(),
        name: target.name.clone(),
    };

    let sealer = Kubeseal::from_config(config);
    let outcome = command::run_until(&sealer, &input, cancel).await;

    Ok(report(view, mode, target, outcome))
}

fn report(
    view: &View,
    mode: Mode,
    target: &TargetArgs,
    outcome: std::result::Result<Transformed, SealError>,
) -> Report {
    let done = match outcome {
        Ok(done) => done,
        Err(err) => {
            let mut report = Report {
                exit_code: err.exit_code(),
                ..Default::default()
            };
            if view.json {
                report.stdout = line(
                    &serde_json::json!({
                        "success": false,
                        "mode": mode.as_str(),
                        "error": err.to_string(),
                    })
                    .to_string(),
                );
            } else if !view.quiet {
                report.stderr = format!("ERROR: {}\n", err);
            }
            return report;
        }
    };

    let mut report = Report::default();

    if !view.print_only && target.in_place {
        if let Some(ref file) = target.file {
            report.write = Some((file.clone(), done.buffer.clone()));
        }
    }

    if view.json {
        let buffer = (!view.print_only).then_some(&done.buffer);
        report.stdout = line(
            &serde_json::json!({
                "success": true,
                "mode": mode.as_str(),
                "namespace": done.secret.namespace,
                "name": done.secret.name,
                "output": done.output,
                "buffer": buffer,
            })
            .to_string(),
        );
        return report;
    }

    if view.print_only {
        if target.in_place && !view.quiet {
            report.stderr = format!(
                "Decrypted output printed; {} left unchanged\n",
                display_target(target)
            );
        }
        report.stdout = line(&done.output);
    } else if target.in_place {
        if !view.quiet {
            report.stderr = format!(
                "Text {}ed in {} ({}/{})\n",
                mode.as_str(),
                display_target(target),
                done.secret.namespace,
                done.secret.name
            );
        }
    } else {
        report.stdout = line(&done.buffer);
    }

    report
}

/// Show kubeseal, certificate and key state
fn cmd_status(config: &Config, config_path: &Path, json: bool) -> Result<()> {
    let binary = locate_binary(&config.kubeseal).ok();
    let cert = path_state(config.cert_path.as_deref());
    let key = path_state(config.private_key_path.as_deref());

    if json {
        println!(
            "{}",
            serde_json::json!({
                "config": config_path.display().to_string(),
                "config_exists": config_path.exists(),
                "kubeseal": binary.as_ref().map(|p| p.display().to_string()),
                "cert_path": config.cert_path.as_ref().map(|p| p.display().to_string()),
                "cert": cert,
                "private_key_path": config.private_key_path.as_ref().map(|p| p.display().to_string()),
                "private_key": key,
                "timeout_secs": config.timeout_secs,
                "decrypt_output": config.decrypt_output.as_str(),
            })
        );
        return Ok(());
    }

    println!("sealtext Status");
    println!("----------------------------");
    println!(
        "Settings:     {}{}",
        config_path.display(),
        if config_path.exists() { "" } else { " (not created)" }
    );
    match binary {
        Some(path) => println!("kubeseal:     {}", path.display()),
        None => println!(
            "kubeseal:     {} not found - install kubeseal and add it to PATH",
            config.kubeseal
        ),
    }
    println!("Certificate:  {}", describe_path(config.cert_path.as_deref(), cert));
    println!("Private key:  {}", describe_path(config.private_key_path.as_deref(), key));
    println!("Timeout:      {}s", config.timeout_secs);
    println!("Decrypt to:   {}", config.decrypt_output.as_str());

    Ok(())
}

/// Print the settings in effect
fn cmd_config_show(config: &Config, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "kubeseal": config.kubeseal,
                "cert_path": config.cert_path,
                "private_key_path": config.private_key_path,
                "timeout_secs": config.timeout_secs,
                "decrypt_output": config.decrypt_output,
            })
        );
    } else {
        print!("{}", toml::to_string_pretty(config)?);
    }
    Ok(())
}

/// Create the settings file
fn cmd_config_init(path: &Path) -> Result<()> {
    if path.exists() {
        eprintln!("Settings already exist: {}", path.display());
        std::process::exit(1);
    }

    Config::default().save(path)?;

    println!("Created {}", path.display());
    println!("Set cert_path (encrypt) and private_key_path (decrypt) before use.");

    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// `text`, ending in exactly the newline it already has or one more
fn line(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{}\n", text)
    }
}

fn display_target(target: &TargetArgs) -> String {
    target
        .file
        .as_ref()
        .map(|f| f.display().to_string())
        .unwrap_or_else(|| "stdin".to_string())
}

fn path_state(path: Option<&Path>) -> &'static str {
    match path {
        None => "not configured",
        Some(p) if p.exists() => "ok",
        Some(_) => "missing",
    }
}

fn describe_path(path: Option<&Path>, state: &str) -> String {
    match path {
        Some(p) => format!("{} ({})", p.display(), state),
        None => state.to_string(),
    }
}
