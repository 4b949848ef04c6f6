mod cmsis;
mod config;
mod logging;
mod makefile;
mod materialize;

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use genmake_pdsc::{Descriptor, Language, LinkKind, Resolution, Verbosity};

use crate::cmsis::CmsisDirs;
use crate::config::Config;
use crate::logging::{setup_logging, LevelFilter};
use crate::makefile::Makefile;

#[derive(clap::Parser)]
#[clap(
    name = "genmake",
    about = "Generates a Makefile for an ARM device described by a CMSIS pack",
    version
)]
struct Cli {
    /// The `.pdsc` file describing the device pack.
    #[clap(short = 'f', long = "pdsc", value_name = "FILE")]
    pdsc: PathBuf,
    /// The device to generate the Makefile for, `name` or `name:processor`.
    #[clap(short, long)]
    device: String,
    /// Directory of the CMSIS core pack.
    #[clap(
        short = 'c',
        long = "cmsis-pack-dir",
        value_name = "DIR",
        env = "GENMAKE_CMSIS_PACK_DIR"
    )]
    cmsis_pack_dir: PathBuf,
    /// Copy the template, system, startup and linker files into the output directory.
    #[clap(long)]
    copy_config_files: bool,
    /// Project language, `c` or `cpp`.
    #[clap(short, long)]
    language: Option<String>,
    /// Project kind, `exe` or `lib`.
    #[clap(short, long)]
    kind: Option<String>,
    /// Vendor extension the project templates are read from.
    #[clap(short, long)]
    extension: Option<String>,
    /// Directory the Makefile and copied files are written to.
    #[clap(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,
    /// Additional configuration file (.toml, .json, .yaml or .yml).
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print the resolved dependencies as YAML.
    #[clap(long)]
    show_dependencies: bool,
    /// Print the release history of the pack.
    #[clap(long)]
    releases: bool,
    /// Report the progress of the resolution.
    #[clap(short, long)]
    verbose: bool,
    #[clap(long, value_enum, help_heading = "LOG CONFIGURATION")]
    log_level: Option<LevelFilter>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // All diagnostics go to stdout.
            println!("{} {error:#}", "Error:".red().bold());
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(Path::new("."), cli.config.as_deref())?;
    setup_logging(cli.log_level.or(config.general.log_level), cli.verbose);

    let cmsis = CmsisDirs::probe(&cli.cmsis_pack_dir)?;

    println!(
        "#pdscfile: {} ## cmsis_packdir: {}",
        cli.pdsc.display(),
        cli.cmsis_pack_dir.display()
    );

    let verbosity = if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Quiet
    };
    let descriptor = Descriptor::load(&cli.pdsc, verbosity)
        .with_context(|| format!("Failed to load '{}'.", cli.pdsc.display()))?;

    if cli.releases {
        for release in descriptor.releases() {
            println!(
                "{} ({}): {}",
                release.version, release.date, release.description
            );
        }
    }

    println!("~~~~~~~~~~~~~~~~~~~~~");
    println!("List of devices: {}", descriptor.list_devices().join(", "));
    println!("~~~~~~~~~~~~~~~~~~~~~");

    let environments = descriptor.environments(&cli.device)?;
    tracing::info!("Environments: {}", environments.join(", "));
    let specifics = descriptor.device_specifics(&cli.device)?;
    tracing::debug!("Device specifics: {specifics:?}");

    let language = cli.language.unwrap_or(config.general.language);
    let kind = cli.kind.unwrap_or(config.general.kind);
    let extension = cli.extension.unwrap_or(config.general.extension);

    let mut dependencies =
        match descriptor.resolve_dependencies(&cli.device, &language, &kind, &extension)? {
            Resolution::Resolved(dependencies) => dependencies,
            Resolution::Skipped(skip) => {
                warning(skip);
                println!("No Makefile generated.");
                return Ok(());
            }
        };

    for missing in &cmsis.missing {
        warning(missing);
    }
    cmsis.apply(&mut dependencies);

    if cli.show_dependencies {
        print!("{}", serde_yaml::to_string(&dependencies)?);
    }

    // Both were accepted by the resolver.
    let language = language.parse::<Language>().map_err(anyhow::Error::msg)?;
    let kind = kind.parse::<LinkKind>().map_err(anyhow::Error::msg)?;

    std::fs::create_dir_all(&cli.output_dir).with_context(|| {
        format!(
            "Failed to create output directory '{}'.",
            cli.output_dir.display()
        )
    })?;
    let files = materialize::materialize(&dependencies, cli.copy_config_files, &cli.output_dir)?;

    let makefile = Makefile {
        device: &cli.device,
        language,
        kind,
        dependencies: &dependencies,
        files: &files,
        toolchain: &config.toolchain,
        flags: &config.flags,
    };
    let path = makefile.write(&cli.output_dir)?;
    let path = path.canonicalize().unwrap_or(path);
    println!("Makefile generated ({}).", path.display());

    Ok(())
}

fn warning(message: impl Display) {
    println!("{} {message}", "Warning:".yellow().bold());
}
