//! Splice operator CLI.
//!
//! Inspects and initializes the pipeline configuration, and answers whether the
//! configured exclusions let the pipeline touch a given artifact.

use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use splice_config::SpliceConfig;
use tracing::{debug, info};

/// Splice command line arguments.
#[derive(Parser, Debug)]
#[command(name = "splice")]
#[command(about = "Load-time artifact transformation pipeline")]
struct Args {
	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Manage the configuration file
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
	/// Report whether artifacts may be transformed
	Check {
		/// Configuration file (defaults to the platform config directory)
		#[arg(short, long, value_name = "PATH")]
		path: Option<PathBuf>,

		/// Artifact names, e.g. `net.game.Main`
		#[arg(required = true)]
		names: Vec<String>,
	},
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
	/// Write the default configuration
	Init {
		#[arg(short, long, value_name = "PATH")]
		path: Option<PathBuf>,

		/// Overwrite an existing file
		#[arg(long)]
		force: bool,
	},
	/// Print the effective configuration
	Show {
		#[arg(short, long, value_name = "PATH")]
		path: Option<PathBuf>,
	},
}

/// Outcome of `splice check` for one name.
#[derive(Debug, PartialEq, Eq)]
enum Verdict<'a> {
	Transformable,
	Excluded { prefix: &'a str },
}

fn main() -> Result<(), Box<dyn Error>> {
	let args = Args::parse();

	let config_path = match &args.command {
		Command::Config {
			action: ConfigAction::Init { path, .. } | ConfigAction::Show { path },
		}
		| Command::Check { path, .. } => resolve_path(path.clone())?,
	};

	// A missing or broken file must not stop `config init` from replacing it.
	let enable_log = SpliceConfig::load(&config_path)
		.map(|c| c.enable_log)
		.unwrap_or(true);
	setup_tracing(args.verbose, enable_log);
	debug!(path = %config_path.display(), "configuration path");

	let mut stdout = io::stdout().lock();
	match args.command {
		Command::Config {
			action: ConfigAction::Init { force, .. },
		} => {
			init_config(&config_path, force)?;
			writeln!(stdout, "wrote {}", config_path.display())?;
		}
		Command::Config {
			action: ConfigAction::Show { .. },
		} => {
			let config = read_config(&config_path)?;
			write!(stdout, "{}", config.to_toml()?)?;
		}
		Command::Check { names, .. } => {
			let config = read_config(&config_path)?;
			for name in &names {
				match verdict(&config, name) {
					Verdict::Transformable => writeln!(stdout, "{name}\ttransformable")?,
					Verdict::Excluded { prefix } => writeln!(stdout, "{name}\texcluded by {prefix:?}")?,
				}
			}
		}
	}

	Ok(())
}

fn resolve_path(path: Option<PathBuf>) -> Result<PathBuf, splice_config::ConfigError> {
	match path {
		Some(path) => Ok(path),
		None => splice_config::default_config_path(),
	}
}

/// Loads `path` without creating it; a missing file means the defaults.
fn read_config(path: &Path) -> Result<SpliceConfig, splice_config::ConfigError> {
	if path.exists() {
		SpliceConfig::load(path)
	} else {
		debug!(path = %path.display(), "no configuration file, using defaults");
		Ok(SpliceConfig::default())
	}
}

fn init_config(path: &Path, force: bool) -> Result<(), Box<dyn Error>> {
	if path.exists() && !force {
		return Err(format!("{} already exists (use --force to overwrite)", path.display()).into());
	}
	SpliceConfig::default().save(path)?;
	info!(path = %path.display(), "default configuration written");
	Ok(())
}

fn verdict<'a>(config: &'a SpliceConfig, name: &str) -> Verdict<'a> {
	if config.exclusion_filter().evaluate(name) {
		return Verdict::Transformable;
	}
	match config.exclusions().find(|prefix| name.starts_with(prefix)) {
		Some(prefix) => Verdict::Excluded { prefix },
		None => Verdict::Transformable,
	}
}

/// Filter used when `RUST_LOG` is unset.
fn default_directives(verbose: bool, enable_log: bool) -> &'static str {
	match (enable_log, verbose) {
		(false, _) => "splice=off",
		(true, true) => "splice=trace",
		(true, false) => "splice=info",
	}
}

fn setup_tracing(verbose: bool, enable_log: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_directives(verbose, enable_log)));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.with_target(verbose)
		.init();
}
