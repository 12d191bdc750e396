//! rch-scan CLI
//!
//! Entry point for the `rch-scan` command-line tool.

use clap::{Args, Parser, Subcommand, ValueEnum};
use rch_scan::config::{env_overrides, ConfigError};
use rch_scan::runner::{self, RunOptions};
use rch_scan::{OutputEnv, OutputStyle, RunError};
use rch_simctl::{Device, DeviceSource, SimPlatform, Simctl, StaticDevices};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rch-scan")]
#[command(about = "Run Xcode unit tests on a simulator", version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the run and execute the xcodebuild test pipeline
    Test {
        #[command(flatten)]
        scan: ScanArgs,

        /// Print the command instead of running it
        #[arg(long)]
        dry_run: bool,

        /// Read simulators from a saved `simctl list devices -j` file
        #[arg(long)]
        simctl_json: Option<PathBuf>,

        /// Path to repo config file (default: .rch/scan.toml next to the project)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// List available simulators
    Devices {
        /// Only list devices for this platform
        #[arg(long, short = 'p', value_enum)]
        platform: Option<PlatformArg>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Read simulators from a saved `simctl list devices -j` file
        #[arg(long)]
        simctl_json: Option<PathBuf>,
    },

    /// Show the effective configuration and its sources
    Config {
        #[command(flatten)]
        scan: ScanArgs,

        /// Path to repo config file (default: .rch/scan.toml next to the project)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PlatformArg {
    Ios,
    Tvos,
    Watchos,
}

impl From<PlatformArg> for SimPlatform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Ios => SimPlatform::Ios,
            PlatformArg::Tvos => SimPlatform::Tvos,
            PlatformArg::Watchos => SimPlatform::Watchos,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    Standard,
    Basic,
    Rspec,
}

impl From<StyleArg> for OutputStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Standard => OutputStyle::Standard,
            StyleArg::Basic => OutputStyle::Basic,
            StyleArg::Rspec => OutputStyle::Rspec,
        }
    }
}

/// Scan options settable from the command line
#[derive(Args)]
struct ScanArgs {
    /// Path to the .xcworkspace
    #[arg(long, short = 'w')]
    workspace: Option<PathBuf>,

    /// Path to the .xcodeproj
    #[arg(long)]
    project: Option<PathBuf>,

    /// Simulator to use, e.g. "iPhone 6 (9.0)"
    #[arg(long, short = 'a')]
    device: Option<String>,

    /// Scheme to test
    #[arg(long, short = 's')]
    scheme: Option<String>,

    /// Clean before testing
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    clean: Option<bool>,

    /// Enable code coverage
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    code_coverage: Option<bool>,

    /// Write an xcresult bundle to the output directory
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    result_bundle: Option<bool>,

    /// Directory for reports and result bundles
    #[arg(long, short = 'o')]
    output_directory: Option<PathBuf>,

    /// xcpretty output style
    #[arg(long, value_enum)]
    output_style: Option<StyleArg>,

    /// Directory for the raw xcodebuild log
    #[arg(long, short = 'l')]
    buildlog_path: Option<PathBuf>,

    #[arg(long)]
    derived_data_path: Option<PathBuf>,

    /// SDK to build against
    #[arg(long, short = 'k')]
    sdk: Option<String>,

    /// Build configuration, e.g. Debug
    #[arg(long, short = 'q')]
    configuration: Option<String>,

    /// Use a raw xcodebuild destination instead of selecting a simulator
    #[arg(long, short = 'd')]
    destination: Option<String>,

    /// Extra arguments passed to xcodebuild verbatim
    #[arg(long, short = 'x')]
    xcargs: Option<String>,

    /// Extra .xcconfig file
    #[arg(long, short = 'y')]
    xcconfig: Option<PathBuf>,
}

impl ScanArgs {
    /// The CLI configuration layer; unset flags are left out
    fn to_value(&self) -> Value {
        let mut layer = Map::new();

        let mut text = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                layer.insert(key.to_string(), Value::String(value));
            }
        };
        text("workspace", path_string(&self.workspace));
        text("project", path_string(&self.project));
        text("device", self.device.clone());
        text("scheme", self.scheme.clone());
        text("output_directory", path_string(&self.output_directory));
        text("buildlog_path", path_string(&self.buildlog_path));
        text("derived_data_path", path_string(&self.derived_data_path));
        text("sdk", self.sdk.clone());
        text("configuration", self.configuration.clone());
        text("destination", self.destination.clone());
        text("xcargs", self.xcargs.clone());
        text("xcconfig", path_string(&self.xcconfig));

        for (key, value) in [
            ("clean", self.clean),
            ("code_coverage", self.code_coverage),
            ("result_bundle", self.result_bundle),
        ] {
            if let Some(flag) = value {
                layer.insert(key.to_string(), Value::Bool(flag));
            }
        }

        if let Some(style) = self.output_style {
            if let Ok(value) = serde_json::to_value(OutputStyle::from(style)) {
                layer.insert("output_style".to_string(), value);
            }
        }

        Value::Object(layer)
    }
}

fn path_string(path: &Option<PathBuf>) -> Option<String> {
    path.as_ref().map(|p| p.to_string_lossy().to_string())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Commands::Test {
            scan,
            dry_run,
            simctl_json,
            config,
        } => run_test(&scan, dry_run, simctl_json, config),
        Commands::Devices {
            platform,
            json,
            simctl_json,
        } => run_devices(platform, json, simctl_json),
        Commands::Config { scan, config } => run_config(&scan, config),
    };

    process::exit(code);
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "rch_scan=debug,rch_simctl=debug,rch_xcproject=debug"
    } else {
        "rch_scan=info,rch_simctl=info,rch_xcproject=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_env_layer() -> Result<Value, RunError> {
    Ok(env_overrides(std::env::vars())?)
}

fn device_source(simctl_json: Option<PathBuf>) -> Result<Box<dyn DeviceSource>, RunError> {
    match simctl_json {
        Some(path) => Ok(Box::new(StaticDevices::from_json_file(&path)?)),
        None => Ok(Box::new(Simctl::new())),
    }
}

fn run_test(
    scan: &ScanArgs,
    dry_run: bool,
    simctl_json: Option<PathBuf>,
    config: Option<PathBuf>,
) -> i32 {
    match test_pipeline(scan, dry_run, simctl_json, config) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            e.exit_code()
        }
    }
}

fn test_pipeline(
    scan: &ScanArgs,
    dry_run: bool,
    simctl_json: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<i32, RunError> {
    let dir = std::env::current_dir()
        .map_err(|e| RunError::Config(ConfigError::IoError(e.to_string())))?;
    let options = RunOptions {
        dir,
        repo_config: config,
        env_overrides: Some(load_env_layer()?),
        cli_overrides: Some(scan.to_value()),
        dry_run,
        output_env: OutputEnv::from_env(),
    };

    let devices = device_source(simctl_json)?;
    let run = runner::prepare(&options, devices.as_ref())?;

    if dry_run {
        println!("{}", run.command_line());
        return Ok(0);
    }
    runner::execute(&run.command_line())
}

fn run_devices(platform: Option<PlatformArg>, json_output: bool, simctl_json: Option<PathBuf>) -> i32 {
    let listed: Result<Vec<Device>, RunError> = match simctl_json {
        Some(path) => StaticDevices::from_json_file(&path)
            .map(|source| source.all().to_vec())
            .map_err(RunError::from),
        None => Simctl::new().list_all().map_err(RunError::from),
    };

    let mut devices = match listed {
        Ok(devices) => devices,
        Err(e) => {
            error!("{}", e);
            return e.exit_code();
        }
    };
    if let Some(platform) = platform {
        let platform = SimPlatform::from(platform);
        devices.retain(|d| d.platform == platform);
    }

    if json_output {
        match serde_json::to_string_pretty(&devices) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                return 1;
            }
        }
        return 0;
    }

    if devices.is_empty() {
        println!("No simulators available.");
        return 0;
    }

    println!("Available simulators ({} total):\n", devices.len());
    for device in &devices {
        println!("  {} [{}]", device.display_name(), device.platform);
        println!("    UDID: {}", device.udid);
        if !device.state.is_empty() {
            println!("    State: {}", device.state);
        }
    }
    0
}

fn run_config(scan: &ScanArgs, config: Option<PathBuf>) -> i32 {
    let result = std::env::current_dir()
        .map_err(|e| RunError::Config(ConfigError::IoError(e.to_string())))
        .and_then(|dir| {
            let options = RunOptions {
                dir,
                repo_config: config,
                env_overrides: Some(load_env_layer()?),
                cli_overrides: Some(scan.to_value()),
                ..Default::default()
            };
            runner::effective_for_dir(&options)
        });

    let effective = match result {
        Ok(effective) => effective,
        Err(e) => {
            error!("{}", e);
            return e.exit_code();
        }
    };

    if let Err(e) = effective.scan_config() {
        eprintln!("Configuration error: {}", e);
        return 1;
    }

    match effective.to_json() {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            1
        }
    }
}
