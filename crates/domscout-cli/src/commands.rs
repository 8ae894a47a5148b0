//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Domscout: discover stable locators for the interactive elements of a page
#[derive(Parser, Debug)]
#[command(name = "domscout")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a page and print a locator record per interactive element
    Discover(DiscoverArgs),

    /// Print the effective configuration as YAML
    Config(ConfigArgs),
}

/// Where to point the browser
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Page URL
    #[arg(long)]
    pub url: Option<String>,

    /// Named environment from the configuration (production, qa, stage)
    #[arg(long)]
    pub env: Option<String>,
}

/// Arguments for the discover command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct DiscoverArgs {
    /// Target page
    #[command(flatten)]
    pub target: TargetArgs,

    /// Log in with this username before scanning
    #[arg(long, env = "DOMSCOUT_USERNAME", requires = "password")]
    pub username: Option<String>,

    /// Password for --username
    #[arg(long, env = "DOMSCOUT_PASSWORD", hide_env_values = true, requires = "username")]
    pub password: Option<String>,

    /// Reuse session cookies from a JSON file instead of logging in
    /// (takes precedence over --username/--password)
    #[arg(long)]
    pub cookies: Option<PathBuf>,

    /// Process every element, even without authentication
    #[arg(long)]
    pub smart: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: FormatArg,

    /// Show the browser window
    #[arg(long)]
    pub no_headless: bool,

    /// Disable the Chromium sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Path to the Chromium executable
    #[arg(long)]
    pub chromium: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Print the built-in defaults, ignoring --config
    #[arg(long)]
    pub defaults: bool,
}

/// Output format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Aligned table with warnings
    #[default]
    Table,
    /// Full outcome as JSON
    Json,
    /// One `name | strategy=value` line per record
    Grounding,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorArg {
    /// Should output be colored
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stdout().features().colors_supported(),
        }
    }
}
