//! Configuration loading and flag overrides

use std::fs;
use std::path::Path;

use domscout::{Credentials, DiscoveryConfig, DiscoveryRequest, SessionCookie};

use crate::commands::DiscoverArgs;
use crate::error::{CliError, CliResult};

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Warnings and phase summaries
    #[default]
    Normal,
    /// Per-phase progress
    Verbose,
    /// Per-element detail
    Debug,
}

impl Verbosity {
    /// Derive the level from `-q` and the `-v` count
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Default tracing filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }
}

/// Install the tracing subscriber. Logs go to stderr so stdout stays
/// parseable for `--format json`.
pub fn init_logging(verbosity: Verbosity) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter())))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Load the configuration file, or the defaults when none is given
pub fn load_config(path: Option<&Path>) -> CliResult<DiscoveryConfig> {
    let Some(path) = path else {
        return Ok(DiscoveryConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|e| {
        CliError::config(format!("cannot read {}: {e}", path.display()))
    })?;
    let config: DiscoveryConfig = serde_yaml_ng::from_str(&text)?;
    config.validate()?;
    Ok(config)
}

/// Apply browser flags on top of the file configuration
#[must_use]
pub fn apply_overrides(mut config: DiscoveryConfig, args: &DiscoverArgs) -> DiscoveryConfig {
    if args.no_headless {
        config.browser.headless = false;
    }
    if args.no_sandbox {
        config.browser.sandbox = false;
    }
    if let Some(ref path) = args.chromium {
        config.browser.chromium_path = Some(path.display().to_string());
    }
    if args.smart {
        config.enumeration.smart = true;
    }
    config
}

/// Read session cookies exported as a JSON array
pub fn load_cookies(path: &Path) -> CliResult<Vec<SessionCookie>> {
    let text = fs::read_to_string(path).map_err(|e| {
        CliError::invalid_argument(format!("cannot read cookies {}: {e}", path.display()))
    })?;
    let cookies: Vec<SessionCookie> = serde_json::from_str(&text)?;
    if cookies.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "{} contains no cookies",
            path.display()
        )));
    }
    Ok(cookies)
}

/// Build the discovery request for the parsed arguments
pub fn build_request(config: &DiscoveryConfig, args: &DiscoverArgs) -> CliResult<DiscoveryRequest> {
    let url = match (&args.target.url, &args.target.env) {
        (Some(url), _) => url.clone(),
        (None, Some(env)) => config.target_url(env)?.to_string(),
        (None, None) => return Err(CliError::invalid_argument("either --url or --env is required")),
    };

    let mut request = DiscoveryRequest::new(url).with_smart(args.smart);
    if let Some(ref path) = args.cookies {
        request = request.with_cookies(load_cookies(path)?);
    } else if let (Some(username), Some(password)) = (&args.username, &args.password) {
        request = request.with_credentials(Credentials::new(username.clone(), password.clone()));
    }
    Ok(request)
}
