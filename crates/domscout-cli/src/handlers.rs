//! Subcommand handlers

use domscout::{DiscoveryConfig, DiscoveryOutcome, DiscoveryRequest};

use crate::commands::{ConfigArgs, DiscoverArgs};
use crate::config::{apply_overrides, build_request};
use crate::error::CliResult;

/// Effective configuration as YAML
pub fn execute_config(config: &DiscoveryConfig, args: &ConfigArgs) -> CliResult<String> {
    if args.defaults {
        Ok(serde_yaml_ng::to_string(&DiscoveryConfig::default())?)
    } else {
        Ok(serde_yaml_ng::to_string(config)?)
    }
}

/// Merge flags into the configuration and build the request
pub fn prepare_discover(
    config: DiscoveryConfig,
    args: &DiscoverArgs,
) -> CliResult<(DiscoveryConfig, DiscoveryRequest)> {
    let config = apply_overrides(config, args);
    config.validate()?;
    let request = build_request(&config, args)?;
    Ok((config, request))
}

/// Run discovery in a Chromium session
#[cfg(feature = "browser")]
pub async fn execute_discover(
    config: DiscoveryConfig,
    request: &DiscoveryRequest,
) -> CliResult<DiscoveryOutcome> {
    use domscout::{ChromiumLauncher, Discoverer};

    let launcher = ChromiumLauncher::new(config.browser.clone());
    let discoverer = Discoverer::with_config(launcher, config);
    Ok(discoverer.discover(request).await?)
}

/// Run discovery in a Chromium session
#[cfg(not(feature = "browser"))]
#[allow(clippy::unused_async)]
pub async fn execute_discover(
    _config: DiscoveryConfig,
    _request: &DiscoveryRequest,
) -> CliResult<DiscoveryOutcome> {
    Err(crate::error::CliError::config(
        "domscout was built without the `browser` feature; rebuild with --features browser",
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use crate::error::CliError;
    use clap::Parser;

    fn discover_args(args: &[&str]) -> DiscoverArgs {
        let mut argv = vec!["domscout", "discover"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Commands::Discover(args) => args,
            Commands::Config(_) => panic!("expected Discover command"),
        }
    }

    #[test]
    fn test_config_yaml_lists_sections() {
        let yaml = execute_config(&DiscoveryConfig::default(), &ConfigArgs { defaults: false }).unwrap();
        for section in ["browser:", "hydration:", "enumeration:", "login:", "environments:"] {
            assert!(yaml.contains(section), "missing {section}");
        }
    }

    #[test]
    fn test_config_yaml_round_trips() {
        let config = DiscoveryConfig::new().with_hydration(4321, 100);
        let yaml = execute_config(&config, &ConfigArgs { defaults: false }).unwrap();
        let parsed: DiscoveryConfig = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_defaults_ignore_loaded_file() {
        let config = DiscoveryConfig::new().with_hydration(4321, 100);
        let yaml = execute_config(&config, &ConfigArgs { defaults: true }).unwrap();
        assert!(!yaml.contains("4321"));
    }

    #[test]
    fn test_prepare_discover_applies_flags() {
        let args = discover_args(&["--env", "stage", "--no-sandbox"]);
        let (config, request) = prepare_discover(DiscoveryConfig::default(), &args).unwrap();
        assert!(!config.browser.sandbox);
        assert_eq!(request.url, "https://stage.my.charitableimpact.com");
    }

    #[test]
    fn test_prepare_discover_rejects_unknown_env() {
        let args = discover_args(&["--env", "nowhere"]);
        let err = prepare_discover(DiscoveryConfig::default(), &args).unwrap_err();
        assert!(matches!(err, CliError::Scout(_)));
    }
}
