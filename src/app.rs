use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, error::ErrorKind};

use crate::config::{FetchConfig, PairsConfig};
use crate::constants::sampler::DEFAULT_SAMPLE_SIZE;
use crate::constants::source::DEFAULT_COUNTRIES_URL;
use crate::orchestrator::Orchestrator;
use crate::report::{render_json, render_text};
use crate::source::{CachingSource, CountrySource, SnapshotCountrySource};

type DynSource = Arc<dyn CountrySource + 'static>;

#[derive(Debug, Parser)]
#[command(
    name = "border_pairs",
    disable_help_subcommand = true,
    about = "Sample countries and list the borders they share",
    long_about = "Draw a random sample of countries, fetch each country's neighbor list \
                  concurrently, and print the unique neighbor pairs within the sample.",
    after_help = "Set RUST_LOG=border_pairs=debug to trace sampling, fetches, \
                  and stale-cycle discards."
)]
/// CLI for `border_pairs`.
///
/// Common usage:
/// - Live API with defaults: `border_pairs`
/// - Reproducible run: `border_pairs --seed 7 --sample-size 12`
/// - Offline from a captured snapshot: `border_pairs --snapshot-dir ./snapshot`
struct BorderPairsCli {
    #[arg(
        long = "sample-size",
        default_value_t = DEFAULT_SAMPLE_SIZE,
        help = "Number of countries drawn per cycle"
    )]
    sample_size: usize,
    #[arg(long, help = "Optional deterministic base seed")]
    seed: Option<u64>,
    #[arg(
        long = "countries-url",
        value_name = "URL",
        default_value = DEFAULT_COUNTRIES_URL,
        help = "URL of the full country list"
    )]
    countries_url: String,
    #[arg(
        long = "snapshot-dir",
        value_name = "PATH",
        help = "Read countries.json and detail files from a local directory instead of the network"
    )]
    snapshot_dir: Option<PathBuf>,
    #[arg(
        long,
        default_value_t = 1,
        value_parser = parse_positive_usize,
        help = "Number of cycles to run; every cycle after the first is a retry"
    )]
    rounds: usize,
    #[arg(long, help = "Emit a JSON document per cycle instead of text")]
    json: bool,
    #[arg(
        long = "timeout-secs",
        default_value_t = 10,
        value_parser = parse_positive_u64,
        help = "Per-request timeout for network fetches"
    )]
    timeout_secs: u64,
    #[arg(
        long = "max-in-flight",
        default_value_t = 16,
        value_parser = parse_positive_usize,
        help = "Maximum concurrent detail fetches"
    )]
    max_in_flight: usize,
}

/// Run the `border_pairs` CLI with `args_iter` (program name excluded).
pub fn run_border_pairs<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let args = std::iter::once("border_pairs".to_string()).chain(args_iter);
    let Some(cli) = parse_cli::<BorderPairsCli, _>(args)? else {
        return Ok(());
    };

    let config = PairsConfig {
        sample_size: cli.sample_size,
        seed: cli.seed,
        countries_url: cli.countries_url.clone(),
        fetch: FetchConfig {
            max_in_flight: cli.max_in_flight,
            timeout: Duration::from_secs(cli.timeout_secs),
        },
    };
    config.validate()?;

    let source = build_source(&cli, &config)?;
    let orchestrator = Orchestrator::new(CachingSource::new(source), &config)?;
    let settle_timeout = settle_timeout(&config);

    for round in 0..cli.rounds {
        let cycle = if round == 0 {
            orchestrator.start()
        } else {
            orchestrator
                .retry()
                .ok_or("retry was refused while a cycle was still loading")?
        };
        let Some(state) = orchestrator.wait_until_settled(settle_timeout) else {
            return Err(format!(
                "cycle {cycle} did not settle within {}s",
                settle_timeout.as_secs()
            )
            .into());
        };
        if cli.json {
            println!("{}", render_json(orchestrator.base_seed(), &state)?);
        } else {
            if cli.rounds > 1 {
                println!("=== cycle {} ===", state.cycle);
            }
            print!("{}", render_text(&state));
            if round + 1 < cli.rounds {
                println!();
            }
        }
    }
    if !cli.json {
        eprintln!(
            "base seed: {} (pass --seed {} to replay)",
            orchestrator.base_seed(),
            orchestrator.base_seed()
        );
    }
    Ok(())
}

fn build_source(cli: &BorderPairsCli, config: &PairsConfig) -> Result<DynSource, Box<dyn Error>> {
    if let Some(dir) = &cli.snapshot_dir {
        if !dir.is_dir() {
            return Err(format!("snapshot directory {} does not exist", dir.display()).into());
        }
        return Ok(Arc::new(SnapshotCountrySource::new(dir.clone())));
    }
    network_source(config)
}

#[cfg(feature = "http")]
fn network_source(config: &PairsConfig) -> Result<DynSource, Box<dyn Error>> {
    Ok(Arc::new(crate::source::HttpCountrySource::from_config(
        config,
    )))
}

#[cfg(not(feature = "http"))]
fn network_source(_config: &PairsConfig) -> Result<DynSource, Box<dyn Error>> {
    Err("built without the `http` feature; pass --snapshot-dir".into())
}

/// Upper bound for one cycle: the list request plus one timeout per fetch wave, with slack.
fn settle_timeout(config: &PairsConfig) -> Duration {
    let waves = config
        .sample_size
        .div_ceil(config.fetch.max_in_flight.max(1))
        .max(1);
    let waves = u32::try_from(waves).unwrap_or(u32::MAX);
    config.fetch.timeout.saturating_mul(waves.saturating_add(2))
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(raw: &str) -> Result<u64, String> {
    let parsed = raw
        .parse::<u64>()
        .map_err(|_| format!("Could not parse '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn cli_defaults_match_config_defaults() {
        let cli = BorderPairsCli::try_parse_from(["border_pairs"]).unwrap();
        let defaults = PairsConfig::default();
        assert_eq!(cli.sample_size, defaults.sample_size);
        assert_eq!(cli.countries_url, defaults.countries_url);
        assert_eq!(cli.max_in_flight, defaults.fetch.max_in_flight);
        assert_eq!(cli.timeout_secs, defaults.fetch.timeout.as_secs());
        assert_eq!(cli.rounds, 1);
        assert!(!cli.json);
    }

    #[test]
    fn zero_rounds_are_rejected() {
        let err = BorderPairsCli::try_parse_from(["border_pairs", "--rounds", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn help_returns_without_running() {
        assert!(run_border_pairs(["--help".to_string()].into_iter()).is_ok());
    }

    #[test]
    fn missing_snapshot_dir_is_an_error() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("nope");
        let args = vec![
            "--snapshot-dir".to_string(),
            missing.display().to_string(),
        ];
        assert!(run_border_pairs(args.into_iter()).is_err());
    }

    #[test]
    fn runs_rounds_against_snapshot_dir() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("countries.json"),
            r#"[{"name": "Chad", "url": "Chad"}, {"name": "Niger", "url": "Niger"}]"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("Chad.json"),
            r#"{"names": {"name": "Chad"}, "neighbors": [{"name": "Niger"}]}"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("Niger.json"),
            r#"{"names": {"name": "Niger"}, "neighbors": [{"name": "Chad"}]}"#,
        )
        .unwrap();
        let args = vec![
            "--snapshot-dir".to_string(),
            temp.path().display().to_string(),
            "--sample-size".to_string(),
            "2".to_string(),
            "--rounds".to_string(),
            "2".to_string(),
            "--seed".to_string(),
            "3".to_string(),
        ];
        run_border_pairs(args.into_iter()).unwrap();
    }

    #[test]
    fn settle_timeout_saturates_for_huge_samples() {
        let config = PairsConfig {
            sample_size: u32::MAX as usize,
            fetch: FetchConfig {
                max_in_flight: 1,
                timeout: Duration::from_secs(1),
            },
            ..PairsConfig::default()
        };
        assert_eq!(settle_timeout(&config), Duration::from_secs(u32::MAX as u64));
        let config = PairsConfig {
            sample_size: usize::MAX,
            ..config
        };
        assert_eq!(settle_timeout(&config), Duration::from_secs(u32::MAX as u64));
    }

    #[test]
    fn oversized_sample_size_reports_a_failed_cycle() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("countries.json"),
            r#"[{"name": "Chad", "url": "Chad"}]"#,
        )
        .unwrap();
        let args = vec![
            "--snapshot-dir".to_string(),
            temp.path().display().to_string(),
            "--sample-size".to_string(),
            "4294967295".to_string(),
            "--max-in-flight".to_string(),
            "1".to_string(),
            "--seed".to_string(),
            "1".to_string(),
        ];
        run_border_pairs(args.into_iter()).unwrap();
    }

    #[test]
    fn settle_timeout_scales_with_fetch_waves() {
        let mut config = PairsConfig::default();
        config.sample_size = 40;
        config.fetch.max_in_flight = 16;
        config.fetch.timeout = Duration::from_secs(2);
        assert_eq!(settle_timeout(&config), Duration::from_secs(10));
    }
}
