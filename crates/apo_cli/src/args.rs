// crates/apo_cli/src/args.rs
//
// Command-line surface of `apo`. Every path must be local; `<scheme>://` is refused.

use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

use apo_core::config::MAX_ITERATIONS;

/// Parsed CLI arguments.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "apo",
    disable_help_subcommand = true,
    about = "Offline, deterministic CLI for the APO scoring engine"
)]
pub struct Args {
    /// Scoring payload JSON (items, optional category_apos, config, signals).
    #[arg(long)]
    pub input: PathBuf,

    /// Engine configuration JSON; replaces the payload's `config`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// External signals JSON; replaces the payload's `external_signals`.
    #[arg(long)]
    pub signals: Option<PathBuf>,

    /// Output directory for result.json and run_record.json.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Monte Carlo seed. Accepts decimal u64 or 0x-hex (≤16 hex digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    /// Monte Carlo trial count.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_ITERATIONS)))]
    pub iterations: Option<u32>,

    /// Skip the Monte Carlo band.
    #[arg(long)]
    pub no_ci: bool,

    /// Validate inputs only; do not score or write artifacts.
    #[arg(long)]
    pub validate_only: bool,

    /// Only log warnings and errors.
    #[arg(long)]
    pub quiet: bool,

    /// Log filter (e.g. `debug`, `apo_pipeline=trace`); overrides APO_LOG.
    #[arg(long)]
    pub log_level: Option<String>,
}

/// A path argument that names a remote resource.
#[derive(Debug, Error)]
#[error("--{flag} must be a local file, got {path:?}")]
pub struct NonLocalPath {
    pub flag: &'static str,
    pub path: String,
}

/// `--seed` value: decimal `u64`, or `0x` followed by 1..=16 hex digits.
pub fn parse_seed(raw: &str) -> Result<u64, String> {
    let raw = raw.trim();
    let (digits, radix) = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (raw, 10),
    };
    let well_formed = !digits.is_empty()
        && (radix == 10 || digits.len() <= 16)
        && digits.chars().all(|c| c.is_digit(radix));
    if !well_formed {
        return Err(format!("seed {raw:?}: expected a decimal u64 or 0x plus 1..=16 hex digits"));
    }
    u64::from_str_radix(digits, radix).map_err(|e| format!("seed {raw:?}: {e}"))
}

impl Args {
    /// Every path argument with the flag it came from.
    fn paths(&self) -> [(&'static str, Option<&Path>); 4] {
        [
            ("input", Some(self.input.as_path())),
            ("config", self.config.as_deref()),
            ("signals", self.signals.as_deref()),
            ("out", Some(self.out.as_path())),
        ]
    }

    /// Refuse URL-shaped paths. Whether a local file exists is the loaders'
    /// concern, so each input keeps its own exit code.
    pub fn ensure_local(&self) -> Result<(), NonLocalPath> {
        for (flag, path) in self.paths() {
            let Some(text) = path.and_then(Path::to_str) else { continue };
            if apo_io::looks_like_url_strict(text) {
                return Err(NonLocalPath { flag, path: text.to_string() });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("apo").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn seed_accepts_decimal_and_short_hex() {
        assert_eq!(parse_seed("42"), Ok(42));
        assert_eq!(parse_seed(" 0X2a "), Ok(42));
        assert_eq!(parse_seed("0xFFFFFFFFFFFFFFFF"), Ok(u64::MAX));
        for bad in ["", "0x", "0x1FFFFFFFFFFFFFFFF", "-1", "+5", "0x+5", "12a"] {
            assert!(parse_seed(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn url_paths_are_refused_by_flag() {
        let err = parse(&["--input", "p.json", "--signals", "HTTPS://host/s.json"]).ensure_local().unwrap_err();
        assert_eq!(err.flag, "signals");
        assert!(err.to_string().starts_with("--signals must be a local file"));

        assert!(parse(&["--input", "file:///tmp/p.json"]).ensure_local().is_err());
        assert!(parse(&["--input", r"C:\local\payload.json", "--out", "/tmp/out"]).ensure_local().is_ok());
    }

    #[test]
    fn flags_parse() {
        let a = parse(&["--input", "p.json", "--seed", "0x10", "--iterations", "500", "--no-ci", "--quiet"]);
        assert_eq!(a.seed, Some(16));
        assert_eq!(a.iterations, Some(500));
        assert!(a.no_ci && a.quiet && !a.validate_only);
        assert_eq!(a.out, PathBuf::from("."));
        assert!(Args::try_parse_from(["apo", "--input", "p.json", "--iterations", "0"]).is_err());
        assert!(Args::try_parse_from(["apo"]).is_err());
    }
}
