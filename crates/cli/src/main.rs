//! Elocute CLI: contraction expansion, IPA conversion and validation.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};

use elocute_core::{ExpansionMode, Normalizer, NormalizerConfig};

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "elocute",
    about = "Pronunciation normalization for text-to-speech",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Expand contractions
    Expand(ExpandArgs),
    /// Convert text to stress-marked IPA
    Ipa(IpaArgs),
    /// Report the contractions found in text
    Analyze(AnalyzeArgs),
    /// Check an IPA string
    Validate(ValidateArgs),
    /// Expand, convert and validate in one pass
    Normalize(NormalizeArgs),
}

// ─── Shared arguments (embedded in each subcommand) ──────────────

#[derive(Parser, Debug)]
struct SharedArgs {
    /// Input text (read from stdin when omitted)
    text: Option<String>,

    /// JSON config file (built-in defaults when omitted or unreadable)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Parser, Debug)]
struct ExpandArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Expansion mode
    #[arg(long, default_value = "enhanced", value_parser = ["enhanced", "basic", "phonetic-only"])]
    mode: String,
}

#[derive(Parser, Debug)]
struct IpaArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Language tag, e.g. en-US or fr
    #[arg(long, default_value = "en-US")]
    language: String,
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    #[command(flatten)]
    shared: SharedArgs,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    #[command(flatten)]
    shared: SharedArgs,
}

#[derive(Parser, Debug)]
struct NormalizeArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Language tag, e.g. en-US or fr
    #[arg(long, default_value = "en-US")]
    language: String,

    /// Expansion mode
    #[arg(long, default_value = "enhanced", value_parser = ["enhanced", "basic", "phonetic-only"])]
    mode: String,
}

impl Command {
    fn shared(&self) -> &SharedArgs {
        match self {
            Command::Expand(a) => &a.shared,
            Command::Ipa(a) => &a.shared,
            Command::Analyze(a) => &a.shared,
            Command::Validate(a) => &a.shared,
            Command::Normalize(a) => &a.shared,
        }
    }
}

// ─── Main ────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    // Init logging
    let log_level = if cli.command.shared().verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Expand(args) => run_expand(args),
        Command::Ipa(args) => run_ipa(args),
        Command::Analyze(args) => run_analyze(args),
        Command::Validate(args) => run_validate(args),
        Command::Normalize(args) => run_normalize(args),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Positional text, or all of stdin.
fn input_text(shared: &SharedArgs) -> Result<String> {
    if let Some(text) = &shared.text {
        return Ok(text.clone());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read text from stdin")?;
    Ok(buf.trim_end_matches(['\n', '\r']).to_string())
}

fn build_normalizer(shared: &SharedArgs) -> Normalizer {
    let config = NormalizerConfig::load_or_default(shared.config.as_deref());
    Normalizer::new_or_builtin(&config)
}

fn parse_mode(mode: &str) -> Result<ExpansionMode> {
    mode.parse().map_err(|e: String| anyhow!(e))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ─── Subcommands ─────────────────────────────────────────────────

fn run_expand(args: ExpandArgs) -> Result<()> {
    let mode = parse_mode(&args.mode)?;
    let text = input_text(&args.shared)?;
    let normalizer = build_normalizer(&args.shared);

    let expanded = normalizer.expand_contractions(&text, mode);
    if args.shared.json {
        print_json(&serde_json::json!({
            "original": text,
            "expanded": expanded,
            "mode": mode,
        }))
    } else {
        println!("{expanded}");
        Ok(())
    }
}

fn run_ipa(args: IpaArgs) -> Result<()> {
    let text = input_text(&args.shared)?;
    let normalizer = build_normalizer(&args.shared);

    let ipa = normalizer.to_ipa(&text, &args.language);
    if args.shared.json {
        print_json(&serde_json::json!({
            "text": text,
            "language": args.language,
            "ipa": ipa,
        }))
    } else {
        println!("{ipa}");
        Ok(())
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let text = input_text(&args.shared)?;
    let normalizer = build_normalizer(&args.shared);

    let report = normalizer.analyze(&text);
    if args.shared.json {
        return print_json(&report);
    }
    if report.is_empty() {
        println!("No known contractions found");
        return Ok(());
    }
    println!("Found ({} occurrences): {}", report.occurrences, report.found.join(", "));
    for (label, list) in [
        ("High priority", &report.high_priority),
        ("Context-sensitive", &report.context_sensitive),
        ("Phonetic guidance", &report.phonetic_guidance),
        ("Natural", &report.natural),
        ("Problematic", &report.problematic),
    ] {
        if !list.is_empty() {
            println!("{label}: {}", list.join(", "));
        }
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    let ipa = input_text(&args.shared)?;
    let normalizer = build_normalizer(&args.shared);

    let report = normalizer.validate(&ipa);
    if args.shared.json {
        print_json(&report)?;
    } else if report.is_valid {
        println!("valid");
    } else {
        for error in &report.errors {
            println!("{error}");
        }
    }

    if !report.is_valid {
        bail!("{} validation error(s)", report.errors.len());
    }
    Ok(())
}

fn run_normalize(args: NormalizeArgs) -> Result<()> {
    let mode = parse_mode(&args.mode)?;
    let text = input_text(&args.shared)?;
    let normalizer = build_normalizer(&args.shared);

    let result = normalizer.normalize(&text, &args.language, mode);
    if args.shared.json {
        return print_json(&result);
    }
    println!("Expanded: {}", result.expanded);
    println!("IPA:      {}", result.ipa);
    if !result.validation.is_valid {
        println!("Issues:   {}", result.validation.errors.join("; "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["elocute", "expand", "I'm here", "--mode", "basic"]).unwrap();
        match cli.command {
            Command::Expand(args) => {
                assert_eq!(args.shared.text.as_deref(), Some("I'm here"));
                assert_eq!(args.mode, "basic");
            }
            _ => panic!("expected expand"),
        }

        let cli = Cli::try_parse_from(["elocute", "ipa", "--language", "fr", "-v"]).unwrap();
        assert!(cli.command.shared().verbose);
        assert!(cli.command.shared().text.is_none());
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["elocute", "expand", "x", "--mode", "fancy"]).is_err());
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode("phonetic-only").unwrap(), ExpansionMode::PhoneticOnly);
        assert!(parse_mode("nope").is_err());
    }
}
