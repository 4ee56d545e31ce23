use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use hanchk::cli::output::{self, OutputFormat};
use hanchk::pipeline::resolve::{GroupingResolution, Resolution};
use hanchk::pipeline::CheckRequest;
use hanchk::profanity::{self, EvaluateOptions, ProfanityAction};
use hanchk::provider::collect_rule_suggestions;
use hanchk::rules::basic::{quick_correct, BASIC_CORRECTIONS};
use hanchk::rules::korean::KO_RULES;
use hanchk::rules::lexicon::DICTIONARY_RULES;
use hanchk::{Config, Domain, Mode, SpellcheckEngine};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hanchk")]
#[command(version, about = "Korean text correction and moderation engine", long_about = None)]
struct Cli {
    /// Text to check (falls back to --file, then stdin)
    text: Option<String>,

    /// Read the text to check from a file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Mode: strict, balanced, fast
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Domain: general, music
    #[arg(short, long)]
    domain: Option<Domain>,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Exit with code 0 even when the profanity verdict is not allow
    #[arg(long, global = true)]
    no_fail: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Content-moderation verdict for the given text
    Profanity {
        text: Vec<String>,
    },
    /// Basic literal corrector (no pipeline, no network)
    Quick {
        text: Vec<String>,
    },
    /// Run the rule-table smoke harness with the grouping resolver
    Smoke,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "hanchk", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(command) = &cli.command {
        return handle_command(command, &cli);
    }

    let text = read_input(&cli)?;
    if text.trim().is_empty() {
        anyhow::bail!("No text provided. Pass text as an argument, via --file, or on stdin.");
    }

    let config = Config::load()?;
    let engine = SpellcheckEngine::from_config(&config);
    let response = engine
        .check(CheckRequest {
            text,
            mode: cli.mode.or(config.mode),
            domain: cli.domain.or(config.domain),
            trace_id: None,
        })
        .await;

    output::print_response(&response, !cli.no_color, &cli.format);
    Ok(())
}

fn read_input(cli: &Cli) -> Result<String> {
    if let Some(text) = &cli.text {
        return Ok(text.clone());
    }
    if let Some(path) = &cli.file {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn gathered_or_stdin(words: &[String]) -> Result<String> {
    if !words.is_empty() {
        return Ok(words.join(" "));
    }
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn handle_command(command: &Commands, cli: &Cli) -> Result<()> {
    match command {
        Commands::Profanity { text } => {
            let text = gathered_or_stdin(text)?;
            let evaluation = profanity::evaluate(&text, &EvaluateOptions::default());
            output::print_profanity(&evaluation, !cli.no_color, &cli.format);
            if evaluation.action != ProfanityAction::Allow && !cli.no_fail {
                std::process::exit(1);
            }
        }
        Commands::Quick { text } => {
            let text = gathered_or_stdin(text)?;
            let result = quick_correct(&text, &BASIC_CORRECTIONS)
                .map_err(|err| anyhow::anyhow!("{}", err))?;
            output::print_quick(&result, !cli.no_color);
        }
        Commands::Smoke => run_smoke()?,
    }
    Ok(())
}

struct SmokeCase {
    name: &'static str,
    text: &'static str,
    min: usize,
}

/// Rule-table smoke harness: the Korean and dictionary tables resolved with
/// the grouping strategy, with a floor on how many suggestions each case
/// must keep producing.
fn run_smoke() -> Result<()> {
    let cases = [
        SmokeCase {
            name: "lyrics-board",
            text: "오늘은 기분이 이상햇다. 친구가 웃엇다. 나는 그냥 참앗다. \
                   어쨋든 할수있을 거라고 생각햇다. 후회는 전부 버렷다.",
            min: 5,
        },
        SmokeCase {
            name: "typo-short",
            text: "그낭 걸엇어.",
            min: 2,
        },
        SmokeCase {
            name: "informal-typos",
            text: "쫌 구지 할려면 될려고 하지마.",
            min: 3,
        },
    ];

    let resolver = GroupingResolution::default();
    let mut failed = false;

    for case in &cases {
        let mut raw = collect_rule_suggestions(case.text, &KO_RULES, "smoke");
        raw.extend(collect_rule_suggestions(case.text, &DICTIONARY_RULES, "smoke"));
        let resolved = resolver.resolve(raw);

        println!("[smoke] {} suggestions={}", case.name, resolved.len());
        for r in resolved.iter().take(12) {
            println!(
                "  {} -> {} ({}, {:.2}{})",
                r.suggestion.before,
                r.suggestion.after,
                r.suggestion.reason,
                r.suggestion.confidence,
                r.group_id
                    .as_ref()
                    .map(|g| format!(", group {}", g))
                    .unwrap_or_default(),
            );
        }
        if resolved.len() < case.min {
            eprintln!(
                "[smoke] FAIL: {} expected >={}, got {}",
                case.name,
                case.min,
                resolved.len()
            );
            failed = true;
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
