use crate::pipeline::CheckResponse;
use crate::profanity::{ProfanityAction, ProfanityEvaluation};
use crate::rules::basic::QuickCorrection;
use colored::*;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_response(response: &CheckResponse, colored_output: bool, format: &OutputFormat) {
    match format {
        OutputFormat::Json => print_json(response),
        OutputFormat::Text => print_text(response, colored_output),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("Failed to serialize output: {}", err),
    }
}

fn print_text(response: &CheckResponse, colored_output: bool) {
    if colored_output {
        println!("{}", "Corrected:".bold());
    } else {
        println!("Corrected:");
    }
    println!("{}", response.corrected_text);

    if response.suggestions.is_empty() {
        let reason = response
            .meta
            .reason_if_empty
            .as_deref()
            .unwrap_or("no_matches");
        if colored_output {
            println!("\n{} ({})", "No suggestions.".yellow(), reason.dimmed());
        } else {
            println!("\nNo suggestions. ({})", reason);
        }
    } else {
        println!();
        for suggestion in &response.suggestions {
            if colored_output {
                println!(
                    "  {} {} {} {} ({}, {:.2})",
                    format!("{}..{}", suggestion.start, suggestion.end).blue().bold(),
                    suggestion.original.red(),
                    "→".dimmed(),
                    suggestion.replacement.green(),
                    suggestion.message,
                    suggestion.confidence,
                );
            } else {
                println!(
                    "  {}..{} {} -> {} ({}, {:.2})",
                    suggestion.start,
                    suggestion.end,
                    suggestion.original,
                    suggestion.replacement,
                    suggestion.message,
                    suggestion.confidence,
                );
            }
        }
    }

    println!();
    for provider in &response.meta.providers {
        let status = if provider.ok { "ok" } else { "failed" };
        let warnings = provider
            .warnings
            .as_ref()
            .map(|w| format!(" [{}]", w.join(", ")))
            .unwrap_or_default();
        if colored_output {
            let status = if provider.ok {
                status.green().to_string()
            } else {
                status.red().to_string()
            };
            println!(
                "  {} {} {}ms{}",
                provider.name.cyan(),
                status,
                provider.ms,
                warnings.dimmed(),
            );
        } else {
            println!("  {} {} {}ms{}", provider.name, status, provider.ms, warnings);
        }
    }

    if response.meta.truncated {
        println!("\n{}", "Input was truncated.".yellow());
    }
}

pub fn print_profanity(
    evaluation: &ProfanityEvaluation,
    colored_output: bool,
    format: &OutputFormat,
) {
    match format {
        OutputFormat::Json => print_json(evaluation),
        OutputFormat::Text => {
            let action = evaluation.action.to_string();
            if colored_output {
                let action = match evaluation.action {
                    ProfanityAction::Allow => action.green().bold(),
                    ProfanityAction::Warn => action.yellow().bold(),
                    ProfanityAction::Mask | ProfanityAction::Block => action.red().bold(),
                };
                println!("action: {}", action);
            } else {
                println!("action: {}", action);
            }
            println!("score: {}", evaluation.score);
            if !evaluation.matched_rule_ids.is_empty() {
                println!("matched: {}", evaluation.matched_rule_ids.join(", "));
            }
        }
    }
}

pub fn print_quick(result: &QuickCorrection, colored_output: bool) {
    println!("{}", result.corrected);
    if result.changes.is_empty() {
        return;
    }
    println!();
    for change in &result.changes {
        if colored_output {
            println!(
                "  {} {} {}",
                change.from.red(),
                "→".dimmed(),
                change.to.green()
            );
        } else {
            println!("  {} -> {}", change.from, change.to);
        }
    }
    if result.truncated {
        println!("\n(input truncated)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
