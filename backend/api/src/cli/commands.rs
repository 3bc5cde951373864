use anyhow::{Context, Result};
use colored::*;
use peitho_intent::{unclassified_queries, ClassificationComparison, EmergingIntentSuggestion};

use crate::config::Settings;
use crate::server::build_classifier;

/// Handle the `classify` command
pub async fn handle_classify(settings: &Settings, text: &str, json: bool) -> Result<()> {
    if !settings.validate_environment() {
        println!(
            "{}",
            "⚠️  OPENROUTER_API_KEY is missing or malformed, expect keyword fallback".yellow()
        );
    }

    let classifier = build_classifier(settings)?;
    let comparison = classifier.compare(text).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        print_comparison(text, &comparison);
    }
    Ok(())
}

fn print_comparison(text: &str, comparison: &ClassificationComparison) {
    let traditional = &comparison.traditional;
    let llm = &comparison.llm;

    println!("{} {}", "Customer:".bold(), text);
    println!("{}", "-".repeat(80).dimmed());
    println!("{}", "Traditional NLP".yellow().bold());
    println!("   Intent:     {}", traditional.intent);
    println!("   Confidence: {:.0}%", traditional.confidence * 100.0);
    println!("   Issues:     {}", traditional.issues.dimmed());
    println!("{}", "LLM Classification".green().bold());
    println!("   Intent:     {}", llm.intent.green());
    println!("   Confidence: {:.0}%", llm.confidence * 100.0);
    println!("   Reasoning:  {}", llm.reasoning);
    println!("   Latency:    {}ms", llm.latency_ms);
}

/// Handle the `discover` command
pub async fn handle_discover(settings: &Settings, json: bool) -> Result<()> {
    let classifier = build_classifier(settings)?;
    let queries = unclassified_queries();

    println!(
        "{}",
        format!("🔍 Analyzing {} unclassified queries...", queries.len()).cyan()
    );

    let suggestions = classifier
        .discover(&queries)
        .await
        .context("Discovery request did not complete")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else {
        print_suggestions(&suggestions);
    }
    Ok(())
}

fn print_suggestions(suggestions: &[EmergingIntentSuggestion]) {
    if suggestions.is_empty() {
        println!("{}", "No emerging intents suggested".dimmed());
        return;
    }

    for suggestion in suggestions {
        println!(
            "{} {}",
            suggestion.name.green().bold(),
            format!("({} queries, priority: {})", suggestion.count, suggestion.priority).dimmed()
        );
        println!("   {}", suggestion.description);
        if !suggestion.business_impact.is_empty() {
            println!("   Impact: {}", suggestion.business_impact);
        }
        for example in &suggestion.examples {
            println!("   - {}", example.dimmed());
        }
    }
}
