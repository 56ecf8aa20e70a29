//! `newsvec recommend` and `newsvec ask`: print ranked recommendations.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Input;

use newsvec_types::article::Recommendation;

use crate::state::AppState;

/// Recommend articles similar to a stored article.
///
/// # Examples
///
/// ```bash
/// newsvec recommend 4f3b2a10-0c1d-5e6f-8a9b-0123456789ab --top-k 10
/// ```
pub async fn recommend(
    state: &AppState,
    article_id: &str,
    top_k: Option<usize>,
    json: bool,
) -> Result<()> {
    let top_k = top_k.unwrap_or(state.config.store.top_k);
    let rec = state
        .recommendation_service
        .recommend(article_id, top_k)
        .await
        .with_context(|| format!("No recommendations for '{article_id}'"))?;

    print_recommendation(&rec, &format!("Articles similar to '{article_id}'"), json)
}

/// Recommend articles for a free-text preference, prompting for it if needed.
pub async fn ask(state: &AppState, query: Option<String>, top_k: Option<usize>, json: bool) -> Result<()> {
    let query = match query {
        Some(q) => q,
        None => Input::<String>::new()
            .with_prompt("What would you like to read about?")
            .interact_text()?,
    };
    if query.trim().is_empty() {
        anyhow::bail!("Query must not be empty");
    }

    let top_k = top_k.unwrap_or(state.config.store.top_k);
    let rec = state
        .recommendation_service
        .recommend_for_text(&query, top_k)
        .await
        .context("Failed to find recommendations")?;

    print_recommendation(&rec, &format!("Articles for \"{query}\""), json)
}

fn print_recommendation(rec: &Recommendation, title: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rec)?);
        return Ok(());
    }

    if rec.recommended_ids.is_empty() {
        println!();
        println!(
            "  {} The store is empty. Run `newsvec index <csv>` first.",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Headline").fg(Color::White),
        Cell::new("Id").fg(Color::White),
        Cell::new("Distance").fg(Color::White),
    ]);

    for (rank, (record, distance)) in rec.metadatas.iter().zip(&rec.distances).enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1).fg(Color::DarkGrey),
            Cell::new(truncate(&record.headline, 60)).fg(Color::Cyan),
            Cell::new(&record.article_id).fg(Color::DarkGrey),
            Cell::new(format!("{distance:.4}")).fg(Color::Yellow),
        ]);
    }

    println!();
    println!("  {}", style(title).bold());
    println!();
    println!("{table}");
    println!();
    Ok(())
}

/// Cut `text` to at most `max` characters, marking the cut with `...`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
