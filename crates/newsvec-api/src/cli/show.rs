//! `newsvec show`: print stored article metadata.

use anyhow::Result;
use console::style;

use newsvec_core::article::store::ArticleStore;

use crate::state::AppState;

pub async fn show(state: &AppState, ids: &[String], json: bool) -> Result<()> {
    let found = state.store.get(ids).await?;
    let missing: Vec<&String> = ids
        .iter()
        .filter(|id| !found.iter().any(|r| &r.article_id == *id))
        .collect();

    if json {
        let out = serde_json::json!({ "articles": found, "not_found": missing });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for record in &found {
        println!();
        println!("  {}", style(&record.headline).cyan().bold());
        println!("  {}  {}", style("Id:").bold(), record.article_id);
        println!("  {}  {}", style("URI:").bold(), style(&record.uri).dim());
        println!();
        println!("  {}", record.abstract_text);
        println!();
        println!("  {}", style(&record.lead_paragraph).dim());
    }
    for id in &missing {
        println!();
        println!(
            "  {} Article '{}' not found",
            style("✗").red().bold(),
            style(id).yellow()
        );
    }
    println!();
    Ok(())
}
