//! Loader for the NYT article metadata CSV.
//!
//! Keeps the `uri`, `headline`, `abstract` and `lead_paragraph` columns and
//! drops rows where any of them is missing. The headline column holds a
//! dict literal such as `{'main': 'Title', 'kicker': None}`; only the `main`
//! entry is kept.

use std::io::Read;
use std::path::Path;

use newsvec_types::article::ArticleRecord;
use newsvec_types::error::DatasetError;

/// Rows read from the top of the file when no limit is given.
pub const DEFAULT_LIMIT: usize = 5000;

/// Cell values treated as missing.
const MISSING_VALUES: [&str; 3] = ["", " ", "[]"];

const REQUIRED_COLUMNS: [&str; 4] = ["uri", "headline", "abstract", "lead_paragraph"];

/// Load articles from a CSV file, reading at most `limit` data rows.
pub fn load_articles(path: &Path, limit: usize) -> Result<Vec<ArticleRecord>, DatasetError> {
    let file = std::fs::File::open(path)?;
    read_articles(file, limit)
}

/// Parse articles from any CSV source.
///
/// `limit` counts raw rows, so dropped rows still use up the budget.
pub fn read_articles<R: Read>(source: R, limit: usize) -> Result<Vec<ArticleRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| DatasetError::Csv(e.to_string()))?
        .clone();
    let mut positions = [0usize; 4];
    for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or(DatasetError::MissingColumn(name))?;
    }

    let mut articles = Vec::new();
    let mut dropped = 0usize;
    for row in reader.records().take(limit) {
        let row = row.map_err(|e| DatasetError::Csv(e.to_string()))?;
        let cell = |i: usize| row.get(positions[i]).filter(|v| !MISSING_VALUES.contains(v));

        let parsed = (|| {
            let uri = cell(0)?;
            let headline = main_headline(cell(1)?)?;
            Some(ArticleRecord {
                article_id: article_id_from_uri(uri).to_string(),
                uri: uri.to_string(),
                headline,
                abstract_text: cell(2)?.to_string(),
                lead_paragraph: cell(3)?.to_string(),
            })
        })();

        match parsed {
            Some(article) => articles.push(article),
            None => dropped += 1,
        }
    }

    tracing::info!(loaded = articles.len(), dropped, "loaded article dataset");
    Ok(articles)
}

/// Last `/`-separated segment of `uri`.
pub fn article_id_from_uri(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// The `main` entry of a headline dict literal.
///
/// A value that is not a dict literal is returned as-is. `None` when the
/// dict has no string `main` entry.
pub fn main_headline(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('{') {
        return Some(trimmed.to_string());
    }

    let mut rest = &trimmed[1..];
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.starts_with('}') || rest.is_empty() {
            return None;
        }
        let (key, after_key) = parse_literal(rest)?;
        let after_colon = after_key.trim_start().strip_prefix(':')?.trim_start();
        let (value, after_value) = parse_literal(after_colon)?;
        if key.as_deref() == Some("main") {
            return value;
        }
        rest = after_value;
    }
}

/// Parse one literal at the start of `input`.
///
/// Quoted strings yield `Some(text)`; bare tokens such as `None` yield
/// `None`. Returns the remaining input.
fn parse_literal(input: &str) -> Option<(Option<String>, &str)> {
    let mut chars = input.char_indices();
    let (_, first) = chars.next()?;

    if first != '\'' && first != '"' {
        let end = input
            .find(|c: char| c == ',' || c == '}' || c == ':')
            .unwrap_or(input.len());
        return Some((None, &input[end..]));
    }

    let mut text = String::new();
    let mut escaped = false;
    for (i, c) in chars {
        if escaped {
            text.push(match c {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == first {
            return Some((Some(text), &input[i + c.len_utf8()..]));
        } else {
            text.push(c);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "abstract,web_url,headline,lead_paragraph,uri\n";

    fn parse(body: &str, limit: usize) -> Vec<ArticleRecord> {
        read_articles(format!("{HEADER}{body}").as_bytes(), limit).unwrap()
    }

    #[test]
    fn test_main_headline_from_dict_literal() {
        let raw = r#"{'main': "Nixon's Last Day", 'kicker': None, 'print_headline': 'X'}"#;
        assert_eq!(main_headline(raw).as_deref(), Some("Nixon's Last Day"));
    }

    #[test]
    fn test_main_headline_not_first_key() {
        let raw = "{'kicker': 'Op-Ed', 'main': 'A \\'Quiet\\' Week'}";
        assert_eq!(main_headline(raw).as_deref(), Some("A 'Quiet' Week"));
    }

    #[test]
    fn test_main_headline_plain_string_is_kept() {
        assert_eq!(main_headline("Just a Title").as_deref(), Some("Just a Title"));
    }

    #[test]
    fn test_main_headline_missing_or_none() {
        assert_eq!(main_headline("{'kicker': 'Op-Ed'}"), None);
        assert_eq!(main_headline("{'main': None, 'kicker': 'x'}"), None);
        assert_eq!(main_headline("{'main': 'unterminated"), None);
    }

    #[test]
    fn test_article_id_is_last_uri_segment() {
        assert_eq!(
            article_id_from_uri("nyt://article/3e2f1c9a-5d2b-5c4e-9f00-1a2b3c4d5e6f"),
            "3e2f1c9a-5d2b-5c4e-9f00-1a2b3c4d5e6f"
        );
        assert_eq!(article_id_from_uri("no-slashes"), "no-slashes");
    }

    #[test]
    fn test_read_articles_extracts_fields() {
        let rows = parse(
            "Markets fell.,https://x,\"{'main': 'Stocks Slide', 'kicker': None}\",Shares dropped.,nyt://article/abc\n",
            10,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].article_id, "abc");
        assert_eq!(rows[0].uri, "nyt://article/abc");
        assert_eq!(rows[0].headline, "Stocks Slide");
        assert_eq!(rows[0].abstract_text, "Markets fell.");
        assert_eq!(rows[0].lead_paragraph, "Shares dropped.");
    }

    #[test]
    fn test_rows_with_missing_values_are_dropped() {
        let rows = parse(
            concat!(
                ",u,\"{'main': 'No Abstract'}\",lead,nyt://article/1\n",
                "abs,u,\"{'main': 'Empty Lead'}\",[],nyt://article/2\n",
                "abs,u,\"{'main': 'Blank Lead'}\", ,nyt://article/3\n",
                "abs,u,\"{'kicker': 'No Main'}\",lead,nyt://article/4\n",
                "abs,u,\"{'main': 'Kept'}\",lead,nyt://article/5\n",
            ),
            10,
        );
        let ids: Vec<&str> = rows.iter().map(|r| r.article_id.as_str()).collect();
        assert_eq!(ids, vec!["5"]);
    }

    #[test]
    fn test_limit_counts_raw_rows() {
        let rows = parse(
            concat!(
                ",u,\"{'main': 'Dropped'}\",lead,nyt://article/1\n",
                "abs,u,\"{'main': 'Second'}\",lead,nyt://article/2\n",
                "abs,u,\"{'main': 'Third'}\",lead,nyt://article/3\n",
            ),
            2,
        );
        let ids: Vec<&str> = rows.iter().map(|r| r.article_id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let err = read_articles("uri,headline,abstract\nx,y,z\n".as_bytes(), 10).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn("lead_paragraph")));
    }

    #[test]
    fn test_load_articles_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nyt-metadata.csv");
        std::fs::write(
            &path,
            format!("{HEADER}abs,u,\"{{'main': 'From Disk'}}\",lead,nyt://article/d1\n"),
        )
        .unwrap();

        let rows = load_articles(&path, DEFAULT_LIMIT).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].headline, "From Disk");
    }
}
