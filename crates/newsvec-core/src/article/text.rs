use newsvec_types::article::ArticleRecord;

/// Text that represents `record` in embedding space.
///
/// Used for indexing and for query-time encoding of a stored article, so
/// both sides see the same normalisation.
pub fn article_text(record: &ArticleRecord) -> String {
    format!(
        "{}\n{}\n{}",
        record.headline.to_lowercase(),
        record.abstract_text.to_lowercase(),
        record.lead_paragraph.to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::article;

    #[test]
    fn test_fields_are_lowercased_and_newline_joined() {
        let record = ArticleRecord {
            abstract_text: "Markets RALLY".to_string(),
            lead_paragraph: "Stocks Rose on Friday.".to_string(),
            ..article("a1", "Wall Street")
        };
        assert_eq!(
            article_text(&record),
            "wall street\nmarkets rally\nstocks rose on friday."
        );
    }

    #[test]
    fn test_same_record_gives_same_text() {
        let record = article("a1", "Election Night");
        assert_eq!(article_text(&record), article_text(&record.clone()));
    }
}
