//! Article records, neighbors and recommendation responses.

use serde::{Deserialize, Serialize};

/// One news article as stored alongside its embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub article_id: String,
    pub uri: String,
    pub headline: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub lead_paragraph: String,
}

impl ArticleRecord {
    /// Name of the first text field that is blank, if any.
    pub fn missing_text_field(&self) -> Option<&'static str> {
        [
            ("headline", &self.headline),
            ("abstract", &self.abstract_text),
            ("lead_paragraph", &self.lead_paragraph),
        ]
        .into_iter()
        .find_map(|(name, value)| value.trim().is_empty().then_some(name))
    }
}

/// A stored article returned by a nearest-neighbor query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub article_id: String,
    pub metadata: ArticleRecord,
    pub distance: f32,
}

/// Response of the recommendation flow.
///
/// `recommended_ids`, `metadatas` and `distances` are parallel and ranked by
/// ascending distance. The queried article is not filtered out, so it
/// normally appears first with distance ~0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub queried_id: String,
    pub recommended_ids: Vec<String>,
    pub metadatas: Vec<ArticleRecord>,
    pub distances: Vec<f32>,
}

impl Recommendation {
    pub fn from_neighbors(queried_id: impl Into<String>, neighbors: Vec<Neighbor>) -> Self {
        let mut recommended_ids = Vec::with_capacity(neighbors.len());
        let mut metadatas = Vec::with_capacity(neighbors.len());
        let mut distances = Vec::with_capacity(neighbors.len());
        for n in neighbors {
            recommended_ids.push(n.article_id);
            metadatas.push(n.metadata);
            distances.push(n.distance);
        }
        Self {
            queried_id: queried_id.into(),
            recommended_ids,
            metadatas,
            distances,
        }
    }
}

/// Summary of an indexing run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    pub total: usize,
    pub indexed: usize,
    /// Articles whose embedding failed and were not stored.
    pub failed_ids: Vec<String>,
    pub cancelled: bool,
}
