use super::scorer::FuzzyScorer;
use super::types::{Rank, ScoredMatch, SearchField};
use crate::corpus::types::Document;
use std::sync::Arc;

/// Which optional fields take part in scoring. Title, description and topics always do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldSet {
    pub include_content: bool,
}

impl FieldSet {
    pub fn with_content() -> Self {
        Self {
            include_content: true,
        }
    }
}

/// Scores every document against a query and orders the matches.
#[derive(Clone)]
pub struct RankingEngine {
    scorer: Arc<dyn FuzzyScorer>,
    fields: FieldSet,
}

impl RankingEngine {
    pub fn new(scorer: Arc<dyn FuzzyScorer>, fields: FieldSet) -> Self {
        Self { scorer, fields }
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    pub fn fields(&self) -> FieldSet {
        self.fields
    }

    /// Ranks `documents` against `query`.
    ///
    /// Each document keeps the maximum rank over its fields; documents that never match are
    /// dropped. The sort is stable, so equal ranks come out in corpus order. An empty query
    /// matches nothing.
    pub fn rank<'a>(&self, query: &str, documents: &'a [Document]) -> Vec<ScoredMatch<'a>> {
        if query.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<ScoredMatch<'a>> = documents
            .iter()
            .filter_map(|document| self.score_document(query, document))
            .collect();

        matches.sort_by(|a, b| b.rank.cmp(&a.rank));
        matches
    }

    fn score_document<'a>(&self, query: &str, document: &'a Document) -> Option<ScoredMatch<'a>> {
        let mut best: Option<(Rank, SearchField)> = None;

        for (field, text) in searchable_fields(document, self.fields.include_content) {
            let rank = self.scorer.score(query, text);
            if rank > best.map(|(r, _)| r).unwrap_or(0) {
                best = Some((rank, field));
            }
        }

        best.map(|(rank, field)| ScoredMatch {
            document,
            rank,
            field,
        })
    }
}

/// Field texts of `document` in scoring order.
fn searchable_fields(
    document: &Document,
    include_content: bool,
) -> impl Iterator<Item = (SearchField, &str)> {
    let content = include_content.then_some((SearchField::Content, document.content.as_str()));

    [
        (SearchField::Title, document.frontmatter.title.as_str()),
        (SearchField::Description, document.frontmatter.description.as_str()),
    ]
    .into_iter()
    .chain(
        document
            .frontmatter
            .topics
            .iter()
            .map(|topic| (SearchField::Topic, topic.as_str())),
    )
    .chain(content)
}
