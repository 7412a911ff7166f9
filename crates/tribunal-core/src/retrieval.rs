//! Context retrieval boundary
//!
//! Sessions fall back to a [`ContextRetriever`] when the caller supplied no
//! context for a domain. Ranking and keyword extraction live behind this
//! trait, outside the engine.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::domain::Domain;
use crate::error::RetrievalError;
use crate::request::ContextDocument;

/// Source of supporting passages for a domain
#[async_trait]
pub trait ContextRetriever: Send + Sync + std::fmt::Debug {
    /// Fetch passages relevant to `query` within `domain`. May return an empty list.
    async fn retrieve(
        &self,
        query: &str,
        domain: Domain,
    ) -> Result<Vec<ContextDocument>, RetrievalError>;
}

/// Retriever that never finds anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoContext;

#[async_trait]
impl ContextRetriever for NoContext {
    async fn retrieve(
        &self,
        _query: &str,
        _domain: Domain,
    ) -> Result<Vec<ContextDocument>, RetrievalError> {
        Ok(Vec::new())
    }
}

/// In-memory retriever over a fixed corpus per domain.
///
/// Returns documents sharing at least one word of four or more letters with
/// the query, in corpus order, up to `limit`.
#[derive(Debug, Default, Clone)]
pub struct StaticContextRetriever {
    corpus: BTreeMap<Domain, Vec<ContextDocument>>,
    limit: usize,
}

impl StaticContextRetriever {
    /// Create an empty retriever returning at most `limit` documents
    pub fn new(limit: usize) -> Self {
        Self {
            corpus: BTreeMap::new(),
            limit,
        }
    }

    /// Add a document to a domain's corpus
    pub fn insert(&mut self, domain: Domain, doc: ContextDocument) {
        self.corpus.entry(domain).or_default().push(doc);
    }

    fn keywords(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= 4)
            .map(str::to_lowercase)
            .collect()
    }
}

#[async_trait]
impl ContextRetriever for StaticContextRetriever {
    async fn retrieve(
        &self,
        query: &str,
        domain: Domain,
    ) -> Result<Vec<ContextDocument>, RetrievalError> {
        let Some(docs) = self.corpus.get(&domain) else {
            return Ok(Vec::new());
        };
        let wanted = Self::keywords(query);
        let hits = docs
            .iter()
            .filter(|doc| {
                Self::keywords(&doc.text)
                    .iter()
                    .any(|word| wanted.contains(word))
            })
            .take(self.limit)
            .cloned()
            .collect::<Vec<_>>();
        tracing::debug!(domain = %domain, hits = hits.len(), "static retrieval");
        Ok(hits)
    }
}
