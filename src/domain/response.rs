use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A ranked excerpt returned by a retrieval backend.
///
/// Highlights are keyed by field name in a `BTreeMap` so iteration order,
/// and with it context assembly, is deterministic. Never mutated after
/// creation; owned by the response that carries it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// Source document identifier
    pub document_id: String,
    /// Document title, never empty (backends substitute the id when the
    /// index has no title for a document)
    pub title: String,
    /// Body excerpt
    #[serde(default)]
    pub content: String,
    /// Extractive captions, most relevant first
    #[serde(default)]
    pub captions: Vec<String>,
    /// Highlighted fragments keyed by field name
    #[serde(default)]
    pub highlights: BTreeMap<String, Vec<String>>,
    /// Backend relevance score
    pub score: f64,
}

impl RetrievedPassage {
    pub fn new(document_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            title: title.into(),
            content: String::new(),
            captions: Vec::new(),
            highlights: BTreeMap::new(),
            score: 0.0,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.captions.push(caption.into());
        self
    }

    pub fn with_highlights(
        mut self,
        field: impl Into<String>,
        fragments: Vec<String>,
    ) -> Self {
        self.highlights.insert(field.into(), fragments);
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}

/// A generated answer with the documents it was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchAnswer {
    pub text: String,
    /// Identifiers of the documents whose lines were in the grounding
    /// context for this answer
    #[serde(default)]
    pub citations: Vec<String>,
}

impl SearchAnswer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }

    pub fn with_citations(mut self, citations: Vec<String>) -> Self {
        self.citations = citations;
        self
    }
}

/// The unified result of one orchestration run: retrieved passages in
/// descending relevance order plus zero or more generated answers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub passages: Vec<RetrievedPassage>,
    pub answers: Vec<SearchAnswer>,
}

impl SearchResponse {
    pub fn new(passages: Vec<RetrievedPassage>, answers: Vec<SearchAnswer>) -> Self {
        Self { passages, answers }
    }

    /// Response for a strategy without a generation step.
    pub fn retrieval_only(passages: Vec<RetrievedPassage>) -> Self {
        Self {
            passages,
            answers: Vec::new(),
        }
    }

    pub fn has_answers(&self) -> bool {
        !self.answers.is_empty()
    }
}
