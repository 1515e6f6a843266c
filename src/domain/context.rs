//! Grounding context assembly
//!
//! Renders retrieved passages into line-oriented context text, one
//! attributable fact per line, each prefixed with its document title. The
//! completion prompt binds this text to the `sources` placeholder.

use super::response::RetrievedPassage;

/// Pure renderer from passages to grounding text. Holds no state; the
/// same passage sequence always assembles to the same string.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Lines contributed by one passage: every caption first, then every
    /// highlight fragment, fields in name order. Fragments that normalize
    /// to nothing are dropped.
    pub fn render_passage(&self, passage: &RetrievedPassage) -> String {
        let mut block = String::new();

        for caption in &passage.captions {
            push_line(&mut block, &passage.title, caption);
        }

        for fragments in passage.highlights.values() {
            for fragment in fragments {
                push_line(&mut block, &passage.title, fragment);
            }
        }

        block
    }

    /// Concatenate passage blocks in the order given. No ranking and no
    /// truncation; which passages to include is the caller's decision.
    pub fn assemble(&self, passages: &[RetrievedPassage]) -> String {
        passages
            .iter()
            .map(|passage| self.render_passage(passage))
            .collect()
    }
}

fn push_line(block: &mut String, title: &str, text: &str) {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return;
    }

    block.push_str(title);
    block.push_str(": ");
    block.push_str(&normalized);
    block.push('\n');
}

/// Collapse every internal whitespace run (spaces, tabs, newlines) to a
/// single space and trim the ends, keeping the context line-oriented.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captions_then_highlights_with_title_prefix() {
        let passage = RetrievedPassage::new("doc-1", "Policy.pdf")
            .with_caption("Refunds within 30 days")
            .with_highlights("content", vec!["store credit only".to_string()]);

        let assembler = ContextAssembler::new();
        let context = assembler.assemble(std::slice::from_ref(&passage));

        assert_eq!(
            context,
            "Policy.pdf: Refunds within 30 days\nPolicy.pdf: store credit only\n"
        );
    }

    #[test]
    fn test_internal_whitespace_collapsed() {
        let passage = RetrievedPassage::new("doc-1", "Policy.pdf")
            .with_caption("Refunds\r\nwithin\t  30 days ");

        let context = ContextAssembler::new().assemble(&[passage]);
        assert_eq!(context, "Policy.pdf: Refunds within 30 days\n");
    }

    #[test]
    fn test_passage_order_preserved() {
        let passages = vec![
            RetrievedPassage::new("b", "Second.pdf").with_caption("beta"),
            RetrievedPassage::new("a", "First.pdf").with_caption("alpha"),
        ];

        let context = ContextAssembler::new().assemble(&passages);
        assert_eq!(context, "Second.pdf: beta\nFirst.pdf: alpha\n");
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let passages = vec![
            RetrievedPassage::new("doc-1", "Policy.pdf")
                .with_caption("Refunds within 30 days")
                .with_highlights("content", vec!["original receipt".to_string()])
                .with_highlights("abstract", vec!["returns policy".to_string()]),
        ];

        let assembler = ContextAssembler::new();
        let first = assembler.assemble(&passages);
        let second = assembler.assemble(&passages);

        assert_eq!(first, second);
    }

    #[test]
    fn test_highlight_fields_in_name_order() {
        let passage = RetrievedPassage::new("doc-1", "Policy.pdf")
            .with_highlights("content", vec!["from content".to_string()])
            .with_highlights("abstract", vec!["from abstract".to_string()]);

        let context = ContextAssembler::new().assemble(&[passage]);
        assert_eq!(
            context,
            "Policy.pdf: from abstract\nPolicy.pdf: from content\n"
        );
    }

    #[test]
    fn test_blank_fragments_dropped() {
        let passage = RetrievedPassage::new("doc-1", "Policy.pdf")
            .with_caption("   \r\n\t")
            .with_caption("kept");

        let context = ContextAssembler::new().assemble(&[passage]);
        assert_eq!(context, "Policy.pdf: kept\n");
    }

    #[test]
    fn test_no_passages_assembles_empty() {
        assert_eq!(ContextAssembler::new().assemble(&[]), "");
    }
}
