//! Lossless syntax trees and incremental reparsing.
//!
//! Trees are rowan green trees. A [`Parser`] turns text into a
//! [`ParseResult`], and can reparse edited text reusing whatever parts
//! of a prior result the [`EditSet`] provably did not affect.

mod edit;
mod kind;
mod lexer;
mod parser;
mod reuse;
mod tree;

use std::sync::Arc;

pub use edit::{EditSet, TextEdit};
pub use kind::{Lang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
pub use parser::parse;
pub use tree::{ItemLookahead, LookaheadRanges, ParseResult, ReuseObserver, ReusedSyntax, SyntaxTree};

/// A full and incremental parser.
///
/// Implementations must be pure: the same inputs always give a tree with
/// the same structure, and `reparse` must give the tree `parse` would
/// have given for the same text.
pub trait Parser: Send + Sync + 'static {
    fn parse(&self, text: Arc<str>) -> ParseResult;

    /// Parse `text`, the result of applying `edits` to `prior`'s text.
    ///
    /// `observer` is called once for every node or token taken over from
    /// `prior`.
    fn reparse(
        &self,
        text: Arc<str>,
        prior: &ParseResult,
        edits: &EditSet,
        observer: Option<&ReuseObserver>,
    ) -> ParseResult;
}

/// The crate's own parser, reusing untouched top-level items and tokens.
#[derive(Default, Clone, Copy, Debug)]
pub struct IncrementalParser;

impl Parser for IncrementalParser {
    fn parse(&self, text: Arc<str>) -> ParseResult {
        parser::parse(text)
    }

    fn reparse(
        &self,
        text: Arc<str>,
        prior: &ParseResult,
        edits: &EditSet,
        observer: Option<&ReuseObserver>,
    ) -> ParseResult {
        let reuse = reuse::ReuseContext::new(prior, edits, observer);
        let (result, stats) = parser::parse_with_reuse(text, reuse);
        tracing::trace!(
            edits = edits.len(),
            reused_items = stats.items,
            reused_tokens = stats.tokens,
            "incremental reparse"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{TextRange, TextSize};
    use parking_lot::Mutex;
    use rstest::rstest;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    /// Reparse `old` after `edits`, returning the result and everything
    /// the observer saw.
    fn reparse(old: &str, edits: EditSet) -> (ParseResult, Vec<ReusedSyntax>) {
        let prior = parse(Arc::from(old));
        let new_text: Arc<str> = Arc::from(edits.apply(old).expect("edits fit"));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let observer: ReuseObserver = Arc::new(move |reused| sink.lock().push(reused));

        let result = IncrementalParser.reparse(new_text, &prior, &edits, Some(&observer));
        let seen = seen.lock().clone();
        (result, seen)
    }

    #[test]
    fn test_literal_change_reuses_leading_tokens() {
        let edits = EditSet::concurrent([TextEdit::replace(range(8, 9), "2")]).unwrap();
        let (result, reused) = reparse("let x = 1", edits);

        assert_eq!(result.text(), "let x = 2");
        let kinds: Vec<_> = reused.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&SyntaxKind::LetKw));
        assert!(kinds.contains(&SyntaxKind::Ident));
        assert!(!kinds.contains(&SyntaxKind::Int));
        assert!(!kinds.contains(&SyntaxKind::LetDecl));
    }

    #[test]
    fn test_untouched_items_are_reused_whole() {
        let edits = EditSet::concurrent([TextEdit::replace(range(18, 19), "5")]).unwrap();
        let (result, reused) = reparse("let a = 1\nlet b = 2\nlet c = 3", edits);

        assert_eq!(result.text(), "let a = 1\nlet b = 5\nlet c = 3");
        let items: Vec<_> = reused
            .iter()
            .filter(|r| r.kind == SyntaxKind::LetDecl)
            .map(|r| (r.old_range, r.new_range))
            .collect();
        assert_eq!(items, vec![(range(0, 9), range(0, 9)), (range(20, 29), range(20, 29))]);
    }

    #[test]
    fn test_reused_item_shifts_after_insertion() {
        let edits = EditSet::concurrent([TextEdit::insert(TextSize::from(19), "00")]).unwrap();
        let (result, reused) = reparse("let a = 1\nlet b = 2\nlet c = 3", edits);

        assert_eq!(result.text(), "let a = 1\nlet b = 200\nlet c = 3");
        assert!(reused.contains(&ReusedSyntax {
            kind: SyntaxKind::LetDecl,
            old_range: range(20, 29),
            new_range: range(22, 31),
        }));
    }

    #[test]
    fn test_lookahead_blocks_reuse_of_preceding_item() {
        // `1` peeked at the `+` that now follows it, so item one must be redone.
        let edits = EditSet::concurrent([TextEdit::insert(TextSize::from(9), " + 2")]).unwrap();
        let (result, reused) = reparse("let a = 1\nlet b = 2", edits);

        assert!(!reused.iter().any(|r| r.kind == SyntaxKind::LetDecl && r.old_range == range(0, 9)));
        assert_eq!(result.tree().debug_dump(), parse(Arc::from(result.text())).tree().debug_dump());
    }

    #[test]
    fn test_empty_edit_set_reuses_everything() {
        let (result, reused) = reparse("func f() {}\nlet x = 1", EditSet::empty());

        assert_eq!(result.text(), "func f() {}\nlet x = 1");
        let items = reused.iter().filter(|r| !r.kind.is_token()).count();
        assert_eq!(items, 2);
    }

    #[rstest]
    #[case("let x = 1", vec![TextEdit::replace(range(8, 9), "2")])]
    #[case("func f() {}", vec![TextEdit::insert(TextSize::from(10), "x")])]
    #[case("let a = 1\nlet b = 2", vec![TextEdit::delete(range(9, 10))])]
    #[case("let a = 1\nlet b = 2", vec![TextEdit::replace(range(0, 3), "var")])]
    #[case("f(1)\ng(2)", vec![TextEdit::insert(TextSize::from(4), "(3)")])]
    #[case("let s = \"ab\"\nlet t = 1", vec![TextEdit::delete(range(11, 12))])]
    #[case("func f() { return 1 }\n", vec![TextEdit::insert(TextSize::from(0), "// c\n")])]
    #[case("let x = 1 let y = 2", vec![
        TextEdit::replace(range(4, 5), "xx"),
        TextEdit::insert(TextSize::from(19), ";"),
    ])]
    fn test_reparse_matches_full_parse(#[case] old: &str, #[case] edits: Vec<TextEdit>) {
        let edits = EditSet::concurrent(edits).unwrap();
        let (result, _) = reparse(old, edits);
        let full = parse(Arc::from(result.text()));

        assert_eq!(result.tree().debug_dump(), full.tree().debug_dump());
        assert_eq!(result.lookahead(), full.lookahead());
    }
}
