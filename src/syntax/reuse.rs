//! What an incremental parse may carry over from the previous tree.
//!
//! Two granularities:
//! - whole top-level items, when no edit touches the bytes the item's
//!   parse depended on and the new text re-lexes identically there;
//! - single tokens inside re-parsed regions, when no edit touches them
//!   and kind and text are unchanged.

use rowan::{GreenNode, GreenNodeData, GreenToken, Language, NodeOrToken};
use rustc_hash::FxHashMap;

use super::edit::EditSet;
use super::lexer::Token;
use super::tree::{ParseResult, ReuseObserver};
use super::{Lang, SyntaxKind};
use crate::base::{TextRange, TextSize};

/// A token of the previous tree.
struct OldToken {
    kind: SyntaxKind,
    range: TextRange,
    green: GreenToken,
}

/// A top-level item of the previous tree that no edit touched.
pub(crate) struct OldItem {
    pub(crate) kind: SyntaxKind,
    pub(crate) green: GreenNode,
    pub(crate) range: TextRange,
    pub(crate) lookahead_end: TextSize,
    /// Number of tokens inside the node
    pub(crate) token_count: usize,
    /// Index of the item's first token in `ReuseContext::old_tokens`
    first_token: usize,
}

pub(crate) struct ReuseContext<'a> {
    old_tokens: Vec<OldToken>,
    /// Unaffected old tokens, keyed by their start in the new text
    tokens: FxHashMap<TextSize, usize>,
    /// Unaffected old items, keyed by their start in the new text
    items: FxHashMap<TextSize, OldItem>,
    pub(crate) observer: Option<&'a ReuseObserver>,
}

impl<'a> ReuseContext<'a> {
    pub(crate) fn new(
        prior: &ParseResult,
        edits: &EditSet,
        observer: Option<&'a ReuseObserver>,
    ) -> Self {
        let root = prior.tree().green();

        let mut old_tokens = Vec::new();
        collect_tokens(root, TextSize::from(0), &mut old_tokens);

        let tokens = old_tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !edits.touches(token.range))
            .filter_map(|(index, token)| Some((edits.map_offset(token.range.start())?, index)))
            .collect();

        let mut items = FxHashMap::default();
        let mut lookahead = prior.lookahead().iter().peekable();
        let mut offset = TextSize::from(0);
        for child in root.children() {
            let len = child.text_len();
            let range = TextRange::at(offset, len);
            offset += len;

            let NodeOrToken::Node(node) = child else {
                continue;
            };
            let Some(item) = lookahead.next_if(|item| item.range == range) else {
                continue;
            };
            if edits.touches(item.dependency_range()) {
                continue;
            }
            let Some(new_start) = edits.map_offset(range.start()) else {
                continue;
            };
            let first_token = old_tokens.partition_point(|token| token.range.start() < range.start());
            let token_count = old_tokens[first_token..]
                .iter()
                .take_while(|token| token.range.end() <= range.end())
                .count();
            items.insert(
                new_start,
                OldItem {
                    kind: Lang::kind_from_raw(node.kind()),
                    green: node.to_owned(),
                    range,
                    lookahead_end: item.lookahead_end,
                    token_count,
                    first_token,
                },
            );
        }

        Self {
            old_tokens,
            tokens,
            items,
            observer,
        }
    }

    /// The old green token that can stand in for a new token at `start`.
    pub(crate) fn token_at(
        &self,
        start: TextSize,
        kind: SyntaxKind,
        text: &str,
    ) -> Option<(GreenToken, TextRange)> {
        let old = &self.old_tokens[*self.tokens.get(&start)?];
        (old.kind == kind && old.green.text() == text).then(|| (old.green.clone(), old.range))
    }

    /// The old item that can be spliced in at `start`, given the new
    /// tokens from `start` onwards.
    ///
    /// Every old token the item's parse examined must reappear unchanged,
    /// which also rules out an earlier edit changing how this stretch of
    /// text lexes.
    pub(crate) fn item_at(&self, start: TextSize, text: &str, new_tokens: &[Token]) -> Option<&OldItem> {
        let item = self.items.get(&start)?;
        let examined = self.old_tokens[item.first_token..]
            .iter()
            .take_while(|old| old.range.start() < item.lookahead_end);
        let mut new_tokens = new_tokens.iter();
        for old in examined {
            let new = new_tokens.next()?;
            if new.kind != old.kind || &text[new.range] != old.green.text() {
                return None;
            }
        }
        Some(item)
    }
}

fn collect_tokens(node: &GreenNodeData, mut offset: TextSize, out: &mut Vec<OldToken>) -> TextSize {
    for child in node.children() {
        match child {
            NodeOrToken::Node(child) => offset = collect_tokens(child, offset, out),
            NodeOrToken::Token(token) => {
                let range = TextRange::at(offset, token.text_len());
                out.push(OldToken {
                    kind: Lang::kind_from_raw(token.kind()),
                    range,
                    green: token.to_owned(),
                });
                offset = range.end();
            }
        }
    }
    offset
}
