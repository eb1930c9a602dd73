//! Parse results.

use std::fmt;
use std::sync::Arc;

use rowan::GreenNode;

use super::{SyntaxKind, SyntaxNode};
use crate::base::{TextRange, TextSize};

/// An immutable syntax tree together with the text it was parsed from.
///
/// Holds the green tree only, so it is `Send + Sync` and cheap to clone.
/// Red nodes for traversal are built on demand by [`root`](Self::root).
#[derive(Clone)]
pub struct SyntaxTree {
    green: GreenNode,
    text: Arc<str>,
}

impl SyntaxTree {
    pub(crate) fn new(green: GreenNode, text: Arc<str>) -> Self {
        debug_assert_eq!(green.text_len(), TextSize::of(&*text));
        Self { green, text }
    }

    pub fn root(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the parser had to recover from malformed input anywhere.
    pub fn has_errors(&self) -> bool {
        self.root().descendants_with_tokens().any(|element| {
            matches!(element.kind(), SyntaxKind::Error | SyntaxKind::ErrorToken)
        })
    }

    /// Indented dump of every node and token, for tests and debugging.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        for event in self.root().preorder_with_tokens() {
            match event {
                rowan::WalkEvent::Enter(element) => {
                    out.push_str(&"  ".repeat(depth));
                    match element {
                        rowan::NodeOrToken::Node(node) => {
                            out.push_str(&format!("{:?}@{:?}\n", node.kind(), node.text_range()));
                            depth += 1;
                        }
                        rowan::NodeOrToken::Token(token) => {
                            out.push_str(&format!(
                                "{:?}@{:?} {:?}\n",
                                token.kind(),
                                token.text_range(),
                                token.text()
                            ));
                        }
                    }
                }
                rowan::WalkEvent::Leave(element) => {
                    if element.as_node().is_some() {
                        depth -= 1;
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("len", &self.green.text_len())
            .field("children", &self.green.children().len())
            .finish()
    }
}

/// How far the parser looked while parsing one top-level item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemLookahead {
    /// Range of the item node itself.
    pub range: TextRange,
    /// End of the furthest token examined while parsing the item. Never
    /// before `range.end()`.
    pub lookahead_end: TextSize,
}

impl ItemLookahead {
    /// Every byte the item's parse depended on.
    pub fn dependency_range(&self) -> TextRange {
        TextRange::new(self.range.start(), self.lookahead_end)
    }
}

/// Lookahead bookkeeping for every top-level item, in source order.
///
/// This is the state an incremental reparse is seeded with: an item can
/// only be reused when no edit touches its dependency range.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LookaheadRanges {
    items: Vec<ItemLookahead>,
}

impl LookaheadRanges {
    pub(crate) fn push(&mut self, item: ItemLookahead) {
        debug_assert!(self.items.last().is_none_or(|last| last.range.end() <= item.range.start()));
        self.items.push(item);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemLookahead> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The output of a parse: the tree plus what the next incremental parse
/// needs to know about it.
#[derive(Clone, Debug)]
pub struct ParseResult {
    tree: SyntaxTree,
    lookahead: LookaheadRanges,
}

impl ParseResult {
    pub fn new(tree: SyntaxTree, lookahead: LookaheadRanges) -> Self {
        Self { tree, lookahead }
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn lookahead(&self) -> &LookaheadRanges {
        &self.lookahead
    }

    pub fn text(&self) -> &str {
        self.tree.text()
    }
}

/// A node or token carried over from the previous tree instead of being
/// rebuilt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReusedSyntax {
    pub kind: SyntaxKind,
    /// Where the element sat in the pre-edit text.
    pub old_range: TextRange,
    /// Where it sits in the post-edit text.
    pub new_range: TextRange,
}

/// Callback invoked once per reused element during an incremental parse.
pub type ReuseObserver = Arc<dyn Fn(ReusedSyntax) + Send + Sync>;
