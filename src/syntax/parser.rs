//! Error-tolerant recursive descent parser.
//!
//! The parser never fails. Unexpected tokens are wrapped in `Error`
//! nodes and missing ones are simply absent, so every input produces a
//! tree whose text is exactly the input.
//!
//! ```text
//! source_file = item*
//! item        = func_decl | let_decl | return_stmt | expr_stmt
//! func_decl   = 'func' IDENT param_list? ret_type? block?
//! param_list  = '(' (param (',' param)*)? ')'
//! param       = IDENT (':' IDENT)?
//! ret_type    = '->' IDENT
//! block       = '{' item* '}'
//! let_decl    = ('let' | 'var') IDENT (':' IDENT)? ('=' expr)? ';'?
//! return_stmt = 'return' expr? ';'?
//! expr_stmt   = expr ';'?
//! expr        = atom (('+' | '-' | '*' | '/') expr)*
//! atom        = INT | STRING | name_ref arg_list* | '(' expr ')'
//! ```
//!
//! While parsing a top-level item the parser remembers the furthest byte
//! it looked at. Those [`LookaheadRanges`] tell a later incremental parse
//! which items an edit cannot have affected.

use std::sync::Arc;

use rowan::{GreenNode, GreenToken, NodeOrToken};

use super::SyntaxKind::{self, *};
use super::lexer::{Token, tokenize};
use super::reuse::ReuseContext;
use super::tree::{ItemLookahead, LookaheadRanges, ParseResult, ReusedSyntax, SyntaxTree};
use crate::base::{TextRange, TextSize};

type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Parse `text` from scratch.
pub fn parse(text: Arc<str>) -> ParseResult {
    let tokens = tokenize(&text);
    Parser::new(&text, &tokens, None).parse(Arc::clone(&text))
}

/// Parse `text`, carrying over whatever `reuse` proves unaffected.
pub(crate) fn parse_with_reuse(text: Arc<str>, reuse: ReuseContext<'_>) -> (ParseResult, ReuseStats) {
    let tokens = tokenize(&text);
    let mut parser = Parser::new(&text, &tokens, Some(reuse));
    parser.source_file();
    let stats = parser.stats;
    (parser.finish(Arc::clone(&text)), stats)
}

/// Counts of elements carried over by an incremental parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ReuseStats {
    pub(crate) items: usize,
    pub(crate) tokens: usize,
}

/// Builds green trees, allowing finished subtrees from an older tree to
/// be spliced in as-is.
#[derive(Default)]
struct GreenBuilder {
    parents: Vec<(SyntaxKind, usize)>,
    children: Vec<GreenElement>,
}

impl GreenBuilder {
    fn start_node(&mut self, kind: SyntaxKind) {
        self.parents.push((kind, self.children.len()));
    }

    fn checkpoint(&self) -> usize {
        self.children.len()
    }

    fn start_node_at(&mut self, checkpoint: usize, kind: SyntaxKind) {
        debug_assert!(checkpoint <= self.children.len());
        self.parents.push((kind, checkpoint));
    }

    fn finish_node(&mut self) {
        if let Some((kind, first)) = self.parents.pop() {
            let node = GreenNode::new(kind.into(), self.children.drain(first..));
            self.children.push(NodeOrToken::Node(node));
        }
    }

    fn push(&mut self, element: GreenElement) {
        self.children.push(element);
    }

    fn finish(mut self) -> GreenNode {
        debug_assert!(self.parents.is_empty());
        match self.children.pop() {
            Some(NodeOrToken::Node(root)) if self.children.is_empty() => root,
            _ => GreenNode::new(SourceFile.into(), Vec::new()),
        }
    }
}

struct Parser<'t> {
    text: &'t str,
    tokens: &'t [Token],
    /// Index of the next token to consume
    pos: usize,
    builder: GreenBuilder,
    /// Furthest byte examined since the current top-level item started
    peeked_end: TextSize,
    /// End of the last consumed non-trivia token
    last_end: TextSize,
    lookahead: LookaheadRanges,
    reuse: Option<ReuseContext<'t>>,
    stats: ReuseStats,
}

impl<'t> Parser<'t> {
    fn new(text: &'t str, tokens: &'t [Token], reuse: Option<ReuseContext<'t>>) -> Self {
        Self {
            text,
            tokens,
            pos: 0,
            builder: GreenBuilder::default(),
            peeked_end: TextSize::from(0),
            last_end: TextSize::from(0),
            lookahead: LookaheadRanges::default(),
            reuse,
            stats: ReuseStats::default(),
        }
    }

    fn parse(mut self, text: Arc<str>) -> ParseResult {
        self.source_file();
        self.finish(text)
    }

    fn finish(self, text: Arc<str>) -> ParseResult {
        let tree = SyntaxTree::new(self.builder.finish(), text);
        ParseResult::new(tree, self.lookahead)
    }

    // ========================================================================
    // TOKEN CURSOR
    // ========================================================================

    /// Kind of the next non-trivia token, or `Eof`.
    fn current(&mut self) -> SyntaxKind {
        let next = self.tokens[self.pos..]
            .iter()
            .find(|token| !token.kind.is_trivia());
        match next {
            Some(token) => {
                self.peeked_end = self.peeked_end.max(token.range.end());
                token.kind
            }
            None => {
                self.peeked_end = TextSize::of(self.text);
                Eof
            }
        }
    }

    fn at(&mut self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Consume pending trivia, then the next token.
    fn bump(&mut self) {
        self.flush_trivia();
        if let Some(&token) = self.tokens.get(self.pos) {
            self.push_token(token);
            self.last_end = token.range.end();
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            return true;
        }
        false
    }

    fn flush_trivia(&mut self) {
        while let Some(&token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.push_token(token);
        }
    }

    fn push_token(&mut self, token: Token) {
        let text = &self.text[token.range];
        let reused = self
            .reuse
            .as_ref()
            .and_then(|reuse| reuse.token_at(token.range.start(), token.kind, text));
        let green = match reused {
            Some((green, old_range)) => {
                self.stats.tokens += 1;
                self.notify(ReusedSyntax {
                    kind: token.kind,
                    old_range,
                    new_range: token.range,
                });
                green
            }
            None => GreenToken::new(token.kind.into(), text),
        };
        self.builder.push(NodeOrToken::Token(green));
        self.pos += 1;
    }

    fn notify(&self, reused: ReusedSyntax) {
        if let Some(observer) = self.reuse.as_ref().and_then(|reuse| reuse.observer) {
            observer(reused);
        }
    }

    // Nodes never start with trivia: it stays with the enclosing node.

    fn start_node(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind);
    }

    fn checkpoint(&mut self) -> usize {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn error_token(&mut self) {
        self.start_node(Error);
        self.bump();
        self.finish_node();
    }

    // ========================================================================
    // TOP LEVEL
    // ========================================================================

    fn source_file(&mut self) {
        self.builder.start_node(SourceFile);
        loop {
            self.flush_trivia();
            let Some(&token) = self.tokens.get(self.pos) else {
                break;
            };
            if self.reuse_item(token.range.start()) {
                continue;
            }

            let start = token.range.start();
            self.peeked_end = start;
            self.item();
            self.lookahead.push(ItemLookahead {
                range: TextRange::new(start, self.last_end),
                lookahead_end: self.peeked_end.max(self.last_end),
            });
        }
        self.builder.finish_node();
    }

    /// Splice in the old item starting at `start`, if it is unaffected.
    fn reuse_item(&mut self, start: TextSize) -> bool {
        let Some(reuse) = self.reuse.as_ref() else {
            return false;
        };
        let Some(item) = reuse.item_at(start, self.text, &self.tokens[self.pos..]) else {
            return false;
        };

        let new_range = TextRange::at(start, item.range.len());
        let lookahead_end = start + (item.lookahead_end - item.range.start());
        self.builder.push(NodeOrToken::Node(item.green.clone()));
        self.pos += item.token_count;
        self.last_end = new_range.end();
        self.lookahead.push(ItemLookahead {
            range: new_range,
            lookahead_end,
        });
        self.stats.items += 1;
        self.notify(ReusedSyntax {
            kind: item.kind,
            old_range: item.range,
            new_range,
        });
        true
    }

    fn item(&mut self) {
        match self.current() {
            FuncKw => self.func_decl(),
            LetKw | VarKw => self.let_decl(),
            ReturnKw => self.return_stmt(),
            kind if kind.starts_expr() => self.expr_stmt(),
            _ => self.error_token(),
        }
    }

    // ========================================================================
    // DECLARATIONS
    // ========================================================================

    fn func_decl(&mut self) {
        self.start_node(FuncDecl);
        self.bump();
        self.eat(Ident);
        if self.at(LParen) {
            self.param_list();
        }
        if self.at(Arrow) {
            self.ret_type();
        }
        if self.at(LBrace) {
            self.block();
        }
        self.finish_node();
    }

    fn param_list(&mut self) {
        self.start_node(ParamList);
        self.bump();
        loop {
            match self.current() {
                RParen => {
                    self.bump();
                    break;
                }
                Ident => self.param(),
                Comma => self.bump(),
                kind if kind.is_recovery_point() || kind == Arrow => break,
                _ => self.error_token(),
            }
        }
        self.finish_node();
    }

    fn param(&mut self) {
        self.start_node(Param);
        self.bump();
        if self.eat(Colon) {
            self.eat(Ident);
        }
        self.finish_node();
    }

    fn ret_type(&mut self) {
        self.start_node(RetType);
        self.bump();
        self.eat(Ident);
        self.finish_node();
    }

    fn block(&mut self) {
        self.start_node(Block);
        self.bump();
        loop {
            match self.current() {
                RBrace => {
                    self.bump();
                    break;
                }
                Eof => break,
                _ => self.item(),
            }
        }
        self.finish_node();
    }

    fn let_decl(&mut self) {
        self.start_node(LetDecl);
        self.bump();
        self.eat(Ident);
        if self.eat(Colon) {
            self.eat(Ident);
        }
        if self.eat(Eq) && self.current().starts_expr() {
            self.expr();
        }
        self.eat(Semi);
        self.finish_node();
    }

    fn return_stmt(&mut self) {
        self.start_node(ReturnStmt);
        self.bump();
        if self.current().starts_expr() {
            self.expr();
        }
        self.eat(Semi);
        self.finish_node();
    }

    fn expr_stmt(&mut self) {
        self.start_node(ExprStmt);
        self.expr();
        self.eat(Semi);
        self.finish_node();
    }

    // ========================================================================
    // EXPRESSIONS
    // ========================================================================

    fn expr(&mut self) {
        self.expr_bp(1);
    }

    fn expr_bp(&mut self, min_prec: u8) {
        let checkpoint = self.checkpoint();
        if !self.atom() {
            return;
        }
        loop {
            let prec = match self.current() {
                Plus | Minus => 1,
                Star | Slash => 2,
                _ => break,
            };
            if prec < min_prec {
                break;
            }
            self.builder.start_node_at(checkpoint, BinExpr);
            self.bump();
            if self.current().starts_expr() {
                self.expr_bp(prec + 1);
            }
            self.finish_node();
        }
    }

    fn atom(&mut self) -> bool {
        match self.current() {
            Int | Str => {
                self.start_node(Literal);
                self.bump();
                self.finish_node();
            }
            Ident => {
                let checkpoint = self.checkpoint();
                self.start_node(NameRef);
                self.bump();
                self.finish_node();
                while self.at(LParen) {
                    self.builder.start_node_at(checkpoint, CallExpr);
                    self.arg_list();
                    self.finish_node();
                }
            }
            LParen => {
                self.start_node(ParenExpr);
                self.bump();
                if self.current().starts_expr() {
                    self.expr();
                }
                self.eat(RParen);
                self.finish_node();
            }
            _ => return false,
        }
        true
    }

    fn arg_list(&mut self) {
        self.start_node(ArgList);
        self.bump();
        loop {
            match self.current() {
                RParen => {
                    self.bump();
                    break;
                }
                Comma => self.bump(),
                kind if kind.starts_expr() => self.expr(),
                kind if kind.is_recovery_point() || kind == Semi => break,
                _ => self.error_token(),
            }
        }
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse_str(text: &str) -> ParseResult {
        parse(Arc::from(text))
    }

    fn top_level_kinds(result: &ParseResult) -> Vec<SyntaxKind> {
        result.tree().root().children().map(|node| node.kind()).collect()
    }

    #[rstest]
    #[case("")]
    #[case("let x = 1")]
    #[case("func f() {}")]
    #[case("func add(a: Int, b: Int) -> Int {\n  return a + b * 2;\n}\n")]
    #[case("}}} let = = (")]
    #[case("func (x: ) -> { let y = f(1, 2\n")]
    #[case("let s = \"unterminated\nlet t = 2 // tail")]
    fn test_tree_text_equals_input(#[case] text: &str) {
        let result = parse_str(text);
        assert_eq!(result.tree().root().text().to_string(), text);
        assert_eq!(result.tree().to_string(), text);
    }

    #[test]
    fn test_parse_let_decl() {
        let result = parse_str("let x = 1");
        assert_eq!(
            result.tree().debug_dump(),
            "SourceFile@0..9\n  LetDecl@0..9\n    LetKw@0..3 \"let\"\n    Whitespace@3..4 \" \"\n    \
             Ident@4..5 \"x\"\n    Whitespace@5..6 \" \"\n    Eq@6..7 \"=\"\n    \
             Whitespace@7..8 \" \"\n    Literal@8..9\n      Int@8..9 \"1\"\n"
        );
        assert!(!result.tree().has_errors());
    }

    #[test]
    fn test_parse_func_decl_structure() {
        let result = parse_str("func f(a: Int) -> Int { return a }");
        let func = result.tree().root().first_child().unwrap();
        assert_eq!(func.kind(), FuncDecl);
        let kinds: Vec<_> = func.children().map(|node| node.kind()).collect();
        assert_eq!(kinds, vec![ParamList, RetType, Block]);
    }

    #[test]
    fn test_binary_precedence() {
        let result = parse_str("1 + 2 * 3");
        let stmt = result.tree().root().first_child().unwrap();
        let bin = stmt.first_child().unwrap();
        assert_eq!(bin.kind(), BinExpr);
        let rhs = bin.last_child().unwrap();
        assert_eq!(rhs.kind(), BinExpr);
        assert_eq!(rhs.text().to_string(), "2 * 3");
    }

    #[test]
    fn test_call_expr_wraps_name_ref() {
        let result = parse_str("print(1, x)(2)");
        let stmt = result.tree().root().first_child().unwrap();
        let outer = stmt.first_child().unwrap();
        assert_eq!(outer.kind(), CallExpr);
        assert_eq!(outer.first_child().unwrap().kind(), CallExpr);
    }

    #[test]
    fn test_stray_tokens_become_error_nodes() {
        let result = parse_str("} let x = 1");
        assert_eq!(top_level_kinds(&result), vec![Error, LetDecl]);
        assert!(result.tree().has_errors());
    }

    #[test]
    fn test_trivia_stays_outside_items() {
        let result = parse_str("  let a = 1\n\nlet b = 2  ");
        let ranges: Vec<_> = result.lookahead().iter().map(|item| item.range).collect();
        assert_eq!(
            ranges,
            vec![
                TextRange::new(2.into(), 11.into()),
                TextRange::new(13.into(), 22.into()),
            ]
        );
    }

    #[test]
    fn test_lookahead_covers_peeked_token() {
        // After `1` the parser peeks the next `let` to rule out an operator.
        let result = parse_str("let a = 1\nlet b = 2");
        let items: Vec<_> = result.lookahead().iter().copied().collect();
        assert_eq!(items[0].range, TextRange::new(0.into(), 9.into()));
        assert_eq!(items[0].lookahead_end, TextSize::from(13));
        // The last item peeks end of input.
        assert_eq!(items[1].lookahead_end, TextSize::from(19));
    }
}
