//! Syntax kinds and the rowan language binding.

/// Every token and node kind the parser produces.
///
/// Tokens come first, nodes after `Eof`. `Eof` itself never appears in
/// a tree; the parser uses it to report end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // Trivia
    Whitespace = 0,
    Newline,
    Comment,

    // Keywords
    FuncKw,
    LetKw,
    VarKw,
    ReturnKw,

    // Atoms
    Ident,
    Int,
    Str,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semi,
    Eq,
    Arrow,
    Plus,
    Minus,
    Star,
    Slash,

    /// Bytes the lexer could not make sense of.
    ErrorToken,
    Eof,

    // Nodes
    SourceFile,
    FuncDecl,
    ParamList,
    Param,
    RetType,
    Block,
    LetDecl,
    ReturnStmt,
    ExprStmt,
    Literal,
    NameRef,
    CallExpr,
    ArgList,
    BinExpr,
    ParenExpr,
    Error,
}

use SyntaxKind::*;

const ALL: [SyntaxKind; Error as usize + 1] = [
    Whitespace, Newline, Comment, FuncKw, LetKw, VarKw, ReturnKw, Ident, Int, Str, LParen,
    RParen, LBrace, RBrace, Comma, Colon, Semi, Eq, Arrow, Plus, Minus, Star, Slash, ErrorToken,
    Eof, SourceFile, FuncDecl, ParamList, Param, RetType, Block, LetDecl, ReturnStmt, ExprStmt,
    Literal, NameRef, CallExpr, ArgList, BinExpr, ParenExpr, Error,
];

impl SyntaxKind {
    /// Whitespace, newlines and comments.
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Newline | Comment)
    }

    #[inline]
    pub fn is_keyword(self) -> bool {
        matches!(self, FuncKw | LetKw | VarKw | ReturnKw)
    }

    /// Whether this kind labels a leaf token rather than a node.
    #[inline]
    pub fn is_token(self) -> bool {
        self < Eof
    }

    /// Tokens that can begin an expression.
    #[inline]
    pub(crate) fn starts_expr(self) -> bool {
        matches!(self, Int | Str | Ident | LParen)
    }

    /// Tokens that can only begin a declaration or close a block; list
    /// parsers stop on them instead of swallowing the rest of the file.
    #[inline]
    pub(crate) fn is_recovery_point(self) -> bool {
        matches!(self, Eof | LBrace | RBrace) || self.is_keyword()
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Marker type binding [`SyntaxKind`] to rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lang {}

impl rowan::Language for Lang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> SyntaxKind {
        ALL.get(raw.0 as usize).copied().unwrap_or(Error)
    }

    fn kind_to_raw(kind: SyntaxKind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<Lang>;
pub type SyntaxToken = rowan::SyntaxToken<Lang>;
pub type SyntaxElement = rowan::SyntaxElement<Lang>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::Language;

    #[test]
    fn test_kind_table_matches_discriminants() {
        for (index, kind) in ALL.iter().enumerate() {
            assert_eq!(*kind as usize, index, "{kind:?}");
        }
    }

    #[test]
    fn test_raw_roundtrip() {
        for kind in ALL {
            assert_eq!(Lang::kind_from_raw(Lang::kind_to_raw(kind)), kind);
        }
        assert_eq!(Lang::kind_from_raw(rowan::SyntaxKind(u16::MAX)), Error);
    }

    #[test]
    fn test_token_classification() {
        assert!(Comment.is_trivia());
        assert!(!Ident.is_trivia());
        assert!(ReturnKw.is_keyword());
        assert!(ErrorToken.is_token());
        assert!(!SourceFile.is_token());
    }
}
