//! Tokenizer.
//!
//! The lexer is total: every byte of the input ends up in exactly one
//! token, and bytes it cannot classify become `ErrorToken`s. Concatenating
//! the token texts always reproduces the input.

use logos::Logos;

use super::SyntaxKind;
use crate::base::{TextRange, TextSize};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[regex(r"[ \t\r]+")]
    Whitespace,
    #[token("\n")]
    Newline,
    #[regex(r"//[^\n]*")]
    Comment,

    #[token("func")]
    Func,
    #[token("let")]
    Let,
    #[token("var")]
    Var,
    #[token("return")]
    Return,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"[0-9]+")]
    Int,
    // Unterminated strings run to the end of the line.
    #[regex(r#""([^"\\\n]|\\[^\n])*"?"#)]
    Str,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token("=")]
    Eq,
    #[token("->")]
    Arrow,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
}

impl From<RawToken> for SyntaxKind {
    fn from(raw: RawToken) -> Self {
        match raw {
            RawToken::Whitespace => SyntaxKind::Whitespace,
            RawToken::Newline => SyntaxKind::Newline,
            RawToken::Comment => SyntaxKind::Comment,
            RawToken::Func => SyntaxKind::FuncKw,
            RawToken::Let => SyntaxKind::LetKw,
            RawToken::Var => SyntaxKind::VarKw,
            RawToken::Return => SyntaxKind::ReturnKw,
            RawToken::Ident => SyntaxKind::Ident,
            RawToken::Int => SyntaxKind::Int,
            RawToken::Str => SyntaxKind::Str,
            RawToken::LParen => SyntaxKind::LParen,
            RawToken::RParen => SyntaxKind::RParen,
            RawToken::LBrace => SyntaxKind::LBrace,
            RawToken::RBrace => SyntaxKind::RBrace,
            RawToken::Comma => SyntaxKind::Comma,
            RawToken::Colon => SyntaxKind::Colon,
            RawToken::Semi => SyntaxKind::Semi,
            RawToken::Eq => SyntaxKind::Eq,
            RawToken::Arrow => SyntaxKind::Arrow,
            RawToken::Plus => SyntaxKind::Plus,
            RawToken::Minus => SyntaxKind::Minus,
            RawToken::Star => SyntaxKind::Star,
            RawToken::Slash => SyntaxKind::Slash,
        }
    }
}

/// A lexed token: its kind and where it sits in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: SyntaxKind,
    pub(crate) range: TextRange,
}

/// Split `text` into tokens covering every byte.
pub(crate) fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut lexer = RawToken::lexer(text);
    let mut covered = 0usize;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let start = span.start.max(covered);
        let mut end = span.end.max(start);
        while !text.is_char_boundary(end) {
            end += 1;
        }
        if start > covered {
            push_error(&mut tokens, covered, start);
        }
        match result {
            Ok(raw) if start < end => tokens.push(token(raw.into(), start, end)),
            Ok(_) => {}
            Err(()) => push_error(&mut tokens, start, end),
        }
        covered = end;
    }
    if covered < text.len() {
        push_error(&mut tokens, covered, text.len());
    }

    tokens
}

fn token(kind: SyntaxKind, start: usize, end: usize) -> Token {
    Token {
        kind,
        range: TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32)),
    }
}

/// Append an error token, gluing it onto a directly preceding one.
fn push_error(tokens: &mut Vec<Token>, start: usize, end: usize) {
    if start == end {
        return;
    }
    if let Some(last) = tokens.last_mut() {
        if last.kind == SyntaxKind::ErrorToken && usize::from(last.range.end()) == start {
            last.range = TextRange::new(last.range.start(), TextSize::from(end as u32));
            return;
        }
    }
    tokens.push(token(SyntaxKind::ErrorToken, start, end));
}
