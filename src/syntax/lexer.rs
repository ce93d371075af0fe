#![allow(non_camel_case_types)]

use std::borrow::Borrow;
use std::mem::discriminant;
use std::ops::Range;

use logos::Logos;

use crate::span::Span;

#[derive(Clone, Debug)]
pub struct Token {
  pub kind: TokenKind,
  pub span: Span,
}

impl Token {
  pub fn is(&self, kind: impl Borrow<TokenKind>) -> bool {
    discriminant(&self.kind) == discriminant(kind.borrow())
  }
}

#[derive(Clone)]
pub struct Lexer<'src> {
  src: &'src str,
  inner: logos::Lexer<'src, TokenKind>,
  previous: Token,
  current: Token,
  eof: Token,
}

impl<'src> Lexer<'src> {
  pub fn new(src: &'src str) -> Self {
    let end = src.len();
    let eof = Token {
      span: (end..end).into(),
      kind: TokenKind::Tok_Eof,
    };

    let mut lex = Self {
      src,
      inner: TokenKind::lexer(src),
      previous: eof.clone(),
      current: eof.clone(),
      eof,
    };
    lex.bump();

    lex
  }

  #[inline]
  pub fn previous(&self) -> &Token {
    &self.previous
  }

  #[inline]
  pub fn current(&self) -> &Token {
    &self.current
  }

  #[inline]
  pub fn lexeme(&self, token: &Token) -> &'src str {
    &self.src[Range::from(token.span)]
  }

  #[inline]
  pub fn src(&self) -> &'src str {
    self.src
  }

  #[inline]
  pub fn bump(&mut self) {
    std::mem::swap(&mut self.previous, &mut self.current);

    self.current = match self.inner.next() {
      Some(Ok(kind)) => Token {
        kind,
        span: self.inner.span().into(),
      },
      Some(Err(())) => Token {
        kind: TokenKind::Tok_Error,
        span: self.inner.span().into(),
      },
      None => self.eof.clone(),
    };
  }
}

#[derive(Clone, Copy, Debug, Logos, PartialEq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"#[^\n]*")]
pub enum TokenKind {
  // Keywords
  #[token("class")]
  Kw_Class,
  #[token("def")]
  Kw_Def,
  #[token("end")]
  Kw_End,
  #[token("if")]
  Kw_If,
  #[token("unless")]
  Kw_Unless,
  #[token("then")]
  Kw_Then,
  #[token("else")]
  Kw_Else,
  #[token("case")]
  Kw_Case,
  #[token("when")]
  Kw_When,
  #[token("while")]
  Kw_While,
  #[token("do")]
  Kw_Do,
  #[token("true")]
  Kw_True,
  #[token("false")]
  Kw_False,
  #[token("nil")]
  Kw_Nil,
  #[token("self")]
  Kw_Self,
  #[token("raise")]
  Kw_Raise,
  #[token("exit")]
  Kw_Exit,

  // Brackets
  #[token("(")]
  Brk_ParenL,
  #[token(")")]
  Brk_ParenR,
  #[token("[")]
  Brk_SquareL,
  #[token("]")]
  Brk_SquareR,
  #[token("{")]
  Brk_CurlyL,
  #[token("}")]
  Brk_CurlyR,

  // Misc characters
  #[token(".")]
  Op_Dot,
  #[token(",")]
  Tok_Comma,
  #[token(";")]
  Tok_Semicolon,
  #[token("=>")]
  Op_Rocket,

  // Operators
  #[token("=")]
  Op_Equal,
  #[token("==")]
  Op_EqualEqual,
  #[token("!=")]
  Op_BangEqual,
  #[token("<")]
  Op_Less,
  #[token("<=")]
  Op_LessEqual,
  #[token("<=>")]
  Op_Spaceship,
  #[token(">")]
  Op_More,
  #[token(">=")]
  Op_MoreEqual,
  #[token("+")]
  Op_Plus,
  #[token("-")]
  Op_Minus,
  #[token("*")]
  Op_Star,
  #[token("/")]
  Op_Slash,
  #[token("%")]
  Op_Percent,
  #[token("!")]
  Op_Bang,

  // Literals
  #[regex("[0-9]+")]
  Lit_Int,
  #[regex(r#""([^"\\\n]|\\.)*""#)]
  #[regex(r"'([^'\\\n]|\\.)*'")]
  Lit_String,
  /// `a`, `b_c`, `empty?`, `mutate!`, `Array`, etc.
  #[regex("[a-zA-Z_][a-zA-Z0-9_]*[?!]?")]
  Tok_Ident,

  /// Statement separator; spaces and tabs are skipped, newlines are not.
  #[token("\n")]
  Tok_Newline,

  Tok_Error,
  Tok_Eof,
}

impl TokenKind {
  pub fn name(&self) -> &'static str {
    match self {
      TokenKind::Kw_Class => "class",
      TokenKind::Kw_Def => "def",
      TokenKind::Kw_End => "end",
      TokenKind::Kw_If => "if",
      TokenKind::Kw_Unless => "unless",
      TokenKind::Kw_Then => "then",
      TokenKind::Kw_Else => "else",
      TokenKind::Kw_Case => "case",
      TokenKind::Kw_When => "when",
      TokenKind::Kw_While => "while",
      TokenKind::Kw_Do => "do",
      TokenKind::Kw_True => "true",
      TokenKind::Kw_False => "false",
      TokenKind::Kw_Nil => "nil",
      TokenKind::Kw_Self => "self",
      TokenKind::Kw_Raise => "raise",
      TokenKind::Kw_Exit => "exit",
      TokenKind::Brk_ParenL => "(",
      TokenKind::Brk_ParenR => ")",
      TokenKind::Brk_SquareL => "[",
      TokenKind::Brk_SquareR => "]",
      TokenKind::Brk_CurlyL => "{",
      TokenKind::Brk_CurlyR => "}",
      TokenKind::Op_Dot => ".",
      TokenKind::Tok_Comma => ",",
      TokenKind::Tok_Semicolon => ";",
      TokenKind::Op_Rocket => "=>",
      TokenKind::Op_Equal => "=",
      TokenKind::Op_EqualEqual => "==",
      TokenKind::Op_BangEqual => "!=",
      TokenKind::Op_Less => "<",
      TokenKind::Op_LessEqual => "<=",
      TokenKind::Op_Spaceship => "<=>",
      TokenKind::Op_More => ">",
      TokenKind::Op_MoreEqual => ">=",
      TokenKind::Op_Plus => "+",
      TokenKind::Op_Minus => "-",
      TokenKind::Op_Star => "*",
      TokenKind::Op_Slash => "/",
      TokenKind::Op_Percent => "%",
      TokenKind::Op_Bang => "!",
      TokenKind::Lit_Int => "int",
      TokenKind::Lit_String => "string",
      TokenKind::Tok_Ident => "identifier",
      TokenKind::Tok_Newline => "newline",
      TokenKind::Tok_Error => "<error>",
      TokenKind::Tok_Eof => "<eof>",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(src: &str) -> Vec<TokenKind> {
    let mut lex = Lexer::new(src);
    let mut out = Vec::new();
    while !lex.current().is(TokenKind::Tok_Eof) {
      out.push(lex.current().kind);
      lex.bump();
    }
    out
  }

  #[test]
  fn keywords_beat_identifiers() {
    use TokenKind::*;
    assert_eq!(kinds("def ends end"), vec![Kw_Def, Tok_Ident, Kw_End]);
  }

  #[test]
  fn idents_may_end_in_query_or_bang() {
    use TokenKind::*;
    assert_eq!(kinds("empty? mutate! x"), vec![Tok_Ident, Tok_Ident, Tok_Ident]);
  }

  #[test]
  fn longest_operator_wins() {
    use TokenKind::*;
    assert_eq!(
      kinds("< <= <=> = == => != !"),
      vec![
        Op_Less,
        Op_LessEqual,
        Op_Spaceship,
        Op_Equal,
        Op_EqualEqual,
        Op_Rocket,
        Op_BangEqual,
        Op_Bang
      ]
    );
  }

  #[test]
  fn newlines_are_tokens_comments_are_not() {
    use TokenKind::*;
    assert_eq!(
      kinds("x = 1 # one\ny"),
      vec![Tok_Ident, Op_Equal, Lit_Int, Tok_Newline, Tok_Ident]
    );
  }

  #[test]
  fn strings_in_both_quote_styles() {
    use TokenKind::*;
    assert_eq!(kinds(r#"'a' "b""#), vec![Lit_String, Lit_String]);
  }
}
