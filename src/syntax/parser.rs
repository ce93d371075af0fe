#![deny(unused_must_use)]

use beef::lean::Cow;

use super::ast;
use super::lexer::{Lexer, Token, TokenKind};
use crate::span::{Span, Spanned, SpannedError};

mod expr;
mod stmt;

type Result<T, E = SpannedError> = std::result::Result<T, E>;

/// Parses a dialect module. On failure every collected error is
/// returned; the parser resynchronizes at statement boundaries.
pub fn parse(src: &str) -> Result<ast::Module<'_>, Vec<SpannedError>> {
  Parser::new(src).module()
}

struct Parser<'src> {
  lex: Lexer<'src>,
  errors: Vec<SpannedError>,
  in_class: bool,
}

impl<'src> Parser<'src> {
  fn new(src: &'src str) -> Self {
    Self {
      lex: Lexer::new(src),
      errors: Vec::new(),
      in_class: false,
    }
  }

  fn module(mut self) -> Result<ast::Module<'src>, Vec<SpannedError>> {
    let mut module = ast::Module::new();
    loop {
      self.skip_separators();
      if self.current().is(TokenKind::Tok_Eof) {
        break;
      }
      match self.stmt_and_boundary() {
        Ok(stmt) => module.body.push(stmt),
        Err(e) => {
          self.errors.push(e);
          self.sync();
        }
      }
    }
    if self.errors.is_empty() {
      Ok(module)
    } else {
      Err(self.errors)
    }
  }

  /// One statement followed by a statement boundary.
  fn stmt_and_boundary(&mut self) -> Result<ast::Stmt<'src>> {
    let stmt = self.stmt()?;
    if !self.at_stmt_boundary() {
      return Err(self.expected("newline or `;`"));
    }
    Ok(stmt)
  }

  /// Statements inside a body, up to (but not including) one of
  /// `terminators` or end of input.
  fn block(&mut self, terminators: &[TokenKind]) -> Result<Vec<ast::Stmt<'src>>> {
    let mut body = vec![];
    loop {
      self.skip_separators();
      let current = self.current();
      if current.is(TokenKind::Tok_Eof) || terminators.iter().any(|t| current.is(t)) {
        break;
      }
      body.push(self.stmt_and_boundary()?);
    }
    Ok(body)
  }

  fn at_stmt_boundary(&self) -> bool {
    matches!(
      self.current().kind,
      TokenKind::Tok_Newline
        | TokenKind::Tok_Semicolon
        | TokenKind::Tok_Eof
        | TokenKind::Kw_End
        | TokenKind::Kw_Else
        | TokenKind::Kw_When
    )
  }

  fn skip_separators(&mut self) {
    while matches!(
      self.current().kind,
      TokenKind::Tok_Newline | TokenKind::Tok_Semicolon
    ) {
      self.bump();
    }
  }

  /// Newlines are transparent inside bracketed lists.
  fn skip_newlines(&mut self) {
    while self.current().is(TokenKind::Tok_Newline) {
      self.bump();
    }
  }

  /// Skips ahead to the next statement boundary after an error.
  fn sync(&mut self) {
    while !matches!(
      self.current().kind,
      TokenKind::Tok_Eof | TokenKind::Tok_Newline | TokenKind::Tok_Semicolon
    ) {
      self.bump();
    }
  }

  #[inline]
  fn previous(&self) -> &Token {
    self.lex.previous()
  }

  #[inline]
  fn current(&self) -> &Token {
    self.lex.current()
  }

  #[inline]
  fn bump(&mut self) {
    self.lex.bump();
  }

  #[inline]
  fn bump_if(&mut self, kind: TokenKind) -> bool {
    if self.current().is(kind) {
      self.bump();
      true
    } else {
      false
    }
  }

  #[inline]
  fn expect(&mut self, kind: TokenKind) -> Result<()> {
    if self.bump_if(kind) {
      Ok(())
    } else {
      Err(self.expected(&format!("`{}`", kind.name())))
    }
  }

  fn expected(&self, what: &str) -> SpannedError {
    SpannedError::new(
      format!("expected {what}, found `{}`", self.current().kind.name()),
      self.current().span,
    )
  }

  fn error(&self, message: impl ToString, span: impl Into<Span>) -> SpannedError {
    SpannedError::new(message, span)
  }

  /// The identifier for a just-bumped ident token.
  fn ident(&self, token: &Token) -> ast::Ident<'src> {
    Spanned::new(token.span, Cow::borrowed(self.lex.lexeme(token)))
  }
}

/// Resolves escape sequences in a string literal body. Returns `None`
/// for an unknown escape.
fn unescape(raw: &str) -> Option<String> {
  let mut out = String::with_capacity(raw.len());
  let mut chars = raw.chars();
  while let Some(ch) = chars.next() {
    if ch != '\\' {
      out.push(ch);
      continue;
    }
    let escape = match chars.next()? {
      'n' => '\n',
      't' => '\t',
      'r' => '\r',
      '0' => '\0',
      '\\' => '\\',
      '\'' => '\'',
      '"' => '"',
      _ => return None,
    };
    out.push(escape);
  }
  Some(out)
}
