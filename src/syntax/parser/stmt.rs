use super::*;
use crate::syntax::ast::{expr_if, expr_set_var, expr_stmt, ExprKind, SetIndex, StmtKind};

impl<'src> Parser<'src> {
  pub(super) fn stmt(&mut self) -> Result<ast::Stmt<'src>> {
    match self.current().kind {
      TokenKind::Kw_Def => {
        let def = self.def_()?;
        Ok(ast::Stmt::new(
          def.span,
          StmtKind::Def(Box::new(def.into_inner())),
        ))
      }
      TokenKind::Kw_Class => self.class_(),
      _ => {
        let expr = self.expr()?;
        let expr = self.modifier(expr)?;
        Ok(expr_stmt(expr))
      }
    }
  }

  /// `E if C` / `E unless C`. A modified assignment binds its value
  /// through the conditional, so `x = 100 if false` binds nil.
  fn modifier(&mut self, expr: ast::Expr<'src>) -> Result<ast::Expr<'src>> {
    let negate = if self.bump_if(TokenKind::Kw_If) {
      false
    } else if self.bump_if(TokenKind::Kw_Unless) {
      true
    } else {
      return Ok(expr);
    };
    let cond = self.expr()?;
    let span = expr.span.join(cond.span);
    let wrap = |value: ast::Expr<'src>| {
      let value_span = value.span;
      if negate {
        expr_if(value_span, cond, vec![], Some(vec![expr_stmt(value)]))
      } else {
        expr_if(value_span, cond, vec![expr_stmt(value)], None)
      }
    };
    match expr.into_inner() {
      ExprKind::SetVar(set) => Ok(expr_set_var(span, set.name, wrap(set.value))),
      other => Ok(wrap(ast::Expr::new(span, other))),
    }
  }

  pub(super) fn def_(&mut self) -> Result<Spanned<ast::Def<'src>>> {
    let start = self.current().span;
    self.expect(TokenKind::Kw_Def)?;
    let name = self.method_name()?;

    let mut params = vec![];
    if self.bump_if(TokenKind::Brk_ParenL) {
      self.skip_newlines();
      if !self.current().is(TokenKind::Brk_ParenR) {
        loop {
          let token = self.current().clone();
          self.expect(TokenKind::Tok_Ident)?;
          params.push(self.ident(&token));
          self.skip_newlines();
          if !self.bump_if(TokenKind::Tok_Comma) {
            break;
          }
          self.skip_newlines();
        }
      }
      self.expect(TokenKind::Brk_ParenR)?;
    }

    let body = self.block(&[TokenKind::Kw_End])?;
    self.expect(TokenKind::Kw_End)?;
    let span = start.join(self.previous().span);
    Ok(Spanned::new(span, ast::Def { name, params, body }))
  }

  fn class_(&mut self) -> Result<ast::Stmt<'src>> {
    let start = self.current().span;
    self.expect(TokenKind::Kw_Class)?;
    if self.in_class {
      return Err(self.error("nested class definitions are not supported", start));
    }

    let token = self.current().clone();
    self.expect(TokenKind::Tok_Ident)?;
    let name = self.ident(&token);

    self.in_class = true;
    let result = self.class_body();
    self.in_class = false;
    let methods = result?;

    self.expect(TokenKind::Kw_End)?;
    let span = start.join(self.previous().span);
    Ok(ast::Stmt::new(
      span,
      StmtKind::Class(Box::new(ast::Class { name, methods })),
    ))
  }

  fn class_body(&mut self) -> Result<Vec<Spanned<ast::Def<'src>>>> {
    let mut methods = vec![];
    loop {
      self.skip_separators();
      match self.current().kind {
        TokenKind::Kw_End => break,
        TokenKind::Kw_Def => methods.push(self.def_()?),
        TokenKind::Kw_Class => {
          return Err(self.error(
            "nested class definitions are not supported",
            self.current().span,
          ))
        }
        _ => return Err(self.expected("a method definition or `end`")),
      }
    }
    Ok(methods)
  }

  /// Method names: identifiers (optionally ending in `?`/`!`), the
  /// comparison operators, and the index operators `[]`/`[]=`.
  fn method_name(&mut self) -> Result<ast::Ident<'src>> {
    let token = self.current().clone();
    let name: Cow<'src, str> = match token.kind {
      TokenKind::Tok_Ident => {
        self.bump();
        return Ok(self.ident(&token));
      }
      TokenKind::Op_Less => Cow::borrowed("<"),
      TokenKind::Op_More => Cow::borrowed(">"),
      TokenKind::Op_LessEqual => Cow::borrowed("<="),
      TokenKind::Op_MoreEqual => Cow::borrowed(">="),
      TokenKind::Op_Spaceship => Cow::borrowed("<=>"),
      TokenKind::Op_EqualEqual => Cow::borrowed("=="),
      TokenKind::Op_BangEqual => Cow::borrowed("!="),
      TokenKind::Brk_SquareL => {
        self.bump();
        self.expect(TokenKind::Brk_SquareR)?;
        let name = if self.bump_if(TokenKind::Op_Equal) {
          "[]="
        } else {
          "[]"
        };
        let span = token.span.join(self.previous().span);
        return Ok(Spanned::new(span, Cow::borrowed(name)));
      }
      _ => return Err(self.expected("a method name")),
    };
    self.bump();
    Ok(Spanned::new(token.span, name))
  }
}

/// Lowers an `x[i] = v` target into its AST node. Used by `assign`.
pub(super) fn set_index<'src>(
  span: Span,
  index: ast::Index<'src>,
  value: ast::Expr<'src>,
) -> ast::Expr<'src> {
  ast::Expr::new(
    span,
    ExprKind::SetIndex(Box::new(SetIndex {
      target: index.target,
      key: index.key,
      value,
    })),
  )
}
