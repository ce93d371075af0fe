use num_bigint::BigInt;

use super::stmt::set_index;
use super::*;
use crate::syntax::ast::{
  expr_binary, expr_call, expr_get_var, expr_if, expr_index, expr_set_var, Arm, BinaryOp, ExprKind,
};

impl<'src> Parser<'src> {
  pub(super) fn expr(&mut self) -> Result<ast::Expr<'src>> {
    self.assign()
  }

  fn assign(&mut self) -> Result<ast::Expr<'src>> {
    let lhs = self.equality()?;
    if !self.bump_if(TokenKind::Op_Equal) {
      return Ok(lhs);
    }
    self.skip_newlines();
    let value = self.assign()?;
    let span = lhs.span.join(value.span);
    match lhs.into_inner() {
      ExprKind::GetVar(var) => Ok(expr_set_var(span, var.name, value)),
      ExprKind::Index(index) => Ok(set_index(span, *index, value)),
      _ => Err(self.error("invalid assignment target", span)),
    }
  }

  fn equality(&mut self) -> Result<ast::Expr<'src>> {
    let mut lhs = self.comparison()?;
    loop {
      let op = if self.bump_if(TokenKind::Op_EqualEqual) {
        BinaryOp::Eq
      } else if self.bump_if(TokenKind::Op_BangEqual) {
        BinaryOp::Ne
      } else {
        break;
      };
      let rhs = self.comparison()?;
      let span = lhs.span.join(rhs.span);
      lhs = expr_binary(span, op, lhs, rhs);
    }
    Ok(lhs)
  }

  /// Ordering comparisons desugar to method calls; the prelude defines
  /// them on Integer in terms of `<=>`.
  fn comparison(&mut self) -> Result<ast::Expr<'src>> {
    let mut lhs = self.additive()?;
    loop {
      let name = match self.current().kind {
        TokenKind::Op_Less => "<",
        TokenKind::Op_LessEqual => "<=",
        TokenKind::Op_More => ">",
        TokenKind::Op_MoreEqual => ">=",
        TokenKind::Op_Spaceship => "<=>",
        _ => break,
      };
      let op_span = self.current().span;
      self.bump();
      let rhs = self.additive()?;
      let span = lhs.span.join(rhs.span);
      let name = Spanned::new(op_span, Cow::borrowed(name));
      lhs = expr_call(span, Some(lhs), name, vec![rhs]);
    }
    Ok(lhs)
  }

  fn additive(&mut self) -> Result<ast::Expr<'src>> {
    let mut lhs = self.multiplicative()?;
    loop {
      let op = if self.bump_if(TokenKind::Op_Plus) {
        BinaryOp::Add
      } else if self.bump_if(TokenKind::Op_Minus) {
        BinaryOp::Sub
      } else {
        break;
      };
      let rhs = self.multiplicative()?;
      let span = lhs.span.join(rhs.span);
      lhs = expr_binary(span, op, lhs, rhs);
    }
    Ok(lhs)
  }

  fn multiplicative(&mut self) -> Result<ast::Expr<'src>> {
    let mut lhs = self.unary()?;
    loop {
      let op = if self.bump_if(TokenKind::Op_Star) {
        BinaryOp::Mul
      } else if self.bump_if(TokenKind::Op_Slash) {
        BinaryOp::Div
      } else if self.bump_if(TokenKind::Op_Percent) {
        BinaryOp::Rem
      } else {
        break;
      };
      let rhs = self.unary()?;
      let span = lhs.span.join(rhs.span);
      lhs = expr_binary(span, op, lhs, rhs);
    }
    Ok(lhs)
  }

  fn unary(&mut self) -> Result<ast::Expr<'src>> {
    if self.current().is(TokenKind::Op_Bang) {
      let start = self.current().span;
      self.bump();
      let rhs = self.unary()?;
      let span = start.join(rhs.span);
      return Ok(ast::Expr::new(span, ExprKind::Not(Box::new(rhs))));
    }
    if self.current().is(TokenKind::Op_Minus) {
      let start = self.current().span;
      self.bump();
      let rhs = self.unary()?;
      let span = start.join(rhs.span);
      // fold negative integer literals
      if let ExprKind::Int(n) = &*rhs {
        return Ok(ast::Expr::new(span, ExprKind::Int(-n.clone())));
      }
      return Ok(ast::Expr::new(span, ExprKind::Neg(Box::new(rhs))));
    }
    self.postfix()
  }

  fn postfix(&mut self) -> Result<ast::Expr<'src>> {
    let mut expr = self.primary()?;
    loop {
      if self.bump_if(TokenKind::Op_Dot) {
        let token = self.current().clone();
        self.expect(TokenKind::Tok_Ident)?;
        let name = self.ident(&token);
        let args = if self.bump_if(TokenKind::Brk_ParenL) {
          let args = self.call_args(TokenKind::Brk_ParenR)?;
          self.expect(TokenKind::Brk_ParenR)?;
          args
        } else {
          vec![]
        };
        let span = expr.span.join(self.previous().span);
        expr = expr_call(span, Some(expr), name, args);
      } else if self.bump_if(TokenKind::Brk_SquareL) {
        self.skip_newlines();
        let key = self.expr()?;
        self.skip_newlines();
        self.expect(TokenKind::Brk_SquareR)?;
        let span = expr.span.join(self.previous().span);
        expr = expr_index(span, expr, key);
      } else {
        break;
      }
    }
    Ok(expr)
  }

  fn primary(&mut self) -> Result<ast::Expr<'src>> {
    let token = self.current().clone();
    match token.kind {
      TokenKind::Lit_Int => {
        self.bump();
        let value = self
          .lex
          .lexeme(&token)
          .parse::<BigInt>()
          .map_err(|_| self.error("invalid integer literal", token.span))?;
        Ok(ast::Expr::new(token.span, ExprKind::Int(value)))
      }
      TokenKind::Lit_String => {
        self.bump();
        let value = self.string_body(&token)?;
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
          (Some(ch), None) => Ok(ast::Expr::new(token.span, ExprKind::Char(ch))),
          _ => Err(self.error(
            "string literals must be exactly one character",
            token.span,
          )),
        }
      }
      TokenKind::Kw_True => {
        self.bump();
        Ok(ast::Expr::new(token.span, ExprKind::Bool(true)))
      }
      TokenKind::Kw_False => {
        self.bump();
        Ok(ast::Expr::new(token.span, ExprKind::Bool(false)))
      }
      TokenKind::Kw_Nil => {
        self.bump();
        Ok(ast::Expr::new(token.span, ExprKind::Nil))
      }
      TokenKind::Kw_Self => {
        self.bump();
        Ok(ast::Expr::new(token.span, ExprKind::GetSelf))
      }
      TokenKind::Kw_Exit => {
        self.bump();
        Ok(ast::Expr::new(token.span, ExprKind::Exit))
      }
      TokenKind::Kw_Raise => {
        self.bump();
        let message = self.current().clone();
        self.expect(TokenKind::Lit_String)?;
        let message = self.string_body(&message)?;
        let span = token.span.join(self.previous().span);
        Ok(ast::Expr::new(
          span,
          ExprKind::Raise(Box::new(ast::Raise { message })),
        ))
      }
      TokenKind::Kw_If => {
        self.bump();
        self.if_(token.span, false)
      }
      TokenKind::Kw_Unless => {
        self.bump();
        self.if_(token.span, true)
      }
      TokenKind::Kw_While => {
        self.bump();
        self.while_(token.span)
      }
      TokenKind::Kw_Case => {
        self.bump();
        self.case_(token.span)
      }
      TokenKind::Brk_ParenL => {
        self.bump();
        self.skip_newlines();
        let expr = self.expr()?;
        self.skip_newlines();
        self.expect(TokenKind::Brk_ParenR)?;
        Ok(expr)
      }
      TokenKind::Brk_SquareL => {
        self.bump();
        let items = self.call_args(TokenKind::Brk_SquareR)?;
        self.expect(TokenKind::Brk_SquareR)?;
        let span = token.span.join(self.previous().span);
        Ok(ast::Expr::new(span, ExprKind::Array(items)))
      }
      TokenKind::Brk_CurlyL => {
        self.bump();
        self.hash_literal(token.span)
      }
      TokenKind::Tok_Ident => {
        self.bump();
        self.ident_expr(&token)
      }
      _ => Err(self.expected("an expression")),
    }
  }

  /// A bareword: a call with parentheses, a paren-less command call, or
  /// a plain variable read (which lowering may still resolve to a
  /// zero-argument call).
  fn ident_expr(&mut self, token: &Token) -> Result<ast::Expr<'src>> {
    let name = self.ident(token);
    if self.bump_if(TokenKind::Brk_ParenL) {
      let args = self.call_args(TokenKind::Brk_ParenR)?;
      self.expect(TokenKind::Brk_ParenR)?;
      let span = token.span.join(self.previous().span);
      return Ok(expr_call(span, None, name, args));
    }
    if self.at_command_arg() {
      let mut args = vec![];
      loop {
        args.push(self.expr()?);
        if !self.bump_if(TokenKind::Tok_Comma) {
          break;
        }
        self.skip_newlines();
      }
      let span = token.span.join(self.previous().span);
      return Ok(expr_call(span, None, name, args));
    }
    Ok(expr_get_var(name))
  }

  /// Whether the current token begins an argument of a paren-less
  /// command call like `put_as_number 3 + 2`.
  fn at_command_arg(&self) -> bool {
    match self.current().kind {
      TokenKind::Lit_Int
      | TokenKind::Lit_String
      | TokenKind::Tok_Ident
      | TokenKind::Kw_True
      | TokenKind::Kw_False
      | TokenKind::Kw_Nil
      | TokenKind::Kw_Self
      | TokenKind::Op_Bang => true,
      // `f -1` is a command call, `f - 1` and `f-1` are subtraction.
      TokenKind::Op_Minus => {
        let minus = self.current().span;
        let next = self.lookahead_token();
        matches!(
          next.kind,
          TokenKind::Lit_Int | TokenKind::Brk_ParenL | TokenKind::Tok_Ident
        ) && self.previous().span.end < minus.start
          && minus.end == next.span.start
      }
      _ => false,
    }
  }

  fn lookahead_token(&self) -> Token {
    let mut lex = self.lex.clone();
    lex.bump();
    lex.current().clone()
  }

  /// Comma-separated expressions up to (not including) `close`.
  fn call_args(&mut self, close: TokenKind) -> Result<Vec<ast::Expr<'src>>> {
    self.skip_newlines();
    let mut args = vec![];
    if self.current().is(close) {
      return Ok(args);
    }
    loop {
      args.push(self.expr()?);
      self.skip_newlines();
      if !self.bump_if(TokenKind::Tok_Comma) {
        break;
      }
      self.skip_newlines();
    }
    Ok(args)
  }

  fn hash_literal(&mut self, start: Span) -> Result<ast::Expr<'src>> {
    self.skip_newlines();
    let mut pairs = vec![];
    if !self.current().is(TokenKind::Brk_CurlyR) {
      loop {
        let key = self.expr()?;
        self.skip_newlines();
        self.expect(TokenKind::Op_Rocket)?;
        self.skip_newlines();
        let value = self.expr()?;
        pairs.push((key, value));
        self.skip_newlines();
        if !self.bump_if(TokenKind::Tok_Comma) {
          break;
        }
        self.skip_newlines();
      }
    }
    self.expect(TokenKind::Brk_CurlyR)?;
    let span = start.join(self.previous().span);
    Ok(ast::Expr::new(span, ExprKind::Hash(pairs)))
  }

  fn if_(&mut self, start: Span, negate: bool) -> Result<ast::Expr<'src>> {
    let cond = self.expr()?;
    self.bump_if(TokenKind::Kw_Then);
    let then = self.block(&[TokenKind::Kw_Else, TokenKind::Kw_End])?;
    let els = if self.bump_if(TokenKind::Kw_Else) {
      Some(self.block(&[TokenKind::Kw_End])?)
    } else {
      None
    };
    self.expect(TokenKind::Kw_End)?;
    let span = start.join(self.previous().span);
    if negate {
      Ok(expr_if(span, cond, els.unwrap_or_default(), Some(then)))
    } else {
      Ok(expr_if(span, cond, then, els))
    }
  }

  fn while_(&mut self, start: Span) -> Result<ast::Expr<'src>> {
    let cond = self.expr()?;
    self.bump_if(TokenKind::Kw_Do);
    let body = self.block(&[TokenKind::Kw_End])?;
    self.expect(TokenKind::Kw_End)?;
    let span = start.join(self.previous().span);
    Ok(ast::Expr::new(
      span,
      ExprKind::While(Box::new(ast::While { cond, body })),
    ))
  }

  fn case_(&mut self, start: Span) -> Result<ast::Expr<'src>> {
    let scrutinee = self.expr()?;
    let mut arms = vec![];
    loop {
      self.skip_separators();
      if !self.bump_if(TokenKind::Kw_When) {
        break;
      }
      let mut patterns = vec![];
      loop {
        patterns.push(self.expr()?);
        if !self.bump_if(TokenKind::Tok_Comma) {
          break;
        }
        self.skip_newlines();
      }
      self.bump_if(TokenKind::Kw_Then);
      let body = self.block(&[TokenKind::Kw_When, TokenKind::Kw_Else, TokenKind::Kw_End])?;
      arms.push(Arm { patterns, body });
    }
    let els = if self.bump_if(TokenKind::Kw_Else) {
      Some(self.block(&[TokenKind::Kw_End])?)
    } else {
      None
    };
    self.expect(TokenKind::Kw_End)?;
    let span = start.join(self.previous().span);
    Ok(ast::Expr::new(
      span,
      ExprKind::Case(Box::new(ast::Case {
        scrutinee,
        arms,
        els,
      })),
    ))
  }

  fn string_body(&mut self, token: &Token) -> Result<String> {
    let lexeme = self.lex.lexeme(token);
    let body = &lexeme[1..lexeme.len() - 1];
    unescape(body).ok_or_else(|| self.error("invalid escape sequence", token.span))
  }
}
