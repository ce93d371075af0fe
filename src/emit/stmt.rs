use super::*;
use crate::syntax::ast::StmtKind;

impl<'src> State<'src> {
  /// Lowers a statement and discards its value. Definitions were
  /// consumed by the registration pre-pass and produce no code here.
  pub(super) fn emit_stmt_discard(&mut self, stmt: &'src ast::Stmt<'src>) -> Result<()> {
    match &**stmt {
      StmtKind::Expr(expr) => {
        self.emit_expr(expr)?;
        self.emit(Insn::Pop);
        Ok(())
      }
      StmtKind::Def(_) | StmtKind::Class(_) => Ok(()),
    }
  }

  /// Lowers a statement keeping its value; definitions yield nil.
  fn emit_stmt_value(&mut self, stmt: &'src ast::Stmt<'src>) -> Result<()> {
    match &**stmt {
      StmtKind::Expr(expr) => self.emit_expr(expr),
      StmtKind::Def(_) | StmtKind::Class(_) => {
        self.push_i(value::NIL);
        Ok(())
      }
    }
  }

  /// Lowers a statement list as a body: every value is discarded except
  /// the last, which is the body's value. An empty body yields nil.
  pub(super) fn emit_body(&mut self, body: &'src [ast::Stmt<'src>]) -> Result<()> {
    match body.split_last() {
      None => {
        self.push_i(value::NIL);
        Ok(())
      }
      Some((last, rest)) => {
        for stmt in rest {
          self.emit_stmt_discard(stmt)?;
        }
        self.emit_stmt_value(last)
      }
    }
  }
}
