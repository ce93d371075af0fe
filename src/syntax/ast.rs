use beef::lean::Cow;
use num_bigint::BigInt;

use crate::span::{Span, Spanned};

pub type Ident<'src> = Spanned<Cow<'src, str>>;

#[cfg_attr(test, derive(Debug))]
pub struct Module<'src> {
  pub body: Vec<Stmt<'src>>,
}

impl<'src> Module<'src> {
  pub fn new() -> Self {
    Self { body: vec![] }
  }
}

impl<'src> Default for Module<'src> {
  fn default() -> Self {
    Self::new()
  }
}

pub type Stmt<'src> = Spanned<StmtKind<'src>>;

#[cfg_attr(test, derive(Debug))]
pub enum StmtKind<'src> {
  Expr(Box<Expr<'src>>),
  Def(Box<Def<'src>>),
  Class(Box<Class<'src>>),
}

/// A method definition, at the top level or inside a class clause.
#[cfg_attr(test, derive(Debug))]
pub struct Def<'src> {
  pub name: Ident<'src>,
  pub params: Vec<Ident<'src>>,
  pub body: Vec<Stmt<'src>>,
}

/// A clause reopening one of the built-in classes.
#[cfg_attr(test, derive(Debug))]
pub struct Class<'src> {
  pub name: Ident<'src>,
  pub methods: Vec<Spanned<Def<'src>>>,
}

pub type Expr<'src> = Spanned<ExprKind<'src>>;

#[cfg_attr(test, derive(Debug))]
pub enum ExprKind<'src> {
  /// Integer literal.
  Int(BigInt),
  /// Single-character string literal; the value is its code point.
  Char(char),
  Bool(bool),
  Nil,
  GetSelf,
  GetVar(Box<GetVar<'src>>),
  SetVar(Box<SetVar<'src>>),
  Array(Vec<Expr<'src>>),
  Hash(Vec<(Expr<'src>, Expr<'src>)>),
  Binary(Box<Binary<'src>>),
  Not(Box<Expr<'src>>),
  Neg(Box<Expr<'src>>),
  If(Box<If<'src>>),
  Case(Box<Case<'src>>),
  While(Box<While<'src>>),
  Call(Box<Call<'src>>),
  Index(Box<Index<'src>>),
  SetIndex(Box<SetIndex<'src>>),
  Raise(Box<Raise>),
  Exit,
}

#[cfg_attr(test, derive(Debug))]
pub struct GetVar<'src> {
  pub name: Ident<'src>,
}

#[cfg_attr(test, derive(Debug))]
pub struct SetVar<'src> {
  pub name: Ident<'src>,
  pub value: Expr<'src>,
}

#[cfg_attr(test, derive(Debug))]
pub struct Binary<'src> {
  pub op: BinaryOp,
  pub left: Expr<'src>,
  pub right: Expr<'src>,
}

/// Operators lowered inline. Ordering comparisons are not here: the
/// parser desugars them to method calls, which the prelude defines in
/// terms of `<=>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Rem,
  Eq,
  Ne,
}

#[cfg_attr(test, derive(Debug))]
pub struct If<'src> {
  pub cond: Expr<'src>,
  /// Runs when the condition is truthy. Empty bodies yield nil.
  pub then: Vec<Stmt<'src>>,
  pub els: Option<Vec<Stmt<'src>>>,
}

#[cfg_attr(test, derive(Debug))]
pub struct Case<'src> {
  pub scrutinee: Expr<'src>,
  pub arms: Vec<Arm<'src>>,
  pub els: Option<Vec<Stmt<'src>>>,
}

#[cfg_attr(test, derive(Debug))]
pub struct Arm<'src> {
  /// Literal patterns only; checked during lowering.
  pub patterns: Vec<Expr<'src>>,
  pub body: Vec<Stmt<'src>>,
}

#[cfg_attr(test, derive(Debug))]
pub struct While<'src> {
  pub cond: Expr<'src>,
  pub body: Vec<Stmt<'src>>,
}

#[cfg_attr(test, derive(Debug))]
pub struct Call<'src> {
  /// `None` for a bareword call, which dispatches on `self`.
  pub receiver: Option<Expr<'src>>,
  pub name: Ident<'src>,
  pub args: Vec<Expr<'src>>,
}

#[cfg_attr(test, derive(Debug))]
pub struct Index<'src> {
  pub target: Expr<'src>,
  pub key: Expr<'src>,
}

#[cfg_attr(test, derive(Debug))]
pub struct SetIndex<'src> {
  pub target: Expr<'src>,
  pub key: Expr<'src>,
  pub value: Expr<'src>,
}

#[cfg_attr(test, derive(Debug))]
pub struct Raise {
  pub message: String,
}

pub fn expr_binary<'src>(
  s: impl Into<Span>,
  op: BinaryOp,
  left: Expr<'src>,
  right: Expr<'src>,
) -> Expr<'src> {
  Expr::new(s, ExprKind::Binary(Box::new(Binary { op, left, right })))
}

pub fn expr_call<'src>(
  s: impl Into<Span>,
  receiver: Option<Expr<'src>>,
  name: Ident<'src>,
  args: Vec<Expr<'src>>,
) -> Expr<'src> {
  Expr::new(
    s,
    ExprKind::Call(Box::new(Call {
      receiver,
      name,
      args,
    })),
  )
}

pub fn expr_get_var(name: Ident) -> Expr {
  Expr::new(name.span, ExprKind::GetVar(Box::new(GetVar { name })))
}

pub fn expr_set_var<'src>(s: impl Into<Span>, name: Ident<'src>, value: Expr<'src>) -> Expr<'src> {
  Expr::new(s, ExprKind::SetVar(Box::new(SetVar { name, value })))
}

pub fn expr_index<'src>(s: impl Into<Span>, target: Expr<'src>, key: Expr<'src>) -> Expr<'src> {
  Expr::new(s, ExprKind::Index(Box::new(Index { target, key })))
}

pub fn expr_if<'src>(
  s: impl Into<Span>,
  cond: Expr<'src>,
  then: Vec<Stmt<'src>>,
  els: Option<Vec<Stmt<'src>>>,
) -> Expr<'src> {
  Expr::new(s, ExprKind::If(Box::new(If { cond, then, els })))
}

pub fn expr_stmt(expr: Expr) -> Stmt {
  Stmt::new(expr.span, StmtKind::Expr(Box::new(expr)))
}
