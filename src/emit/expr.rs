use num_traits::Zero;

use super::*;
use crate::span::{line_col, Spanned};
use crate::syntax::ast::BinaryOp;

#[derive(Clone, Copy, PartialEq, Eq)]
enum CallKind {
  /// Written without a receiver; may fall back to the top level.
  Bareword,
  /// Written with an explicit receiver; an unknown receiver type raises.
  Explicit,
}

impl<'src> State<'src> {
  /// Lowers one expression. Every expression leaves exactly one value on
  /// the stack, except `exit` and `raise`, which never fall through.
  pub(super) fn emit_expr(&mut self, expr: &'src ast::Expr<'src>) -> Result<()> {
    use ast::ExprKind::*;
    match &**expr {
      Int(n) => {
        self.push_big(value::wrap_int(n.clone()));
        Ok(())
      }
      Char(c) => {
        self.push_big(value::wrap_int(*c as u32));
        Ok(())
      }
      Bool(true) => {
        self.push_i(value::TRUE);
        Ok(())
      }
      Bool(false) => {
        self.push_i(value::FALSE);
        Ok(())
      }
      Nil => {
        self.push_i(value::NIL);
        Ok(())
      }
      GetSelf => {
        match self.frames.last().and_then(|frame| frame.self_addr) {
          Some(addr) => self.load(addr),
          None => self.push_i(value::NONE),
        }
        Ok(())
      }
      GetVar(var) => self.emit_get_var(&var.name),
      SetVar(set) => self.emit_set_var(&set.name, &set.value),
      Array(items) => self.emit_array_literal(items),
      Hash(pairs) => self.emit_hash_literal(pairs),
      Binary(binary) => self.emit_binary(binary),
      Not(inner) => {
        self.emit_expr(inner)?;
        self.call_routine(Routine::Not);
        Ok(())
      }
      Neg(inner) => {
        // -x is (0 - x) on the unwrapped payload
        self.emit_expr(inner)?;
        self.unwrap_top();
        self.push_i(-1);
        self.emit(Insn::Mul);
        self.wrap_top_int();
        Ok(())
      }
      If(if_) => self.emit_if(&if_.cond, &if_.then, if_.els.as_deref()),
      Case(case) => self.emit_case(case),
      While(while_) => self.emit_while(while_),
      Call(call) => self.emit_call(call, expr.span),
      Index(index) => {
        let name = Spanned::new(expr.span, Cow::borrowed("[]"));
        self.emit_user_call(Some(&index.target), &name, &[&index.key], expr.span)
      }
      SetIndex(set) => {
        let name = Spanned::new(expr.span, Cow::borrowed("[]="));
        self.emit_user_call(Some(&set.target), &name, &[&set.key, &set.value], expr.span)
      }
      Raise(raise) => {
        self.emit_raise(&raise.message, expr.span);
        Ok(())
      }
      Exit => {
        self.emit(Insn::Exit);
        Ok(())
      }
    }
  }

  fn emit_get_var(&mut self, name: &ast::Ident<'src>) -> Result<()> {
    if let Some(addr) = self.lookup_var(name.as_ref()) {
      self.load(addr);
      return Ok(());
    }
    if self.emit_io_builtin(name, &[])? {
      return Ok(());
    }
    if name.as_ref().starts_with(char::is_uppercase) {
      let class_code = match name.as_ref() {
        "Special" => Some(value::CLASS_SPECIAL),
        "Integer" => Some(value::CLASS_INT),
        "Array" => Some(value::CLASS_ARRAY),
        "Hash" => Some(value::CLASS_HASH),
        _ => None,
      };
      if let Some(code) = class_code {
        self.push_i(code);
        return Ok(());
      }
      if let Some(addr) = self.constants.get(name.as_ref()).copied() {
        self.load(addr);
        return Ok(());
      }
      return Err(SpannedError::new(
        format!("uninitialized constant `{}`", name.as_ref()),
        name.span,
      ));
    }
    // a bareword read is a zero-argument call
    self.emit_user_call(None, name, &[], name.span)
  }

  fn emit_set_var(&mut self, name: &ast::Ident<'src>, value: &'src ast::Expr<'src>) -> Result<()> {
    self.emit_expr(value)?;
    let addr = if name.as_ref().starts_with(char::is_uppercase) {
      match self.constants.get(name.as_ref()).copied() {
        Some(addr) => addr,
        None => {
          let addr = self.addrs.fresh();
          self.constants.insert(name.clone().into_inner(), addr);
          addr
        }
      }
    } else {
      self.declare_var(&name.clone().into_inner())
    };
    // assignment is an expression; its value is the assigned value
    self.emit(Insn::Dup);
    self.store(addr);
    Ok(())
  }

  // --- literals -------------------------------------------------------

  /// Allocates the descriptor and element cells, then fills elements
  /// left to right. The base address stays on the stack throughout, so
  /// nested literals and calls inside elements cannot clobber it.
  fn emit_array_literal(&mut self, items: &'src [ast::Expr<'src>]) -> Result<()> {
    let size = items.len() as i64;
    let cap = (size * 2).max(10);

    // allocate 3 + cap cells; the bump pointer holds the last cell
    self.push_i(value::HEAP_COUNT);
    self.emit(Insn::Load);
    self.push_i(1);
    self.emit(Insn::Add); // base
    self.emit(Insn::Dup);
    self.push_i(cap + 2);
    self.emit(Insn::Add);
    self.push_i(value::HEAP_COUNT);
    self.emit(Insn::Swap);
    self.emit(Insn::Save);

    // descriptor: element pointer, size, capacity
    self.emit(Insn::Dup);
    self.emit(Insn::Dup);
    self.push_i(3);
    self.emit(Insn::Add);
    self.emit(Insn::Save);
    self.emit(Insn::Dup);
    self.push_i(1);
    self.emit(Insn::Add);
    self.push_i(size);
    self.emit(Insn::Save);
    self.emit(Insn::Dup);
    self.push_i(2);
    self.emit(Insn::Add);
    self.push_i(cap);
    self.emit(Insn::Save);

    for (i, item) in items.iter().enumerate() {
      self.emit(Insn::Dup);
      self.push_i(3 + i as i64);
      self.emit(Insn::Add);
      self.emit_expr(item)?;
      self.emit(Insn::Save);
    }

    self.wrap_top(value::TAG_ARRAY);
    Ok(())
  }

  /// Allocates the bucket block with every key set to NONE, then inserts
  /// the pairs in source order through the insertion routine.
  fn emit_hash_literal(&mut self, pairs: &'src [(ast::Expr<'src>, ast::Expr<'src>)]) -> Result<()> {
    let cells = value::HASH_BUCKETS * 3;

    self.push_i(value::HEAP_COUNT);
    self.emit(Insn::Load);
    self.push_i(1);
    self.emit(Insn::Add); // base
    self.emit(Insn::Dup);
    self.push_i(cells - 1);
    self.emit(Insn::Add);
    self.push_i(value::HEAP_COUNT);
    self.emit(Insn::Swap);
    self.emit(Insn::Save);

    // empty buckets have key NONE; their `next` links read as NONE_ADDR
    // because fresh cells default to zero
    for i in 0..value::HASH_BUCKETS {
      self.emit(Insn::Dup);
      self.push_i(3 * i);
      self.emit(Insn::Add);
      self.push_i(value::NONE);
      self.emit(Insn::Save);
    }

    self.wrap_top(value::TAG_HASH);

    for (key, val) in pairs {
      self.emit_expr(key)?;
      self.emit_expr(val)?;
      self.call_routine(Routine::HashInsert);
    }
    Ok(())
  }

  // --- operators ------------------------------------------------------

  fn emit_binary(&mut self, binary: &'src ast::Binary<'src>) -> Result<()> {
    match binary.op {
      BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
        self.emit_expr(&binary.left)?;
        self.unwrap_top();
        self.emit_expr(&binary.right)?;
        self.unwrap_top();
        self.emit(match binary.op {
          BinaryOp::Add => Insn::Add,
          BinaryOp::Sub => Insn::Sub,
          BinaryOp::Mul => Insn::Mul,
          BinaryOp::Div => Insn::Div,
          _ => Insn::Mod,
        });
        self.wrap_top_int();
      }
      BinaryOp::Eq => {
        self.emit_expr(&binary.left)?;
        self.emit_expr(&binary.right)?;
        self.call_routine(Routine::Eq);
      }
      BinaryOp::Ne => {
        self.emit_expr(&binary.left)?;
        self.emit_expr(&binary.right)?;
        self.call_routine(Routine::Neq);
      }
    }
    Ok(())
  }

  // --- control flow ---------------------------------------------------

  /// Evaluates `cond` and jumps to `truthy` when it holds, falling
  /// through otherwise.
  ///
  /// `x == 0` and `0 == x` skip the truthiness helper and branch on the
  /// unwrapped operand directly; `x < 0` and `0 < x` branch on its
  /// sign. Sound only for INT-tagged operands, which holds for the
  /// integer comparisons user source can write.
  fn emit_cond(&mut self, cond: &'src ast::Expr<'src>, truthy: &Label) -> Result<()> {
    if let ast::ExprKind::Binary(binary) = &**cond {
      if binary.op == BinaryOp::Eq {
        let operand = if is_zero_literal(&binary.right) {
          Some(&binary.left)
        } else if is_zero_literal(&binary.left) {
          Some(&binary.right)
        } else {
          None
        };
        if let Some(operand) = operand {
          self.emit_expr(operand)?;
          self.unwrap_top();
          self.emit(Insn::JumpIfZero(truthy.clone()));
          return Ok(());
        }
      }
    }
    if let ast::ExprKind::Call(call) = &**cond {
      if call.name.as_ref() == "<" && call.args.len() == 1 {
        if let Some(receiver) = &call.receiver {
          if is_zero_literal(&call.args[0]) {
            self.emit_expr(receiver)?;
            self.unwrap_top();
            self.emit(Insn::JumpIfNeg(truthy.clone()));
            return Ok(());
          }
          if is_zero_literal(receiver) {
            // 0 < x holds iff -x is negative
            self.emit_expr(&call.args[0])?;
            self.unwrap_top();
            self.push_i(-1);
            self.emit(Insn::Mul);
            self.emit(Insn::JumpIfNeg(truthy.clone()));
            return Ok(());
          }
        }
      }
    }

    self.emit_expr(cond)?;
    self.call_routine(Routine::Rtest);
    self.emit(Insn::JumpIfZero(truthy.clone()));
    Ok(())
  }

  fn emit_if(
    &mut self,
    cond: &'src ast::Expr<'src>,
    then: &'src [ast::Stmt<'src>],
    els: Option<&'src [ast::Stmt<'src>]>,
  ) -> Result<()> {
    let l_then = self.fresh_label();
    let l_end = self.fresh_label();

    self.emit_cond(cond, &l_then)?;
    match els {
      Some(els) => self.emit_body(els)?,
      None => self.push_i(value::NIL),
    }
    self.emit(Insn::Jump(l_end.clone()));
    self.emit(Insn::Def(l_then));
    self.emit_body(then)?;
    self.emit(Insn::Def(l_end));
    Ok(())
  }

  /// The loop's value is always nil. `while true` is an unconditional
  /// jump.
  fn emit_while(&mut self, while_: &'src ast::While<'src>) -> Result<()> {
    if matches!(&*while_.cond, ast::ExprKind::Bool(true)) {
      let l_top = self.fresh_label();
      self.emit(Insn::Def(l_top.clone()));
      for stmt in &while_.body {
        self.emit_stmt_discard(stmt)?;
      }
      self.emit(Insn::Jump(l_top));
      self.push_i(value::NIL);
      return Ok(());
    }

    let l_cond = self.fresh_label();
    let l_body = self.fresh_label();
    let l_end = self.fresh_label();

    self.emit(Insn::Def(l_cond.clone()));
    self.emit_cond(&while_.cond, &l_body)?;
    self.emit(Insn::Jump(l_end.clone()));
    self.emit(Insn::Def(l_body));
    for stmt in &while_.body {
      self.emit_stmt_discard(stmt)?;
    }
    self.emit(Insn::Jump(l_cond));
    self.emit(Insn::Def(l_end));
    self.push_i(value::NIL);
    Ok(())
  }

  /// Dup-subtract-branch chains over a single evaluation of the
  /// scrutinee; each arm pops its copy before running.
  fn emit_case(&mut self, case: &'src ast::Case<'src>) -> Result<()> {
    self.emit_expr(&case.scrutinee)?;

    let l_end = self.fresh_label();
    let arm_labels: Vec<Label> = case.arms.iter().map(|_| self.fresh_label()).collect();

    for (arm, label) in case.arms.iter().zip(&arm_labels) {
      for pattern in &arm.patterns {
        if !is_literal(pattern) {
          return Err(SpannedError::new(
            "case patterns must be literals",
            pattern.span,
          ));
        }
        self.emit(Insn::Dup);
        self.emit_expr(pattern)?;
        self.emit(Insn::Sub);
        self.emit(Insn::JumpIfZero(label.clone()));
      }
    }

    self.emit(Insn::Pop);
    match &case.els {
      Some(els) => self.emit_body(els)?,
      None => self.push_i(value::NIL),
    }
    self.emit(Insn::Jump(l_end.clone()));

    for (arm, label) in case.arms.iter().zip(&arm_labels) {
      self.emit(Insn::Def(label.clone()));
      self.emit(Insn::Pop);
      self.emit_body(&arm.body)?;
      self.emit(Insn::Jump(l_end.clone()));
    }

    self.emit(Insn::Def(l_end));
    Ok(())
  }

  // --- calls ----------------------------------------------------------

  fn emit_call(&mut self, call: &'src ast::Call<'src>, span: Span) -> Result<()> {
    let args: Vec<&'src ast::Expr<'src>> = call.args.iter().collect();

    if call.receiver.is_none() && self.emit_io_builtin(&call.name, &args)? {
      return Ok(());
    }
    if let Some(receiver) = &call.receiver {
      if call.name.as_ref() == "is_a?" && args.len() == 1 {
        return self.emit_is_a(receiver, args[0]);
      }
    }

    self.emit_user_call(call.receiver.as_ref(), &call.name, &args, span)
  }

  /// `put_as_number` and friends lower to the I/O primitives directly.
  fn emit_io_builtin(
    &mut self,
    name: &ast::Ident<'src>,
    args: &[&'src ast::Expr<'src>],
  ) -> Result<bool> {
    let (read, insn) = match name.as_ref() {
      "put_as_number" => (false, Insn::WriteNum),
      "put_as_char" => (false, Insn::WriteChar),
      "get_as_number" => (true, Insn::ReadNum),
      "get_as_char" => (true, Insn::ReadChar),
      _ => return Ok(false),
    };
    if read {
      if !args.is_empty() {
        return Err(SpannedError::new(
          format!("`{}` takes no arguments", name.as_ref()),
          name.span,
        ));
      }
      self.push_i(value::TMP);
      self.emit(insn);
      self.load(value::TMP);
      self.wrap_top_int();
    } else {
      let &[arg] = args else {
        return Err(SpannedError::new(
          format!("`{}` takes exactly one argument", name.as_ref()),
          name.span,
        ));
      };
      self.emit_expr(arg)?;
      self.unwrap_top();
      self.emit(insn);
      self.push_i(value::NIL);
    }
    Ok(true)
  }

  /// `x.is_a?(K)` is a tag subtraction: a class code's payload is
  /// 8 + the tag its instances carry.
  fn emit_is_a(
    &mut self,
    receiver: &'src ast::Expr<'src>,
    class: &'src ast::Expr<'src>,
  ) -> Result<()> {
    self.emit_expr(receiver)?;
    self.push_i(4);
    self.emit(Insn::Mod);
    self.emit_expr(class)?;
    self.unwrap_top();
    self.push_i(8);
    self.emit(Insn::Sub);
    self.emit(Insn::Sub);

    let l_true = self.fresh_label();
    let l_end = self.fresh_label();
    self.emit(Insn::JumpIfZero(l_true.clone()));
    self.push_i(value::FALSE);
    self.emit(Insn::Jump(l_end.clone()));
    self.emit(Insn::Def(l_true));
    self.push_i(value::TRUE);
    self.emit(Insn::Def(l_end));
    Ok(())
  }

  /// A user-level call: arguments left to right, then the receiver, then
  /// dispatch on its tag. The caller's live locals are saved around the
  /// call and restored afterwards, with the return value stashed in TMP.
  fn emit_user_call(
    &mut self,
    receiver: Option<&'src ast::Expr<'src>>,
    name: &ast::Ident<'src>,
    args: &[&'src ast::Expr<'src>],
    span: Span,
  ) -> Result<()> {
    let arity = args.len();
    let method: &Cow<'src, str> = name;

    if receiver.is_none() {
      let any_class = [ClassId::Int, ClassId::Array, ClassId::Hash]
        .into_iter()
        .any(|class| self.class_has_method(class, method.as_ref()));
      let top_level = self.methods.contains_key(&(None, method.clone()));
      if !top_level && (self.at_top_level() || !any_class) {
        let message = if args.is_empty() {
          format!("undefined local variable or method `{method}`")
        } else {
          format!("undefined method `{method}`")
        };
        return Err(SpannedError::new(message, span));
      }
    }

    let saved = self
      .frames
      .last()
      .map(|frame| frame.live_addrs())
      .unwrap_or_default();
    for &addr in &saved {
      self.push_i(addr);
      self.load(addr);
    }

    for &arg in args {
      self.emit_expr(arg)?;
    }

    match receiver {
      Some(receiver) => {
        self.emit_expr(receiver)?;
        self.emit_dispatch(CallKind::Explicit, name, arity, span)?;
      }
      None if self.at_top_level() => {
        // self is statically NONE here, no tag branches needed
        let label = self.method_label(None, method, arity, span)?;
        self.push_i(value::NONE);
        self.emit(Insn::Call(label));
      }
      None => {
        match self.frames.last().and_then(|frame| frame.self_addr) {
          Some(addr) => self.load(addr),
          None => self.push_i(value::NONE),
        }
        self.emit_dispatch(CallKind::Bareword, name, arity, span)?;
      }
    }

    if !saved.is_empty() {
      self.store(value::TMP);
      for _ in &saved {
        self.emit(Insn::Save);
      }
      self.load(value::TMP);
    }
    Ok(())
  }

  /// Branches on the receiver's tag; each arm either calls the typed
  /// method, falls back to the top level (bareword calls only, with NONE
  /// as the receiver), or raises at run time.
  fn emit_dispatch(
    &mut self,
    kind: CallKind,
    name: &ast::Ident<'src>,
    arity: usize,
    span: Span,
  ) -> Result<()> {
    let l_end = self.fresh_label();
    let classes = [ClassId::Int, ClassId::Array, ClassId::Hash];
    let class_labels: Vec<Label> = classes.iter().map(|_| self.fresh_label()).collect();

    self.emit(Insn::Dup);
    self.push_i(4);
    self.emit(Insn::Mod);
    for (class, label) in classes.iter().zip(&class_labels) {
      self.emit(Insn::Dup);
      self.push_i(class.tag());
      self.emit(Insn::Sub);
      self.emit(Insn::JumpIfZero(label.clone()));
    }

    // the special tag: only a NONE receiver (a top-level bareword) is
    // meaningful, everything else is an unknown receiver
    self.emit(Insn::Pop);
    self.emit_dispatch_arm(None, kind, name, arity, span)?;
    self.emit(Insn::Jump(l_end.clone()));

    for (class, label) in classes.iter().zip(&class_labels) {
      self.emit(Insn::Def(label.clone()));
      self.emit(Insn::Pop);
      self.emit_dispatch_arm(Some(*class), kind, name, arity, span)?;
      self.emit(Insn::Jump(l_end.clone()));
    }

    self.emit(Insn::Def(l_end));
    Ok(())
  }

  fn emit_dispatch_arm(
    &mut self,
    class: Option<ClassId>,
    kind: CallKind,
    name: &ast::Ident<'src>,
    arity: usize,
    span: Span,
  ) -> Result<()> {
    let method: &Cow<'src, str> = name;
    match class {
      Some(class) if self.class_has_method(class, method.as_ref()) => {
        let label = self.method_label(Some(class), method, arity, span)?;
        self.emit(Insn::Call(label));
        Ok(())
      }
      _ if kind == CallKind::Bareword && self.methods.contains_key(&(None, method.clone())) => {
        let label = self.method_label(None, method, arity, span)?;
        self.emit(Insn::Pop);
        self.push_i(value::NONE);
        self.emit(Insn::Call(label));
        Ok(())
      }
      _ => {
        self.emit_raise("Unknown type of receiver", span);
        Ok(())
      }
    }
  }

  /// Writes `{path}:{line}:{col}: {message} (Error)\n` byte by byte,
  /// then exits.
  pub(super) fn emit_raise(&mut self, message: &str, span: Span) {
    let source = self.source();
    let (line, col) = line_col(source.text, span.start);
    let text = format!("{}:{}:{}: {} (Error)\n", source.path, line, col, message);
    for ch in text.chars() {
      self.push_i(ch as u32 as i64);
      self.emit(Insn::WriteChar);
    }
    self.emit(Insn::Exit);
  }
}

fn is_zero_literal(expr: &ast::Expr<'_>) -> bool {
  matches!(&**expr, ast::ExprKind::Int(n) if n.is_zero())
}

fn is_literal(expr: &ast::Expr<'_>) -> bool {
  matches!(
    &**expr,
    ast::ExprKind::Int(_) | ast::ExprKind::Char(_) | ast::ExprKind::Bool(_) | ast::ExprKind::Nil
  )
}
