//! Lowering: AST to IR.
//!
//! A single recursive pass translates each module's statements, after a
//! registration pre-pass has populated the method registry and the
//! dispatch table. Method bodies and runtime support routines are not
//! emitted where they are defined: the first call site that resolves one
//! assigns its label and queues it, and queued bodies are drained into
//! the trailer after the main program's EXIT. Definitions that are never
//! called produce no code.

mod expr;
mod runtime;
mod stmt;

use beef::lean::Cow;
use indexmap::{IndexMap, IndexSet};
use num_bigint::BigInt;

use crate::ir::{Addrs, Insn, Label, Labels};
use crate::span::{Span, SpannedError};
use crate::syntax::ast;
use crate::value;

type Result<T, E = SpannedError> = std::result::Result<T, E>;

/// A parsed module together with where it came from; `raise` lowers the
/// path and position into its message.
pub struct Source<'src> {
  pub path: &'src str,
  pub text: &'src str,
  pub module: &'src ast::Module<'src>,
}

/// Lowers the given modules (prelude first, then user code) into one
/// program.
pub fn lower<'src>(sources: &'src [Source<'src>]) -> Result<Vec<Insn>> {
  let mut state = State::new(sources);
  state.register_sources()?;
  state.emit_program()
}

/// The classes a receiver tag can select.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum ClassId {
  Int,
  Array,
  Hash,
}

impl ClassId {
  fn tag(self) -> i64 {
    match self {
      ClassId::Int => value::TAG_INT,
      ClassId::Array => value::TAG_ARRAY,
      ClassId::Hash => value::TAG_HASH,
    }
  }

  fn name(self) -> &'static str {
    match self {
      ClassId::Int => "Integer",
      ClassId::Array => "Array",
      ClassId::Hash => "Hash",
    }
  }
}

/// Runtime support routines, emitted at most once each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Routine {
  Rtest,
  Not,
  Eq,
  Neq,
  Cmp,
  ArraySize,
  ArrayPush,
  ArrayPop,
  ArrayGet,
  ArraySet,
  ArrayGrow,
  HashLookup,
  HashInsert,
  HashGet,
  HashSet,
}

/// The built-in methods backing the dispatch table before the prelude
/// and user code add theirs.
fn builtin_method(class: ClassId, name: &str) -> Option<(Routine, usize)> {
  let entry = match (class, name) {
    (ClassId::Int, "<=>") => (Routine::Cmp, 1),
    (ClassId::Array, "size") => (Routine::ArraySize, 0),
    (ClassId::Array, "push") => (Routine::ArrayPush, 1),
    (ClassId::Array, "pop") => (Routine::ArrayPop, 0),
    (ClassId::Array, "[]") => (Routine::ArrayGet, 1),
    (ClassId::Array, "[]=") => (Routine::ArraySet, 2),
    (ClassId::Hash, "[]") => (Routine::HashGet, 1),
    (ClassId::Hash, "[]=") => (Routine::HashSet, 2),
    _ => return None,
  };
  Some(entry)
}

#[derive(Clone, Copy)]
struct MethodDef<'src> {
  source: usize,
  def: &'src ast::Def<'src>,
}

#[derive(Clone)]
enum Pending<'src> {
  Method {
    class: Option<ClassId>,
    name: Cow<'src, str>,
    arity: usize,
    label: Label,
  },
  Routine(Routine),
}

/// The compile-time set of local addresses belonging to one method
/// (or to the top level). Call sites save and restore exactly these.
struct Frame<'src> {
  vars: IndexMap<Cow<'src, str>, i64>,
  /// The self slot; the top-level frame has none, `self` there is NONE.
  self_addr: Option<i64>,
}

impl<'src> Frame<'src> {
  fn top_level() -> Self {
    Self {
      vars: IndexMap::new(),
      self_addr: None,
    }
  }

  /// Addresses a call site must preserve, in a fixed order.
  fn live_addrs(&self) -> Vec<i64> {
    let mut addrs: Vec<i64> = self.vars.values().copied().collect();
    addrs.extend(self.self_addr);
    addrs
  }
}

struct State<'src> {
  sources: &'src [Source<'src>],
  current_source: usize,

  insns: Vec<Insn>,
  labels: Labels,
  addrs: Addrs,

  /// `(class, name)` to every registered definition of that name.
  methods: IndexMap<(Option<ClassId>, Cow<'src, str>), Vec<MethodDef<'src>>>,
  /// `class` to the method names it owns; decides typed dispatch
  /// against top-level fallback.
  dispatch: IndexMap<ClassId, IndexSet<Cow<'src, str>>>,
  method_labels: IndexMap<(Option<ClassId>, Cow<'src, str>, usize), Label>,
  routine_labels: IndexMap<Routine, Label>,
  pending: Vec<Pending<'src>>,

  frames: Vec<Frame<'src>>,
  constants: IndexMap<Cow<'src, str>, i64>,
}

impl<'src> State<'src> {
  fn new(sources: &'src [Source<'src>]) -> Self {
    let mut dispatch: IndexMap<ClassId, IndexSet<Cow<'src, str>>> = IndexMap::new();
    for class in [ClassId::Int, ClassId::Array, ClassId::Hash] {
      let mut names = IndexSet::new();
      for name in ["<=>", "size", "push", "pop", "[]", "[]="] {
        if builtin_method(class, name).is_some() {
          names.insert(Cow::borrowed(name));
        }
      }
      dispatch.insert(class, names);
    }

    Self {
      sources,
      current_source: 0,
      insns: Vec::new(),
      labels: Labels::new(),
      addrs: Addrs::new(),
      methods: IndexMap::new(),
      dispatch,
      method_labels: IndexMap::new(),
      routine_labels: IndexMap::new(),
      pending: Vec::new(),
      frames: Vec::new(),
      constants: IndexMap::new(),
    }
  }

  fn source(&self) -> &Source<'src> {
    &self.sources[self.current_source]
  }

  // --- registration pre-pass ------------------------------------------

  /// Populates the method registry and dispatch table before any code
  /// is lowered, so call sites may refer to definitions that appear
  /// later in the source.
  fn register_sources(&mut self) -> Result<()> {
    for i in 0..self.sources.len() {
      let module = self.sources[i].module;
      self.register_stmts(i, &module.body)?;
    }
    Ok(())
  }

  fn register_stmts(&mut self, source: usize, stmts: &'src [ast::Stmt<'src>]) -> Result<()> {
    for stmt in stmts {
      match &**stmt {
        ast::StmtKind::Def(def) => self.register_def(source, def, None)?,
        ast::StmtKind::Class(class) => {
          let id = self.class_id(&class.name)?;
          for def in &class.methods {
            self.register_def(source, def, Some(id))?;
          }
        }
        ast::StmtKind::Expr(expr) => self.register_expr(source, expr)?,
      }
    }
    Ok(())
  }

  fn register_def(
    &mut self,
    source: usize,
    def: &'src ast::Def<'src>,
    class: Option<ClassId>,
  ) -> Result<()> {
    let name = def.name.clone().into_inner();
    if let Some(class) = class {
      self.dispatch[&class].insert(name.clone());
    }
    self
      .methods
      .entry((class, name))
      .or_default()
      .push(MethodDef { source, def });
    // definitions nested in the body register eagerly as well
    self.register_stmts(source, &def.body)
  }

  /// Walks into every statement body nested in an expression, so a
  /// definition inside a branch still registers eagerly.
  fn register_expr(&mut self, source: usize, expr: &'src ast::Expr<'src>) -> Result<()> {
    use ast::ExprKind::*;
    match &**expr {
      Int(_) | Char(_) | Bool(_) | Nil | GetSelf | Exit | Raise(_) => Ok(()),
      GetVar(_) => Ok(()),
      SetVar(set) => self.register_expr(source, &set.value),
      Array(items) => {
        for item in items {
          self.register_expr(source, item)?;
        }
        Ok(())
      }
      Hash(pairs) => {
        for (k, v) in pairs {
          self.register_expr(source, k)?;
          self.register_expr(source, v)?;
        }
        Ok(())
      }
      Binary(binary) => {
        self.register_expr(source, &binary.left)?;
        self.register_expr(source, &binary.right)
      }
      Not(inner) | Neg(inner) => self.register_expr(source, inner),
      If(if_) => {
        self.register_expr(source, &if_.cond)?;
        self.register_stmts(source, &if_.then)?;
        if let Some(els) = &if_.els {
          self.register_stmts(source, els)?;
        }
        Ok(())
      }
      Case(case) => {
        self.register_expr(source, &case.scrutinee)?;
        for arm in &case.arms {
          for pattern in &arm.patterns {
            self.register_expr(source, pattern)?;
          }
          self.register_stmts(source, &arm.body)?;
        }
        if let Some(els) = &case.els {
          self.register_stmts(source, els)?;
        }
        Ok(())
      }
      While(while_) => {
        self.register_expr(source, &while_.cond)?;
        self.register_stmts(source, &while_.body)
      }
      Call(call) => {
        if let Some(receiver) = &call.receiver {
          self.register_expr(source, receiver)?;
        }
        for arg in &call.args {
          self.register_expr(source, arg)?;
        }
        Ok(())
      }
      Index(index) => {
        self.register_expr(source, &index.target)?;
        self.register_expr(source, &index.key)
      }
      SetIndex(set) => {
        self.register_expr(source, &set.target)?;
        self.register_expr(source, &set.key)?;
        self.register_expr(source, &set.value)
      }
    }
  }

  fn class_id(&self, name: &ast::Ident<'src>) -> Result<ClassId> {
    match name.as_ref() {
      "Integer" => Ok(ClassId::Int),
      "Array" => Ok(ClassId::Array),
      "Hash" => Ok(ClassId::Hash),
      other => Err(SpannedError::new(
        format!("unknown class `{other}`; only Array, Hash and Integer may be reopened"),
        name.span,
      )),
    }
  }

  // --- program assembly -----------------------------------------------

  fn emit_program(&mut self) -> Result<Vec<Insn>> {
    // Seed HEAP_COUNT with the last static address. The operand is not
    // known until lowering finishes, so it is patched below.
    self.push_i(value::HEAP_COUNT);
    let patch = self.insns.len();
    self.emit(Insn::Push(BigInt::default()));
    self.emit(Insn::Save);

    self.frames.push(Frame::top_level());
    for i in 0..self.sources.len() {
      self.current_source = i;
      let module = self.sources[i].module;
      for stmt in &module.body {
        self.emit_stmt_discard(stmt)?;
      }
    }
    self.frames.pop();
    self.emit(Insn::Exit);

    self.drain_pending()?;

    self.insns[patch] = Insn::Push(BigInt::from(self.addrs.last()));
    Ok(std::mem::take(&mut self.insns))
  }

  /// Emits every queued method and routine; emission may queue more.
  fn drain_pending(&mut self) -> Result<()> {
    let mut next = 0;
    while next < self.pending.len() {
      let item = self.pending[next].clone();
      next += 1;
      match item {
        Pending::Method {
          class,
          name,
          arity,
          label,
        } => self.emit_method(class, &name, arity, &label)?,
        Pending::Routine(routine) => self.emit_routine(routine),
      }
    }
    Ok(())
  }

  fn emit_method(
    &mut self,
    class: Option<ClassId>,
    name: &Cow<'src, str>,
    arity: usize,
    label: &Label,
  ) -> Result<()> {
    let method = self.methods[&(class, name.clone())]
      .iter()
      .copied()
      .find(|m| m.def.params.len() == arity)
      .unwrap_or_else(|| panic!("queued method {name}/{arity} has no definition"));

    let saved_source = self.current_source;
    self.current_source = method.source;

    self.emit(Insn::Def(label.clone()));

    let mut frame = Frame {
      vars: IndexMap::new(),
      self_addr: Some(self.addrs.fresh()),
    };
    for param in &method.def.params {
      let addr = self.addrs.fresh();
      frame.vars.insert(param.clone().into_inner(), addr);
    }
    let self_addr = frame.self_addr.unwrap_or_default();
    let param_addrs: Vec<i64> = frame.vars.values().copied().collect();
    self.frames.push(frame);

    // Prologue: the receiver is on top, arguments below it in source
    // order. Pop the receiver into the self slot, then the arguments in
    // reverse into theirs.
    self.store(self_addr);
    for addr in param_addrs.iter().rev() {
      self.store(*addr);
    }

    self.emit_body(&method.def.body)?;
    self.emit(Insn::End);

    self.frames.pop();
    self.current_source = saved_source;
    Ok(())
  }

  // --- tables ---------------------------------------------------------

  /// The label of `class#name/arity`, queuing its body for emission the
  /// first time it is requested.
  fn method_label(
    &mut self,
    class: Option<ClassId>,
    name: &Cow<'src, str>,
    arity: usize,
    span: Span,
  ) -> Result<Label> {
    let key = (class, name.clone(), arity);
    if let Some(label) = self.method_labels.get(&key) {
      return Ok(label.clone());
    }

    if let Some(defs) = self.methods.get(&(class, name.clone())) {
      if defs.iter().any(|m| m.def.params.len() == arity) {
        let label = self.labels.fresh();
        self.method_labels.insert(key, label.clone());
        self.pending.push(Pending::Method {
          class,
          name: name.clone(),
          arity,
          label: label.clone(),
        });
        return Ok(label);
      }
      return Err(SpannedError::new(
        format!("wrong number of arguments for `{name}`"),
        span,
      ));
    }

    if let Some(class) = class {
      if let Some((routine, builtin_arity)) = builtin_method(class, name) {
        if builtin_arity == arity {
          return Ok(self.routine_label(routine));
        }
        return Err(SpannedError::new(
          format!("wrong number of arguments for `{}#{name}`", class.name()),
          span,
        ));
      }
    }

    Err(SpannedError::new(
      format!("undefined method `{name}`"),
      span,
    ))
  }

  fn routine_label(&mut self, routine: Routine) -> Label {
    if let Some(label) = self.routine_labels.get(&routine) {
      return label.clone();
    }
    let label = self.labels.fresh();
    self.routine_labels.insert(routine, label.clone());
    self.pending.push(Pending::Routine(routine));
    label
  }

  fn call_routine(&mut self, routine: Routine) {
    let label = self.routine_label(routine);
    self.emit(Insn::Call(label));
  }

  fn class_has_method(&self, class: ClassId, name: &str) -> bool {
    self.dispatch[&class].contains(name)
  }

  // --- frames ---------------------------------------------------------

  fn frame(&mut self) -> &mut Frame<'src> {
    self.frames.last_mut().unwrap_or_else(|| panic!("no frame"))
  }

  fn lookup_var(&self, name: &str) -> Option<i64> {
    self
      .frames
      .last()
      .and_then(|frame| frame.vars.get(name).copied())
  }

  fn declare_var(&mut self, name: &Cow<'src, str>) -> i64 {
    if let Some(addr) = self.lookup_var(name.as_ref()) {
      return addr;
    }
    let addr = self.addrs.fresh();
    self.frame().vars.insert(name.clone(), addr);
    addr
  }

  fn at_top_level(&self) -> bool {
    self.frames.len() <= 1
  }

  // --- instruction helpers --------------------------------------------

  fn emit(&mut self, insn: Insn) {
    self.insns.push(insn);
  }

  fn push_i(&mut self, value: i64) {
    self.emit(Insn::Push(BigInt::from(value)));
  }

  fn push_big(&mut self, value: BigInt) {
    self.emit(Insn::Push(value));
  }

  /// `[] -> [heap[addr]]`
  fn load(&mut self, addr: i64) {
    self.push_i(addr);
    self.emit(Insn::Load);
  }

  /// `[v] -> []`, storing v at addr.
  fn store(&mut self, addr: i64) {
    self.push_i(addr);
    self.emit(Insn::Swap);
    self.emit(Insn::Save);
  }

  /// `[wrapped] -> [payload]`
  fn unwrap_top(&mut self) {
    self.push_i(4);
    self.emit(Insn::Div);
  }

  /// `[payload] -> [wrapped int]`
  fn wrap_top_int(&mut self) {
    self.wrap_top(value::TAG_INT);
  }

  fn wrap_top(&mut self, tag: i64) {
    self.push_i(4);
    self.emit(Insn::Mul);
    self.push_i(tag);
    self.emit(Insn::Add);
  }

  fn fresh_label(&mut self) -> Label {
    self.labels.fresh()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::syntax;

  fn lower_src(src: &str) -> Vec<Insn> {
    let module = syntax::parse(src).expect("parse failed");
    let sources = [Source {
      path: "test.wsrb",
      text: src,
      module: &module,
    }];
    lower(&sources).expect("lowering failed")
  }

  #[test]
  fn empty_program_initializes_the_heap_and_exits() {
    let program = lower_src("");
    assert_eq!(
      program,
      vec![
        Insn::Push(BigInt::from(value::HEAP_COUNT)),
        Insn::Push(BigInt::from(value::HEAP_COUNT)),
        Insn::Save,
        Insn::Exit,
      ]
    );
  }

  #[test]
  fn uncalled_definitions_produce_no_code() {
    let empty = lower_src("");
    let with_defs = lower_src("def a\n1\nend\ndef b(x)\nx\nend");
    assert_eq!(empty, with_defs);
  }

  #[test]
  fn called_methods_are_emitted_after_exit() {
    let program = lower_src("def a\n1\nend\na");
    let exit_at = program
      .iter()
      .position(|insn| *insn == Insn::Exit)
      .expect("no exit");
    let def_at = program
      .iter()
      .position(|insn| matches!(insn, Insn::Def(_)))
      .expect("method body was not emitted");
    assert!(def_at > exit_at);
  }

  #[test]
  fn heap_count_seed_covers_every_static_cell() {
    let program = lower_src("x = 1\ny = 2");
    let Insn::Push(seed) = &program[1] else {
      panic!("expected the heap seed");
    };
    // two locals at addresses 3 and 4
    assert_eq!(seed, &BigInt::from(4));
  }

  #[test]
  fn unknown_class_is_a_compile_error() {
    let src = "class Foo\ndef a\n1\nend\nend";
    let module = syntax::parse(src).expect("parse failed");
    let sources = [Source {
      path: "test.wsrb",
      text: src,
      module: &module,
    }];
    let err = lower(&sources).unwrap_err();
    assert!(err.message.contains("unknown class"));
  }
}
