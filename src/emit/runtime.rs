//! Runtime support routines: Whitespace code emitted at most once and
//! referenced by CALL.
//!
//! Routines own private static cells for their scratch state instead of
//! participating in the call-site save/restore protocol. The built-in
//! call graph is acyclic (push -> grow, get/insert -> lookup, set ->
//! insert, neq -> eq/not, not -> rtest) and no user code runs inside a
//! routine, so a routine can never re-enter itself.

use super::*;

impl<'src> State<'src> {
  pub(super) fn emit_routine(&mut self, routine: Routine) {
    let label = self.routine_label(routine);
    self.emit(Insn::Def(label));
    match routine {
      Routine::Rtest => self.routine_rtest(),
      Routine::Not => self.routine_not(),
      Routine::Eq => self.routine_eq(),
      Routine::Neq => self.routine_neq(),
      Routine::Cmp => self.routine_cmp(),
      Routine::ArraySize => self.routine_array_size(),
      Routine::ArrayPush => self.routine_array_push(),
      Routine::ArrayPop => self.routine_array_pop(),
      Routine::ArrayGet => self.routine_array_get(),
      Routine::ArraySet => self.routine_array_set(),
      Routine::ArrayGrow => self.routine_array_grow(),
      Routine::HashLookup => self.routine_hash_lookup(),
      Routine::HashInsert => self.routine_hash_insert(),
      Routine::HashGet => self.routine_hash_get(),
      Routine::HashSet => self.routine_hash_set(),
    }
  }

  /// `[v] -> [0]` for truthy, `[1]` for falsy. Falsy iff NIL or FALSE.
  fn routine_rtest(&mut self) {
    let l_false = self.fresh_label();
    let l_falsy = self.fresh_label();

    self.emit(Insn::Dup);
    self.emit(Insn::JumpIfZero(l_false.clone())); // FALSE is wrapped 0
    self.push_i(value::NIL);
    self.emit(Insn::Sub);
    self.emit(Insn::JumpIfZero(l_falsy.clone()));
    self.push_i(0);
    self.emit(Insn::End);

    self.emit(Insn::Def(l_false));
    self.emit(Insn::Pop);
    self.emit(Insn::Def(l_falsy));
    self.push_i(1);
    self.emit(Insn::End);
  }

  /// `[v] -> [TRUE]` for falsy v, `[FALSE]` for truthy v.
  fn routine_not(&mut self) {
    let l_truthy = self.fresh_label();

    self.call_routine(Routine::Rtest);
    self.emit(Insn::JumpIfZero(l_truthy.clone()));
    self.push_i(value::TRUE);
    self.emit(Insn::End);

    self.emit(Insn::Def(l_truthy));
    self.push_i(value::FALSE);
    self.emit(Insn::End);
  }

  /// `[a, b] -> [TRUE]` iff the wrapped values are identical.
  fn routine_eq(&mut self) {
    let l_equal = self.fresh_label();

    self.emit(Insn::Sub);
    self.emit(Insn::JumpIfZero(l_equal.clone()));
    self.push_i(value::FALSE);
    self.emit(Insn::End);

    self.emit(Insn::Def(l_equal));
    self.push_i(value::TRUE);
    self.emit(Insn::End);
  }

  fn routine_neq(&mut self) {
    self.call_routine(Routine::Eq);
    self.call_routine(Routine::Not);
    self.emit(Insn::End);
  }

  /// Integer#<=>: `[other, self] -> [0 | -1 | +1]` wrapped.
  fn routine_cmp(&mut self) {
    let l_zero = self.fresh_label();
    let l_neg = self.fresh_label();

    self.unwrap_top(); // other, self'
    self.emit(Insn::Swap);
    self.unwrap_top(); // self', other'
    self.emit(Insn::Sub); // self' - other'
    self.emit(Insn::Dup);
    self.emit(Insn::JumpIfZero(l_zero.clone()));
    self.emit(Insn::JumpIfNeg(l_neg.clone()));
    self.push_big(value::wrap_int(1));
    self.emit(Insn::End);

    self.emit(Insn::Def(l_zero));
    self.emit(Insn::Pop);
    self.push_big(value::wrap_int(0));
    self.emit(Insn::End);

    self.emit(Insn::Def(l_neg));
    self.push_big(value::wrap_int(-1));
    self.emit(Insn::End);
  }

  /// `[recv] -> [size]` wrapped.
  fn routine_array_size(&mut self) {
    self.unwrap_top();
    self.push_i(1);
    self.emit(Insn::Add);
    self.emit(Insn::Load);
    self.wrap_top_int();
    self.emit(Insn::End);
  }

  /// `[i, recv] -> [element]`. Reads raw heap.
  // TODO: bounds checking against the size cell
  fn routine_array_get(&mut self) {
    self.unwrap_top(); // i, base
    self.emit(Insn::Load); // i, ptr
    self.emit(Insn::Swap); // ptr, i
    self.unwrap_top(); // ptr, i'
    self.emit(Insn::Add);
    self.emit(Insn::Load);
    self.emit(Insn::End);
  }

  /// `[i, v, recv] -> [v]`. Writes raw heap.
  // TODO: bounds checking and growth on out-of-capacity writes
  fn routine_array_set(&mut self) {
    let s_base = self.addrs.fresh();
    let s_value = self.addrs.fresh();

    self.unwrap_top();
    self.store(s_base); // i, v
    self.store(s_value); // i
    self.unwrap_top(); // i'
    self.load(s_base);
    self.emit(Insn::Load); // i', ptr
    self.emit(Insn::Add); // addr
    self.load(s_value);
    self.emit(Insn::Save);
    self.load(s_value);
    self.emit(Insn::End);
  }

  /// `[x, recv] -> [recv]`. Grows first when size has reached capacity.
  fn routine_array_push(&mut self) {
    let p_base = self.addrs.fresh();
    let p_value = self.addrs.fresh();
    let l_grow = self.fresh_label();
    let l_store = self.fresh_label();

    self.unwrap_top();
    self.store(p_base); // x
    self.store(p_value); // []

    self.load(p_base);
    self.push_i(1);
    self.emit(Insn::Add);
    self.emit(Insn::Load); // size
    self.load(p_base);
    self.push_i(2);
    self.emit(Insn::Add);
    self.emit(Insn::Load); // size, cap
    self.emit(Insn::Sub);
    self.emit(Insn::JumpIfZero(l_grow.clone()));

    self.emit(Insn::Def(l_store.clone()));
    // heap[ptr + size] = x
    self.load(p_base);
    self.emit(Insn::Load);
    self.load(p_base);
    self.push_i(1);
    self.emit(Insn::Add);
    self.emit(Insn::Load);
    self.emit(Insn::Add);
    self.load(p_value);
    self.emit(Insn::Save);
    // size += 1
    self.load(p_base);
    self.push_i(1);
    self.emit(Insn::Add);
    self.emit(Insn::Dup);
    self.emit(Insn::Load);
    self.push_i(1);
    self.emit(Insn::Add);
    self.emit(Insn::Save);
    // return self
    self.load(p_base);
    self.wrap_top(value::TAG_ARRAY);
    self.emit(Insn::End);

    self.emit(Insn::Def(l_grow));
    self.load(p_base);
    self.call_routine(Routine::ArrayGrow);
    self.emit(Insn::Jump(l_store));
  }

  /// `[recv] -> [element | NIL]`, shrinking size by one.
  fn routine_array_pop(&mut self) {
    let q_base = self.addrs.fresh();
    let l_empty = self.fresh_label();

    self.unwrap_top();
    self.store(q_base);
    self.load(q_base);
    self.push_i(1);
    self.emit(Insn::Add);
    self.emit(Insn::Load); // size
    self.emit(Insn::JumpIfZero(l_empty.clone()));

    // size -= 1
    self.load(q_base);
    self.push_i(1);
    self.emit(Insn::Add);
    self.emit(Insn::Dup);
    self.emit(Insn::Load);
    self.push_i(1);
    self.emit(Insn::Sub);
    self.emit(Insn::Save);
    // heap[ptr + size]
    self.load(q_base);
    self.emit(Insn::Load);
    self.load(q_base);
    self.push_i(1);
    self.emit(Insn::Add);
    self.emit(Insn::Load);
    self.emit(Insn::Add);
    self.emit(Insn::Load);
    self.emit(Insn::End);

    self.emit(Insn::Def(l_empty));
    self.push_i(value::NIL);
    self.emit(Insn::End);
  }

  /// `[base] -> []`. Doubles capacity into a fresh contiguous block,
  /// copies the live elements, repoints the descriptor. The old cells
  /// are abandoned.
  fn routine_array_grow(&mut self) {
    let g_base = self.addrs.fresh();
    let g_old = self.addrs.fresh();
    let g_new = self.addrs.fresh();
    let g_size = self.addrs.fresh();
    let g_cap = self.addrs.fresh();
    let g_i = self.addrs.fresh();
    let l_copy = self.fresh_label();
    let l_done = self.fresh_label();

    self.store(g_base);
    self.load(g_base);
    self.emit(Insn::Load);
    self.store(g_old);
    self.load(g_base);
    self.push_i(1);
    self.emit(Insn::Add);
    self.emit(Insn::Load);
    self.store(g_size);
    self.load(g_base);
    self.push_i(2);
    self.emit(Insn::Add);
    self.emit(Insn::Load);
    self.push_i(2);
    self.emit(Insn::Mul);
    self.store(g_cap);

    // allocate g_cap cells
    self.push_i(value::HEAP_COUNT);
    self.emit(Insn::Load); // last
    self.emit(Insn::Dup);
    self.push_i(1);
    self.emit(Insn::Add);
    self.store(g_new); // last
    self.load(g_cap);
    self.emit(Insn::Add);
    self.store(value::HEAP_COUNT);

    self.push_i(0);
    self.store(g_i);
    self.emit(Insn::Def(l_copy.clone()));
    self.load(g_i);
    self.load(g_size);
    self.emit(Insn::Sub);
    self.emit(Insn::JumpIfZero(l_done.clone()));
    self.load(g_new);
    self.load(g_i);
    self.emit(Insn::Add);
    self.load(g_old);
    self.load(g_i);
    self.emit(Insn::Add);
    self.emit(Insn::Load);
    self.emit(Insn::Save);
    self.load(g_i);
    self.push_i(1);
    self.emit(Insn::Add);
    self.store(g_i);
    self.emit(Insn::Jump(l_copy));

    self.emit(Insn::Def(l_done));
    self.load(g_base);
    self.load(g_new);
    self.emit(Insn::Save);
    self.load(g_base);
    self.push_i(2);
    self.emit(Insn::Add);
    self.load(g_cap);
    self.emit(Insn::Save);
    self.emit(Insn::End);
  }

  /// The probe at the core of every hash operation.
  ///
  /// `[key, base] -> [addr, code]` where `addr` is a key-cell address
  /// and `code` classifies it: 0 the key lives here, 1 an empty slot in
  /// the chain, 2 the chain's terminator (occupied by another key).
  fn routine_hash_lookup(&mut self) {
    let h_base = self.addrs.fresh();
    let h_key = self.addrs.fresh();
    let h_at = self.addrs.fresh();
    let l_probe = self.fresh_label();
    let l_found = self.fresh_label();
    let l_empty = self.fresh_label();
    let l_terminal = self.fresh_label();

    self.store(h_base); // key
    self.emit(Insn::Dup);
    self.store(h_key); // key
    self.unwrap_top();
    self.push_i(value::HASH_BUCKETS);
    self.emit(Insn::Mod);
    self.push_i(3);
    self.emit(Insn::Mul);
    self.load(h_base);
    self.emit(Insn::Add);
    self.store(h_at);

    self.emit(Insn::Def(l_probe.clone()));
    self.load(h_at);
    self.emit(Insn::Load); // stored key
    self.emit(Insn::Dup);
    self.load(h_key);
    self.emit(Insn::Sub);
    self.emit(Insn::JumpIfZero(l_found.clone()));
    self.push_i(value::NONE);
    self.emit(Insn::Sub);
    self.emit(Insn::JumpIfZero(l_empty.clone()));
    self.load(h_at);
    self.push_i(2);
    self.emit(Insn::Add);
    self.emit(Insn::Load); // next
    self.emit(Insn::Dup);
    self.emit(Insn::JumpIfZero(l_terminal.clone()));
    self.store(h_at);
    self.emit(Insn::Jump(l_probe));

    self.emit(Insn::Def(l_found));
    self.emit(Insn::Pop);
    self.load(h_at);
    self.push_i(0);
    self.emit(Insn::End);

    self.emit(Insn::Def(l_empty));
    self.load(h_at);
    self.push_i(1);
    self.emit(Insn::End);

    self.emit(Insn::Def(l_terminal));
    self.emit(Insn::Pop);
    self.load(h_at);
    self.push_i(2);
    self.emit(Insn::End);
  }

  /// `[key, recv] -> [value | NIL]`.
  fn routine_hash_get(&mut self) {
    let l_hit = self.fresh_label();

    self.unwrap_top(); // key, base
    self.call_routine(Routine::HashLookup); // addr, code
    self.emit(Insn::JumpIfZero(l_hit.clone()));
    self.emit(Insn::Pop);
    self.push_i(value::NIL);
    self.emit(Insn::End);

    self.emit(Insn::Def(l_hit));
    self.push_i(1);
    self.emit(Insn::Add);
    self.emit(Insn::Load);
    self.emit(Insn::End);
  }

  /// Internal insertion: `[recv, k, v] -> [recv]`. Extends the bucket
  /// chain when the probe stops at an occupied terminator.
  fn routine_hash_insert(&mut self) {
    let i_key = self.addrs.fresh();
    let i_value = self.addrs.fresh();
    let i_base = self.addrs.fresh();
    let i_new = self.addrs.fresh();
    let l_extend = self.fresh_label();
    let l_write = self.fresh_label();

    self.store(i_value); // recv, k
    self.store(i_key); // recv
    self.emit(Insn::Dup);
    self.unwrap_top();
    self.store(i_base); // recv

    self.load(i_key);
    self.load(i_base);
    self.call_routine(Routine::HashLookup); // recv, addr, code
    self.push_i(2);
    self.emit(Insn::Sub);
    self.emit(Insn::JumpIfZero(l_extend.clone())); // recv, addr

    self.emit(Insn::Def(l_write.clone()));
    self.emit(Insn::Dup);
    self.load(i_key);
    self.emit(Insn::Save); // recv, addr
    self.push_i(1);
    self.emit(Insn::Add);
    self.load(i_value);
    self.emit(Insn::Save); // recv
    self.emit(Insn::End);

    // bump-allocate a fresh 3-cell bucket and wire it to the terminator
    self.emit(Insn::Def(l_extend));
    self.push_i(value::HEAP_COUNT);
    self.emit(Insn::Load);
    self.push_i(1);
    self.emit(Insn::Add); // recv, addr, new
    self.emit(Insn::Dup);
    self.store(i_new);
    self.emit(Insn::Dup);
    self.push_i(2);
    self.emit(Insn::Add);
    self.store(value::HEAP_COUNT); // recv, addr, new
    self.emit(Insn::Swap);
    self.push_i(2);
    self.emit(Insn::Add);
    self.emit(Insn::Swap);
    self.emit(Insn::Save); // recv       heap[addr + 2] = new
    self.load(i_new);
    self.push_i(2);
    self.emit(Insn::Add);
    self.push_i(value::NONE_ADDR);
    self.emit(Insn::Save);
    self.load(i_new);
    self.emit(Insn::Jump(l_write));
  }

  /// Hash#[]=: `[k, v, recv] -> [v]`.
  fn routine_hash_set(&mut self) {
    let t_key = self.addrs.fresh();
    let t_value = self.addrs.fresh();
    let t_recv = self.addrs.fresh();

    self.store(t_recv);
    self.store(t_value);
    self.store(t_key);
    self.load(t_recv);
    self.load(t_key);
    self.load(t_value);
    self.call_routine(Routine::HashInsert);
    self.emit(Insn::Pop);
    self.load(t_value);
    self.emit(Insn::End);
  }
}
