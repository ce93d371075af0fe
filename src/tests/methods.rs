check! {
  fibonacci,
  r#"
    def f(n) if n < 2 then 1 else f(n-1)+f(n-2) end end
    put_as_number f(10)
  "#,
  "89"
}

check! {
  argument_order,
  r#"
    def sub2(a, b)
      a - b
    end
    put_as_number sub2(10, 4)
  "#,
  "6"
}

check! {
  callers_locals_survive_the_call,
  r#"
    def noisy(n)
      t = n * 2
      u = t + 1
      u - t
    end
    a = 1
    b = noisy(a + 1)
    put_as_number a
    put_as_number b
  "#,
  "11"
}

check! {
  deep_recursion_restores_locals,
  r#"
    def sum_to(n)
      if n == 0
        0
      else
        m = n - 1
        n + sum_to(m)
      end
    end
    put_as_number sum_to(100)
  "#,
  "5050"
}

check! {
  implicit_return_of_last_statement,
  r#"
    def pick
      1
      2
      3
    end
    put_as_number pick
  "#,
  "3"
}

check! {
  empty_method_returns_nil,
  r#"
    def nothing
    end
    put_as_char 'y' if nothing == nil
  "#,
  "y"
}

check! {
  forward_reference,
  r#"
    put_as_number double(21)
    def double(n)
      n * 2
    end
  "#,
  "42"
}

check! {
  overloads_by_arity,
  r#"
    def f(a)
      a
    end
    def f(a, b)
      a + b
    end
    put_as_number f(1)
    put_as_number f(1, 2)
  "#,
  "13"
}

check! {
  uncalled_methods_emit_no_code,
  r#"
    def unused
      raise "never lowered into the program"
    end
    put_as_char 'k'
  "#,
  "k"
}

check_error! {
  wrong_arity,
  r#"
    def g(a)
      a
    end
    g(1, 2)
  "#,
  "wrong number of arguments"
}

check_error! {
  unknown_method,
  r#"
    frobnicate(1)
  "#,
  "undefined method `frobnicate`"
}
