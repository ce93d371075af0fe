check! {
  if_else_as_expression,
  r#"
    x = if 1 == 1 then 'a' else 'b' end
    put_as_char x
  "#,
  "a"
}

check! {
  if_without_else_yields_nil,
  r#"
    x = if false then 1 end
    put_as_char 'y' if x == nil
  "#,
  "y"
}

check! {
  unless_swaps_branches,
  r#"
    unless false
      put_as_char 'a'
    else
      put_as_char 'b'
    end
    unless true
      put_as_char 'c'
    else
      put_as_char 'd'
    end
  "#,
  "ad"
}

check! {
  zero_comparison_shortcut,
  r#"
    x = 0
    if x == 0
      put_as_char 'z'
    end
    if 0 == x
      put_as_char 'z'
    end
    y = 5
    if y == 0
      put_as_char 'n'
    end
  "#,
  "zz"
}

check! {
  negative_comparison_shortcut,
  r#"
    x = -3
    if x < 0
      put_as_char 'n'
    end
    if 0 < x
      put_as_char 'p'
    end
    y = 3
    if 0 < y
      put_as_char 'q'
    end
    if y < 0
      put_as_char 'r'
    end
  "#,
  "nq"
}

check! {
  nested_if,
  r#"
    x = 5
    if x < 10
      if x < 3
        put_as_char 'a'
      else
        put_as_char 'b'
      end
    else
      put_as_char 'c'
    end
  "#,
  "b"
}

check! {
  condition_with_method_call,
  r#"
    if 2 < 3
      put_as_char 'y'
    end
    if 3 < 2
      put_as_char 'n'
    end
  "#,
  "y"
}
