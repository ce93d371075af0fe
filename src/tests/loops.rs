check! {
  count_up_from_negative,
  r#"
    x = -10
    while x < 0
      put_as_number 10 + x
      x = x + 1
    end
  "#,
  "0123456789"
}

check! {
  false_condition_never_runs,
  r#"
    while false
      put_as_char 'x'
    end
    put_as_char 'd'
  "#,
  "d"
}

check! {
  while_yields_nil,
  r#"
    x = while false
      1
    end
    put_as_char 'y' if x == nil
  "#,
  "y"
}

check! {
  sum_with_le,
  r#"
    i = 1
    sum = 0
    while i <= 5
      sum = sum + i
      i = i + 1
    end
    put_as_number sum
  "#,
  "15"
}

check! {
  nested_loops,
  r#"
    i = 0
    while i < 3
      j = 0
      while j < 2
        put_as_number i * 2 + j
        j = j + 1
      end
      i = i + 1
    end
  "#,
  "012345"
}

check! {
  while_with_do,
  r#"
    i = 0
    while i < 2 do
      put_as_number i
      i = i + 1
    end
  "#,
  "01"
}
