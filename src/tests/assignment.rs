check! {
  read_back,
  r#"
    x = 41
    put_as_number x + 1
  "#,
  "42"
}

check! {
  assignment_is_an_expression,
  r#"
    x = (y = 5) + 1
    put_as_number x
    put_as_number y
  "#,
  "65"
}

check! {
  reassignment,
  r#"
    x = 1
    x = x + 1
    x = x * 10
    put_as_number x
  "#,
  "20"
}

check! {
  constants,
  r#"
    LIMIT = 42
    put_as_number LIMIT
  "#,
  "42"
}

check! {
  modifier_if_binds_nil_when_false,
  r#"
    x = 100 if false
    if x == nil
      put_as_char 'y'
    else
      put_as_char 'n'
    end
  "#,
  "y"
}

check! {
  modifier_if_binds_value_when_true,
  r#"
    x = 100 if true
    put_as_number x
  "#,
  "100"
}

check! {
  modifier_unless,
  r#"
    put_as_char 'a' unless false
    put_as_char 'b' unless true
    put_as_char 'c'
  "#,
  "ac"
}

check_error! {
  undefined_variable,
  r#"
    put_as_number missing
  "#,
  "undefined local variable or method `missing`"
}

check_error! {
  undefined_constant,
  r#"
    put_as_number Missing
  "#,
  "uninitialized constant `Missing`"
}
