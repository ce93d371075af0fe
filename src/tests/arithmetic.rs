check! {
  add,
  r#"
    put_as_number 3 + 2
  "#,
  "5"
}

check! {
  precedence,
  r#"
    put_as_number 2 + 3 * 4
  "#,
  "14"
}

check! {
  left_associative_sub,
  r#"
    put_as_number 10 - 4 - 3
  "#,
  "3"
}

check! {
  parens,
  r#"
    put_as_number (2 + 3) * 4
  "#,
  "20"
}

check! {
  division_floors,
  r#"
    put_as_number 7 / 2
    put_as_char ' '
    put_as_number -7 / 2
  "#,
  "3 -4"
}

check! {
  modulo_takes_divisor_sign,
  r#"
    put_as_number -7 % 3
    put_as_char ' '
    put_as_number 7 % -3
  "#,
  "2 -2"
}

check! {
  negative_literals,
  r#"
    x = -10
    put_as_number x
  "#,
  "-10"
}

check! {
  unary_minus_on_expressions,
  r#"
    x = 6
    put_as_number -(x * 7)
  "#,
  "-42"
}

check! {
  arbitrary_precision,
  r#"
    put_as_number 99999999999999999999 + 1
  "#,
  "100000000000000000000"
}

check! {
  char_literals_are_code_points,
  r#"
    put_as_number 'A'
    put_as_char 'A' + 1
  "#,
  "65B"
}
