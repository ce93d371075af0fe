check! {
  zero_and_empty_collections_are_truthy,
  r#"
    put_as_char 'a' if 0
    put_as_char 'b' if []
    put_as_char 'c' if {}
    put_as_char 'd' if nil
    put_as_char 'e' if false
    put_as_char 'f' if true
  "#,
  "abcf"
}

check! {
  not_flips_truthiness,
  r#"
    put_as_char 'y' if !false
    put_as_char 'z' if !nil
    put_as_char 'n' if !0
    put_as_char 'm' if !true
  "#,
  "yz"
}

check! {
  double_negation_normalizes,
  r#"
    put_as_char 'y' if !!5
    put_as_char 'n' if !!nil
  "#,
  "y"
}

check! {
  not_equal,
  r#"
    put_as_char 'a' if 1 != 2
    put_as_char 'b' if 1 != 1
    put_as_char 'c' if nil != false
  "#,
  "ac"
}
