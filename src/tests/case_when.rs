check! {
  selects_the_matching_arm,
  r#"
    x = 2
    case x
    when 1 then put_as_char 'a'
    when 2, 3 then put_as_char 'b'
    else put_as_char 'c'
    end
  "#,
  "b"
}

check! {
  multiple_patterns_share_an_arm,
  r#"
    case 3
    when 1, 2 then put_as_char 'a'
    when 3, 4 then put_as_char 'b'
    end
  "#,
  "b"
}

check! {
  case_is_an_expression,
  r#"
    y = case 5
    when 1 then 10
    else 99
    end
    put_as_number y
  "#,
  "99"
}

check! {
  char_patterns,
  r#"
    c = 'z'
    case c
    when 'a' then put_as_char '1'
    when 'z' then put_as_char '2'
    end
  "#,
  "2"
}

check! {
  no_match_without_else_is_nil,
  r#"
    x = case 9
    when 1 then 2
    end
    put_as_char 'y' if x == nil
  "#,
  "y"
}

check! {
  bool_and_nil_patterns,
  r#"
    case true
    when false then put_as_char 'f'
    when nil then put_as_char 'n'
    when true then put_as_char 't'
    end
  "#,
  "t"
}

check_error! {
  non_literal_pattern,
  r#"
    y = 1
    case 5
    when y then 2
    end
  "#,
  "case patterns must be literals"
}
