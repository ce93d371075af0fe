check! {
  literal_and_lookup,
  r#"
    x = {1 => 42, 12 => 4}
    put_as_number x[1]
    put_as_char ','
    put_as_number x[12]
  "#,
  "42,4"
}

check! {
  missing_key_is_nil,
  r#"
    h = {}
    put_as_char 'y' if h[5] == nil
  "#,
  "y"
}

check! {
  last_write_wins,
  r#"
    h = {}
    h[1] = 2
    h[1] = 3
    put_as_number h[1]
  "#,
  "3"
}

check! {
  duplicate_literal_keys_keep_the_last,
  r#"
    h = {1 => 2, 1 => 3}
    put_as_number h[1]
  "#,
  "3"
}

check! {
  colliding_keys_chain,
  r#"
    h = {}
    h[1] = 10
    h[12] = 20
    h[23] = 30
    put_as_number h[1]
    put_as_number h[12]
    put_as_number h[23]
    put_as_char 'y' if h[34] == nil
  "#,
  "102030y"
}

check! {
  negative_keys,
  r#"
    h = {}
    h[-4] = 9
    put_as_number h[-4]
  "#,
  "9"
}

check! {
  char_keys,
  r#"
    h = {'a' => 1, 'b' => 2}
    put_as_number h['b']
    put_as_number h['a']
  "#,
  "21"
}

check! {
  many_keys_across_buckets,
  r#"
    h = {}
    i = 0
    while i < 40
      h[i] = i * i
      i = i + 1
    end
    put_as_number h[0]
    put_as_char ' '
    put_as_number h[7]
    put_as_char ' '
    put_as_number h[39]
  "#,
  "0 49 1521"
}
