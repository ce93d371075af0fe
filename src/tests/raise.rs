check! {
  raise_prints_a_located_message_and_stops,
  r#"
    put_as_char 'a'
    raise "boom"
    put_as_char 'b'
  "#,
  "atest.wsrb:2:1: boom (Error)\n"
}

check! {
  raise_inside_a_method,
  r#"
    def explode
      raise "from inside"
    end
    put_as_char 'x'
    explode
    put_as_char 'y'
  "#,
  "xtest.wsrb:2:3: from inside (Error)\n"
}

check! {
  exit_stops_execution,
  r#"
    put_as_char 'a'
    exit
    put_as_char 'b'
  "#,
  "a"
}

check! {
  exit_inside_a_loop,
  r#"
    i = 0
    while true
      put_as_number i
      exit if i == 2
      i = i + 1
    end
  "#,
  "012"
}
