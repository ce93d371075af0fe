check! {
  get_as_number_reads_a_line,
  r#"
    x = get_as_number
    put_as_number x * 2
  "#,
  stdin: "21\n",
  "42"
}

check! {
  get_as_number_reads_negative_numbers,
  r#"
    put_as_number get_as_number + 1
  "#,
  stdin: "-5\n",
  "-4"
}

check! {
  get_as_char_reads_one_byte,
  r#"
    c = get_as_char
    put_as_char c
    put_as_number c
  "#,
  stdin: "A",
  "A65"
}

check! {
  reads_interleave_with_writes,
  r#"
    a = get_as_number
    b = get_as_number
    put_as_number a + b
    put_as_char ' '
    put_as_number a - b
  "#,
  stdin: "10\n4\n",
  "14 6"
}
