check! {
  literal_read_write,
  r#"
    x = [1, 2, 3]
    x[1] = 7
    put_as_number x[0]
    put_as_number x[1]
    put_as_number x[2]
  "#,
  "173"
}

check! {
  push_pop_and_size,
  r#"
    x = []
    x.push(1)
    x.push(2)
    put_as_number x.size
    put_as_number x.pop
    put_as_number x.size
    put_as_number x.pop
    put_as_char 'n' if x.pop == nil
  "#,
  "2211n"
}

check! {
  push_returns_self,
  r#"
    x = []
    put_as_number x.push(9).size
  "#,
  "1"
}

check! {
  growth_preserves_elements,
  r#"
    x = []
    i = 0
    while i < 25
      x.push(i)
      i = i + 1
    end
    put_as_number x.size
    put_as_char ' '
    put_as_number x[10]
    put_as_char ' '
    put_as_number x[24]
  "#,
  "25 10 24"
}

check! {
  nested_arrays,
  r#"
    m = [[1, 2], [3, 4]]
    put_as_number m[1][0]
    put_as_number m[0][1]
  "#,
  "32"
}

check! {
  element_expressions_evaluate_in_order,
  r#"
    x = [1 + 1, 2 * 3, 9 - 1]
    put_as_number x[0]
    put_as_number x[1]
    put_as_number x[2]
  "#,
  "268"
}

check! {
  prelude_helpers,
  r#"
    a = [5, 6, 7]
    put_as_number a.first
    put_as_number a.last
    put_as_char 'y' if a.empty? == false
    put_as_char 'z' if [].empty?
  "#,
  "57yz"
}

check! {
  index_write_returns_the_value,
  r#"
    x = [0]
    put_as_number (x[0] = 42)
  "#,
  "42"
}

check! {
  arrays_compare_by_identity,
  r#"
    a = [1]
    b = [1]
    put_as_char 'y' if a == a
    put_as_char 'n' if a == b
  "#,
  "y"
}
