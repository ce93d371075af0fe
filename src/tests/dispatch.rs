check! {
  reopened_array_method,
  r#"
    class Array
      def second
        self[1]
      end
    end
    a = [5, 6]
    put_as_number a.second
  "#,
  "6"
}

check! {
  bareword_falls_back_to_top_level,
  r#"
    def helper
      7
    end
    class Array
      def h2
        helper
      end
    end
    put_as_number [1].h2
  "#,
  "7"
}

check! {
  bareword_prefers_the_receiver_class,
  r#"
    def size
      99
    end
    class Array
      def report
        size
      end
    end
    put_as_number [1, 2, 3].report
    put_as_number size
  "#,
  "399"
}

check! {
  reopened_integer_method,
  r#"
    class Integer
      def double
        self + self
      end
    end
    put_as_number 21.double
  "#,
  "42"
}

check! {
  spaceship_is_built_in,
  r#"
    put_as_number 3 <=> 7
    put_as_number 7 <=> 3
    put_as_number 3 <=> 3
  "#,
  "-110"
}

check! {
  comparisons_from_the_prelude,
  r#"
    put_as_char 'a' if 1 < 2
    put_as_char 'b' if 2 > 1
    put_as_char 'c' if 1 <= 1
    put_as_char 'd' if 2 >= 3
    put_as_char 'e' if 3 >= 3
  "#,
  "abce"
}

check! {
  is_a_checks_the_tag,
  r#"
    put_as_char 'i' if 5.is_a?(Integer)
    put_as_char 'a' if [].is_a?(Array)
    put_as_char 'h' if {}.is_a?(Hash)
    put_as_char 's' if nil.is_a?(Special)
    put_as_char 'x' if 5.is_a?(Array) == false
  "#,
  "iahsx"
}

check! {
  unknown_receiver_raises_at_runtime,
  r#"
    x = 5
    x.frobnicate
  "#,
  "test.wsrb:2:1: Unknown type of receiver (Error)\n"
}

check! {
  methods_dispatch_by_receiver_type,
  r#"
    class Integer
      def tag
        'i'
      end
    end
    class Array
      def tag
        'a'
      end
    end
    def show(v)
      put_as_char v.tag
    end
    show(1)
    show([])
  "#,
  "ia"
}
