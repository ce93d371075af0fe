/// Compiles and runs a dialect program, asserting on its exact stdout.
#[macro_export]
macro_rules! check {
  ($name:ident, $input:literal, $expected:literal) => {
    check!($name, $input, stdin: "", $expected);
  };
  ($name:ident, $input:literal, stdin: $stdin:literal, $expected:literal) => {
    #[test]
    fn $name() {
      let input = indoc::indoc!($input);
      let mut out = Vec::new();
      if let Err(e) = $crate::run("test.wsrb", input, $stdin.as_bytes(), &mut out) {
        panic!("program failed: {}\n{}", e, e.report(input));
      }
      let stdout = std::str::from_utf8(&out[..]).unwrap();
      assert_eq!(stdout, $expected);
    }
  };
}

/// Asserts that a program fails to compile (or run) with a message
/// containing the given fragment.
#[macro_export]
macro_rules! check_error {
  ($name:ident, $input:literal, $fragment:literal) => {
    #[test]
    fn $name() {
      let input = indoc::indoc!($input);
      let mut out = Vec::new();
      match $crate::run("test.wsrb", input, "".as_bytes(), &mut out) {
        Ok(()) => {
          let stdout = String::from_utf8(out).unwrap();
          panic!("unexpected success, stdout={stdout:?}")
        }
        Err(e) => {
          let message = e.to_string();
          assert!(
            message.contains($fragment),
            "error {message:?} does not mention {:?}",
            $fragment
          );
        }
      }
    }
  };
}
