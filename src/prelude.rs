//! A short dialect program prepended to every compilation. It reopens
//! the built-in classes to define the derived methods: the ordering
//! comparisons in terms of `<=>`, and a few list helpers. Methods that
//! are never called cost nothing, because emission is lazy.

pub const PATH: &str = "<prelude>";

pub const SOURCE: &str = "\
class Integer
  def <(other)
    (self <=> other) == -1
  end

  def >(other)
    (self <=> other) == 1
  end

  def <=(other)
    !((self <=> other) == 1)
  end

  def >=(other)
    !((self <=> other) == -1)
  end
end

class Array
  def first
    self[0]
  end

  def last
    self[size - 1]
  end

  def empty?
    size == 0
  end
end
";
