//! The built-in function registry.
//!
//! Each builtin is a named handler with a declared parameter list; the
//! interpreter checks arity against the declaration exactly as it does for
//! user functions, then runs the handler (see `interp::call_builtin`).

/// The closed set of built-in functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    /// `print(value)` — write the display form, no newline.
    Print,
    /// `input()` — read one line from the host.
    Input,
    /// `clear()` — clear the host display.
    Clear,
    /// `type(value)` — the value's type name as a string.
    Type,
    /// `len(value)` — length of a string or list.
    Len,
    /// `exit()` — terminate with code 0.
    Exit,
    /// `eval(value)` — evaluate a string as a program in the current scope.
    Eval,
    /// `convert(value, to)` — convert to `"string"`, `"number"`, or
    /// `"boolean"`.
    Convert,
    /// `random(value, count)` — a list of `count` integers in `[0, value]`.
    Random,
}

impl Builtin {
    /// Every builtin, in the order they are installed into the globals.
    pub const ALL: [Builtin; 9] = [
        Builtin::Print,
        Builtin::Input,
        Builtin::Clear,
        Builtin::Type,
        Builtin::Len,
        Builtin::Exit,
        Builtin::Eval,
        Builtin::Convert,
        Builtin::Random,
    ];

    /// The global name the builtin is installed under.
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Input => "input",
            Builtin::Clear => "clear",
            Builtin::Type => "type",
            Builtin::Len => "len",
            Builtin::Exit => "exit",
            Builtin::Eval => "eval",
            Builtin::Convert => "convert",
            Builtin::Random => "random",
        }
    }

    /// The advertised parameter names, which also fix the arity.
    pub fn params(&self) -> &'static [&'static str] {
        match self {
            Builtin::Print => &["value"],
            Builtin::Input => &[],
            Builtin::Clear => &[],
            Builtin::Type => &["value"],
            Builtin::Len => &["value"],
            Builtin::Exit => &[],
            Builtin::Eval => &["value"],
            Builtin::Convert => &["value", "to"],
            Builtin::Random => &["value", "count"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Builtin::ALL.iter().map(|b| b.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Builtin::ALL.len());
    }

    #[test]
    fn test_arities() {
        assert_eq!(Builtin::Print.params().len(), 1);
        assert_eq!(Builtin::Input.params().len(), 0);
        assert_eq!(Builtin::Convert.params().len(), 2);
        assert_eq!(Builtin::Random.params().len(), 2);
    }
}
