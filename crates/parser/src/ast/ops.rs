//! Operator kinds.
//!
//! The AST stores operators as their source spelling; these enums give the
//! spelling a closed type for consumers that dispatch on it.

macro_rules! spelled_op {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Parse from the source spelling.
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Source spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }
    };
}

spelled_op! {
    /// Binary operators.
    BinaryOp {
        Add => "+",
        Sub => "-",
        Mult => "*",
        MatMult => "@",
        Div => "/",
        FloorDiv => "//",
        Mod => "%",
        Pow => "**",
        LShift => "<<",
        RShift => ">>",
        BitOr => "|",
        BitXor => "^",
        BitAnd => "&",
    }
}

spelled_op! {
    /// Unary operators.
    UnaryOp {
        Invert => "~",
        Not => "not",
        UAdd => "+",
        USub => "-",
    }
}

spelled_op! {
    /// Comparison operators.
    ComparisonOp {
        Eq => "==",
        NotEq => "!=",
        Lt => "<",
        LtE => "<=",
        Gt => ">",
        GtE => ">=",
        Is => "is",
        IsNot => "is not",
        In => "in",
        NotIn => "not in",
    }
}

spelled_op! {
    /// Boolean operators.
    BoolOp {
        And => "and",
        Or => "or",
    }
}
