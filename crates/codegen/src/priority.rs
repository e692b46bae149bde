//! Operator priorities of the target language.
//!
//! Levels are ordered from loosest to tightest binding. An operand is
//! parenthesized when its own level is below the level its container
//! requires; right operands of left-associative operators require one level
//! more than the operator itself.

/// Binding strength of an emitted expression or of the slot it fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Assign,
    Comma,
    LogicalOr,
    LogicalAnd,
    LogicalNot,
    Comparison,
    NumericBoundary,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Shift,
    Additive,
    Modulo,
    Multiplicative,
    Absolute,
    BitwiseNot,
    UnaryMinus,
    Atom,
}

impl Priority {
    const ORDER: [Priority; 18] = [
        Priority::Assign,
        Priority::Comma,
        Priority::LogicalOr,
        Priority::LogicalAnd,
        Priority::LogicalNot,
        Priority::Comparison,
        Priority::NumericBoundary,
        Priority::BitwiseOr,
        Priority::BitwiseXor,
        Priority::BitwiseAnd,
        Priority::Shift,
        Priority::Additive,
        Priority::Modulo,
        Priority::Multiplicative,
        Priority::Absolute,
        Priority::BitwiseNot,
        Priority::UnaryMinus,
        Priority::Atom,
    ];

    /// The next tighter level.
    pub fn next(self) -> Priority {
        let index = self as usize;
        Self::ORDER[(index + 1).min(Self::ORDER.len() - 1)]
    }

    /// Level required of the right operand of an operator at this level.
    ///
    /// `%` shares one precedence level with `*` and `/` in Aseba, so its right
    /// operand must bind tighter than all three.
    pub fn right_operand(self) -> Priority {
        match self {
            Priority::Modulo | Priority::Multiplicative => Priority::Absolute,
            other => other.next(),
        }
    }

    /// Containers that accept a Boolean result as is.
    pub fn accepts_bool(self) -> bool {
        matches!(
            self,
            Priority::LogicalOr | Priority::LogicalAnd | Priority::LogicalNot
        )
    }
}

/// Whether an operator yields a number or a truth value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    Arithmetic,
    Boolean,
}

/// Target spelling and binding of one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operator {
    pub target: &'static str,
    pub priority: Priority,
    pub class: OpClass,
}

impl Operator {
    const fn arithmetic(target: &'static str, priority: Priority) -> Self {
        Operator {
            target,
            priority,
            class: OpClass::Arithmetic,
        }
    }

    const fn boolean(target: &'static str, priority: Priority) -> Self {
        Operator {
            target,
            priority,
            class: OpClass::Boolean,
        }
    }
}

/// Binary arithmetic operator for a Python spelling. Operators without a
/// direct counterpart (`/`, `**`, `@`) are handled or rejected by the caller.
pub fn binary(op: &str) -> Option<Operator> {
    let operator = match op {
        "+" => Operator::arithmetic("+", Priority::Additive),
        "-" => Operator::arithmetic("-", Priority::Additive),
        "*" => Operator::arithmetic("*", Priority::Multiplicative),
        "//" => Operator::arithmetic("/", Priority::Multiplicative),
        "%" => Operator::arithmetic("%", Priority::Modulo),
        "|" => Operator::arithmetic("|", Priority::BitwiseOr),
        "^" => Operator::arithmetic("^", Priority::BitwiseXor),
        "&" => Operator::arithmetic("&", Priority::BitwiseAnd),
        "<<" => Operator::arithmetic("<<", Priority::Shift),
        ">>" => Operator::arithmetic(">>", Priority::Shift),
        _ => return None,
    };
    Some(operator)
}

pub fn comparison(op: &str) -> Option<Operator> {
    let target = match op {
        "==" => "==",
        "!=" => "!=",
        "<" => "<",
        "<=" => "<=",
        ">" => ">",
        ">=" => ">=",
        _ => return None,
    };
    Some(Operator::boolean(target, Priority::Comparison))
}

pub fn unary(op: &str) -> Option<Operator> {
    let operator = match op {
        "-" => Operator::arithmetic("-", Priority::UnaryMinus),
        "~" => Operator::arithmetic("~", Priority::BitwiseNot),
        "not" => Operator::boolean("not", Priority::LogicalNot),
        _ => return None,
    };
    Some(operator)
}

pub fn boolean(op: &str) -> Option<Operator> {
    let operator = match op {
        "and" => Operator::boolean("and", Priority::LogicalAnd),
        "or" => Operator::boolean("or", Priority::LogicalOr),
        _ => return None,
    };
    Some(operator)
}

pub const ABS: Operator = Operator::arithmetic("abs", Priority::Absolute);

/// Wrap `code` in parentheses when `own` binds looser than `required`.
pub fn parenthesize(code: String, own: Priority, required: Priority) -> String {
    if own < required {
        format!("({})", code)
    } else {
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(Priority::Assign < Priority::Comma);
        assert!(Priority::Comparison < Priority::BitwiseOr);
        assert!(Priority::Additive < Priority::Modulo);
        assert!(Priority::Modulo < Priority::Multiplicative);
        assert_eq!(Priority::Additive.next(), Priority::Modulo);
        assert_eq!(Priority::Atom.next(), Priority::Atom);
    }

    #[test]
    fn floor_division_maps_to_slash() {
        let op = binary("//").unwrap();
        assert_eq!(op.target, "/");
        assert_eq!(op.priority, Priority::Multiplicative);
        assert!(binary("/").is_none());
        assert!(binary("**").is_none());
    }

    #[test]
    fn modulo_right_operand_binds_past_product() {
        assert_eq!(Priority::Modulo.right_operand(), Priority::Absolute);
        assert_eq!(Priority::Additive.right_operand(), Priority::Modulo);
    }

    #[test]
    fn only_logical_containers_take_booleans() {
        assert!(Priority::LogicalAnd.accepts_bool());
        assert!(!Priority::Assign.accepts_bool());
        assert!(!Priority::NumericBoundary.accepts_bool());
    }

    #[test]
    fn parenthesize_when_looser() {
        assert_eq!(
            parenthesize("a + b".into(), Priority::Additive, Priority::Multiplicative),
            "(a + b)"
        );
        assert_eq!(parenthesize("a * b".into(), Priority::Multiplicative, Priority::Additive), "a * b");
    }
}
