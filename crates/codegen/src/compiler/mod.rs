//! Python AST to Aseba compiler
//!
//! Expressions lower to a [`Lowered`] value: the Aseba expression text plus
//! the statements that must run first and the scratch slots they use.
//! Statements compile to indented blocks, with `break`, `continue` and early
//! `return` turned into flags that guard the code following them.

pub mod builtins;
pub mod context;
pub mod expr;
pub mod function;
pub mod stmt;

pub use context::{CompilationContext, Resolved, Scope, StoreTarget};
pub use expr::ExprCompiler;
pub use function::{FunctionCompiler, FunctionInfo};
pub use stmt::StmtCompiler;

use crate::block::CodeBlock;
use crate::error::CompileResult;
use crate::modules::Operand;
use crate::priority::Priority;
use crate::shape::Shape;

/// Result of lowering one expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lowered {
    /// Aseba expression text.
    pub code: String,
    /// Statements that must run before `code` is evaluated.
    pub aux: CodeBlock,
    /// First scratch slot not referenced by `code`; siblings evaluated later
    /// start here.
    pub tmp_req: usize,
    pub is_bool: bool,
    pub priority: Priority,
    pub shape: Shape,
    /// `aux` may write user-visible variables.
    pub effects: bool,
}

impl Lowered {
    /// Side-effect free scalar with no auxiliary code.
    pub fn atom(code: impl Into<String>, tmp: usize) -> Self {
        Lowered {
            code: code.into(),
            aux: CodeBlock::new(),
            tmp_req: tmp,
            is_bool: false,
            priority: Priority::Atom,
            shape: Shape::Scalar,
            effects: false,
        }
    }

    pub fn literal(value: i64, tmp: usize) -> Self {
        let mut lowered = Lowered::atom(value.to_string(), tmp);
        if value < 0 {
            lowered.priority = Priority::UnaryMinus;
        }
        lowered
    }

    pub fn scratch(slot: usize, tmp: usize) -> Self {
        Lowered::atom(format!("_tmp[{}]", slot), tmp.max(slot + 1))
    }

    /// Integer literals and scratch slots keep their value whatever code
    /// runs between their evaluation and their use.
    pub fn is_stable(&self) -> bool {
        if self.code.parse::<i64>().is_ok() {
            return true;
        }
        self.code
            .strip_prefix("_tmp[")
            .and_then(|rest| rest.strip_suffix(']'))
            .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
    }

    pub fn as_operand(&self) -> Operand {
        Operand {
            code: self.code.clone(),
            priority: self.priority,
            shape: self.shape,
        }
    }
}

/// Operands evaluated left to right.
///
/// When a later operand runs code with side effects, earlier operands that
/// read variables are first copied to scratch slots so they keep the value
/// they had when evaluated.
pub struct Sequence {
    pub items: Vec<Lowered>,
    pub aux: CodeBlock,
    /// First scratch slot free for the next operand.
    pub next: usize,
    pub effects: bool,
}

impl Sequence {
    pub fn new(tmp: usize) -> Self {
        Sequence {
            items: Vec::new(),
            aux: CodeBlock::new(),
            next: tmp,
            effects: false,
        }
    }

    /// Lower the next operand with `lower(cx, offset)` and append it.
    pub fn push<'a, F>(&mut self, cx: &mut CompilationContext<'a>, lower: F) -> CompileResult<()>
    where
        F: FnOnce(&mut CompilationContext<'a>, usize) -> CompileResult<Lowered>,
    {
        let unstable: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_stable() && !item.shape.is_array())
            .map(|(index, _)| index)
            .collect();
        let reserved = unstable.len();
        let item = lower(cx, self.next + reserved)?;
        if item.effects && reserved > 0 {
            for (k, &index) in unstable.iter().enumerate() {
                let slot = self.next + k;
                self.aux
                    .line(format!("_tmp[{}] = {}", slot, self.items[index].code));
                let spilled = Lowered::scratch(slot, slot + 1);
                let previous = &mut self.items[index];
                previous.code = spilled.code;
                previous.priority = Priority::Atom;
            }
        }
        self.add(item);
        Ok(())
    }

    /// Append an operand lowered by the caller.
    pub fn add(&mut self, item: Lowered) {
        self.aux.append(item.aux.as_str());
        self.next = self.next.max(item.tmp_req);
        self.effects |= item.effects;
        self.items.push(Lowered {
            aux: CodeBlock::new(),
            ..item
        });
    }
}

/// Abrupt exits a statement may take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flow {
    pub brk: bool,
    pub cont: bool,
    pub ret: bool,
}

impl Flow {
    pub fn any(self) -> bool {
        self.brk || self.cont || self.ret
    }

    pub fn union(self, other: Flow) -> Flow {
        Flow {
            brk: self.brk || other.brk,
            cont: self.cont || other.cont,
            ret: self.ret || other.ret,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_codes() {
        assert!(Lowered::atom("12", 0).is_stable());
        assert!(Lowered::literal(-3, 0).is_stable());
        assert!(Lowered::scratch(4, 0).is_stable());
        assert!(!Lowered::atom("x", 0).is_stable());
        assert!(!Lowered::atom("_tmp[i]", 0).is_stable());
    }

    #[test]
    fn scratch_raises_requirement() {
        assert_eq!(Lowered::scratch(4, 0).tmp_req, 5);
        assert_eq!(Lowered::scratch(1, 6).tmp_req, 6);
    }

    #[test]
    fn flows_combine() {
        let flow = Flow { brk: true, ..Flow::default() }.union(Flow { ret: true, ..Flow::default() });
        assert!(flow.brk && flow.ret && !flow.cont);
        assert!(!Flow::default().any());
    }
}
