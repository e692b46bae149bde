//! Importable modules: named constants, robot variable aliases and native
//! function emitters.
//!
//! A module is plain data plus a table of [`Emitter`]s. Emitters see the
//! compiler only through an [`EmitScope`], which hands out scratch slots and
//! reports errors at the call site.

pub mod clock;
pub mod registry;
pub mod thymio;

use crate::block::CodeBlock;
use crate::error::{CompileError, CompileResult, Location};
use crate::priority::Priority;
use crate::shape::Shape;
use indexmap::IndexMap;

pub use registry::{ModuleBinding, ModuleRegistry};

/// How an emitter wants one argument delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Any scalar expression.
    Value,
    /// A variable, array or array element the native reads or writes in
    /// place.
    Array,
}

/// A lowered call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub code: String,
    pub priority: Priority,
    pub shape: Shape,
}

impl Operand {
    /// Identifiers, literals and scratch slots can be passed to natives as is.
    pub fn is_simple(&self) -> bool {
        self.priority == Priority::Atom && !self.code.starts_with('[')
    }
}

/// Value produced by an emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedValue {
    pub code: String,
    pub priority: Priority,
}

/// Statements to run before the value is used, and the value itself if the
/// function returns one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emission {
    pub aux: CodeBlock,
    pub value: Option<EmittedValue>,
}

/// Capabilities an emitter gets from the call site.
pub struct EmitScope<'s> {
    function: &'s str,
    location: Location,
    next_scratch: usize,
}

impl<'s> EmitScope<'s> {
    pub fn new(function: &'s str, location: Location, first_scratch: usize) -> Self {
        EmitScope {
            function,
            location,
            next_scratch: first_scratch,
        }
    }

    pub fn function(&self) -> &str {
        self.function
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Reserve a fresh `_tmp` slot.
    pub fn scratch(&mut self) -> String {
        let slot = self.next_scratch;
        self.next_scratch += 1;
        format!("_tmp[{}]", slot)
    }

    /// First slot not handed out.
    pub fn next_scratch(&self) -> usize {
        self.next_scratch
    }

    /// Code for `operand` usable as a native argument, spilling complex
    /// expressions into a scratch slot.
    pub fn simple(&mut self, operand: &Operand, aux: &mut CodeBlock) -> String {
        if operand.is_simple() {
            operand.code.clone()
        } else {
            let slot = self.scratch();
            aux.line(format!("{} = {}", slot, operand.code));
            slot
        }
    }

    /// All array operands must have the same number of cells.
    pub fn require_same_size(&self, operands: &[&Operand]) -> CompileResult<()> {
        let Some(first) = operands.first() else {
            return Ok(());
        };
        for operand in &operands[1..] {
            if operand.shape.cells() != first.shape.cells() {
                return Err(CompileError::size(
                    operand.code.clone(),
                    first.shape.cells(),
                    operand.shape.cells(),
                    self.location,
                ));
            }
        }
        Ok(())
    }

    pub fn unsupported(&self, kind: impl Into<String>) -> CompileError {
        CompileError::unsupported(kind, self.location)
    }
}

/// Code generator for one module function.
pub trait Emitter: Send + Sync {
    /// Kind of each parameter; the call must supply exactly this many.
    fn params(&self) -> &[ArgKind];

    fn emit(&self, scope: &mut EmitScope<'_>, args: &[Operand]) -> CompileResult<Emission>;
}

/// Named compile-time value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub code: String,
    pub shape: Shape,
}

/// Alias of a fixed Aseba variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub target: String,
    pub shape: Shape,
}

/// Code a module injects into the program once it is imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportHook {
    /// Event whose handler receives `preamble` before any user code.
    pub event: String,
    pub preamble: Vec<String>,
    /// Variables the preamble needs, declared ahead of user variables.
    pub hidden: IndexMap<String, Shape>,
}

pub struct Module {
    pub name: String,
    pub constants: IndexMap<String, Constant>,
    pub variables: IndexMap<String, Variable>,
    pub functions: IndexMap<String, Box<dyn Emitter>>,
    pub hook: Option<ImportHook>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            constants: IndexMap::new(),
            variables: IndexMap::new(),
            functions: IndexMap::new(),
            hook: None,
        }
    }

    pub fn constant(&mut self, name: impl Into<String>, code: impl Into<String>, shape: Shape) {
        self.constants.insert(
            name.into(),
            Constant {
                code: code.into(),
                shape,
            },
        );
    }

    pub fn variable(&mut self, name: impl Into<String>, target: impl Into<String>, shape: Shape) {
        self.variables.insert(
            name.into(),
            Variable {
                target: target.into(),
                shape,
            },
        );
    }

    pub fn function(&mut self, name: impl Into<String>, emitter: impl Emitter + 'static) {
        self.functions.insert(name.into(), Box::new(emitter));
    }

    pub fn with_hook(mut self, hook: ImportHook) -> Self {
        self.hook = Some(hook);
        self
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("constants", &self.constants.len())
            .field("variables", &self.variables.len())
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("hook", &self.hook)
            .finish()
    }
}

/// `call target(args)` with no result.
pub struct Procedure {
    target: &'static str,
    params: Vec<ArgKind>,
}

impl Procedure {
    pub fn new(target: &'static str, params: Vec<ArgKind>) -> Self {
        Procedure { target, params }
    }

    /// A native taking `count` scalar values.
    pub fn values(target: &'static str, count: usize) -> Self {
        Procedure::new(target, vec![ArgKind::Value; count])
    }
}

impl Emitter for Procedure {
    fn params(&self) -> &[ArgKind] {
        &self.params
    }

    fn emit(&self, scope: &mut EmitScope<'_>, args: &[Operand]) -> CompileResult<Emission> {
        let mut aux = CodeBlock::new();
        let arrays: Vec<&Operand> = args
            .iter()
            .zip(&self.params)
            .filter(|(_, kind)| **kind == ArgKind::Array)
            .map(|(arg, _)| arg)
            .collect();
        scope.require_same_size(&arrays)?;
        let mut codes = Vec::with_capacity(args.len());
        for arg in args {
            codes.push(scope.simple(arg, &mut aux));
        }
        aux.line(format!("call {}({})", self.target, codes.join(", ")));
        Ok(Emission { aux, value: None })
    }
}

/// `call target(_tmp[k], args)` whose first argument receives the result.
pub struct NativeFunction {
    target: &'static str,
    params: Vec<ArgKind>,
}

impl NativeFunction {
    pub fn values(target: &'static str, count: usize) -> Self {
        NativeFunction {
            target,
            params: vec![ArgKind::Value; count],
        }
    }
}

impl Emitter for NativeFunction {
    fn params(&self) -> &[ArgKind] {
        &self.params
    }

    fn emit(&self, scope: &mut EmitScope<'_>, args: &[Operand]) -> CompileResult<Emission> {
        let mut aux = CodeBlock::new();
        let mut codes = Vec::with_capacity(args.len() + 1);
        for arg in args {
            codes.push(scope.simple(arg, &mut aux));
        }
        let result = scope.scratch();
        codes.insert(0, result.clone());
        aux.line(format!("call {}({})", self.target, codes.join(", ")));
        Ok(Emission {
            aux,
            value: Some(EmittedValue {
                code: result,
                priority: Priority::Atom,
            }),
        })
    }
}

/// Fixed expression over module state.
pub struct Inline {
    code: &'static str,
    priority: Priority,
}

impl Inline {
    pub const fn new(code: &'static str, priority: Priority) -> Self {
        Inline { code, priority }
    }
}

impl Emitter for Inline {
    fn params(&self) -> &[ArgKind] {
        &[]
    }

    fn emit(&self, _scope: &mut EmitScope<'_>, _args: &[Operand]) -> CompileResult<Emission> {
        Ok(Emission {
            aux: CodeBlock::new(),
            value: Some(EmittedValue {
                code: self.code.to_string(),
                priority: self.priority,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operand(code: &str, priority: Priority, shape: Shape) -> Operand {
        Operand {
            code: code.to_string(),
            priority,
            shape,
        }
    }

    #[test]
    fn procedure_spills_complex_arguments() {
        let native = Procedure::values("leds.top", 3);
        let mut scope = EmitScope::new("leds_top", Location::default(), 2);
        let args = [
            operand("32", Priority::Atom, Shape::Scalar),
            operand("x + 1", Priority::Additive, Shape::Scalar),
            operand("0", Priority::Atom, Shape::Scalar),
        ];
        let emission = native.emit(&mut scope, &args).unwrap();
        assert_eq!(
            emission.aux.as_str(),
            "_tmp[2] = x + 1\ncall leds.top(32, _tmp[2], 0)\n"
        );
        assert!(emission.value.is_none());
        assert_eq!(scope.next_scratch(), 3);
    }

    #[test]
    fn native_function_returns_scratch_slot() {
        let native = NativeFunction::values("math.min", 2);
        let mut scope = EmitScope::new("math_min", Location::default(), 0);
        let args = [
            operand("a", Priority::Atom, Shape::Scalar),
            operand("b", Priority::Atom, Shape::Scalar),
        ];
        let emission = native.emit(&mut scope, &args).unwrap();
        assert_eq!(emission.aux.as_str(), "call math.min(_tmp[0], a, b)\n");
        assert_eq!(emission.value.unwrap().code, "_tmp[0]");
    }

    #[test]
    fn array_arguments_must_agree() {
        let native = Procedure::new("math.copy", vec![ArgKind::Array, ArgKind::Array]);
        let mut scope = EmitScope::new("nf_math_copy", Location::default(), 0);
        let args = [
            operand("a", Priority::Atom, Shape::Array(3)),
            operand("b", Priority::Atom, Shape::Array(4)),
        ];
        let error = native.emit(&mut scope, &args).unwrap_err();
        assert!(matches!(error, CompileError::IncompatibleSize { expected: 3, got: 4, .. }));
    }
}
