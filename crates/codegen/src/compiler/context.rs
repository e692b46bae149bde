//! Compilation context holding state while a program is translated.
//!
//! One [`CompilationContext`] lives for a whole translation. It owns the
//! program-wide tables (declared variables, events, print formats, hooks)
//! and a stack of [`Scope`]s, one per function body being compiled. Inlined
//! calls push a scope on entry and pop it on exit.

use super::function::FunctionInfo;
use crate::adapter::Locator;
use crate::error::{CompileError, CompileResult, Location};
use crate::metadata::{Metadata, PrintFormat};
use crate::modules::{ModuleBinding, ModuleRegistry};
use crate::names::{is_keyword, local_name};
use crate::shape::Shape;
use indexmap::{IndexMap, IndexSet};
use text_size::TextRange;

/// Name reserved for the scratch array.
pub const SCRATCH: &str = "_tmp";

/// Where `return` inside the current body writes to.
#[derive(Debug, Clone, Default)]
pub struct ReturnTarget {
    /// Scratch slot receiving scalar results. `None` in event handlers.
    pub slot: Option<usize>,
    /// Flag set once a `return` has run, when later code must be skipped.
    pub flag: Option<usize>,
    /// Shape of the value returned so far.
    pub shape: Option<Shape>,
}

/// Flags of the innermost loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopFlags {
    pub brk: Option<usize>,
    pub cont: Option<usize>,
}

/// Per-body compilation state.
#[derive(Debug, Clone, Default)]
pub struct Scope<'a> {
    /// Function or handler whose body this is; `None` at top level.
    pub function: Option<&'a str>,
    pub locals: IndexSet<&'a str>,
    pub declared_globals: IndexSet<&'a str>,
    pub ret: ReturnTarget,
    pub loops: Vec<LoopFlags>,
    /// First scratch slot free for the next statement.
    pub base: usize,
}

impl<'a> Scope<'a> {
    pub fn top_level() -> Self {
        Self::default()
    }

    pub fn function(info: &FunctionInfo<'a>, base: usize, ret: ReturnTarget) -> Self {
        Scope {
            function: Some(info.name),
            locals: info.locals.clone(),
            declared_globals: info.declared_globals.clone(),
            ret,
            loops: Vec::new(),
            base,
        }
    }

    fn local(&self, name: &str) -> Option<&'a str> {
        let function = self.function?;
        if self.locals.contains(name) && !self.declared_globals.contains(name) {
            Some(function)
        } else {
            None
        }
    }
}

/// A name resolved for reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Variable { target: String, shape: Shape },
    Constant { code: String, shape: Shape },
}

/// A name resolved for writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreTarget {
    pub target: String,
    /// Shape imposed by the firmware or a module; `None` for user variables.
    pub fixed: Option<Shape>,
}

pub struct CompilationContext<'a> {
    pub registry: &'a ModuleRegistry,
    pub locator: &'a Locator,
    pub indent: String,
    pub star_imports: Vec<String>,
    pub qualified_imports: Vec<String>,
    applied_hooks: IndexSet<String>,
    pub functions: IndexMap<&'a str, FunctionInfo<'a>>,
    /// Python names of user variables living at top level.
    pub globals: IndexSet<&'a str>,
    /// Declared Aseba variables in first-assignment order.
    pub variables: IndexMap<String, Shape>,
    /// Variables read before any assignment was compiled, with the first
    /// read. Such reads assume a scalar.
    referenced: IndexMap<String, TextRange>,
    /// Variables required by module hooks.
    pub hidden: IndexMap<String, Shape>,
    /// Hook code per event, in import order.
    pub hooks: IndexMap<String, Vec<String>>,
    pub metadata: Metadata,
    /// Number of values every `_print` event carries.
    pub print_width: usize,
    pub scopes: Vec<Scope<'a>>,
    /// Functions currently being inlined, outermost first.
    pub inlining: Vec<&'a str>,
    /// Functions expanded at least once.
    pub inlined: IndexSet<&'a str>,
}

impl<'a> CompilationContext<'a> {
    pub fn new(registry: &'a ModuleRegistry, locator: &'a Locator, indent: &str) -> Self {
        CompilationContext {
            registry,
            locator,
            indent: indent.to_string(),
            star_imports: Vec::new(),
            qualified_imports: Vec::new(),
            applied_hooks: IndexSet::new(),
            functions: IndexMap::new(),
            globals: IndexSet::new(),
            variables: IndexMap::new(),
            referenced: IndexMap::new(),
            hidden: IndexMap::new(),
            hooks: IndexMap::new(),
            metadata: Metadata::default(),
            print_width: 0,
            scopes: vec![Scope::top_level()],
            inlining: Vec::new(),
            inlined: IndexSet::new(),
        }
    }

    pub fn location(&self, span: TextRange) -> Location {
        self.locator.location(span)
    }

    pub fn scope(&self) -> &Scope<'a> {
        // The top-level scope is pushed at construction and never popped.
        &self.scopes[self.scopes.len() - 1]
    }

    pub fn scope_mut(&mut self) -> &mut Scope<'a> {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Reserve a scratch slot for the rest of the current construct.
    pub fn reserve_slot(&mut self) -> usize {
        let scope = self.scope_mut();
        let slot = scope.base;
        scope.base += 1;
        slot
    }

    /// Record `module` as imported with `from module import *`.
    pub fn import_star(&mut self, module: &str) {
        if !self.star_imports.iter().any(|m| m == module) {
            self.star_imports.push(module.to_string());
        }
        self.apply_hook(module);
    }

    /// Record `module` as imported with `import module`.
    pub fn import_qualified(&mut self, module: &str) {
        if !self.qualified_imports.iter().any(|m| m == module) {
            self.qualified_imports.push(module.to_string());
        }
        self.apply_hook(module);
    }

    fn apply_hook(&mut self, module: &str) {
        if !self.applied_hooks.insert(module.to_string()) {
            return;
        }
        let Some(hook) = self.registry.get(module).and_then(|m| m.hook.as_ref()) else {
            return;
        };
        for (name, shape) in &hook.hidden {
            self.hidden.insert(name.clone(), *shape);
        }
        self.hooks
            .entry(hook.event.clone())
            .or_default()
            .extend(hook.preamble.iter().cloned());
    }

    pub fn module_binding(&self, name: &str) -> ModuleBinding<'a> {
        self.registry
            .resolve(name, &self.star_imports, &self.qualified_imports)
    }

    /// True when assigning `name` at top level writes a module or robot
    /// variable rather than creating a user variable.
    pub fn is_fixed_variable(&self, name: &str) -> bool {
        matches!(
            self.module_binding(name),
            ModuleBinding::Variable(_) | ModuleBinding::Robot(_)
        )
    }

    /// Resolve `name` for reading: function local, top-level variable,
    /// module member, robot variable.
    pub fn resolve_load(&mut self, name: &str, span: TextRange) -> CompileResult<Resolved> {
        if let Some(function) = self.scope().local(name) {
            let target = local_name(function, name);
            return Ok(self.user_variable(target, span));
        }
        if self.globals.contains(name) {
            return Ok(self.user_variable(name.to_string(), span));
        }
        match self.module_binding(name) {
            ModuleBinding::Constant(constant) => Ok(Resolved::Constant {
                code: constant.code.clone(),
                shape: constant.shape,
            }),
            ModuleBinding::Variable(variable) => Ok(Resolved::Variable {
                target: variable.target.clone(),
                shape: variable.shape,
            }),
            ModuleBinding::Robot(variable) => Ok(Resolved::Variable {
                target: variable.target,
                shape: variable.shape,
            }),
            ModuleBinding::Unknown => Err(CompileError::unknown(name, self.location(span))),
        }
    }

    fn user_variable(&mut self, target: String, span: TextRange) -> Resolved {
        let shape = match self.variables.get(&target) {
            Some(shape) => *shape,
            None => {
                self.referenced.entry(target.clone()).or_insert(span);
                Shape::Scalar
            }
        };
        Resolved::Variable { target, shape }
    }

    /// Resolve `name` for writing.
    pub fn resolve_store(&self, name: &str, span: TextRange) -> CompileResult<StoreTarget> {
        let location = self.location(span);
        if name == SCRATCH {
            return Err(CompileError::unsupported(
                format!("assignment to reserved name '{}'", SCRATCH),
                location,
            ));
        }
        if let Some(function) = self.scope().local(name) {
            return Ok(StoreTarget {
                target: local_name(function, name),
                fixed: None,
            });
        }
        if self.globals.contains(name) {
            if is_keyword(name) {
                return Err(CompileError::unsupported(
                    format!("variable named after the Aseba keyword '{}'", name),
                    location,
                ));
            }
            return Ok(StoreTarget {
                target: name.to_string(),
                fixed: None,
            });
        }
        match self.module_binding(name) {
            ModuleBinding::Variable(variable) => Ok(StoreTarget {
                target: variable.target.clone(),
                fixed: Some(variable.shape),
            }),
            ModuleBinding::Robot(variable) => Ok(StoreTarget {
                target: variable.target,
                fixed: Some(variable.shape),
            }),
            ModuleBinding::Constant(_) => Err(CompileError::unsupported(
                format!("assignment to module constant '{}'", name),
                location,
            )),
            ModuleBinding::Unknown => Err(CompileError::internal(
                format!("'{}' was not found by the variable scan", name),
                location,
            )),
        }
    }

    /// Declare `target` with `shape`, or check it against an earlier
    /// declaration. `name` is the Python spelling used in errors.
    ///
    /// A variable already read as a scalar, in code compiled before its
    /// first assignment, cannot be declared as an array.
    pub fn declare(&mut self, target: &str, shape: Shape, name: &str, span: TextRange) -> CompileResult<()> {
        match self.variables.get(target) {
            Some(existing) if *existing != shape => Err(CompileError::size(
                name,
                existing.cells(),
                shape.cells(),
                self.location(span),
            )),
            Some(_) => Ok(()),
            None if shape.is_array() && self.referenced.contains_key(target) => Err(CompileError::size(
                name,
                Shape::Scalar.cells(),
                shape.cells(),
                self.location(span),
            )),
            None => {
                self.variables.insert(target.to_string(), shape);
                Ok(())
            }
        }
    }

    /// Variables read somewhere but never assigned by compiled code.
    pub fn undeclared_references(&self) -> impl Iterator<Item = &str> {
        self.referenced
            .keys()
            .filter(|name| !self.variables.contains_key(*name))
            .map(String::as_str)
    }

    /// Index of `format` in the print table, adding it if new.
    pub fn print_format(&mut self, format: String, arity: usize) -> usize {
        let formats = &mut self.metadata.print_formats;
        if let Some(index) = formats.iter().position(|f| f.format == format) {
            return index;
        }
        formats.push(PrintFormat { format, arity });
        formats.len() - 1
    }

    /// Record an outbound event, checking its payload size against earlier
    /// uses.
    pub fn emit_event(&mut self, name: &str, size: usize, span: TextRange) -> CompileResult<()> {
        match self.metadata.events_out.get(name) {
            Some(&existing) if existing != size => Err(CompileError::bad_event(
                name,
                format!("emitted with {} values, earlier with {}", size, existing),
                self.location(span),
            )),
            Some(_) => Ok(()),
            None => {
                self.metadata.events_out.insert(name.to_string(), size);
                Ok(())
            }
        }
    }
}
