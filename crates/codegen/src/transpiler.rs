//! Whole-program translation.
//!
//! A program is split into initialization code (every top-level statement
//! that is not a definition or an import), plain functions, and functions
//! decorated with `@onevent`. Functions are only scanned up front; their
//! bodies are expanded wherever they are called. The output is assembled
//! as declarations, then initialization code, then one `onevent` block per
//! handled event, each section separated by a blank line.

use crate::adapter::{Locator, dotted_name, string_constant};
use crate::block::{CodeBlock, scratch_references};
use crate::compiler::context::{ReturnTarget, SCRATCH};
use crate::compiler::function::check_recursion;
use crate::compiler::{CompilationContext, FunctionInfo, Scope, StmtCompiler};
use crate::error::{CompileError, CompileResult, Location};
use crate::metadata::Metadata;
use crate::modules::{Module, ModuleRegistry, thymio};
use crate::names::{from_python_name, is_valid_identifier, local_name};
use crate::shape::Shape;
use aspy_parser::ast::*;
use aspy_parser::error::{Diagnostic, ParseError, Severity, Warning, WarningCollector, WarningKind};
use aspy_parser::visitor::walk;
use aspy_parser::{Arena, Visitor, parse};
use indexmap::{IndexMap, IndexSet};

/// Decorator marking a function as an event handler.
pub const EVENT_DECORATOR: &str = "onevent";

/// Number of words in `event.args`, the payload buffer of custom events.
const EVENT_ARGS: usize = 32;

/// Configuration for a [`Transpiler`].
#[derive(Debug, Clone)]
pub struct TranspilerConfig {
    /// Source parsed in front of the program, typically `from thymio import *`.
    /// Reported locations skip its lines.
    pub preamble: String,
    /// Behave as if the program started with `from thymio import *`.
    pub import_robot: bool,
    /// Indentation unit of nested blocks
    pub indent: String,
    /// Collect shadowing and unused-function warnings while translating
    pub collect_warnings: bool,
}

impl TranspilerConfig {
    pub fn new() -> Self {
        TranspilerConfig {
            preamble: String::new(),
            import_robot: false,
            indent: "\t".to_string(),
            collect_warnings: true,
        }
    }

    /// No implicit import and no warnings.
    pub fn bare() -> Self {
        TranspilerConfig {
            collect_warnings: false,
            ..Self::new()
        }
    }

    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    pub fn with_robot_import(mut self, import_robot: bool) -> Self {
        self.import_robot = import_robot;
        self
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_warnings(mut self, collect_warnings: bool) -> Self {
        self.collect_warnings = collect_warnings;
        self
    }
}

impl Default for TranspilerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Translates one program at a time.
///
/// ```
/// use aspy_codegen::Transpiler;
///
/// let mut transpiler = Transpiler::new();
/// transpiler.set_source("a = [1, 2, 3]\n");
/// transpiler.transpile().unwrap();
/// assert_eq!(transpiler.get_output(), Some("var a[3]\n\na = [1, 2, 3]\n"));
/// ```
#[derive(Debug)]
pub struct Transpiler {
    config: TranspilerConfig,
    registry: ModuleRegistry,
    source: String,
    output: Option<String>,
    metadata: Metadata,
    warnings: Vec<Warning>,
    locator: Option<Locator>,
}

impl Transpiler {
    /// Transpiler with the robot and clock modules registered.
    pub fn new() -> Self {
        Self::with_config(TranspilerConfig::new())
    }

    pub fn with_config(config: TranspilerConfig) -> Self {
        Transpiler {
            config,
            registry: ModuleRegistry::new(),
            source: String::new(),
            output: None,
            metadata: Metadata::default(),
            warnings: Vec::new(),
            locator: None,
        }
    }

    pub fn config(&self) -> &TranspilerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Make `module` importable. Registering a name twice keeps the first
    /// module and returns `false`.
    pub fn register_module(&mut self, module: Module) -> bool {
        self.registry.register(module)
    }

    /// Replace the program, discarding the previous translation.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into().replace("\r\n", "\n");
        self.output = None;
        self.metadata = Metadata::default();
        self.warnings.clear();
        self.locator = None;
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn transpile(&mut self) -> CompileResult<()> {
        self.output = None;
        self.metadata = Metadata::default();
        self.warnings.clear();

        let (text, skipped) = self.full_text();
        let locator = Locator::new(&text, skipped);
        let result = translate(&self.registry, &self.config, &text, &locator);
        self.locator = Some(locator);
        let translation = result?;
        self.output = Some(translation.output);
        self.metadata = translation.metadata;
        self.warnings = translation.warnings;
        Ok(())
    }

    /// Aseba source of the last successful translation.
    pub fn get_output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Warnings of the last translation, located in the user's source.
    pub fn warning_diagnostics(&self) -> Vec<Diagnostic> {
        let Some(locator) = &self.locator else {
            return Vec::new();
        };
        self.warnings
            .iter()
            .map(|warning| {
                Diagnostic::new(Severity::Warning, warning.kind.format_message())
                    .with_code(warning.kind.code())
                    .at(locator.location(warning.span))
            })
            .collect()
    }

    /// Preamble and program as parsed, with the number of preamble lines.
    fn full_text(&self) -> (String, u32) {
        let mut preamble = self.config.preamble.replace("\r\n", "\n");
        if !preamble.is_empty() && !preamble.ends_with('\n') {
            preamble.push('\n');
        }
        let skipped = preamble.matches('\n').count() as u32;
        (preamble + &self.source, skipped)
    }
}

impl Default for Transpiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate `source` with the robot module imported implicitly.
pub fn simple_transpile(source: &str) -> CompileResult<String> {
    let mut transpiler = Transpiler::with_config(TranspilerConfig::bare().with_robot_import(true));
    transpiler.set_source(source);
    transpiler.transpile()?;
    Ok(transpiler.output.unwrap_or_default())
}

/// Local names of each function, handlers included, that hide a robot
/// variable or a top-level variable because they lack a `global`
/// declaration.
pub fn missing_globals(transpiler: &Transpiler) -> CompileResult<IndexMap<String, IndexSet<String>>> {
    let (text, skipped) = transpiler.full_text();
    let locator = Locator::new(&text, skipped);
    let arena = Arena::new();
    let module = parse(&text, &arena).map_err(|error| syntax_error(error, &locator))?;
    let mut cx = CompilationContext::new(&transpiler.registry, &locator, &transpiler.config.indent);
    let program = Program::prepare(&mut cx, module.body, transpiler.config.import_robot)?;

    let mut missing: IndexMap<String, IndexSet<String>> = IndexMap::new();
    for warning in program.shadowing(&cx).into_vec() {
        match warning.kind {
            WarningKind::ShadowsRobotVariable { function, name } | WarningKind::ShadowsGlobal { function, name } => {
                missing.entry(function).or_default().insert(name);
            }
            WarningKind::UnusedFunction { .. } => {}
        }
    }
    Ok(missing)
}

struct Translation {
    output: String,
    metadata: Metadata,
    warnings: Vec<Warning>,
}

fn syntax_error(error: Box<ParseError>, locator: &Locator) -> CompileError {
    let location = locator.location(error.span);
    CompileError::Syntax { error, location }
}

fn translate(
    registry: &ModuleRegistry,
    config: &TranspilerConfig,
    text: &str,
    locator: &Locator,
) -> CompileResult<Translation> {
    let arena = Arena::new();
    let module = parse(text, &arena).map_err(|error| syntax_error(error, locator))?;
    let mut cx = CompilationContext::new(registry, locator, &config.indent);
    let program = Program::prepare(&mut cx, module.body, config.import_robot)?;

    let mut init = CodeBlock::new();
    for stmt in &program.init {
        let (code, _) = StmtCompiler::compile(&mut cx, stmt)?;
        init.append(code.as_str());
    }

    let mut sections = vec![init];
    for handler in &program.handlers {
        let body = handler.compile(&mut cx)?;
        sections.push(event_block(&cx, &handler.event, &body));
    }
    let hook_only: Vec<CodeBlock> = cx
        .hooks
        .keys()
        .filter(|event| !program.handlers.iter().any(|h| h.event == **event))
        .map(|event| event_block(&cx, event, &CodeBlock::new()))
        .collect();
    sections.extend(hook_only);

    let scratch = sections
        .iter()
        .flat_map(|section| scratch_references(section.as_str()))
        .max();
    let mut declarations = CodeBlock::new();
    for (name, shape) in &cx.hidden {
        declarations.line(format!("var {}{}", name, shape.declaration_suffix()));
    }
    for (name, shape) in &cx.variables {
        if !cx.hidden.contains_key(name) {
            declarations.line(format!("var {}{}", name, shape.declaration_suffix()));
        }
    }
    for name in cx.undeclared_references() {
        declarations.line(format!("var {}", name));
    }
    if let Some(last) = scratch {
        declarations.line(format!("var {}[{}]", SCRATCH, last + 1));
    }
    sections.insert(0, declarations);

    let output = sections
        .iter()
        .filter(|section| !section.is_empty())
        .map(CodeBlock::as_str)
        .collect::<Vec<_>>()
        .join("\n");

    let warnings = if config.collect_warnings {
        let mut warnings = program.shadowing(&cx);
        for (name, info) in &cx.functions {
            if !cx.inlined.contains(name) {
                warnings.warn(WarningKind::UnusedFunction { name: name.to_string() }, info.span);
            }
        }
        warnings.into_vec()
    } else {
        Vec::new()
    };

    Ok(Translation {
        output,
        metadata: std::mem::take(&mut cx.metadata),
        warnings,
    })
}

/// `onevent` block: hook code first, then the handler body.
fn event_block(cx: &CompilationContext<'_>, event: &str, body: &CodeBlock) -> CodeBlock {
    let mut inner = CodeBlock::new();
    for line in cx.hooks.get(event).into_iter().flatten() {
        inner.line(line);
    }
    inner.append(body.as_str());
    let mut block = CodeBlock::new();
    block.line(format!("onevent {}", event));
    block.nest(inner.as_str(), &cx.indent);
    block
}

/// A program once imports, functions and handlers have been sorted out.
struct Program<'a> {
    init: Vec<&'a Stmt<'a>>,
    handlers: Vec<Handler<'a>>,
}

impl<'a> Program<'a> {
    /// Apply imports, scan functions and handlers, and fill the program-wide
    /// tables of `cx` that compilation relies on.
    fn prepare(cx: &mut CompilationContext<'a>, body: &'a [Stmt<'a>], import_robot: bool) -> CompileResult<Self> {
        if import_robot {
            cx.import_star(thymio::MODULE_NAME);
        }
        let mut program = Program {
            init: Vec::new(),
            handlers: Vec::new(),
        };
        for stmt in body {
            match stmt {
                Stmt::Import(import) => import_modules(cx, import)?,
                Stmt::From(from) => import_from(cx, from)?,
                Stmt::FuncDef(def) => match event_decorator(cx, def)? {
                    Some(explicit) => {
                        let handler = Handler::scan(cx, def, explicit)?;
                        if program.handlers.iter().any(|h| h.event == handler.event) {
                            return Err(CompileError::bad_event(
                                handler.event,
                                "several handlers for the same event",
                                cx.location(def.span),
                            ));
                        }
                        program.handlers.push(handler);
                    }
                    None => {
                        if cx.functions.contains_key(def.name) {
                            return Err(CompileError::unsupported(
                                format!("redefinition of function '{}'", def.name),
                                cx.location(def.span),
                            ));
                        }
                        let info = FunctionInfo::scan(def, cx.locator)?;
                        cx.functions.insert(def.name, info);
                    }
                },
                other => program.init.push(other),
            }
        }

        let mut globals = GlobalScan::default();
        for stmt in &program.init {
            globals.visit_stmt(stmt);
        }
        let declared = cx
            .functions
            .values()
            .chain(program.handlers.iter().map(|h| &h.info))
            .flat_map(|info| {
                info.assigned
                    .keys()
                    .copied()
                    .filter(move |name| info.declared_globals.contains(name))
            });
        globals.names.extend(declared);
        for name in globals.names {
            if !cx.is_fixed_variable(name) {
                cx.globals.insert(name);
            }
        }

        check_recursion(&cx.functions, cx.locator)?;

        let mut prints = PrintScan::default();
        for stmt in body {
            prints.visit_stmt(stmt);
        }
        cx.print_width = prints.width;
        Ok(program)
    }

    /// Function locals that hide a robot or top-level variable.
    fn shadowing(&self, cx: &CompilationContext<'a>) -> WarningCollector {
        let mut warnings = WarningCollector::new();
        let infos = cx.functions.values().chain(self.handlers.iter().map(|h| &h.info));
        for info in infos {
            for (&name, &span) in &info.assigned {
                if info.declared_globals.contains(name) || info.is_param(name) {
                    continue;
                }
                let function = info.name.to_string();
                if cx.globals.contains(name) {
                    warnings.warn(
                        WarningKind::ShadowsGlobal {
                            function,
                            name: name.to_string(),
                        },
                        span,
                    );
                } else if cx.is_fixed_variable(name) {
                    warnings.warn(
                        WarningKind::ShadowsRobotVariable {
                            function,
                            name: name.to_string(),
                        },
                        span,
                    );
                }
            }
        }
        warnings
    }
}

fn import_modules(cx: &mut CompilationContext<'_>, import: &ImportStmt<'_>) -> CompileResult<()> {
    let location = cx.location(import.span);
    for &(name, alias) in import.names {
        if !cx.registry.contains(name) {
            return Err(CompileError::unknown(name, location));
        }
        if alias.is_some() {
            return Err(CompileError::unsupported(format!("import {} as ...", name), location));
        }
        cx.import_qualified(name);
    }
    Ok(())
}

fn import_from(cx: &mut CompilationContext<'_>, from: &FromStmt<'_>) -> CompileResult<()> {
    let location = cx.location(from.span);
    let module = match from.module {
        Some(module) if from.level == 0 => module,
        _ => return Err(CompileError::unsupported("relative import", location)),
    };
    if !cx.registry.contains(module) {
        return Err(CompileError::unknown(module, location));
    }
    match from.names {
        [("*", None)] => {
            cx.import_star(module);
            Ok(())
        }
        _ => Err(CompileError::unsupported(
            format!("from {} import <names>; use 'from {} import *'", module, module),
            location,
        )),
    }
}

/// `None` for plain functions, `Some(name)` for `@onevent("name")` and
/// `Some(None)` for `@onevent`.
fn event_decorator<'a>(cx: &CompilationContext<'a>, def: &FuncDefStmt<'a>) -> CompileResult<Option<Option<&'a str>>> {
    let bad = |message: String, location: Location| CompileError::BadDecorator { message, location };
    match def.decorators {
        [] => Ok(None),
        [Expr::Name(name)] if name.id == EVENT_DECORATOR => Ok(Some(None)),
        [Expr::Call(call)] if matches!(call.func, Expr::Name(name) if name.id == EVENT_DECORATOR) => {
            match (call.args, call.keywords) {
                ([arg], []) => match string_constant(arg) {
                    Some(event) => Ok(Some(Some(event))),
                    None => Err(bad(
                        "@onevent takes the event name as a string literal".to_string(),
                        cx.location(arg.span()),
                    )),
                },
                _ => Err(bad(
                    "@onevent takes at most one argument, the event name".to_string(),
                    cx.location(call.span),
                )),
            }
        }
        [decorator] => {
            let name = match decorator {
                Expr::Call(call) => dotted_name(call.func),
                other => dotted_name(other),
            };
            Err(bad(
                format!("unknown decorator '@{}'", name.as_deref().unwrap_or(decorator.kind_name())),
                cx.location(decorator.span()),
            ))
        }
        [_, second, ..] => Err(bad(
            format!("{}() has several decorators", def.name),
            cx.location(second.span()),
        )),
    }
}

/// Event handled by a function: a robot event when the name (or its dotted
/// Aseba form) is one, a custom event otherwise.
fn event_name(function: &str, explicit: Option<&str>, location: Location) -> CompileResult<(String, bool)> {
    let name = explicit.unwrap_or(function);
    let dotted = from_python_name(name);
    for candidate in [name, dotted.as_str()] {
        if thymio::is_robot_event(candidate) {
            return Ok((candidate.to_string(), false));
        }
    }
    if thymio::is_robot_event_family(name) || thymio::is_robot_event_family(&dotted) {
        return Err(CompileError::bad_event(name, "no such robot event", location));
    }
    if name.contains('.') || name.starts_with('_') || !is_valid_identifier(name) {
        return Err(CompileError::bad_event(name, "not a valid event name", location));
    }
    Ok((name.to_string(), true))
}

struct Handler<'a> {
    event: String,
    /// Raised by the host rather than the firmware; parameters are read
    /// from `event.args`.
    custom: bool,
    info: FunctionInfo<'a>,
}

impl<'a> Handler<'a> {
    fn scan(cx: &CompilationContext<'a>, def: &'a FuncDefStmt<'a>, explicit: Option<&'a str>) -> CompileResult<Self> {
        let location = cx.location(def.span);
        let (event, custom) = event_name(def.name, explicit, location)?;
        let info = FunctionInfo::scan(def, cx.locator)?;
        if !custom && !info.params.is_empty() {
            return Err(CompileError::bad_event(event, "robot events carry no arguments", location));
        }
        if info.params.len() > EVENT_ARGS {
            return Err(CompileError::bad_event(
                event,
                format!("at most {} arguments", EVENT_ARGS),
                location,
            ));
        }
        Ok(Handler { event, custom, info })
    }

    fn compile(&self, cx: &mut CompilationContext<'a>) -> CompileResult<CodeBlock> {
        let info = &self.info;
        let mut code = CodeBlock::new();
        if self.custom {
            cx.metadata.events_in.insert(self.event.clone(), info.params.len());
            for (index, param) in info.params.iter().enumerate() {
                let target = local_name(info.name, param.name);
                cx.declare(&target, Shape::Scalar, param.name, param.span)?;
                code.line(format!("{} = event.args[{}]", target, index));
            }
        }

        let flag = info.needs_ret_flag.then_some(0);
        if let Some(flag) = flag {
            code.line(format!("{}[{}] = 0", SCRATCH, flag));
        }
        let ret = ReturnTarget {
            slot: None,
            flag,
            shape: None,
        };
        cx.scopes.push(Scope::function(info, usize::from(flag.is_some()), ret));
        let body = StmtCompiler::block(cx, info.def.body);
        cx.scopes.pop();
        code.append(body?.0.as_str());
        Ok(code)
    }
}

/// Names assigned by top-level code.
#[derive(Default)]
struct GlobalScan<'a> {
    names: IndexSet<&'a str>,
}

impl<'a> GlobalScan<'a> {
    fn target(&mut self, target: &Expr<'a>) {
        match target {
            Expr::Name(name) => {
                self.names.insert(name.id);
            }
            Expr::Tuple(TupleExpr { elts, .. }) | Expr::List(ListExpr { elts, .. }) => {
                for elt in elts.iter() {
                    self.target(elt);
                }
            }
            _ => {}
        }
    }
}

impl<'a> Visitor<'a> for GlobalScan<'a> {
    fn visit_stmt(&mut self, stmt: &Stmt<'a>) {
        match stmt {
            Stmt::Assign(assign) => {
                for target in assign.targets {
                    self.target(target);
                }
            }
            Stmt::AugAssign(aug) => self.target(&aug.target),
            Stmt::AnnAssign(ann) => self.target(&ann.target),
            Stmt::For(for_stmt) => self.target(&for_stmt.target),
            Stmt::FuncDef(_) | Stmt::ClassDef(_) => return,
            _ => {}
        }
        walk::walk_stmt(self, stmt);
    }
}

/// Largest number of values passed to a single `print()`.
#[derive(Default)]
struct PrintScan {
    width: usize,
}

impl<'a> Visitor<'a> for PrintScan {
    fn visit_expr(&mut self, expr: &Expr<'a>) {
        if let Expr::Call(call) = expr
            && matches!(call.func, Expr::Name(name) if name.id == "print")
        {
            let values = call.args.iter().filter(|arg| string_constant(arg).is_none()).count();
            self.width = self.width.max(values);
        }
        walk::walk_expr(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names() {
        let at = Location { line: 1, column: 1 };
        assert_eq!(event_name("button_forward", None, at).unwrap(), ("button.forward".to_string(), false));
        assert_eq!(event_name("f", Some("timer0"), at).unwrap(), ("timer0".to_string(), false));
        assert_eq!(event_name("ping", None, at).unwrap(), ("ping".to_string(), true));
        assert!(matches!(event_name("button_up", None, at), Err(CompileError::BadEvent { .. })));
        assert!(matches!(event_name("_hidden", None, at), Err(CompileError::BadEvent { .. })));
    }

    #[test]
    fn preamble_lines_are_not_counted() {
        let mut transpiler =
            Transpiler::with_config(TranspilerConfig::new().with_preamble("from thymio import *"));
        transpiler.set_source("a = 1\nb = c\n");
        let error = transpiler.transpile().unwrap_err();
        assert!(matches!(error, CompileError::UnknownName { ref name, .. } if name == "c"));
        assert_eq!(error.location().line, 2);
    }

    #[test]
    fn config_builders() {
        let config = TranspilerConfig::bare().with_indent("    ").with_robot_import(true);
        assert!(!config.collect_warnings);
        assert!(config.import_robot);
        assert_eq!(config.indent, "    ");
    }
}
