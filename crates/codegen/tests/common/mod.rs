//! A small Aseba interpreter for running translated programs.
//!
//! It reads the dialect the transpiler emits and rejects what the Aseba
//! compiler would reject: statements before declarations, undeclared or
//! redeclared variables, out-of-range indices, arrays read as numbers, and
//! truth values mixed with numbers. Arithmetic wraps on 16 bits.

#![allow(dead_code)]

use aspy_codegen::modules::thymio::ROBOT_VARIABLES;
use aspy_codegen::simple_transpile;
use std::collections::{HashMap, HashSet};

const STEP_LIMIT: usize = 1_000_000;

const OPS: &[&str] = &[
    "==", "!=", "<=", ">=", "<<", ">>", "<", ">", "=", "+", "-", "*", "/", "%", "|", "^", "&", "~", "(",
    ")", "[", "]", ",", ":",
];

/// Binary arithmetic levels, loosest first.
const LEVELS: &[&[&str]] = &[&["|"], &["^"], &["&"], &["<<", ">>"], &["+", "-"], &["*", "/", "%"]];

const COMPARISONS: &[&str] = &["==", "!=", "<", "<=", ">", ">="];

/// Translate with the robot module imported, panicking on errors.
pub fn transpile(source: &str) -> String {
    match simple_transpile(source) {
        Ok(output) => output,
        Err(error) => panic!("translation failed: {error}\n--- source ---\n{source}"),
    }
}

/// Translate `source`, load it and run its initialization code.
pub fn run(source: &str) -> Vm {
    let aseba = transpile(source);
    let mut vm = match Vm::load(&aseba) {
        Ok(vm) => vm,
        Err(error) => panic!("invalid Aseba: {error}\n--- output ---\n{aseba}"),
    };
    if let Err(error) = vm.run_init() {
        panic!("run failed: {error}\n--- output ---\n{aseba}");
    }
    vm
}

// ===== Tokens =====

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Num(i64),
    Op(&'static str),
}

fn tokenize(line: &str) -> Result<Vec<Tok>, String> {
    let chars: Vec<char> = line.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
                i += 1;
            }
            out.push(Tok::Ident(chars[start..i].iter().collect()));
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            out.push(Tok::Num(text.parse().map_err(|e| format!("{e} in `{line}`"))?));
        } else {
            let rest: String = chars[i..].iter().collect();
            let op = OPS
                .iter()
                .find(|op| rest.starts_with(**op))
                .ok_or_else(|| format!("unexpected character '{c}' in `{line}`"))?;
            out.push(Tok::Op(*op));
            i += op.len();
        }
    }
    Ok(out)
}

struct Cursor {
    toks: Vec<Tok>,
    pos: usize,
    line: String,
}

impl Cursor {
    fn new(line: &str) -> Result<Self, String> {
        Ok(Cursor {
            toks: tokenize(line)?,
            pos: 0,
            line: line.to_string(),
        })
    }

    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn peek_word(&self) -> Option<&str> {
        match self.peek() {
            Some(Tok::Ident(word)) => Some(word.as_str()),
            _ => None,
        }
    }

    fn peek_op(&self) -> Option<&'static str> {
        match self.peek() {
            Some(Tok::Op(op)) => Some(*op),
            _ => None,
        }
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if self.peek_op() == Some(op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.peek_word() == Some(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_op(&mut self, op: &str) -> Result<(), String> {
        if self.eat_op(op) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{op}'")))
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<(), String> {
        if self.eat_word(word) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{word}'")))
        }
    }

    fn ident(&mut self) -> Result<String, String> {
        match self.peek().cloned() {
            Some(Tok::Ident(word)) => {
                self.pos += 1;
                Ok(word)
            }
            _ => Err(self.error("expected a name")),
        }
    }

    fn finish(&self) -> Result<(), String> {
        if self.pos == self.toks.len() {
            Ok(())
        } else {
            Err(self.error("trailing tokens"))
        }
    }

    fn error(&self, message: &str) -> String {
        format!("{message} at token {} of `{}`", self.pos, self.line)
    }
}

// ===== Expressions =====

#[derive(Debug, Clone)]
enum Node {
    Num(i64),
    Var(String),
    Index(String, Box<Node>),
    Neg(Box<Node>),
    BitNot(Box<Node>),
    Abs(Box<Node>),
    Bin(&'static str, Box<Node>, Box<Node>),
    Cmp(&'static str, Box<Node>, Box<Node>),
    Not(Box<Node>),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
}

impl Node {
    fn is_bool(&self) -> bool {
        matches!(self, Node::Cmp(..) | Node::Not(_) | Node::And(..) | Node::Or(..))
    }
}

fn truth(node: Node) -> Result<Box<Node>, String> {
    if node.is_bool() {
        Ok(Box::new(node))
    } else {
        Err(format!("number used as a truth value: {node:?}"))
    }
}

fn number(node: Node) -> Result<Box<Node>, String> {
    if node.is_bool() {
        Err(format!("truth value used as a number: {node:?}"))
    } else {
        Ok(Box::new(node))
    }
}

fn parse_or(c: &mut Cursor) -> Result<Node, String> {
    let mut left = parse_and(c)?;
    while c.eat_word("or") {
        let right = parse_and(c)?;
        left = Node::Or(truth(left)?, truth(right)?);
    }
    Ok(left)
}

fn parse_and(c: &mut Cursor) -> Result<Node, String> {
    let mut left = parse_not(c)?;
    while c.eat_word("and") {
        let right = parse_not(c)?;
        left = Node::And(truth(left)?, truth(right)?);
    }
    Ok(left)
}

fn parse_not(c: &mut Cursor) -> Result<Node, String> {
    if c.eat_word("not") {
        return Ok(Node::Not(truth(parse_not(c)?)?));
    }
    let left = parse_level(c, 0)?;
    match c.peek_op() {
        Some(op) if COMPARISONS.contains(&op) => {
            c.pos += 1;
            let right = parse_level(c, 0)?;
            Ok(Node::Cmp(op, number(left)?, number(right)?))
        }
        _ => Ok(left),
    }
}

fn parse_level(c: &mut Cursor, level: usize) -> Result<Node, String> {
    if level == LEVELS.len() {
        return parse_unary(c);
    }
    let mut left = parse_level(c, level + 1)?;
    while let Some(op) = c.peek_op().filter(|op| LEVELS[level].contains(op)) {
        c.pos += 1;
        let right = parse_level(c, level + 1)?;
        left = Node::Bin(op, number(left)?, number(right)?);
    }
    Ok(left)
}

fn parse_unary(c: &mut Cursor) -> Result<Node, String> {
    if c.eat_op("-") {
        return Ok(Node::Neg(number(parse_unary(c)?)?));
    }
    if c.eat_op("~") {
        return Ok(Node::BitNot(number(parse_unary(c)?)?));
    }
    if c.eat_word("abs") {
        return Ok(Node::Abs(number(parse_unary(c)?)?));
    }
    parse_atom(c)
}

fn parse_atom(c: &mut Cursor) -> Result<Node, String> {
    match c.peek().cloned() {
        Some(Tok::Num(n)) => {
            c.pos += 1;
            Ok(Node::Num(n))
        }
        Some(Tok::Op("(")) => {
            c.pos += 1;
            let inner = parse_or(c)?;
            c.expect_op(")")?;
            Ok(inner)
        }
        Some(Tok::Ident(name)) => {
            c.pos += 1;
            if c.eat_op("[") {
                let index = number(parse_or(c)?)?;
                c.expect_op("]")?;
                Ok(Node::Index(name, index))
            } else {
                Ok(Node::Var(name))
            }
        }
        _ => Err(c.error("expected an operand")),
    }
}

fn parse_number(c: &mut Cursor) -> Result<Node, String> {
    Ok(*number(parse_or(c)?)?)
}

fn parse_condition(c: &mut Cursor) -> Result<Node, String> {
    Ok(*truth(parse_or(c)?)?)
}

fn parse_list(c: &mut Cursor) -> Result<Vec<Node>, String> {
    let mut items = vec![parse_number(c)?];
    while c.eat_op(",") {
        items.push(parse_number(c)?);
    }
    c.expect_op("]")?;
    Ok(items)
}

// ===== Statements =====

#[derive(Debug, Clone)]
enum Target {
    Var(String),
    Index(String, Node),
}

#[derive(Debug, Clone)]
enum Payload {
    Values(Vec<Node>),
    Array(String),
}

#[derive(Debug, Clone)]
enum Stmt {
    Assign(Target, Node),
    AssignList(String, Vec<Node>),
    If(Vec<(Node, Vec<Stmt>)>, Vec<Stmt>),
    While(Node, Vec<Stmt>),
    For(String, Node, Node, i64, Vec<Stmt>),
    Call(String, Vec<Node>),
    Emit(String, Payload),
}

fn starts_block_end(line: &str) -> bool {
    let word = line.split_whitespace().next().unwrap_or("");
    matches!(word, "end" | "else" | "elseif" | "onevent")
}

fn parse_block(lines: &[&str], pos: &mut usize) -> Result<Vec<Stmt>, String> {
    let mut stmts = Vec::new();
    while *pos < lines.len() && !starts_block_end(lines[*pos]) {
        stmts.push(parse_statement(lines, pos)?);
    }
    Ok(stmts)
}

fn expect_end(lines: &[&str], pos: &mut usize) -> Result<(), String> {
    match lines.get(*pos) {
        Some(&"end") => {
            *pos += 1;
            Ok(())
        }
        other => Err(format!("expected 'end', found {other:?}")),
    }
}

fn parse_statement(lines: &[&str], pos: &mut usize) -> Result<Stmt, String> {
    let line = lines[*pos];
    *pos += 1;
    let mut c = Cursor::new(line)?;
    let stmt = match c.peek_word() {
        Some("if") => {
            c.pos += 1;
            let cond = parse_condition(&mut c)?;
            c.expect_word("then")?;
            c.finish()?;
            let mut arms = vec![(cond, parse_block(lines, pos)?)];
            let mut orelse = Vec::new();
            loop {
                let next = *lines.get(*pos).ok_or("missing 'end' of if")?;
                *pos += 1;
                let mut c = Cursor::new(next)?;
                if c.eat_word("elseif") {
                    let cond = parse_condition(&mut c)?;
                    c.expect_word("then")?;
                    c.finish()?;
                    arms.push((cond, parse_block(lines, pos)?));
                } else if c.eat_word("else") {
                    c.finish()?;
                    orelse = parse_block(lines, pos)?;
                    expect_end(lines, pos)?;
                    break;
                } else if c.eat_word("end") {
                    c.finish()?;
                    break;
                } else {
                    return Err(format!("unexpected `{next}` in if"));
                }
            }
            return Ok(Stmt::If(arms, orelse));
        }
        Some("while") => {
            c.pos += 1;
            let cond = parse_condition(&mut c)?;
            c.expect_word("do")?;
            c.finish()?;
            let body = parse_block(lines, pos)?;
            expect_end(lines, pos)?;
            return Ok(Stmt::While(cond, body));
        }
        Some("for") => {
            c.pos += 1;
            let variable = c.ident()?;
            c.expect_word("in")?;
            let first = parse_number(&mut c)?;
            c.expect_op(":")?;
            let last = parse_number(&mut c)?;
            let step = if c.eat_word("step") {
                let negative = c.eat_op("-");
                match c.peek().cloned() {
                    Some(Tok::Num(n)) => {
                        c.pos += 1;
                        if negative { -n } else { n }
                    }
                    _ => return Err(c.error("step must be a constant")),
                }
            } else {
                1
            };
            c.expect_word("do")?;
            c.finish()?;
            let body = parse_block(lines, pos)?;
            expect_end(lines, pos)?;
            return Ok(Stmt::For(variable, first, last, step, body));
        }
        Some("call") => {
            c.pos += 1;
            let name = c.ident()?;
            c.expect_op("(")?;
            let mut args = Vec::new();
            if !c.eat_op(")") {
                args.push(parse_number(&mut c)?);
                while c.eat_op(",") {
                    args.push(parse_number(&mut c)?);
                }
                c.expect_op(")")?;
            }
            Stmt::Call(name, args)
        }
        Some("emit") => {
            c.pos += 1;
            let name = c.ident()?;
            let payload = if c.eat_op("[") {
                Payload::Values(parse_list(&mut c)?)
            } else if c.peek().is_some() {
                Payload::Array(c.ident()?)
            } else {
                Payload::Values(Vec::new())
            };
            Stmt::Emit(name, payload)
        }
        Some("var") | Some("onevent") => return Err(format!("misplaced `{line}`")),
        _ => {
            let name = c.ident()?;
            let target = if c.eat_op("[") {
                let index = parse_number(&mut c)?;
                c.expect_op("]")?;
                Target::Index(name, index)
            } else {
                Target::Var(name)
            };
            c.expect_op("=")?;
            match target {
                Target::Var(name) if c.eat_op("[") => Stmt::AssignList(name, parse_list(&mut c)?),
                target => Stmt::Assign(target, parse_number(&mut c)?),
            }
        }
    };
    c.finish()?;
    Ok(stmt)
}

// ===== Checks =====

/// Reject whole arrays where the compiler expects a number. Only a plain
/// array copy, a native argument and an emitted payload take one.
fn check_block(stmts: &[Stmt], arrays: &HashSet<String>) -> Result<(), String> {
    for stmt in stmts {
        match stmt {
            Stmt::Assign(Target::Var(name), Node::Var(_)) if arrays.contains(name) => {}
            Stmt::Assign(Target::Var(_), value) => check_number(value, arrays)?,
            Stmt::Assign(Target::Index(_, index), value) => {
                check_number(index, arrays)?;
                check_number(value, arrays)?;
            }
            Stmt::AssignList(_, items) => items.iter().try_for_each(|item| check_number(item, arrays))?,
            Stmt::If(arms, orelse) => {
                for (cond, body) in arms {
                    check_number(cond, arrays)?;
                    check_block(body, arrays)?;
                }
                check_block(orelse, arrays)?;
            }
            Stmt::While(cond, body) => {
                check_number(cond, arrays)?;
                check_block(body, arrays)?;
            }
            Stmt::For(variable, first, last, _, body) => {
                if arrays.contains(variable) {
                    return Err(format!("array '{variable}' used as a loop variable"));
                }
                check_number(first, arrays)?;
                check_number(last, arrays)?;
                check_block(body, arrays)?;
            }
            Stmt::Call(_, args) => {
                for arg in args {
                    if !matches!(arg, Node::Var(_)) {
                        check_number(arg, arrays)?;
                    }
                }
            }
            Stmt::Emit(_, Payload::Values(items)) => items.iter().try_for_each(|item| check_number(item, arrays))?,
            Stmt::Emit(_, Payload::Array(_)) => {}
        }
    }
    Ok(())
}

fn check_number(node: &Node, arrays: &HashSet<String>) -> Result<(), String> {
    match node {
        Node::Num(_) => Ok(()),
        Node::Var(name) if arrays.contains(name) => Err(format!("array '{name}' used as a number")),
        Node::Var(_) => Ok(()),
        Node::Index(_, inner) | Node::Neg(inner) | Node::BitNot(inner) | Node::Abs(inner) | Node::Not(inner) => {
            check_number(inner, arrays)
        }
        Node::Bin(_, left, right) | Node::Cmp(_, left, right) | Node::And(left, right) | Node::Or(left, right) => {
            check_number(left, arrays)?;
            check_number(right, arrays)
        }
    }
}

// ===== Machine =====

pub struct Vm {
    vars: HashMap<String, Vec<i16>>,
    declared: Vec<String>,
    init: Vec<Stmt>,
    handlers: HashMap<String, Vec<Stmt>>,
    /// Events emitted so far, with their payload.
    pub emitted: Vec<(String, Vec<i16>)>,
    /// Natives called so far, with their argument values.
    pub calls: Vec<(String, Vec<i16>)>,
    steps: usize,
}

impl Vm {
    pub fn load(source: &str) -> Result<Vm, String> {
        let mut vars = HashMap::new();
        let mut arrays = HashSet::new();
        for &(name, cells) in ROBOT_VARIABLES {
            vars.insert(name.to_string(), vec![0; cells]);
            if cells > 1 {
                arrays.insert(name.to_string());
            }
        }
        let lines: Vec<&str> = source.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let mut pos = 0;
        let mut declared = Vec::new();
        while pos < lines.len() && lines[pos].starts_with("var ") {
            let mut c = Cursor::new(&lines[pos][4..])?;
            let name = c.ident()?;
            let cells = if c.eat_op("[") {
                let n = match c.peek().cloned() {
                    Some(Tok::Num(n)) if n > 0 => n as usize,
                    _ => return Err(c.error("array size must be a positive constant")),
                };
                c.pos += 1;
                c.expect_op("]")?;
                arrays.insert(name.clone());
                n
            } else {
                1
            };
            c.finish()?;
            if vars.insert(name.clone(), vec![0; cells]).is_some() {
                return Err(format!("'{name}' declared twice or shadows a robot variable"));
            }
            declared.push(name);
            pos += 1;
        }

        let init = parse_block(&lines, &mut pos)?;
        check_block(&init, &arrays)?;
        let mut handlers = HashMap::new();
        while pos < lines.len() {
            let mut c = Cursor::new(lines[pos])?;
            c.expect_word("onevent")?;
            let event = c.ident()?;
            c.finish()?;
            pos += 1;
            let body = parse_block(&lines, &mut pos)?;
            check_block(&body, &arrays)?;
            if pos < lines.len() && !lines[pos].starts_with("onevent") {
                return Err(format!("unbalanced `{}`", lines[pos]));
            }
            if handlers.insert(event.clone(), body).is_some() {
                return Err(format!("two handlers for '{event}'"));
            }
        }

        Ok(Vm {
            vars,
            declared,
            init,
            handlers,
            emitted: Vec::new(),
            calls: Vec::new(),
            steps: 0,
        })
    }

    pub fn run_init(&mut self) -> Result<(), String> {
        let init = self.init.clone();
        self.exec_block(&init)
    }

    /// Run the handler of `event` with `args` in `event.args`.
    pub fn fire(&mut self, event: &str, args: &[i16]) -> Result<(), String> {
        let body = self
            .handlers
            .get(event)
            .cloned()
            .ok_or_else(|| format!("no handler for '{event}'"))?;
        let buffer = self.cells_mut("event.args")?;
        for (cell, value) in buffer.iter_mut().zip(args) {
            *cell = *value;
        }
        self.exec_block(&body)
    }

    pub fn has_handler(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    /// Variables in declaration order.
    pub fn declared(&self) -> &[String] {
        &self.declared
    }

    pub fn get(&self, name: &str) -> i16 {
        match self.vars.get(name).map(Vec::as_slice) {
            Some([value]) => *value,
            other => panic!("'{name}' is not a scalar: {other:?}"),
        }
    }

    pub fn array(&self, name: &str) -> Vec<i16> {
        match self.vars.get(name) {
            Some(cells) => cells.clone(),
            None => panic!("no variable '{name}'"),
        }
    }

    pub fn set(&mut self, name: &str, value: i16) {
        if let Some(cells) = self.vars.get_mut(name) {
            cells[0] = value;
        }
    }

    fn cells(&self, name: &str) -> Result<&Vec<i16>, String> {
        self.vars.get(name).ok_or_else(|| format!("undeclared variable '{name}'"))
    }

    fn cells_mut(&mut self, name: &str) -> Result<&mut Vec<i16>, String> {
        self.vars.get_mut(name).ok_or_else(|| format!("undeclared variable '{name}'"))
    }

    fn tick(&mut self) -> Result<(), String> {
        self.steps += 1;
        if self.steps > STEP_LIMIT {
            Err("step limit reached".to_string())
        } else {
            Ok(())
        }
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<(), String> {
        for stmt in stmts {
            self.exec(stmt)?;
        }
        Ok(())
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<(), String> {
        self.tick()?;
        match stmt {
            Stmt::Assign(Target::Var(name), Node::Var(source)) if self.is_array(name) => {
                let values = self.cells(source)?.clone();
                let cells = self.cells_mut(name)?;
                if cells.len() != values.len() {
                    return Err(format!("array '{name}' assigned from '{source}' of another size"));
                }
                cells.copy_from_slice(&values);
            }
            Stmt::Assign(Target::Var(name), value) => {
                let value = self.eval(value)?;
                match self.cells_mut(name)?.as_mut_slice() {
                    [cell] => *cell = value,
                    _ => return Err(format!("scalar assigned to array '{name}'")),
                }
            }
            Stmt::Assign(Target::Index(name, index), value) => {
                let value = self.eval(value)?;
                let index = self.eval(index)?;
                *self.element_mut(name, index)? = value;
            }
            Stmt::AssignList(name, items) => {
                let values = items.iter().map(|item| self.eval(item)).collect::<Result<Vec<_>, _>>()?;
                let cells = self.cells_mut(name)?;
                if cells.len() != values.len() {
                    return Err(format!("array '{name}' of size {} assigned {} values", cells.len(), values.len()));
                }
                cells.copy_from_slice(&values);
            }
            Stmt::If(arms, orelse) => {
                for (cond, body) in arms {
                    if self.test(cond)? {
                        return self.exec_block(body);
                    }
                }
                self.exec_block(orelse)?;
            }
            Stmt::While(cond, body) => {
                while self.test(cond)? {
                    self.exec_block(body)?;
                    self.tick()?;
                }
            }
            Stmt::For(variable, first, last, step, body) => {
                let first = self.eval(first)?;
                let last = self.eval(last)?;
                self.assign_scalar(variable, first)?;
                loop {
                    let current = self.scalar(variable)?;
                    let done = if *step > 0 { current > last } else { current < last };
                    if done {
                        break;
                    }
                    self.exec_block(body)?;
                    let current = self.scalar(variable)?;
                    self.assign_scalar(variable, current.wrapping_add(*step as i16))?;
                    self.tick()?;
                }
            }
            Stmt::Call(name, args) => self.call(name, args)?,
            Stmt::Emit(name, payload) => {
                let values = match payload {
                    Payload::Values(items) => items.iter().map(|item| self.eval(item)).collect::<Result<Vec<_>, _>>()?,
                    Payload::Array(array) => self.cells(array)?.clone(),
                };
                self.emitted.push((name.clone(), values));
            }
        }
        Ok(())
    }

    fn is_array(&self, name: &str) -> bool {
        self.vars.get(name).is_some_and(|cells| cells.len() > 1)
    }

    fn scalar(&self, name: &str) -> Result<i16, String> {
        match self.cells(name)?.as_slice() {
            [value] => Ok(*value),
            _ => Err(format!("array '{name}' used as a scalar")),
        }
    }

    fn assign_scalar(&mut self, name: &str, value: i16) -> Result<(), String> {
        match self.cells_mut(name)?.as_mut_slice() {
            [cell] => {
                *cell = value;
                Ok(())
            }
            _ => Err(format!("scalar assigned to array '{name}'")),
        }
    }

    fn element_mut(&mut self, name: &str, index: i16) -> Result<&mut i16, String> {
        let cells = self.cells_mut(name)?;
        let len = cells.len();
        usize::try_from(index)
            .ok()
            .and_then(|i| cells.get_mut(i))
            .ok_or_else(|| format!("index {index} out of '{name}' of size {len}"))
    }

    fn element(&self, name: &str, index: i16) -> Result<i16, String> {
        let cells = self.cells(name)?;
        usize::try_from(index)
            .ok()
            .and_then(|i| cells.get(i).copied())
            .ok_or_else(|| format!("index {index} out of '{name}' of size {}", cells.len()))
    }

    fn eval(&self, node: &Node) -> Result<i16, String> {
        Ok(match node {
            Node::Num(n) => i16::try_from(*n).map_err(|_| format!("literal {n} out of range"))?,
            Node::Var(name) => self.scalar(name)?,
            Node::Index(name, index) => self.element(name, self.eval(index)?)?,
            Node::Neg(inner) => self.eval(inner)?.wrapping_neg(),
            Node::BitNot(inner) => !self.eval(inner)?,
            Node::Abs(inner) => self.eval(inner)?.wrapping_abs(),
            Node::Bin(op, left, right) => {
                let a = self.eval(left)?;
                let b = self.eval(right)?;
                match *op {
                    "+" => a.wrapping_add(b),
                    "-" => a.wrapping_sub(b),
                    "*" => a.wrapping_mul(b),
                    "/" if b == 0 => return Err("division by zero".to_string()),
                    "/" => a.wrapping_div(b),
                    "%" if b == 0 => return Err("modulo by zero".to_string()),
                    "%" => a.wrapping_rem(b),
                    "|" => a | b,
                    "^" => a ^ b,
                    "&" => a & b,
                    "<<" => a.wrapping_shl(b as u32),
                    ">>" => a.wrapping_shr(b as u32),
                    other => return Err(format!("unknown operator {other}")),
                }
            }
            other => return Err(format!("truth value evaluated as a number: {other:?}")),
        })
    }

    fn test(&self, node: &Node) -> Result<bool, String> {
        Ok(match node {
            Node::Cmp(op, left, right) => {
                let a = self.eval(left)?;
                let b = self.eval(right)?;
                match *op {
                    "==" => a == b,
                    "!=" => a != b,
                    "<" => a < b,
                    "<=" => a <= b,
                    ">" => a > b,
                    ">=" => a >= b,
                    other => return Err(format!("unknown comparison {other}")),
                }
            }
            Node::Not(inner) => !self.test(inner)?,
            Node::And(left, right) => self.test(left)? && self.test(right)?,
            Node::Or(left, right) => self.test(left)? || self.test(right)?,
            other => return Err(format!("number tested as a truth value: {other:?}")),
        })
    }

    /// Cells an argument of a native designates: a whole variable, one
    /// element, or a computed value.
    fn argument(&self, node: &Node) -> Result<Vec<i16>, String> {
        match node {
            Node::Var(name) => Ok(self.cells(name)?.clone()),
            other => Ok(vec![self.eval(other)?]),
        }
    }

    fn store(&mut self, node: &Node, values: &[i16]) -> Result<(), String> {
        match node {
            Node::Var(name) => {
                let cells = self.cells_mut(name)?;
                if cells.len() != values.len() {
                    return Err(format!("native result of size {} stored in '{name}'", values.len()));
                }
                cells.copy_from_slice(values);
                Ok(())
            }
            Node::Index(name, index) => {
                let index = self.eval(index)?;
                match values {
                    [value] => {
                        *self.element_mut(name, index)? = *value;
                        Ok(())
                    }
                    _ => Err("array result stored in one element".to_string()),
                }
            }
            other => Err(format!("native result stored in {other:?}")),
        }
    }

    fn call(&mut self, name: &str, args: &[Node]) -> Result<(), String> {
        let values = args.iter().map(|arg| self.argument(arg)).collect::<Result<Vec<_>, _>>()?;
        self.calls.push((name.to_string(), values.concat()));
        let zip = |f: fn(i16, i16) -> i16| -> Vec<i16> {
            values[1].iter().zip(&values[2]).map(|(a, b)| f(*a, *b)).collect()
        };
        let result = match name {
            "math.copy" => values[1].clone(),
            "math.fill" => vec![values[1][0]; values[0].len()],
            "math.addscalar" => values[1].iter().map(|a| a.wrapping_add(values[2][0])).collect(),
            "math.add" => zip(i16::wrapping_add),
            "math.sub" => zip(i16::wrapping_sub),
            "math.mul" => zip(i16::wrapping_mul),
            "math.min" => zip(std::cmp::min),
            "math.max" => zip(std::cmp::max),
            "math.clamp" => values[1]
                .iter()
                .zip(&values[2])
                .zip(&values[3])
                .map(|((v, lo), hi)| (*v).max(*lo).min(*hi))
                .collect(),
            "math.muldiv" => values[1]
                .iter()
                .zip(&values[2])
                .zip(&values[3])
                .map(|((a, b), c)| ((*a as i32 * *b as i32) / (*c as i32).max(1)) as i16)
                .collect(),
            _ => return Ok(()),
        };
        self.store(&args[0], &result)
    }
}
