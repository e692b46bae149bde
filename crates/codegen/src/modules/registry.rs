//! Registry of importable modules and module-level name resolution.

use super::{Constant, Emitter, Module, Variable, clock, thymio};
use crate::names::from_python_name;
use indexmap::IndexMap;

/// What a name means once user variables have been ruled out.
pub enum ModuleBinding<'r> {
    Constant(&'r Constant),
    Variable(&'r Variable),
    /// Built-in robot variable reachable without any import.
    Robot(Variable),
    Unknown,
}

impl std::fmt::Debug for ModuleBinding<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleBinding::Constant(c) => f.debug_tuple("Constant").field(c).finish(),
            ModuleBinding::Variable(v) => f.debug_tuple("Variable").field(v).finish(),
            ModuleBinding::Robot(v) => f.debug_tuple("Robot").field(v).finish(),
            ModuleBinding::Unknown => f.write_str("Unknown"),
        }
    }
}

#[derive(Debug)]
pub struct ModuleRegistry {
    modules: IndexMap<String, Module>,
}

impl ModuleRegistry {
    /// Registry holding the robot and clock modules.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_all();
        registry
    }

    pub fn empty() -> Self {
        ModuleRegistry {
            modules: IndexMap::new(),
        }
    }

    fn register_all(&mut self) {
        self.register(thymio::module());
        self.register(clock::module());
    }

    /// Register `module` unless one with the same name is already present.
    /// Returns whether the module was added.
    pub fn register(&mut self, module: Module) -> bool {
        if self.modules.contains_key(&module.name) {
            return false;
        }
        self.modules.insert(module.name.clone(), module);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Resolve a value name against module state: `module.member` for
    /// modules in `qualified`, then members of `star` modules in import
    /// order, then the robot variable table.
    pub fn resolve<'r>(&'r self, name: &str, star: &[String], qualified: &[String]) -> ModuleBinding<'r> {
        if let Some(module) = self.qualifier(name, qualified) {
            let member = &name[module.name.len() + 1..];
            return Self::member(module, member);
        }

        for module in star {
            if let Some(module) = self.modules.get(module) {
                let binding = Self::member(module, name);
                if !matches!(binding, ModuleBinding::Unknown) {
                    return binding;
                }
            }
        }

        match thymio::robot_variable(name) {
            Some(variable) => ModuleBinding::Robot(variable),
            None => ModuleBinding::Unknown,
        }
    }

    /// Resolve a called name. Functions and variables live in separate
    /// tables since robot natives often share a name with a variable
    /// (`leds_top`).
    pub fn resolve_function<'r>(
        &'r self,
        name: &str,
        star: &[String],
        qualified: &[String],
    ) -> Option<&'r dyn Emitter> {
        if let Some(module) = self.qualifier(name, qualified) {
            let member = &name[module.name.len() + 1..];
            return module.functions.get(member).map(|f| &**f);
        }
        star.iter()
            .filter_map(|module| self.modules.get(module))
            .find_map(|module| module.functions.get(name))
            .map(|f| &**f)
    }

    fn qualifier(&self, name: &str, qualified: &[String]) -> Option<&Module> {
        let (module, _) = name.split_once('.')?;
        if qualified.iter().any(|q| q == module) {
            self.modules.get(module)
        } else {
            None
        }
    }

    fn member<'r>(module: &'r Module, name: &str) -> ModuleBinding<'r> {
        if let Some(variable) = module.variables.get(name) {
            return ModuleBinding::Variable(variable);
        }
        if let Some(constant) = module.constants.get(name) {
            return ModuleBinding::Constant(constant);
        }
        let dotted = from_python_name(name);
        match module.variables.values().find(|v| v.target == dotted || v.target == name) {
            Some(variable) => ModuleBinding::Variable(variable),
            None => ModuleBinding::Unknown,
        }
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    #[test]
    fn registration_is_idempotent() {
        let mut registry = ModuleRegistry::new();
        assert!(registry.contains("thymio"));
        assert!(registry.contains("clock"));
        assert!(!registry.register(Module::new("clock")));
        assert_eq!(registry.names().count(), 2);
    }

    #[test]
    fn star_import_exposes_functions() {
        let registry = ModuleRegistry::new();
        let star = vec!["thymio".to_string()];
        assert!(registry.resolve_function("leds_top", &star, &[]).is_some());
        assert!(registry.resolve_function("leds_top", &[], &[]).is_none());
        assert!(matches!(registry.resolve("leds_top", &[], &[]), ModuleBinding::Robot(_)));
        assert!(matches!(registry.resolve("RED", &star, &[]), ModuleBinding::Constant(_)));
    }

    #[test]
    fn qualified_members_need_the_module_imported() {
        let registry = ModuleRegistry::new();
        let qualified = vec!["clock".to_string()];
        assert!(registry.resolve_function("clock.seconds", &[], &qualified).is_some());
        assert!(registry.resolve_function("clock.seconds", &[], &[]).is_none());
        assert!(matches!(registry.resolve("clock.seconds", &[], &[]), ModuleBinding::Unknown));
    }

    #[test]
    fn robot_table_is_always_visible() {
        let registry = ModuleRegistry::empty();
        match registry.resolve("motor_left_target", &[], &[]) {
            ModuleBinding::Robot(variable) => {
                assert_eq!(variable.target, "motor.left.target");
                assert_eq!(variable.shape, Shape::Scalar);
            }
            other => panic!("unexpected binding {:?}", other),
        }
    }
}
