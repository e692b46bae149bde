//! Elapsed time measured by counting `buttons` events, which the firmware
//! raises at 50 Hz.

use super::{ImportHook, Inline, Module};
use crate::priority::Priority;
use crate::shape::Shape;
use indexmap::IndexMap;

pub const MODULE_NAME: &str = "clock";

/// Hidden counter incremented by the hook.
pub const TICKS: &str = "_clock_ticks";

pub const TICK_EVENT: &str = "buttons";

pub fn module() -> Module {
    let mut hidden = IndexMap::new();
    hidden.insert(TICKS.to_string(), Shape::Scalar);
    let mut module = Module::new(MODULE_NAME).with_hook(ImportHook {
        event: TICK_EVENT.to_string(),
        preamble: vec![format!("{} = {} + 1", TICKS, TICKS)],
        hidden,
    });
    module.function("ticks_50Hz", Inline::new(TICKS, Priority::Atom));
    module.function("seconds", Inline::new("_clock_ticks / 50", Priority::Multiplicative));
    module
}
