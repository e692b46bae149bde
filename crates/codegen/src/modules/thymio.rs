//! The Thymio II robot: variables, events, natives and color constants.

use super::{ArgKind, Module, NativeFunction, Procedure, Variable};
use crate::names::{round_trips, to_python_name};
use crate::shape::Shape;
use indexmap::IndexMap;
use once_cell::sync::Lazy;

pub const MODULE_NAME: &str = "thymio";

/// Firmware variables with their sizes in words.
pub const ROBOT_VARIABLES: &[(&str, usize)] = &[
    ("_id", 1),
    ("event.source", 1),
    ("event.args", 32),
    ("_fwversion", 2),
    ("_productId", 1),
    ("buttons._raw", 5),
    ("button.backward", 1),
    ("button.left", 1),
    ("button.center", 1),
    ("button.forward", 1),
    ("button.right", 1),
    ("buttons._mean", 5),
    ("buttons._noise", 5),
    ("prox.horizontal", 7),
    ("prox.comm.rx._payloads", 7),
    ("prox.comm.rx._intensities", 7),
    ("prox.comm.rx", 1),
    ("prox.comm.tx", 1),
    ("prox.ground.ambiant", 2),
    ("prox.ground.reflected", 2),
    ("prox.ground.delta", 2),
    ("motor.left.target", 1),
    ("motor.right.target", 1),
    ("_vbat", 2),
    ("_imot", 2),
    ("motor.left.speed", 1),
    ("motor.right.speed", 1),
    ("motor.left.pwm", 1),
    ("motor.right.pwm", 1),
    ("_integrator", 2),
    ("acc", 3),
    ("leds.top", 3),
    ("leds.bottom.left", 3),
    ("leds.bottom.right", 3),
    ("leds.circle", 8),
    ("temperature", 1),
    ("rc5.address", 1),
    ("rc5.command", 1),
    ("mic.intensity", 1),
    ("mic.threshold", 1),
    ("mic._mean", 1),
    ("timer.period", 2),
    ("acc._tap", 1),
    ("sd.present", 1),
];

/// Events raised by the firmware. None of them carries a payload.
pub const ROBOT_EVENTS: &[&str] = &[
    "button.backward",
    "button.left",
    "button.center",
    "button.forward",
    "button.right",
    "buttons",
    "prox",
    "prox.comm",
    "tap",
    "acc",
    "mic",
    "sound.finished",
    "temperature",
    "rc5",
    "motor",
    "timer0",
    "timer1",
];

/// Robot variables reachable from Python, keyed by Python name.
static ROBOT_TABLE: Lazy<IndexMap<String, Variable>> = Lazy::new(|| {
    ROBOT_VARIABLES
        .iter()
        .filter(|(name, _)| round_trips(name))
        .map(|&(name, cells)| {
            let variable = Variable {
                target: name.to_string(),
                shape: Shape::from_cells(cells),
            };
            (to_python_name(name), variable)
        })
        .collect()
});

pub fn robot_table() -> &'static IndexMap<String, Variable> {
    &ROBOT_TABLE
}

/// Look a robot variable up by Python name or by its dotted Aseba name.
pub fn robot_variable(name: &str) -> Option<Variable> {
    if let Some(variable) = ROBOT_TABLE.get(name) {
        return Some(variable.clone());
    }
    if name.contains('.') {
        return ROBOT_TABLE.values().find(|v| v.target == name).cloned();
    }
    None
}

pub fn is_robot_event(name: &str) -> bool {
    ROBOT_EVENTS.contains(&name)
}

/// Names such as `button.up` that sit in a robot event family without
/// naming an actual event.
pub fn is_robot_event_family(name: &str) -> bool {
    match name.split_once('.') {
        Some((family, _)) => ROBOT_EVENTS
            .iter()
            .any(|event| event.split_once('.').is_some_and(|(f, _)| f == family)),
        None => false,
    }
}

const LED_NATIVES: &[(&str, &str, usize)] = &[
    ("leds_top", "leds.top", 3),
    ("leds_bottom_left", "leds.bottom.left", 3),
    ("leds_bottom_right", "leds.bottom.right", 3),
    ("leds_circle", "leds.circle", 8),
    ("leds_buttons", "leds.buttons", 4),
    ("leds_prox_h", "leds.prox.h", 8),
    ("leds_prox_v", "leds.prox.v", 2),
    ("leds_rc", "leds.rc", 1),
    ("leds_sound", "leds.sound", 1),
    ("leds_temperature", "leds.temperature", 2),
    ("sound_system", "sound.system", 1),
    ("sound_freq", "sound.freq", 2),
    ("sound_play", "sound.play", 1),
    ("sound_record", "sound.record", 1),
    ("sound_replay", "sound.replay", 1),
];

const ARRAY_NATIVES: &[(&str, &str, &[ArgKind])] = {
    use ArgKind::{Array as A, Value as V};
    &[
        ("math_copy", "math.copy", &[A, A]),
        ("math_fill", "math.fill", &[A, V]),
        ("math_addscalar", "math.addscalar", &[A, A, V]),
        ("math_add", "math.add", &[A, A, A]),
        ("math_sub", "math.sub", &[A, A, A]),
        ("math_mul", "math.mul", &[A, A, A]),
        ("math_div", "math.div", &[A, A, A]),
        ("math_min", "math.min", &[A, A, A]),
        ("math_max", "math.max", &[A, A, A]),
        ("math_clamp", "math.clamp", &[A, A, A, A]),
        ("math_muldiv", "math.muldiv", &[A, A, A, A]),
        ("math_atan2", "math.atan2", &[A, A, A]),
        ("math_sin", "math.sin", &[A, A]),
        ("math_cos", "math.cos", &[A, A]),
        ("math_sqrt", "math.sqrt", &[A, A]),
        ("math_rand", "math.rand", &[A]),
        ("math_sort", "math.sort", &[A]),
    ]
};

const VALUE_NATIVES: &[(&str, &str, usize)] = &[
    ("math_min", "math.min", 2),
    ("math_max", "math.max", 2),
    ("math_clamp", "math.clamp", 3),
    ("math_muldiv", "math.muldiv", 3),
    ("math_atan2", "math.atan2", 2),
    ("math_sin", "math.sin", 1),
    ("math_cos", "math.cos", 1),
    ("math_sqrt", "math.sqrt", 1),
    ("math_rand", "math.rand", 0),
];

/// LED levels range from 0 to 32.
const COLORS: &[(&str, [u8; 3])] = &[
    ("BLACK", [0, 0, 0]),
    ("WHITE", [32, 32, 32]),
    ("RED", [32, 0, 0]),
    ("GREEN", [0, 32, 0]),
    ("BLUE", [0, 0, 32]),
    ("YELLOW", [32, 32, 0]),
    ("CYAN", [0, 32, 32]),
    ("MAGENTA", [32, 0, 32]),
];

pub fn module() -> Module {
    let mut module = Module::new(MODULE_NAME);

    for (name, variable) in ROBOT_TABLE.iter() {
        module.variable(name.clone(), variable.target.clone(), variable.shape);
    }

    for &(name, target, count) in LED_NATIVES {
        module.function(name, Procedure::values(target, count));
        module.function(format!("nf_{}", name), Procedure::values(target, count));
    }
    module.function("sound_wave", Procedure::new("sound.wave", vec![ArgKind::Array]));
    module.function("nf_sound_wave", Procedure::new("sound.wave", vec![ArgKind::Array]));

    for &(name, target, params) in ARRAY_NATIVES {
        module.function(format!("nf_{}", name), Procedure::new(target, params.to_vec()));
    }
    for &(name, target, count) in VALUE_NATIVES {
        module.function(name, NativeFunction::values(target, count));
    }

    for &(name, [r, g, b]) in COLORS {
        module.constant(name, format!("[{}, {}, {}]", r, g, b), Shape::Array(3));
    }

    module
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::from_python_name;

    #[test]
    fn table_skips_hidden_members() {
        let table = robot_table();
        assert!(table.contains_key("prox_horizontal"));
        assert!(table.contains_key("_fwversion"));
        assert!(!table.values().any(|v| v.target.contains("._")));
    }

    #[test]
    fn table_names_round_trip() {
        for (python, variable) in robot_table() {
            assert_eq!(from_python_name(python), variable.target);
            assert_eq!(to_python_name(&variable.target), *python);
        }
    }

    #[test]
    fn dotted_lookup() {
        let variable = robot_variable("leds.top").unwrap();
        assert_eq!(variable.shape, Shape::Array(3));
        assert!(robot_variable("leds").is_none());
    }

    #[test]
    fn event_families() {
        assert!(is_robot_event("button.forward"));
        assert!(!is_robot_event("button.up"));
        assert!(is_robot_event_family("button.up"));
        assert!(!is_robot_event_family("my.event"));
    }

    #[test]
    fn natives_have_plain_and_prefixed_names() {
        let module = module();
        assert!(module.functions.contains_key("leds_top"));
        assert!(module.functions.contains_key("nf_leds_top"));
        assert!(module.functions.contains_key("nf_math_copy"));
        assert!(module.functions.contains_key("math_rand"));
        assert_eq!(module.constants["RED"].shape, Shape::Array(3));
    }
}
