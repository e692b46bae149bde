//! Mapping between Python identifiers and Aseba identifiers.
//!
//! Aseba names are dotted (`motor.left.target`) while Python names cannot
//! contain dots, so every dot after the first character becomes an
//! underscore on the Python side (`motor_left_target`). Names whose Aseba
//! form contains `._` do not survive the round trip and are kept out of the
//! tables that rely on it.

/// Keywords of the target language; a user variable cannot take these names.
pub const ASEBA_KEYWORDS: &[&str] = &[
    "abs", "and", "call", "callsub", "do", "else", "elseif", "emit", "end", "for", "if", "in",
    "not", "onevent", "or", "return", "step", "sub", "then", "var", "when", "while",
];

/// Python spelling of an Aseba identifier.
pub fn to_python_name(name: &str) -> String {
    name.replace('.', "_")
}

/// Aseba spelling of a Python identifier.
pub fn from_python_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => {
            let rest: String = chars.map(|c| if c == '_' { '.' } else { c }).collect();
            format!("{}{}", first, rest)
        }
        None => String::new(),
    }
}

/// True when `name` survives `from_python_name(to_python_name(name))`.
pub fn round_trips(name: &str) -> bool {
    !name.contains("._") && !name.contains("..") && from_python_name(&to_python_name(name)) == name
}

/// Python names that contain an underscore past their first character.
pub fn has_inner_underscore(name: &str) -> bool {
    name.chars().skip(1).any(|c| c == '_')
}

/// ASCII identifier, optionally dotted, as Aseba accepts it.
pub fn is_valid_identifier(name: &str) -> bool {
    name.split('.').all(|part| {
        let mut chars = part.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    })
}

pub fn is_keyword(name: &str) -> bool {
    ASEBA_KEYWORDS.contains(&name)
}

/// Name of the Aseba variable backing local `local` of function `function`.
pub fn local_name(function: &str, local: &str) -> String {
    format!("_{}__{}", function, local)
}

/// Name of the Aseba variable receiving array results of `function`.
pub fn return_name(function: &str) -> String {
    format!("_{}__return", function)
}
