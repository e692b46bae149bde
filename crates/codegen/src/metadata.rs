//! Facts about a translated program that the host needs to run it.

use indexmap::IndexMap;
use serde::Serialize;

/// Format string of one `print()` call site, `%d` per printed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintFormat {
    pub format: String,
    pub arity: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// Indexed by the first value of each `_print` event.
    pub print_formats: Vec<PrintFormat>,
    /// Custom events handled by the program, with their payload size.
    pub events_in: IndexMap<String, usize>,
    /// Events the program emits, with their payload size.
    pub events_out: IndexMap<String, usize>,
    /// The program may emit `_exit`.
    pub has_exit_event: bool,
}

impl Metadata {
    pub fn print_format(&self, index: usize) -> Option<&PrintFormat> {
        self.print_formats.get(index)
    }
}
