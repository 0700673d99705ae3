//! Template mode
//!
//! Text that does not start with `=` is a template: every `{Name}` or
//! `{Name}[i]` is replaced with the stringified value, then whitespace is
//! collapsed. Independent of the tokenizer and parser, and cannot fail.

use regex::{Captures, Regex};

use crate::ast::ColumnRef;
use crate::environment::Environment;

fn reference_pattern() -> &'static Regex {
    lazy_regex::regex!(r"\{([^}]*)\}(?:\[(\d+)\])?")
}

fn capture_ref(caps: &Captures<'_>) -> ColumnRef {
    // An index past usize can never resolve, so it looks up nothing
    let index = caps.get(2).map(|m| m.as_str().parse().unwrap_or(usize::MAX));
    ColumnRef::new(&caps[1], index)
}

/// Substitute references and normalize whitespace
///
/// # Example
/// ```rust
/// use colcalc_formula::{evaluate_template, Environment};
///
/// let env = Environment::new().with("First", "Ada").with("Last", "Lovelace");
/// assert_eq!(evaluate_template("  {First}\n{Last} ", &env), "Ada Lovelace");
/// ```
pub fn evaluate_template(template: &str, env: &Environment) -> String {
    let substituted = reference_pattern().replace_all(template, |caps: &Captures<'_>| {
        let reference = capture_ref(caps);
        env.lookup(&reference.name, reference.index).to_string()
    });

    collapse_whitespace(&substituted)
}

/// Column references in a template, in order of appearance
pub fn template_references(template: &str) -> Vec<ColumnRef> {
    reference_pattern()
        .captures_iter(template)
        .map(|caps| capture_ref(&caps))
        .collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
