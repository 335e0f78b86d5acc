//! "Did you mean" suggestions for unknown assertion names.

use crate::registry::AssertionRegistry;
use crate::types::TypeRegistry;
use crate::value::Value;
use strsim::levenshtein;

/// Pick the registered assertion name closest to `requested`.
///
/// Types are visited from the oldest (`any`) to the newest. Each type that
/// accepts the subject gets a bonus one higher than the previous accepting
/// type, so names on narrower types win close calls. Ties keep the first
/// name found.
pub(crate) fn closest_assertion(
    types: &TypeRegistry,
    assertions: &AssertionRegistry,
    subject: &Value,
    requested: &str,
) -> Option<String> {
    let mut best: Option<(i64, &str)> = None;
    let mut next_bonus = 0i64;

    for ty in types.iter().rev() {
        let bonus = if ty.identify(subject) {
            next_bonus += 1;
            next_bonus - 1
        } else {
            0
        };

        for name in assertions.names_for(ty.name()) {
            let score = bonus - levenshtein(requested, name) as i64;
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, name));
            }
        }
    }

    best.map(|(_, name)| name.to_string())
}
