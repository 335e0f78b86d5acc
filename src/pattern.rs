//! Assertion name patterns.
//!
//! A pattern is made of literal words, optional `[flag]` words and
//! `(alt1|alt2)` alternations. Expanding a pattern produces every concrete
//! assertion name it stands for together with the flag assignment of each
//! variant:
//!
//! ```
//! use layered_expect::pattern::expand;
//!
//! let names: Vec<_> = expand("to [not] (equal|be)")
//!     .unwrap()
//!     .into_iter()
//!     .map(|p| p.text)
//!     .collect();
//! assert_eq!(names, ["to not equal", "to not be", "to equal", "to be"]);
//! ```

use crate::errors::{PatternError, PatternErrorKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Flag assignment of one expanded assertion name.
pub type Flags = BTreeMap<String, bool>;

static FLAG_TRAILING_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\[[^\]]+\]) ?").unwrap());
static TOKEN_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]+\]|\([^)]+\)").unwrap());

/// One concrete assertion name produced by [`expand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedPattern {
    pub text: String,
    pub flags: Flags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Literal(&'a str),
    Flag(&'a str),
    Alternation(Vec<&'a str>),
}

impl<'a> Token<'a> {
    fn parse(raw: &'a str) -> Self {
        if raw.starts_with('[') && raw.ends_with(']') {
            Token::Flag(&raw[1..raw.len() - 1])
        } else if raw.starts_with('(') && raw.ends_with(')') {
            Token::Alternation(
                raw[1..raw.len() - 1]
                    .split('|')
                    .filter(|alt| !alt.is_empty())
                    .collect(),
            )
        } else {
            Token::Literal(raw)
        }
    }
}

/// Check the syntax of a pattern without expanding it.
pub fn validate(pattern: &str) -> Result<(), PatternError> {
    let fail = |reason| Err(PatternError::new(pattern, reason));

    if pattern.is_empty() {
        return fail(PatternErrorKind::Empty);
    }
    if pattern.starts_with(char::is_whitespace) || pattern.ends_with(char::is_whitespace) {
        return fail(PatternErrorKind::SurroundingWhitespace);
    }

    let (mut open_brackets, mut close_brackets) = (0usize, 0usize);
    let (mut open_parens, mut close_parens) = (0usize, 0usize);
    let mut previous = None;

    for c in pattern.chars() {
        match c {
            '[' => open_brackets += 1,
            ']' => close_brackets += 1,
            '(' => open_parens += 1,
            ')' => close_parens += 1,
            _ => {}
        }

        if c == ']' && open_brackets >= close_brackets {
            if open_brackets == close_brackets + 1 {
                return fail(PatternErrorKind::NestedBracketsInFlag);
            }
            if open_parens != close_parens {
                return fail(PatternErrorKind::ParenthesesInFlag);
            }
            if previous == Some('[') {
                return fail(PatternErrorKind::EmptyFlag);
            }
        } else if c == ')' && open_parens >= close_parens {
            if open_parens == close_parens + 1 {
                return fail(PatternErrorKind::NestedParenthesesInAlternation);
            }
            if open_brackets != close_brackets {
                return fail(PatternErrorKind::BracketsInAlternation);
            }
        }

        if (c == ')' || c == '|')
            && open_parens >= close_parens
            && matches!(previous, Some('(') | Some('|'))
        {
            return fail(PatternErrorKind::EmptyAlternation);
        }

        previous = Some(c);
    }

    if open_brackets != close_brackets {
        return fail(PatternErrorKind::UnbalancedBrackets);
    }
    if open_parens != close_parens {
        return fail(PatternErrorKind::UnbalancedParentheses);
    }
    Ok(())
}

/// Validate and expand a pattern into all of its concrete names.
///
/// Variants with a flag switched on come before the variants with it off.
pub fn expand(pattern: &str) -> Result<Vec<ExpandedPattern>, PatternError> {
    validate(pattern)?;

    // An optional word swallows the space after it, so leaving it out does
    // not produce a double space.
    let normalized = FLAG_TRAILING_SPACE.replace_all(pattern, "$1");
    let tokens = tokenize(&normalized);

    let mut expansions = permutations(&tokens, 0);
    for expansion in expansions.iter_mut() {
        expansion.text = expansion.text.trim().to_string();
        if expansion.text.is_empty() {
            return Err(PatternError::new(pattern, PatternErrorKind::OnlyFlags));
        }
    }
    Ok(expansions)
}

fn tokenize(pattern: &str) -> Vec<Token<'_>> {
    let mut raw = Vec::new();
    let mut last = 0;
    for m in TOKEN_BOUNDARY.find_iter(pattern) {
        raw.push(&pattern[last..m.start()]);
        raw.push(m.as_str());
        last = m.end();
    }
    raw.push(&pattern[last..]);

    raw.into_iter()
        .filter(|token| !token.is_empty())
        .map(Token::parse)
        .collect()
}

fn permutations(tokens: &[Token<'_>], index: usize) -> Vec<ExpandedPattern> {
    let Some(token) = tokens.get(index) else {
        return vec![ExpandedPattern {
            text: String::new(),
            flags: Flags::new(),
        }];
    };

    let tail = permutations(tokens, index + 1);
    // A flag is its own word: keep it apart from whatever precedes it.
    let before_flag = matches!(tokens.get(index + 1), Some(Token::Flag(_)));

    match token {
        Token::Flag(flag) => {
            let on = tail.iter().map(|suffix| ExpandedPattern {
                text: format!("{} {}", flag, suffix.text),
                flags: with_flag(flag, true, &suffix.flags),
            });
            let off = tail.iter().map(|suffix| ExpandedPattern {
                text: suffix.text.clone(),
                flags: with_flag(flag, false, &suffix.flags),
            });
            on.chain(off).collect()
        }
        Token::Alternation(alternatives) => alternatives
            .iter()
            .flat_map(|alt| {
                tail.iter().map(move |suffix| ExpandedPattern {
                    text: join(alt, &suffix.text, before_flag),
                    flags: suffix.flags.clone(),
                })
            })
            .collect(),
        Token::Literal(literal) => tail
            .iter()
            .map(|suffix| ExpandedPattern {
                text: join(literal, &suffix.text, before_flag),
                flags: suffix.flags.clone(),
            })
            .collect(),
    }
}

fn with_flag(flag: &str, value: bool, downstream: &Flags) -> Flags {
    let mut flags = Flags::new();
    flags.insert(flag.to_string(), value);
    flags.extend(downstream.iter().map(|(k, v)| (k.clone(), *v)));
    flags
}

fn join(head: &str, suffix: &str, separate: bool) -> String {
    if separate && !head.ends_with(' ') {
        format!("{} {}", head, suffix)
    } else {
        format!("{}{}", head, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(pattern: &str) -> Vec<String> {
        expand(pattern).unwrap().into_iter().map(|p| p.text).collect()
    }

    fn flags(pairs: &[(&str, bool)]) -> Flags {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_expand_flag() {
        assert_eq!(
            expand("foo[bar] baz").unwrap(),
            vec![
                ExpandedPattern {
                    text: "foo bar baz".to_string(),
                    flags: flags(&[("bar", true)]),
                },
                ExpandedPattern {
                    text: "foo baz".to_string(),
                    flags: flags(&[("bar", false)]),
                },
            ]
        );
        assert_eq!(texts("foo [bar] baz"), ["foo bar baz", "foo baz"]);
    }

    #[test]
    fn test_expand_alternation() {
        let expanded = expand("to (equal|be) bar").unwrap();
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].text, "to equal bar");
        assert_eq!(expanded[1].text, "to be bar");
        assert!(expanded.iter().all(|p| p.flags.is_empty()));
    }

    #[test]
    fn test_expand_leading_and_trailing_flags() {
        assert_eq!(texts("[not] to be"), ["not to be", "to be"]);
        assert_eq!(texts("to be [ok]"), ["to be ok", "to be"]);
    }

    #[test]
    fn test_expand_cross_product() {
        let expanded = expand("[not] to (be|equal) [shallowly]").unwrap();
        assert_eq!(expanded.len(), 8);
        assert_eq!(expanded[0].text, "not to be shallowly");
        assert_eq!(expanded[0].flags, flags(&[("not", true), ("shallowly", true)]));
        assert_eq!(expanded[7].text, "to equal");
        assert_eq!(expanded[7].flags, flags(&[("not", false), ("shallowly", false)]));
    }

    #[test]
    fn test_only_flags_rejected() {
        let err = expand("[foo] [bar]").unwrap_err();
        assert_eq!(err.reason, PatternErrorKind::OnlyFlags);
    }

    #[test]
    fn test_invalid_patterns() {
        let cases = [
            ("", PatternErrorKind::Empty),
            (" leading", PatternErrorKind::SurroundingWhitespace),
            ("trailing ", PatternErrorKind::SurroundingWhitespace),
            ("[]", PatternErrorKind::EmptyFlag),
            ("(a|)", PatternErrorKind::EmptyAlternation),
            ("(|a)", PatternErrorKind::EmptyAlternation),
            ("(a)b)", PatternErrorKind::UnbalancedParentheses),
            ("[a[b]]", PatternErrorKind::NestedBracketsInFlag),
            ("[a(b]", PatternErrorKind::ParenthesesInFlag),
            ("(a[b)", PatternErrorKind::BracketsInAlternation),
            ("((a))", PatternErrorKind::NestedParenthesesInAlternation),
            ("to [be", PatternErrorKind::UnbalancedBrackets),
        ];
        for (pattern, reason) in cases {
            let err = validate(pattern).unwrap_err();
            assert_eq!(err.reason, reason, "pattern {:?}", pattern);
            assert!(expand(pattern).is_err());
        }
    }
}
