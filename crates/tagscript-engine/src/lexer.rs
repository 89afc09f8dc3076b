//! Brace scanner and verb splitter.
//!
//! A single forward pass maintains a stack of open-brace positions; every
//! `}` that matches an open brace emits a [`Verb`]. Verbs therefore come out
//! in closing-brace order, so inner verbs always precede the verbs that
//! contain them — the interpreter relies on this to evaluate innermost-first.
//!
//! The scanner cannot fail: unmatched braces simply never produce a verb and
//! stay literal in the body.

use crate::verb::{Span, Verb};

/// Scan `source` into verbs, in closing-brace order.
///
/// `dot_parameter` selects the parameter style: `{name(param):payload}` when
/// false, `{name.param:payload}` when true.
pub fn lex(source: &str, dot_parameter: bool) -> Vec<Verb> {
    let mut verbs = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    for (idx, ch) in source.char_indices() {
        match ch {
            '{' => open.push(idx),
            '}' => {
                if let Some(start) = open.pop() {
                    let span = Span::new(start, idx + 1);
                    verbs.push(parse_verb(
                        &source[start..idx + 1],
                        dot_parameter,
                        span,
                        open.len(),
                    ));
                }
            }
            _ => {}
        }
    }

    verbs
}

/// Split one `{...}` substring into declaration / parameter / payload.
///
/// The declaration is the longest leading run of non-separator characters.
/// Separator priority: `:` (payload), `(` (parenthesized parameter) or `.`
/// (dotted parameter, only in that mode), and whitespace, which terminates
/// the declaration without introducing a parameter. An unbalanced `(` is not
/// a separator at all — the run up to `:` stays in the declaration, so the
/// verb is rejected downstream and rewritten literally.
pub fn parse_verb(original: &str, dot_parameter: bool, span: Span, depth: usize) -> Verb {
    debug_assert!(original.starts_with('{') && original.ends_with('}'));
    let interior = &original[1..original.len() - 1];

    let (declaration, parameter, payload) = split_interior(interior, dot_parameter);

    Verb {
        declaration: declaration.to_string(),
        parameter: parameter.map(String::from),
        payload: payload.map(String::from),
        original: original.to_string(),
        span,
        depth,
    }
}

fn split_interior(interior: &str, dot_parameter: bool) -> (&str, Option<&str>, Option<&str>) {
    for (i, ch) in interior.char_indices() {
        match ch {
            ':' => {
                return (&interior[..i], None, Some(&interior[i + 1..]));
            }
            '(' if !dot_parameter => {
                let Some(close) = matching_paren(interior, i) else {
                    // Unbalanced: fall back to a plain payload split.
                    return match interior.find(':') {
                        Some(colon) => (&interior[..colon], None, Some(&interior[colon + 1..])),
                        None => (interior, None, None),
                    };
                };
                let declaration = &interior[..i];
                let parameter = &interior[i + 1..close];
                let rest = &interior[close + 1..];
                let payload = rest.find(':').map(|colon| &rest[colon + 1..]);
                return (declaration, Some(parameter), payload);
            }
            '.' if dot_parameter => {
                let declaration = &interior[..i];
                let rest = &interior[i + 1..];
                return match rest.find(':') {
                    Some(colon) => (
                        declaration,
                        Some(&rest[..colon]),
                        Some(&rest[colon + 1..]),
                    ),
                    None => (declaration, Some(rest), None),
                };
            }
            c if c.is_whitespace() => {
                let declaration = &interior[..i];
                let rest = &interior[i..];
                let payload = rest.find(':').map(|colon| &rest[colon + 1..]);
                return (declaration, None, payload);
            }
            _ => {}
        }
    }
    (interior, None, None)
}

/// Byte index of the `)` matching the `(` at `open`, honoring nesting.
fn matching_paren(interior: &str, open: usize) -> Option<usize> {
    let mut level = 0usize;
    for (i, ch) in interior[open..].char_indices() {
        match ch {
            '(' => level += 1,
            ')' => {
                level -= 1;
                if level == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex1(source: &str) -> Verb {
        let verbs = lex(source, false);
        assert_eq!(verbs.len(), 1, "expected one verb in {source:?}");
        verbs.into_iter().next().unwrap()
    }

    #[test]
    fn bare_declaration() {
        let v = lex1("{delete}");
        assert_eq!(v.declaration, "delete");
        assert_eq!(v.parameter, None);
        assert_eq!(v.payload, None);
        assert_eq!(v.original, "{delete}");
    }

    #[test]
    fn parameter_and_payload() {
        let v = lex1("{if(1==1):yes|no}");
        assert_eq!(v.declaration, "if");
        assert_eq!(v.parameter.as_deref(), Some("1==1"));
        assert_eq!(v.payload.as_deref(), Some("yes|no"));
    }

    #[test]
    fn payload_only_keeps_colons() {
        let v = lex1("{strf:%H:%M}");
        assert_eq!(v.declaration, "strf");
        assert_eq!(v.payload.as_deref(), Some("%H:%M"));
    }

    #[test]
    fn nested_parens_in_parameter() {
        let v = lex1("{math((1+2)*3)}");
        assert_eq!(v.parameter.as_deref(), Some("(1+2)*3"));
    }

    #[test]
    fn unbalanced_paren_stays_in_declaration() {
        let v = lex1("{foo(bar:baz}");
        assert_eq!(v.declaration, "foo(bar");
        assert_eq!(v.parameter, None);
        assert_eq!(v.payload.as_deref(), Some("baz"));
    }

    #[test]
    fn whitespace_terminates_declaration() {
        let v = lex1("{user name}");
        assert_eq!(v.declaration, "user");
        assert_eq!(v.parameter, None);
        assert_eq!(v.payload, None);
    }

    #[test]
    fn dotted_parameter_mode() {
        let v = lex("{author.name}", true).pop().unwrap();
        assert_eq!(v.declaration, "author");
        assert_eq!(v.parameter.as_deref(), Some("name"));

        let v = lex("{if.1==1:yes}", true).pop().unwrap();
        assert_eq!(v.parameter.as_deref(), Some("1==1"));
        assert_eq!(v.payload.as_deref(), Some("yes"));
    }

    #[test]
    fn paren_is_literal_in_dot_mode() {
        let v = lex("{args(1)}", true).pop().unwrap();
        assert_eq!(v.declaration, "args(1)");
        assert_eq!(v.parameter, None);
    }

    #[test]
    fn closing_order_is_innermost_first() {
        let verbs = lex("{outer:{inner}}", false);
        assert_eq!(verbs.len(), 2);
        assert_eq!(verbs[0].declaration, "inner");
        assert_eq!(verbs[0].depth, 1);
        assert_eq!(verbs[1].declaration, "outer");
        assert_eq!(verbs[1].depth, 0);
    }

    #[test]
    fn sibling_verbs_emit_left_to_right() {
        let verbs = lex("{a} {b} {c}", false);
        let names: Vec<_> = verbs.iter().map(|v| v.declaration.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn unmatched_braces_emit_nothing() {
        assert!(lex("{open", false).is_empty());
        assert!(lex("close}", false).is_empty());
        assert!(lex("plain text", false).is_empty());
    }

    #[test]
    fn unmatched_open_before_verb() {
        let verbs = lex("{ {x}", false);
        assert_eq!(verbs.len(), 1);
        assert_eq!(verbs[0].declaration, "x");
        assert_eq!(verbs[0].span, Span::new(2, 5));
    }

    #[test]
    fn spans_are_byte_accurate() {
        let source = "héllo {x} wörld {y}";
        for v in lex(source, false) {
            assert_eq!(&source[v.span.start..v.span.end], v.original);
        }
    }
}
