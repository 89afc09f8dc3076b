//! String utility blocks. Boundary conditions follow the Unicode codepoint
//! model, not bytes.

use crate::block::{Block, Context};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// `{replace(old,new):text}`
pub struct ReplaceBlock;

impl Block for ReplaceBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        ctx.declaration() == "replace"
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let (old, new) = ctx.parameter()?.split_once(',')?;
        if old.is_empty() {
            return None;
        }
        Some(ctx.payload().unwrap_or("").replace(old, new))
    }
}

/// `{substr(a):text}` takes the suffix from codepoint `a`; `{substr(a,b):text}`
/// takes `a..b`. Negative indices count from the end.
pub struct SubstringBlock;

impl Block for SubstringBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        matches!(ctx.declaration(), "substr" | "substring")
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let parameter = ctx.parameter()?.trim();
        let chars: Vec<char> = ctx.payload().unwrap_or("").chars().collect();
        let len = chars.len();

        let resolve = |raw: &str| -> Option<usize> {
            let index = raw.trim().parse::<i64>().ok()?;
            let resolved = if index < 0 {
                (len as i64 + index).max(0)
            } else {
                index.min(len as i64)
            };
            Some(resolved as usize)
        };

        let (start, end) = match parameter.split_once(',') {
            Some((a, b)) => (resolve(a)?, resolve(b)?),
            None => (resolve(parameter)?, len),
        };
        if start >= end {
            return Some(String::new());
        }
        Some(chars[start..end].iter().collect())
    }
}

// Everything but [0-9A-Za-z] is escaped; form mode keeps the space literal
// so it can become "+" afterwards.
const FORM: &AsciiSet = &NON_ALPHANUMERIC.remove(b' ');

/// `{urlencode:text}` percent-encodes the payload; `{urlencode(+):text}`
/// uses form style with spaces as `+`.
pub struct UrlEncodeBlock;

impl Block for UrlEncodeBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        ctx.declaration() == "urlencode"
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let text = ctx.payload()?;
        let encoded = match ctx.parameter().map(str::trim) {
            Some("+") => utf8_percent_encode(text, FORM)
                .to_string()
                .replace(' ', "+"),
            _ => utf8_percent_encode(text, NON_ALPHANUMERIC).to_string(),
        };
        Some(encoded)
    }
}

#[cfg(test)]
mod tests {
    use crate::blocks::default_blocks;
    use crate::interpreter::Interpreter;
    use std::collections::HashMap;

    fn render(source: &str) -> String {
        Interpreter::new(default_blocks())
            .process(source, HashMap::new())
            .body
    }

    #[test]
    fn replace_rewrites_occurrences() {
        assert_eq!(render("{replace(o,0):foo boo}"), "f00 b00");
        assert_eq!(render("{replace(l,L):hello}"), "heLLo");
    }

    #[test]
    fn replace_without_comma_is_literal() {
        assert_eq!(render("{replace(o):foo}"), "{replace(o):foo}");
    }

    #[test]
    fn substring_slices_codepoints() {
        assert_eq!(render("{substr(1):héllo}"), "éllo");
        assert_eq!(render("{substr(0,2):héllo}"), "hé");
        assert_eq!(render("{substr(-2):héllo}"), "lo");
        assert_eq!(render("{substr(3,1):abc}"), "");
        assert_eq!(render("{substr(0,99):ab}"), "ab");
    }

    #[test]
    fn urlencode_percent_and_form_styles() {
        assert_eq!(render("{urlencode:a b&c}"), "a%20b%26c");
        assert_eq!(render("{urlencode(+):a b&c}"), "a+b%26c");
    }
}
