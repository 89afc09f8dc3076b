//! Time formatting block.

use crate::block::{Block, Context};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone, Utc};

/// `{strf:%Y-%m-%d}` formats the injected clock's current time with the
/// payload as a strftime pattern; `{strf(1735689600):%Y}` formats the given
/// unix timestamp instead. An invalid pattern or timestamp leaves the verb
/// literal — formatting never panics.
pub struct StrftimeBlock;

impl Block for StrftimeBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        matches!(ctx.declaration(), "strf" | "strftime")
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let format = ctx.payload()?;
        if format.trim().is_empty() {
            return None;
        }

        let when: DateTime<Utc> = match ctx.parameter().map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => {
                let seconds = raw.parse::<i64>().ok()?;
                Utc.timestamp_opt(seconds, 0).single()?
            }
            None => ctx.clock().now(),
        };

        let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return None;
        }
        Some(when.format_with_items(items.iter()).to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::blocks::default_blocks;
    use crate::clock::FixedClock;
    use crate::interpreter::Interpreter;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn interp() -> Interpreter {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        Interpreter::new(default_blocks()).with_clock(Arc::new(FixedClock(instant)))
    }

    #[test]
    fn formats_the_injected_clock() {
        let body = interp().process("{strf:%Y-%m-%d %H:%M}", HashMap::new()).body;
        assert_eq!(body, "2024-05-01 12:30");
    }

    #[test]
    fn formats_a_unix_timestamp_parameter() {
        let body = interp().process("{strf(0):%Y}", HashMap::new()).body;
        assert_eq!(body, "1970");
    }

    #[test]
    fn invalid_pattern_is_literal() {
        let body = interp().process("{strf:%Q-nope}", HashMap::new()).body;
        assert_eq!(body, "{strf:%Q-nope}");
    }

    #[test]
    fn invalid_timestamp_is_literal() {
        let body = interp().process("{strf(soon):%Y}", HashMap::new()).body;
        assert_eq!(body, "{strf(soon):%Y}");
    }
}
