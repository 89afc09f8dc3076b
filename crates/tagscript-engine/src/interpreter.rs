//! Recursive block-expansion interpreter.
//!
//! Runs the lexer once, then splices block output into a working copy of the
//! source, innermost verb first. Produced text is never re-lexed, so blocks
//! cannot smuggle new `{...}` into the output for re-interpretation — that
//! closes the exponential-expansion hole. `process` is infallible: author
//! mistakes degrade to literal rewriting and budget overruns set
//! `actions.aborted_by_limit`.

use crate::adapter::Adapter;
use crate::block::{Block, Context};
use crate::clock::{Clock, SystemClock};
use crate::lexer::{lex, parse_verb};
use crate::response::Response;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

pub const DEFAULT_WORK_LIMIT: usize = 10_000;
pub const DEFAULT_DEPTH_LIMIT: usize = 200;
pub const DEFAULT_CHAR_LIMIT: usize = 2_000;

/// Drives the expansion loop over a fixed block list. Blocks are probed in
/// registration order; configuration is fixed for the interpreter's
/// lifetime, so two interpreters with different parameter styles coexist.
pub struct Interpreter {
    blocks: Vec<Arc<dyn Block>>,
    dot_parameter: bool,
    work_limit: usize,
    depth_limit: usize,
    char_limit: usize,
    rng_seed: Option<u64>,
    clock: Arc<dyn Clock>,
}

impl Interpreter {
    pub fn new(blocks: Vec<Arc<dyn Block>>) -> Self {
        Interpreter {
            blocks,
            dot_parameter: false,
            work_limit: DEFAULT_WORK_LIMIT,
            depth_limit: DEFAULT_DEPTH_LIMIT,
            char_limit: DEFAULT_CHAR_LIMIT,
            rng_seed: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// `{name.param:payload}` instead of `{name(param):payload}`.
    pub fn with_dot_parameter(mut self, dot_parameter: bool) -> Self {
        self.dot_parameter = dot_parameter;
        self
    }

    pub fn with_work_limit(mut self, work_limit: usize) -> Self {
        self.work_limit = work_limit;
        self
    }

    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Cap on the rendered body, in codepoints.
    pub fn with_char_limit(mut self, char_limit: usize) -> Self {
        self.char_limit = char_limit;
        self
    }

    /// Pin the per-invocation RNG. With a pinned seed and clock the whole
    /// Response is byte-identical across runs.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Render `source` with the given seed variables.
    pub fn process(
        &self,
        source: &str,
        seed_variables: HashMap<String, Arc<dyn Adapter>>,
    ) -> Response {
        let verbs = lex(source, self.dot_parameter);
        let mut response = Response::new(seed_variables);
        let mut body = source.to_string();

        // Current location of every pending verb inside `body`. Verbs are
        // properly nested or disjoint, and each splice happens at a verb
        // that closes before all pending ones, so the adjustment below is
        // exact: later spans shift, enclosing spans grow.
        let mut spans: Vec<(usize, usize)> = verbs.iter().map(|v| (v.span.start, v.span.end)).collect();

        let mut rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let invocation_seed = self.rng_seed.unwrap_or_else(rand::random);
        let mut work = 0usize;

        for (i, lexed) in verbs.iter().enumerate() {
            if lexed.depth > self.depth_limit {
                response.actions.aborted_by_limit = true;
                break;
            }

            let (start, end) = spans[i];
            let current = &body[start..end];
            // Inner verbs were already replaced in place, so re-parsing the
            // current text is the nested-parameter pre-expansion: the verb's
            // parameter and payload arrive with inner results substituted.
            let verb = if current == lexed.original {
                lexed.clone()
            } else {
                parse_verb(current, self.dot_parameter, lexed.span, lexed.depth)
            };
            let dec = verb.declaration.to_lowercase();

            let result = {
                let mut ctx = Context {
                    verb: &verb,
                    dec: &dec,
                    response: &mut response,
                    source,
                    rng: &mut rng,
                    invocation_seed,
                    clock: self.clock.as_ref(),
                };
                let mut output = None;
                for block in &self.blocks {
                    if block.accepts(&ctx) {
                        output = block.process(&mut ctx);
                        break;
                    }
                }
                output
            };
            trace!(declaration = %verb.declaration, consumed = result.is_some(), "dispatched verb");

            if let Some(text) = result {
                // The splice that would cross the work budget is withheld,
                // so the output never grows past work_limit + len(source).
                let cost = text.chars().count().max(1);
                if work + cost > self.work_limit {
                    response.actions.aborted_by_limit = true;
                    break;
                }
                work += cost;

                let delta = text.len() as isize - (end - start) as isize;
                body.replace_range(start..end, &text);
                for span in spans.iter_mut().skip(i + 1) {
                    if span.0 >= end {
                        span.0 = (span.0 as isize + delta) as usize;
                        span.1 = (span.1 as isize + delta) as usize;
                    } else if span.0 <= start && span.1 >= end {
                        span.1 = (span.1 as isize + delta) as usize;
                    }
                }
            }

            if response.aborted {
                break;
            }
        }

        let mut final_body = response.body_override.take().unwrap_or(body);
        if final_body.chars().count() > self.char_limit {
            final_body = final_body.chars().take(self.char_limit).collect();
        }
        response.body = final_body;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::StringAdapter;
    use crate::blocks::default_blocks;

    fn interp() -> Interpreter {
        Interpreter::new(default_blocks())
    }

    fn no_vars() -> HashMap<String, Arc<dyn Adapter>> {
        HashMap::new()
    }

    #[test]
    fn verbless_source_is_identity() {
        let response = interp().process("plain text, no braces", no_vars());
        assert_eq!(response.body, "plain text, no braces");
        assert!(response.actions.is_empty());
    }

    #[test]
    fn unmatched_braces_are_preserved() {
        assert_eq!(interp().process("{open", no_vars()).body, "{open");
        assert_eq!(interp().process("close}", no_vars()).body, "close}");
        assert_eq!(interp().process("{", no_vars()).body, "{");
    }

    #[test]
    fn inner_verbs_expand_before_outer() {
        let mut vars = no_vars();
        vars.insert("args".into(), Arc::new(StringAdapter::new("yes")));
        let response = interp().process("{if({args}==yes):ok|no}", vars);
        assert_eq!(response.body, "ok");
    }

    #[test]
    fn sibling_replacements_keep_later_spans_aligned() {
        let mut vars = no_vars();
        vars.insert("a".into(), Arc::new(StringAdapter::new("longer value")));
        vars.insert("b".into(), Arc::new(StringAdapter::new("B")));
        let response = interp().process("[{a}] [{b}]", vars);
        assert_eq!(response.body, "[longer value] [B]");
    }

    #[test]
    fn declined_inner_replacement_stays_inside_outer() {
        // {missing} stays literal inside the payload of the outer verb.
        let response = interp().process("{=(x):{missing}}{x}", no_vars());
        assert_eq!(response.body, "{missing}");
    }

    #[test]
    fn work_limit_aborts_with_flag() {
        let mut vars = no_vars();
        vars.insert("v".into(), Arc::new(StringAdapter::new("x".repeat(100))));
        let source = "{v}".repeat(10);
        let interp = interp().with_work_limit(250);
        let response = interp.process(&source, vars);
        assert!(response.actions.aborted_by_limit);
        assert!(response.body.chars().count() <= 250 + source.chars().count());
    }

    #[test]
    fn depth_limit_aborts_with_flag() {
        let interp = interp().with_depth_limit(2);
        let response = interp.process("{a{b{c{d}}}}", no_vars());
        assert!(response.actions.aborted_by_limit);
    }

    #[test]
    fn body_is_trimmed_to_char_limit() {
        let mut vars = no_vars();
        vars.insert("v".into(), Arc::new(StringAdapter::new("0123456789")));
        let interp = interp().with_char_limit(5);
        let response = interp.process("{v}", vars);
        assert_eq!(response.body, "01234");
    }

    #[test]
    fn determinism_under_pinned_seed() {
        let interp = Interpreter::new(default_blocks()).with_rng_seed(42);
        let source = "{random:a,b,c,d,e} {5050:maybe} {range:1~100}";
        let first = interp.process(source, no_vars());
        let second = interp.process(source, no_vars());
        assert_eq!(first.body, second.body);
    }

    #[test]
    fn dot_parameter_style() {
        let mut vars = no_vars();
        vars.insert("args".into(), Arc::new(StringAdapter::new("one two")));
        let interp = Interpreter::new(default_blocks()).with_dot_parameter(true);
        let response = interp.process("{args.2}", vars);
        assert_eq!(response.body, "two");
    }
}
