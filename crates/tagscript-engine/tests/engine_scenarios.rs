//! End-to-end rendering scenarios over the public engine API.

use std::collections::HashMap;
use std::sync::Arc;

use tagscript_engine::{
    default_blocks, Adapter, IntAdapter, Interpreter, Member, MemberAdapter, StringAdapter,
};

fn interp() -> Interpreter {
    Interpreter::new(default_blocks())
}

fn vars(entries: Vec<(&str, Arc<dyn Adapter>)>) -> HashMap<String, Arc<dyn Adapter>> {
    entries
        .into_iter()
        .map(|(name, adapter)| (name.to_string(), adapter))
        .collect()
}

#[test]
fn author_attribute_renders() {
    let member = Member {
        id: 1,
        name: "Ada".into(),
        ..Default::default()
    };
    let seed = vars(vec![("author", Arc::new(MemberAdapter::new(&member)))]);
    let response = interp().process("hello {author(name)}", seed);
    assert_eq!(response.body, "hello Ada");
    assert!(response.actions.is_empty());
}

#[test]
fn if_over_seeded_args() {
    let seed = vars(vec![("args", Arc::new(StringAdapter::new("yes")))]);
    let response = interp().process("{if({args}==yes):ok|no}", seed);
    assert_eq!(response.body, "ok");
}

#[test]
fn assign_then_math() {
    let response = interp().process("{=(n):3}{math:{n}*4}", HashMap::new());
    assert_eq!(response.body, "12");
    let n = response.variable("n").unwrap().get_value(None);
    assert_eq!(n.as_deref(), Some("3"));
}

#[test]
fn delete_action_with_body() {
    let response = interp().process("{delete}hi", HashMap::new());
    assert_eq!(response.body, "hi");
    assert_eq!(response.actions.delete, Some(true));
}

#[test]
fn require_records_predicate_for_the_executor() {
    let response = interp().process("{require(Admin):only admins}", HashMap::new());
    assert_eq!(response.body, "");
    let requires = response.actions.requires.unwrap();
    assert_eq!(requires.items, ["Admin"]);
    assert_eq!(requires.response.as_deref(), Some("only admins"));
}

#[test]
fn random_choice_is_deterministic_per_seed() {
    let interp = Interpreter::new(default_blocks()).with_rng_seed(0);
    let first = interp.process("{#:a,b,c}", HashMap::new());
    let second = interp.process("{#:a,b,c}", HashMap::new());
    assert_eq!(first.body, second.body);
    assert!(["a", "b", "c"].contains(&first.body.as_str()));
}

#[test]
fn verbless_source_round_trips() {
    for source in ["", "hello", "no verbs here }{ backwards"] {
        let response = interp().process(source, HashMap::new());
        assert_eq!(response.body, source);
        assert!(response.actions.is_empty());
        assert!(!response.aborted);
    }
}

#[test]
fn loose_getter_contract() {
    let seed = vars(vec![("name", Arc::new(StringAdapter::new("Grace")))]);
    assert_eq!(interp().process("{name}", seed).body, "Grace");
    assert_eq!(interp().process("{name}", HashMap::new()).body, "{name}");
}

#[test]
fn unaccepted_verb_is_identity() {
    let source = "{definitely_not_a_block(x):y}";
    let response = interp().process(source, HashMap::new());
    assert_eq!(response.body, source);
}

#[test]
fn stop_payload_dominates_output() {
    let response = interp().process(
        "start {stop({args}==):no arguments passed} {=(x):1}{x} end",
        vars(vec![("args", Arc::new(StringAdapter::new("")))]),
    );
    assert_eq!(response.body, "no arguments passed");
    assert!(response.aborted);
    assert!(response.variable("x").is_none());
}

#[test]
fn uses_counter_renders_as_int() {
    let seed = vars(vec![("uses", Arc::new(IntAdapter::new(17)))]);
    let response = interp().process("used {uses} times", seed);
    assert_eq!(response.body, "used 17 times");
}

#[test]
fn output_length_is_bounded_by_work_limit() {
    let seed = vars(vec![("v", Arc::new(StringAdapter::new("a".repeat(500))))]);
    let source = "{v}{v}{v}{v}{v}{v}{v}{v}";
    let interp = interp().with_work_limit(1_000).with_char_limit(100_000);
    let response = interp.process(source, seed);
    assert!(response.actions.aborted_by_limit);
    assert!(response.body.chars().count() <= 1_000 + source.chars().count());
}

#[test]
fn unbalanced_parameter_is_rewritten_literally() {
    let source = "{if(1==1:yes|no}";
    let response = interp().process(source, HashMap::new());
    assert_eq!(response.body, source);
}

#[test]
fn command_cap_replacement_text() {
    let response = interp().process("{c:a}{c:b}{c:c}{c:d}", HashMap::new());
    assert_eq!(response.body, "`COMMAND LIMIT REACHED (3)`");
    assert_eq!(response.actions.commands.len(), 3);
}

#[test]
fn fixed_rng_and_clock_give_byte_identical_responses() {
    use chrono::TimeZone;
    use tagscript_engine::FixedClock;

    let clock = Arc::new(FixedClock(
        chrono::Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    ));
    let source = "{strf:%Y-%m-%d} {random:x,y,z} {5050:!} {range:1~9}";
    let build = || {
        Interpreter::new(default_blocks())
            .with_rng_seed(99)
            .with_clock(clock.clone())
    };
    let first = build().process(source, HashMap::new());
    let second = build().process(source, HashMap::new());
    assert_eq!(first.body, second.body);
    assert_eq!(first.actions, second.actions);
    assert!(first.body.starts_with("2025-01-01 "));
}
