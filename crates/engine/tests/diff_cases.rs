use engine::{Engine, EngineConfig};
use std::path::Path;
use vdom_test_support::assert_markup_eq;
use vdom_test_support::fixtures::{DiffCase, load_diff_cases, to_pretty_json};

fn cases() -> Vec<DiffCase> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/diff_cases.toml");
    load_diff_cases(&path)
}

fn engine_for(case: &DiffCase) -> Engine {
    let config = EngineConfig::from_toml_str(&case.config_toml())
        .unwrap_or_else(|err| panic!("{}: bad config: {err}", case.id));
    Engine::from_config(config).unwrap_or_else(|err| panic!("{}: bad config: {err}", case.id))
}

#[test]
fn scripts_match_expected_actions() {
    for case in cases() {
        let engine = engine_for(&case);
        let script = engine.diff(&case.before, &case.after);
        if let Some(expected) = &case.actions {
            let actual: Vec<&str> = script.iter().map(|op| op.action()).collect();
            assert_eq!(
                actual,
                *expected,
                "{}: unexpected script\n{}",
                case.id,
                to_pretty_json(&script)
            );
        }
        if let Some(max_ops) = case.max_ops {
            assert!(
                script.len() <= max_ops,
                "{}: {} ops exceed the cap of {max_ops}",
                case.id,
                script.len()
            );
        }
    }
}

#[test]
fn scripts_apply_and_undo_against_live_documents() {
    for case in cases() {
        let engine = engine_for(&case);
        let script = engine.diff(&case.before, &case.after);
        let mut doc = engine.materialize(&case.before);
        engine
            .apply(&mut doc, &script)
            .unwrap_or_else(|err| panic!("{}: apply failed: {err}", case.id));
        if case.converges {
            assert_markup_eq(&engine.to_markup(&case.after), &engine.to_markup(&doc), &case.id);
        }
        engine
            .undo(&mut doc, &script)
            .unwrap_or_else(|err| panic!("{}: undo failed: {err}", case.id));
        assert_markup_eq(&engine.to_markup(&case.before), &engine.to_markup(&doc), &case.id);
    }
}

#[test]
fn live_side_diff_matches_markup_side_diff() {
    for case in cases() {
        let engine = engine_for(&case);
        let doc = engine.materialize(&case.before);
        assert_eq!(
            engine.diff(&doc, &case.after),
            engine.diff(&case.before, &case.after),
            "{}",
            case.id
        );
    }
}
