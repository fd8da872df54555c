//! End-to-end tests: compile a dump program, apply overrides, run it per
//! document and read results back by feature reference.

use std::collections::BTreeMap;

use glaive::features::register_builtin_features;
use glaive::match_data::FeatureValue;
use glaive::prelude::*;

fn builtin_factory() -> BlueprintFactory {
    let mut factory = BlueprintFactory::new();
    register_builtin_features(&mut factory);
    factory
}

fn assert_approx(results: &BTreeMap<String, FeatureValue>, name: &str, expected: FeatureValue) {
    let actual = results
        .get(name)
        .unwrap_or_else(|| panic!("missing result entry '{name}'"));
    assert!(
        (actual - expected).abs() < 1e-6,
        "{name}: expected {expected}, got {actual}"
    );
}

#[test]
fn test_overrides() -> Result<()> {
    let factory = builtin_factory();
    let index_env = SimpleIndexEnvironment::new();

    let mut setup = RankSetup::new(&factory, &index_env);
    setup.add_dump_feature("value(1,2,3)");
    setup.add_dump_feature("double(value(1))");
    setup.add_dump_feature("double(value(2))");
    setup.add_dump_feature("double(value(3))");
    setup.add_dump_feature("mysum(value(2),value(2))");
    setup.add_dump_feature("mysum(value(1),value(2),value(3))");
    setup.compile()?;

    let mut program = setup.create_dump_program()?;

    let mut layout = MatchDataLayout::new();
    let query_env = SimpleQueryEnvironment::new();
    let mut overrides = Properties::new();
    overrides.add("value(2)", "20.0");
    overrides.add("value(1,2,3).1", "4.0");
    overrides.add("value(1,2,3).2", "6.0");
    overrides.add("bogus(feature)", "10.0");

    program.setup(&mut layout, &query_env, &overrides)?;
    program.run(2);

    let results = program.all_features();
    assert_eq!(results.len(), 20);

    assert_approx(&results, "value(1)", 1.0);
    assert_approx(&results, "value(1).0", 1.0);
    assert_approx(&results, "value(2)", 20.0);
    assert_approx(&results, "value(2).0", 20.0);
    assert_approx(&results, "value(3)", 3.0);
    assert_approx(&results, "value(3).0", 3.0);
    assert_approx(&results, "value(1,2,3)", 1.0);
    assert_approx(&results, "value(1,2,3).0", 1.0);
    assert_approx(&results, "value(1,2,3).1", 4.0);
    assert_approx(&results, "value(1,2,3).2", 6.0);
    assert_approx(&results, "mysum(value(2),value(2))", 40.0);
    assert_approx(&results, "mysum(value(2),value(2)).out", 40.0);
    assert_approx(&results, "mysum(value(1),value(2),value(3))", 24.0);
    assert_approx(&results, "mysum(value(1),value(2),value(3)).out", 24.0);
    assert_approx(&results, "double(value(1))", 2.0);
    assert_approx(&results, "double(value(1)).0", 2.0);
    assert_approx(&results, "double(value(2))", 40.0);
    assert_approx(&results, "double(value(2)).0", 40.0);
    assert_approx(&results, "double(value(3))", 6.0);
    assert_approx(&results, "double(value(3)).0", 6.0);
    Ok(())
}

#[test]
fn test_override_with_out_of_range_index_is_ignored() -> Result<()> {
    let factory = builtin_factory();
    let index_env = SimpleIndexEnvironment::new();

    let mut setup = RankSetup::new(&factory, &index_env);
    setup.add_dump_feature("value(7,8)");
    setup.compile()?;

    let mut program = setup.create_dump_program()?;
    let mut layout = MatchDataLayout::new();
    let query_env = SimpleQueryEnvironment::new();
    let mut overrides = Properties::new();
    overrides.add("value(7,8).9000", "1.0");
    overrides.add("value(7,8)", "not a number");

    program.setup(&mut layout, &query_env, &overrides)?;
    program.run(1);

    assert_eq!(program.feature_value("value(7,8).0"), Some(7.0));
    assert_eq!(program.feature_value("value(7,8).1"), Some(8.0));
    Ok(())
}

#[test]
fn test_override_order_does_not_matter() -> Result<()> {
    let mut results = Vec::new();
    for swap in [false, true] {
        let factory = builtin_factory();
        let index_env = SimpleIndexEnvironment::new();
        let mut setup = RankSetup::new(&factory, &index_env);
        setup.add_dump_feature("value(1,2,3)");
        setup.compile()?;

        let mut program = setup.create_dump_program()?;
        let mut layout = MatchDataLayout::new();
        let query_env = SimpleQueryEnvironment::new();
        let mut overrides = Properties::new();
        if swap {
            overrides.add("value(1,2,3).2", "6.0");
            overrides.add("value(1,2,3).1", "4.0");
        } else {
            overrides.add("value(1,2,3).1", "4.0");
            overrides.add("value(1,2,3).2", "6.0");
        }
        program.setup(&mut layout, &query_env, &overrides)?;
        program.run(1);
        results.push(program.all_features());
    }
    assert_eq!(results[0], results[1]);
    assert_approx(&results[0], "value(1,2,3).1", 4.0);
    assert_approx(&results[0], "value(1,2,3).2", 6.0);
    Ok(())
}

#[test]
fn test_matches_feature_end_to_end() -> Result<()> {
    let factory = builtin_factory();
    let mut index_env = SimpleIndexEnvironment::new();
    let title = index_env.add_field("title");

    let mut setup = RankSetup::new(&factory, &index_env);
    setup.add_dump_feature("matches(title)");
    setup.add_dump_feature("matches(removed_field)");
    setup.compile()?;

    let mut program = setup.create_dump_program()?;
    let mut layout = MatchDataLayout::new();
    let mut query_env = SimpleQueryEnvironment::new();
    let term = query_env.add_term();
    let handle = layout.alloc_term_field();
    query_env.bind_handle(term, title, handle);

    program.setup(&mut layout, &query_env, &Properties::new())?;
    program.match_data_mut().term_field_mut(handle).set_doc_id(5);

    program.run(5);
    assert_eq!(program.feature_value("matches(title)"), Some(1.0));
    assert_eq!(program.feature_value("matches(removed_field)"), Some(0.0));

    // Stale term-field state does not match the next document.
    program.run(6);
    assert_eq!(program.feature_value("matches(title)"), Some(0.0));
    Ok(())
}

#[test]
fn test_programs_on_separate_threads() -> Result<()> {
    let factory = builtin_factory();
    let index_env = SimpleIndexEnvironment::new();
    let mut setup = RankSetup::new(&factory, &index_env);
    setup.add_dump_feature("mysum(value(4),value(5))");
    setup.compile()?;

    // One compiled setup, one program and buffer per thread.
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let mut program = setup.create_dump_program().unwrap();
                let mut layout = MatchDataLayout::new();
                let query_env = SimpleQueryEnvironment::new();
                program
                    .setup(&mut layout, &query_env, &Properties::new())
                    .unwrap();
                for doc_id in 0..100 {
                    program.run(doc_id);
                    assert_eq!(
                        program.feature_value("mysum(value(4),value(5))"),
                        Some(9.0)
                    );
                }
            });
        }
    });
    Ok(())
}
