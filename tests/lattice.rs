//! End-to-end lattice scenarios: flat domains defined by Horn clauses,
//! code-defined domains, their products, and the failure modes.

use std::thread;
use std::time::Duration;

use latlog::{
    Atom, Config, Engine, EvalError, FnRegistry, LatticeId, Outcome, PredSym, ProgramBuilder,
    Term, Value,
};

fn atom(name: &str) -> Value {
    Value::atom(name)
}

/// Declare a flat lattice `Bot < elems < Top` with clause-defined
/// operators: the `leq` axioms plus join axioms, with distinct-element
/// joins enumerated as facts.
fn flat_lattice(
    b: &mut ProgramBuilder,
    name: &str,
    elems: &[&str],
) -> (LatticeId, PredSym, PredSym) {
    let leq = b.lattice_fn(&format!("{name}_leq"), 2);
    let join = b.lattice_fn(&format!("{name}_join"), 3);
    let lat = b.lattice(name, leq, join);
    b.bottom(lat, atom("Bot"));

    // leq(Bot, x). leq(x, x). leq(x, Top).
    b.clause(
        Atom::new(leq, vec![Term::lit(atom("Bot")), Term::var("x")]),
        vec![],
    );
    b.clause(Atom::new(leq, vec![Term::var("x"), Term::var("x")]), vec![]);
    b.clause(
        Atom::new(leq, vec![Term::var("x"), Term::lit(atom("Top"))]),
        vec![],
    );

    // join(Bot, x, x). join(x, Bot, x). join(x, x, x).
    // join(Top, x, Top). join(x, Top, Top).
    b.clause(
        Atom::new(
            join,
            vec![Term::lit(atom("Bot")), Term::var("x"), Term::var("x")],
        ),
        vec![],
    );
    b.clause(
        Atom::new(
            join,
            vec![Term::var("x"), Term::lit(atom("Bot")), Term::var("x")],
        ),
        vec![],
    );
    b.clause(
        Atom::new(join, vec![Term::var("x"), Term::var("x"), Term::var("x")]),
        vec![],
    );
    b.clause(
        Atom::new(
            join,
            vec![Term::lit(atom("Top")), Term::var("x"), Term::lit(atom("Top"))],
        ),
        vec![],
    );
    b.clause(
        Atom::new(
            join,
            vec![Term::var("x"), Term::lit(atom("Top")), Term::lit(atom("Top"))],
        ),
        vec![],
    );
    for a in elems {
        for c in elems {
            if a != c {
                b.fact(join, vec![atom(a), atom(c), atom("Top")]);
            }
        }
    }
    (lat, leq, join)
}

/// The sign lattice with code-interpreted operators, same shape as
/// `flat_lattice`.
fn code_sign(b: &mut ProgramBuilder, registry: &mut FnRegistry) -> (LatticeId, PredSym, PredSym) {
    let leq = b.code("csign_leq", 2, 2);
    let join = b.code("csign_join", 3, 2);
    let lat = b.lattice("CSign", leq, join);
    b.bottom(lat, atom("Bot"));

    registry.register(leq, |args| {
        let ok = args[0] == Value::atom("Bot")
            || args[1] == Value::atom("Top")
            || args[0] == args[1];
        Some(Value::Bool(ok))
    });
    registry.register(join, |args| {
        Some(match (&args[0], &args[1]) {
            (a, b) if a == b => a.clone(),
            (a, _) if *a == Value::atom("Bot") => args[1].clone(),
            (_, b) if *b == Value::atom("Bot") => args[0].clone(),
            _ => Value::atom("Top"),
        })
    });
    (lat, leq, join)
}

fn sp(s: &str, p: &str) -> Value {
    Value::ctor("SP", vec![atom(s), atom(p)])
}

/// Product of a sign and a parity lattice: `leq`/`join` are one Horn
/// clause each, conjoining the component operators.
fn product_lattice(
    b: &mut ProgramBuilder,
    sign_ops: (PredSym, PredSym),
    parity_ops: (PredSym, PredSym),
) -> (LatticeId, PredSym, PredSym) {
    let leq = b.lattice_fn("sp_leq", 2);
    let join = b.lattice_fn("sp_join", 3);
    let lat = b.lattice("SP", leq, join);
    b.bottom(lat, sp("Bot", "Bot"));

    b.clause(
        Atom::new(
            leq,
            vec![
                Term::app("SP", vec![Term::var("s1"), Term::var("p1")]),
                Term::app("SP", vec![Term::var("s2"), Term::var("p2")]),
            ],
        ),
        vec![
            Atom::new(sign_ops.0, vec![Term::var("s1"), Term::var("s2")]),
            Atom::new(parity_ops.0, vec![Term::var("p1"), Term::var("p2")]),
        ],
    );
    b.clause(
        Atom::new(
            join,
            vec![
                Term::app("SP", vec![Term::var("s1"), Term::var("p1")]),
                Term::app("SP", vec![Term::var("s2"), Term::var("p2")]),
                Term::app("SP", vec![Term::var("s3"), Term::var("p3")]),
            ],
        ),
        vec![
            Atom::new(sign_ops.1, vec![Term::var("s1"), Term::var("s2"), Term::var("s3")]),
            Atom::new(parity_ops.1, vec![Term::var("p1"), Term::var("p2"), Term::var("p3")]),
        ],
    );
    (lat, leq, join)
}

#[test]
fn sign_constant_analysis_joins_to_top() {
    let mut b = ProgramBuilder::new();
    let (sign, _, _) = flat_lattice(&mut b, "Sign", &["Neg", "Zero", "Pos"]);
    let val = b.lattice_map("val", 1, sign);
    b.fact(val, vec![Value::string("x"), atom("Pos")]);
    b.fact(val, vec![Value::string("x"), atom("Neg")]);
    b.fact(val, vec![Value::string("z"), atom("Zero")]);

    let mut engine = Engine::new(b.build().unwrap(), FnRegistry::new()).unwrap();
    assert!(engine.run().is_fixpoint());

    assert_eq!(
        engine.lattice_value(val, &[Value::string("x")]),
        Some(atom("Top"))
    );
    assert_eq!(
        engine.lattice_value(val, &[Value::string("z")]),
        Some(atom("Zero"))
    );
    // Never-derived keys read as bottom.
    assert_eq!(
        engine.lattice_value(val, &[Value::string("y")]),
        Some(atom("Bot"))
    );
}

#[test]
fn lattice_deltas_drive_relation_clauses() {
    let mut b = ProgramBuilder::new();
    let (sign, _, _) = flat_lattice(&mut b, "Sign", &["Neg", "Zero", "Pos"]);
    let val = b.lattice_map("val", 1, sign);
    let unstable = b.relation("unstable", 1);
    // unstable(k) :- val(k, Top).
    b.clause(
        Atom::new(unstable, vec![Term::var("k")]),
        vec![Atom::new(val, vec![Term::var("k"), Term::lit(atom("Top"))])],
    );
    b.fact(val, vec![Value::string("x"), atom("Pos")]);
    b.fact(val, vec![Value::string("x"), atom("Neg")]);
    b.fact(val, vec![Value::string("z"), atom("Zero")]);

    let mut engine = Engine::new(b.build().unwrap(), FnRegistry::new()).unwrap();
    assert!(engine.run().is_fixpoint());

    let rel = engine.relation(unstable).unwrap();
    assert_eq!(rel.len(), 1);
    assert!(rel.contains(&vec![Value::string("x")]));
}

#[test]
fn inserting_bottom_changes_nothing() {
    let mut b = ProgramBuilder::new();
    let (sign, _, _) = flat_lattice(&mut b, "Sign", &["Neg", "Zero", "Pos"]);
    let val = b.lattice_map("val", 1, sign);

    let mut engine = Engine::new(b.build().unwrap(), FnRegistry::new()).unwrap();
    let changed = engine
        .insert(val, vec![Value::string("x"), atom("Bot")])
        .unwrap();
    assert!(!changed);
    assert_eq!(engine.derived_count(val), 0);
    assert!(engine.run().is_fixpoint());
    assert_eq!(engine.stats().deltas_processed, 0);
}

#[test]
fn product_leq_composes_componentwise() {
    let mut b = ProgramBuilder::new();
    let (_, s_leq, s_join) = flat_lattice(&mut b, "Sign", &["Neg", "Zero", "Pos"]);
    let (_, p_leq, p_join) = flat_lattice(&mut b, "Parity", &["Even", "Odd"]);
    let (sp_lat, _, _) = product_lattice(&mut b, (s_leq, s_join), (p_leq, p_join));

    let mut engine = Engine::new(b.build().unwrap(), FnRegistry::new()).unwrap();

    assert!(engine
        .lattice_leq(sp_lat, &sp("Pos", "Even"), &sp("Top", "Top"))
        .unwrap());
    assert!(engine
        .lattice_leq(sp_lat, &sp("Bot", "Bot"), &sp("Neg", "Odd"))
        .unwrap());
    assert!(!engine
        .lattice_leq(sp_lat, &sp("Pos", "Even"), &sp("Neg", "Odd"))
        .unwrap());
    assert!(!engine
        .lattice_leq(sp_lat, &sp("Top", "Even"), &sp("Top", "Odd"))
        .unwrap());

    assert_eq!(
        engine
            .lattice_join(sp_lat, &sp("Pos", "Even"), &sp("Neg", "Even"))
            .unwrap(),
        sp("Top", "Even")
    );
}

#[test]
fn product_map_merges_elementwise() {
    let mut b = ProgramBuilder::new();
    let (_, s_leq, s_join) = flat_lattice(&mut b, "Sign", &["Neg", "Zero", "Pos"]);
    let (_, p_leq, p_join) = flat_lattice(&mut b, "Parity", &["Even", "Odd"]);
    let (sp_lat, _, _) = product_lattice(&mut b, (s_leq, s_join), (p_leq, p_join));
    let state = b.lattice_map("state", 1, sp_lat);
    b.fact(state, vec![Value::string("v"), sp("Pos", "Even")]);
    b.fact(state, vec![Value::string("v"), sp("Neg", "Even")]);

    let mut engine = Engine::new(b.build().unwrap(), FnRegistry::new()).unwrap();
    assert!(engine.run().is_fixpoint());

    assert_eq!(
        engine.lattice_value(state, &[Value::string("v")]),
        Some(sp("Top", "Even"))
    );
}

#[test]
fn code_and_clause_lattices_mix_in_a_product() {
    let mut b = ProgramBuilder::new();
    let mut registry = FnRegistry::new();
    let (_, s_leq, s_join) = code_sign(&mut b, &mut registry);
    let (_, p_leq, p_join) = flat_lattice(&mut b, "Parity", &["Even", "Odd"]);
    let (sp_lat, _, _) = product_lattice(&mut b, (s_leq, s_join), (p_leq, p_join));
    let state = b.lattice_map("state", 1, sp_lat);
    b.fact(state, vec![Value::string("v"), sp("Pos", "Even")]);
    b.fact(state, vec![Value::string("v"), sp("Pos", "Odd")]);

    let mut engine = Engine::new(b.build().unwrap(), registry).unwrap();
    assert!(engine.run().is_fixpoint());

    assert_eq!(
        engine.lattice_value(state, &[Value::string("v")]),
        Some(sp("Pos", "Top"))
    );
}

#[test]
fn broken_code_lattice_fails_the_law_check() {
    let mut b = ProgramBuilder::new();
    let leq = b.code("bad_leq", 2, 2);
    let join = b.code("bad_join", 3, 2);
    let lat = b.lattice("Bad", leq, join);
    b.bottom(lat, atom("Bot"));
    let cell = b.lattice_map("cell", 1, lat);
    b.fact(cell, vec![Value::string("k"), atom("Pos")]);

    let mut registry = FnRegistry::new();
    registry.register(leq, |args| Some(Value::Bool(args[0] == args[1])));
    // join(x, y) = Bot: not idempotent, not an upper bound.
    registry.register(join, |_| Some(Value::atom("Bot")));

    let mut engine = Engine::new(b.build().unwrap(), registry).unwrap();
    match engine.run() {
        Outcome::Error(EvalError::LatticeLawViolation { lattice, .. }) => {
            assert_eq!(lattice, "Bad");
        }
        other => panic!("expected a law violation, got {other:?}"),
    }
}

#[test]
fn law_check_samples_literals_from_clause_bodies() {
    let mut b = ProgramBuilder::new();
    let leq = b.code("first_leq", 2, 2);
    let join = b.code("first_join", 3, 2);
    let lat = b.lattice("First", leq, join);
    b.bottom(lat, atom("Bot"));
    let cell = b.lattice_map("cell", 1, lat);
    let seen = b.relation("seen", 1);
    // seen(k) :- cell(k, High). -- High occurs nowhere but this body.
    b.clause(
        Atom::new(seen, vec![Term::var("k")]),
        vec![Atom::new(cell, vec![Term::var("k"), Term::lit(atom("High"))])],
    );

    let mut registry = FnRegistry::new();
    registry.register(leq, |args| {
        Some(Value::Bool(
            args[0] == args[1] || args[0] == Value::atom("Bot"),
        ))
    });
    // "join" keeps its left input: indistinguishable from correct on the
    // bottom alone, commutativity fails once High enters the sample set.
    registry.register(join, |args| Some(args[0].clone()));

    let mut engine = Engine::new(b.build().unwrap(), registry).unwrap();
    match engine.run() {
        Outcome::Error(EvalError::LatticeLawViolation { lattice, law, .. }) => {
            assert_eq!(lattice, "First");
            assert_eq!(law, "join(x, y) = join(y, x)");
        }
        other => panic!("expected a law violation, got {other:?}"),
    }
}

#[test]
fn non_monotone_join_detected_when_validation_enabled() {
    let mut b = ProgramBuilder::new();
    let leq = b.code("nm_leq", 2, 2);
    let join = b.code("nm_join", 3, 2);
    let lat = b.lattice("NonMono", leq, join);
    b.bottom(lat, Value::I32(0));
    let cell = b.lattice_map("cell", 1, lat);
    b.fact(cell, vec![Value::string("k"), Value::I32(3)]);
    b.fact(cell, vec![Value::string("k"), Value::I32(5)]);

    let mut registry = FnRegistry::new();
    registry.register(leq, |args| {
        Some(Value::Bool(args[0].as_i64() <= args[1].as_i64()))
    });
    // "join" takes the minimum: below its inputs, hence non-monotone.
    registry.register(join, |args| {
        let (a, b) = (args[0].as_i64()?, args[1].as_i64()?);
        Some(Value::I32(a.min(b) as i32))
    });

    let config = Config {
        check_laws: false,
        validate_joins: true,
        ..Config::default()
    };
    let mut engine = Engine::with_config(b.build().unwrap(), registry, config).unwrap();
    match engine.run() {
        Outcome::Error(EvalError::NonMonotoneJoin { lattice, .. }) => {
            assert_eq!(lattice, "NonMono");
        }
        other => panic!("expected non-monotone join, got {other:?}"),
    }
}

#[test]
fn cyclic_lattice_definition_exhausts_the_budget() {
    let mut b = ProgramBuilder::new();
    let leq = b.lattice_fn("loop_leq", 2);
    let join = b.lattice_fn("loop_join", 3);
    let lat = b.lattice("Loop", leq, join);
    b.bottom(lat, atom("Bot"));
    // loop_leq(x, y) :- loop_leq(x, y).
    b.clause(
        Atom::new(leq, vec![Term::var("x"), Term::var("y")]),
        vec![Atom::new(leq, vec![Term::var("x"), Term::var("y")])],
    );

    let config = Config {
        lattice_budget: 100,
        ..Config::default()
    };
    let mut engine = Engine::with_config(b.build().unwrap(), FnRegistry::new(), config).unwrap();
    match engine.lattice_leq(lat, &atom("A"), &atom("B")) {
        Err(EvalError::LatticeTimeoutOrOverflow { symbol }) => {
            assert_eq!(symbol, "loop_leq");
        }
        other => panic!("expected budget exhaustion, got {other:?}"),
    }
}

#[test]
fn join_without_answer_is_an_error() {
    let mut b = ProgramBuilder::new();
    let leq = b.lattice_fn("partial_leq", 2);
    let join = b.lattice_fn("partial_join", 3);
    let lat = b.lattice("Partial", leq, join);
    b.bottom(lat, atom("Bot"));
    b.clause(Atom::new(leq, vec![Term::var("x"), Term::var("x")]), vec![]);
    // join is only defined on equal elements.
    b.clause(
        Atom::new(join, vec![Term::var("x"), Term::var("x"), Term::var("x")]),
        vec![],
    );

    let mut engine = Engine::new(b.build().unwrap(), FnRegistry::new()).unwrap();
    match engine.lattice_join(lat, &atom("A"), &atom("B")) {
        Err(EvalError::JoinUndefined { lattice, .. }) => assert_eq!(lattice, "Partial"),
        other => panic!("expected undefined join, got {other:?}"),
    }
}

#[test]
fn unbounded_ascending_chain_cancels_promptly() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut b = ProgramBuilder::new();
    let leq = b.code("int_leq", 2, 2);
    let join = b.code("int_join", 3, 2);
    let lat = b.lattice("MaxInt", leq, join);
    b.bottom(lat, Value::I64(0));
    let counter = b.lattice_map("counter", 1, lat);
    let succ = b.code("succ", 2, 1);
    // counter(k, m) :- counter(k, n), succ(n, m). -- no upper bound.
    b.clause(
        Atom::new(counter, vec![Term::var("k"), Term::var("m")]),
        vec![
            Atom::new(counter, vec![Term::var("k"), Term::var("n")]),
            Atom::new(succ, vec![Term::var("n"), Term::var("m")]),
        ],
    );
    b.fact(counter, vec![Value::string("t"), Value::I64(1)]);

    let mut registry = FnRegistry::new();
    registry.register(leq, |args| {
        Some(Value::Bool(args[0].as_i64() <= args[1].as_i64()))
    });
    registry.register(join, |args| {
        Some(Value::I64(args[0].as_i64()?.max(args[1].as_i64()?)))
    });
    registry.register(succ, |args| Some(Value::I64(args[0].as_i64()? + 1)));

    let mut engine = Engine::new(b.build().unwrap(), registry).unwrap();
    let token = engine.cancel_token();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        token.cancel();
    });

    match engine.run() {
        Outcome::Cancelled => {}
        other => panic!("expected cancellation, got {other:?}"),
    }
    canceller.join().unwrap();

    // The partial database is non-empty and strictly ascended.
    let reached = engine
        .lattice_value(counter, &[Value::string("t")])
        .and_then(|v| v.as_i64())
        .unwrap();
    assert!(reached >= 1);
}
