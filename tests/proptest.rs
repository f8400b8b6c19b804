//! Property tests for the solver invariants: order independence,
//! idempotence, semi-naive/naive agreement, and the lattice laws.

use std::collections::BTreeSet;

use latlog::{
    Atom, Config, Engine, FnRegistry, LatticeId, PredSym, Program, ProgramBuilder, Term, Value,
};
use proptest::prelude::*;

// --- Strategies ---

fn arb_edges() -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((0i32..8, 0i32..8), 0..24)
}

fn arb_sign() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::atom("Bot")),
        Just(Value::atom("Neg")),
        Just(Value::atom("Zero")),
        Just(Value::atom("Pos")),
        Just(Value::atom("Top")),
    ]
}

// --- Fixtures ---

fn closure_program(edges: &[(i32, i32)], swap_body: bool) -> (Program, PredSym) {
    let mut b = ProgramBuilder::new();
    let edge = b.relation("edge", 2);
    let path = b.relation("path", 2);
    b.clause(
        Atom::new(path, vec![Term::var("x"), Term::var("y")]),
        vec![Atom::new(edge, vec![Term::var("x"), Term::var("y")])],
    );
    let mut body = vec![
        Atom::new(edge, vec![Term::var("x"), Term::var("y")]),
        Atom::new(path, vec![Term::var("y"), Term::var("z")]),
    ];
    if swap_body {
        body.reverse();
    }
    b.clause(Atom::new(path, vec![Term::var("x"), Term::var("z")]), body);
    for (a, c) in edges {
        b.fact(edge, vec![Value::I32(*a), Value::I32(*c)]);
    }
    (b.build().unwrap(), path)
}

fn paths(engine: &Engine, path: PredSym) -> BTreeSet<(i32, i32)> {
    engine
        .relation(path)
        .unwrap()
        .iter()
        .map(|t| match t.as_slice() {
            [Value::I32(a), Value::I32(b)] => (*a, *b),
            other => panic!("unexpected row {other:?}"),
        })
        .collect()
}

/// Clause-defined flat sign lattice, as the analyses under test declare it.
fn sign_program() -> (Program, LatticeId, PredSym) {
    let mut b = ProgramBuilder::new();
    let leq = b.lattice_fn("sign_leq", 2);
    let join = b.lattice_fn("sign_join", 3);
    let lat = b.lattice("Sign", leq, join);
    b.bottom(lat, Value::atom("Bot"));

    b.clause(
        Atom::new(leq, vec![Term::lit(Value::atom("Bot")), Term::var("x")]),
        vec![],
    );
    b.clause(Atom::new(leq, vec![Term::var("x"), Term::var("x")]), vec![]);
    b.clause(
        Atom::new(leq, vec![Term::var("x"), Term::lit(Value::atom("Top"))]),
        vec![],
    );
    b.clause(
        Atom::new(
            join,
            vec![Term::lit(Value::atom("Bot")), Term::var("x"), Term::var("x")],
        ),
        vec![],
    );
    b.clause(
        Atom::new(
            join,
            vec![Term::var("x"), Term::lit(Value::atom("Bot")), Term::var("x")],
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
            vec![
                Term::lit(Value::atom("Top")),
                Term::var("x"),
                Term::lit(Value::atom("Top")),
            ],
        ),
        vec![],
    );
    b.clause(
        Atom::new(
            join,
            vec![
                Term::var("x"),
                Term::lit(Value::atom("Top")),
                Term::lit(Value::atom("Top")),
            ],
        ),
        vec![],
    );
    let elems = ["Neg", "Zero", "Pos"];
    for a in elems {
        for c in elems {
            if a != c {
                b.fact(join, vec![Value::atom(a), Value::atom(c), Value::atom("Top")]);
            }
        }
    }
    let cell = b.lattice_map("cell", 1, lat);
    (b.build().unwrap(), lat, cell)
}

// --- Oracles ---

fn oracle_leq(a: &Value, b: &Value) -> bool {
    *a == Value::atom("Bot") || *b == Value::atom("Top") || a == b
}

fn oracle_join(a: &Value, b: &Value) -> Value {
    if a == b {
        a.clone()
    } else if *a == Value::atom("Bot") {
        b.clone()
    } else if *b == Value::atom("Bot") {
        a.clone()
    } else {
        Value::atom("Top")
    }
}

proptest! {
    #[test]
    fn naive_and_seminaive_agree(edges in arb_edges()) {
        let (program, path) = closure_program(&edges, false);

        let mut semi = Engine::new(program.clone(), FnRegistry::new()).unwrap();
        let mut naive = Engine::with_config(
            program,
            FnRegistry::new(),
            Config { seminaive: false, ..Config::default() },
        )
        .unwrap();

        prop_assert!(semi.run().is_fixpoint());
        prop_assert!(naive.run().is_fixpoint());
        prop_assert_eq!(paths(&semi, path), paths(&naive, path));
    }

    #[test]
    fn second_solve_adds_nothing(edges in arb_edges()) {
        let (program, path) = closure_program(&edges, false);
        let mut engine = Engine::new(program, FnRegistry::new()).unwrap();
        prop_assert!(engine.run().is_fixpoint());
        let first = paths(&engine, path);
        let changed = engine.stats().inserts_changed;

        prop_assert!(engine.run().is_fixpoint());
        prop_assert_eq!(paths(&engine, path), first);
        prop_assert_eq!(engine.stats().inserts_changed, changed);
    }

    #[test]
    fn body_permutation_preserves_the_model(edges in arb_edges()) {
        let (forward, path_f) = closure_program(&edges, false);
        let (swapped, path_s) = closure_program(&edges, true);

        let mut a = Engine::new(forward, FnRegistry::new()).unwrap();
        let mut b = Engine::new(swapped, FnRegistry::new()).unwrap();
        prop_assert!(a.run().is_fixpoint());
        prop_assert!(b.run().is_fixpoint());
        prop_assert_eq!(paths(&a, path_f), paths(&b, path_s));
    }

    #[test]
    fn clause_sign_matches_the_oracle(a in arb_sign(), b in arb_sign()) {
        let (program, lat, _) = sign_program();
        let mut engine = Engine::new(program, FnRegistry::new()).unwrap();

        prop_assert_eq!(engine.lattice_leq(lat, &a, &b).unwrap(), oracle_leq(&a, &b));
        prop_assert_eq!(engine.lattice_join(lat, &a, &b).unwrap(), oracle_join(&a, &b));
    }

    #[test]
    fn clause_sign_join_is_commutative_and_bounding(a in arb_sign(), b in arb_sign()) {
        let (program, lat, _) = sign_program();
        let mut engine = Engine::new(program, FnRegistry::new()).unwrap();

        let ab = engine.lattice_join(lat, &a, &b).unwrap();
        let ba = engine.lattice_join(lat, &b, &a).unwrap();
        prop_assert_eq!(&ab, &ba);
        prop_assert!(engine.lattice_leq(lat, &a, &ab).unwrap());
        prop_assert!(engine.lattice_leq(lat, &b, &ab).unwrap());
        prop_assert!(engine.lattice_leq(lat, &Value::atom("Bot"), &ab).unwrap());
    }

    #[test]
    fn cell_value_is_insertion_order_independent(values in prop::collection::vec(arb_sign(), 1..6)) {
        let (program, _, cell) = sign_program();
        let key = Value::string("k");

        let mut forward = Engine::new(program.clone(), FnRegistry::new()).unwrap();
        for v in &values {
            forward.insert(cell, vec![key.clone(), v.clone()]).unwrap();
        }

        let mut backward = Engine::new(program, FnRegistry::new()).unwrap();
        for v in values.iter().rev() {
            backward.insert(cell, vec![key.clone(), v.clone()]).unwrap();
        }

        prop_assert_eq!(
            forward.lattice_value(cell, &[key.clone()]),
            backward.lattice_value(cell, &[key.clone()])
        );
    }
}
