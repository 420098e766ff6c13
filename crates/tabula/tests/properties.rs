// Property-based tests for sheet consistency under random edits.
// CI: 128 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;
use tabula::{parse_formula, Error, Position, Sheet, Size};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_128() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(128),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Op {
    Set(Position, String),
    Clear(Position),
}

/// Positions on a small grid, so that edits collide often
fn arb_pos() -> impl Strategy<Value = Position> {
    (0..4i32, 0..4i32).prop_map(|(row, col)| Position::new(row, col))
}

fn arb_formula() -> impl Strategy<Value = String> {
    (
        arb_pos(),
        prop::sample::select(vec!['+', '-', '*', '/']),
        prop_oneof![
            arb_pos().prop_map(|p| p.to_string()),
            "[0-9]{1,2}".prop_map(String::from),
        ],
    )
        .prop_map(|(left, op, right)| format!("={}{}{}", left, op, right))
}

/// Cell text: mostly formulas, sometimes numbers, words or nothing
fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => arb_formula(),
        2 => r"-?[0-9]{1,3}".prop_map(String::from),
        1 => r"[a-z]{1,4}".prop_map(String::from),
        1 => Just(String::new()),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => (arb_pos(), arb_text()).prop_map(|(p, t)| Op::Set(p, t)),
        1 => arb_pos().prop_map(Op::Clear),
    ]
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Whether `from` transitively reads `target` through the sheet's cells
fn reaches(sheet: &Sheet, from: Position, target: Position) -> bool {
    let mut stack = vec![from];
    let mut seen = HashSet::new();

    while let Some(pos) = stack.pop() {
        if pos == target {
            return true;
        }
        if !seen.insert(pos) {
            continue;
        }
        if let Some(view) = sheet.get_cell(pos).unwrap() {
            stack.extend_from_slice(view.referenced_cells());
        }
    }

    false
}

fn references_of(text: &str) -> Vec<Position> {
    match text.strip_prefix('=') {
        Some(expression) if !expression.is_empty() => parse_formula(expression)
            .map(|f| f.referenced_cells().to_vec())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn assert_acyclic(sheet: &Sheet) {
    for view in sheet.cells() {
        for &referenced in view.referenced_cells() {
            assert!(
                !reaches(sheet, referenced, view.position()),
                "{} is part of a cycle",
                view.position()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_128())]

    /// Rejections happen exactly for writes that would close a cycle
    #[test]
    fn cycle_rejection_is_exact(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut sheet = Sheet::new();

        for op in ops {
            match op {
                Op::Set(pos, text) => {
                    let refs = references_of(&text);
                    let cyclic = refs.iter().any(|&r| reaches(&sheet, r, pos));
                    let before = sheet.texts_to_string();

                    match sheet.set_cell(pos, text) {
                        Ok(()) => prop_assert!(!cyclic),
                        Err(err) => {
                            prop_assert_eq!(err, Error::CircularDependency(pos));
                            prop_assert!(cyclic);
                            prop_assert_eq!(sheet.texts_to_string(), before);
                        }
                    }
                }
                Op::Clear(pos) => sheet.clear_cell(pos).unwrap(),
            }
            assert_acyclic(&sheet);
        }
    }

    /// Memoized values always match a sheet built from scratch
    #[test]
    fn cached_values_match_fresh_sheet(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut sheet = Sheet::new();
        let mut accepted = Vec::new();

        for op in ops {
            let ok = match &op {
                Op::Set(pos, text) => sheet.set_cell(*pos, text.clone()).is_ok(),
                Op::Clear(pos) => sheet.clear_cell(*pos).is_ok(),
            };
            if ok {
                accepted.push(op);
            }
            // Populate caches between edits
            let _ = sheet.values_to_string();
        }

        let mut fresh = Sheet::new();
        for op in accepted {
            match op {
                Op::Set(pos, text) => fresh.set_cell(pos, text).unwrap(),
                Op::Clear(pos) => fresh.clear_cell(pos).unwrap(),
            }
        }

        prop_assert_eq!(sheet.values_to_string(), fresh.values_to_string());
        prop_assert_eq!(sheet.texts_to_string(), fresh.texts_to_string());
        prop_assert_eq!(sheet.graph().edge_count(), fresh.graph().edge_count());
    }

    /// The printable area reaches exactly the furthest populated cell
    #[test]
    fn printable_size_covers_cells(ops in prop::collection::vec(arb_op(), 0..30)) {
        let mut sheet = Sheet::new();
        for op in ops {
            let _ = match op {
                Op::Set(pos, text) => sheet.set_cell(pos, text),
                Op::Clear(pos) => sheet.clear_cell(pos),
            };
        }

        let expected = sheet.cells().fold(Size::new(0, 0), |size, view| {
            let pos = view.position();
            Size::new(size.rows.max(pos.row + 1), size.cols.max(pos.col + 1))
        });
        prop_assert_eq!(sheet.printable_size(), expected);
        prop_assert_eq!(sheet.is_empty(), expected == Size::new(0, 0));

        let rendered = sheet.texts_to_string();
        prop_assert_eq!(rendered.lines().count(), expected.rows as usize);
    }
}
