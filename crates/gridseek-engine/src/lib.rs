//! gridseek_engine - Grid model, search matching and selection aggregates.

pub mod engine;

#[cfg(test)]
mod tests {
    use crate::engine::*;
    use dashmap::DashMap;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_from_str_single_letter_columns() {
        let a1 = CellRef::from_str("A1").unwrap();
        assert_eq!(a1.row, 0);
        assert_eq!(a1.col, 0);

        let b1 = CellRef::from_str("B1").unwrap();
        assert_eq!(b1.row, 0);
        assert_eq!(b1.col, 1);

        let z1 = CellRef::from_str("Z1").unwrap();
        assert_eq!(z1.col, 25);
    }

    #[test]
    fn test_from_str_multi_letter_columns() {
        assert_eq!(CellRef::from_str("AA1").unwrap().col, 26);
        assert_eq!(CellRef::from_str("AZ1").unwrap().col, 51);
        assert_eq!(CellRef::from_str("BA1").unwrap().col, 52);
    }

    #[test]
    fn test_from_str_case_insensitive() {
        let lower = CellRef::from_str("a1").unwrap();
        assert_eq!(lower, CellRef::new(0, 0));
        assert_eq!(CellRef::from_str("aA10").unwrap(), CellRef::new(26, 9));
    }

    #[test]
    fn test_from_str_invalid_inputs() {
        assert!(CellRef::from_str("").is_none());
        assert!(CellRef::from_str("123").is_none());
        assert!(CellRef::from_str("ABC").is_none());
        assert!(CellRef::from_str("A0").is_none());
        assert!(CellRef::from_str("1A").is_none());
        assert!(CellRef::from_str("A 1").is_none());
    }

    #[test]
    fn test_display_round_trip() {
        for name in ["A1", "Z9", "AA10", "ZZ100"] {
            assert_eq!(CellRef::from_str(name).unwrap().to_string(), name);
        }
    }

    #[test]
    fn test_shared_grid_reads_through_arc() {
        let grid: Grid = Arc::new(DashMap::new());
        grid.insert(CellRef::new(0, 0), Cell::new_number(5.0));
        grid.insert(CellRef::new(0, 1), Cell::new_text("3.5"));
        grid.insert(CellRef::new(0, 2), Cell::new_text("abc"));

        let range = SelectionRange::parse("A1:A4").unwrap();
        let summary = compute_aggregate(&range, &grid).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.sum, 8.5);

        let matcher = TextMatcher::new("ABC").unwrap();
        assert_eq!(matcher.find_matches(&grid), vec![CellRef::new(0, 2)]);
    }

    fn arb_grid() -> impl Strategy<Value = GridSnapshot> {
        proptest::collection::btree_map(
            (0usize..6, 0usize..6).prop_map(|(col, row)| CellRef::new(col, row)),
            "[a-dA-D ]{0,6}".prop_map(|text| Cell::new_text(&text)),
            0..20,
        )
    }

    proptest! {
        /// Every match contains the term and every cell containing the term
        /// is matched exactly once, in row-major order.
        #[test]
        fn find_matches_is_exact(grid in arb_grid(), term in "[a-dA-D]{1,2}") {
            let matcher = TextMatcher::new(&term).unwrap();
            let found = matcher.find_matches(&grid);
            let needle = term.to_lowercase();

            let expected: Vec<CellRef> = grid
                .iter()
                .filter(|(_, cell)| {
                    cell.resolved_text()
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
                })
                .map(|(cell_ref, _)| cell_ref.clone())
                .collect();

            prop_assert_eq!(&found, &expected);
            prop_assert!(found.windows(2).all(|w| w[0] < w[1]));
        }

        /// Replacing with text that does not contain the term leaves nothing to find.
        #[test]
        fn replace_all_removes_term(text in "[a-dA-D ]{0,12}", term in "[a-d]{1,2}") {
            let matcher = TextMatcher::new(&term).unwrap();
            let replaced = matcher.replace_all(&text, "#");
            prop_assert!(!matcher.is_match(&replaced));
        }

        /// The aggregate never depends on which walk was used.
        #[test]
        fn aggregate_ignores_walk_strategy(
            values in proptest::collection::vec(-1000i32..1000, 2..12),
        ) {
            let grid: GridSnapshot = values
                .iter()
                .enumerate()
                .map(|(row, v)| (CellRef::new(0, row), Cell::new_number(*v as f64)))
                .collect();
            let tight = SelectionRange::from_corners(
                &CellRef::new(0, 0),
                &CellRef::new(0, values.len() - 1),
            );
            let wide = SelectionRange::from_corners(&CellRef::new(0, 0), &CellRef::new(9, 999));

            let a = compute_aggregate(&tight, &grid).unwrap();
            let b = compute_aggregate(&wide, &grid).unwrap();
            prop_assert_eq!(a, b);
            prop_assert_eq!(a.numeric_count, values.len());
            prop_assert_eq!(a.sum, values.iter().map(|v| *v as f64).sum::<f64>());
        }
    }
}
