//! Property tests for display width, column sizing and name sanitizing.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use hivesheet_core::sheet::naming::{SheetNameRegistry, sanitize_filename};
use hivesheet_core::sheet::width::{column_widths, display_width};
use hivesheet_core::{CellValue, Dataset};
use proptest::prelude::*;

fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

proptest! {
    #[test]
    fn display_width_counts_cjk_twice(s in "\\PC{0,64}") {
        let cjk = s.chars().filter(|c| is_cjk(*c)).count();
        let other = s.chars().count() - cjk;
        prop_assert_eq!(display_width(&s), 2 * cjk + other);
    }

    #[test]
    fn column_width_never_exceeds_max(
        header in "[a-z\u{4E00}-\u{4E20}]{0,20}",
        cells in prop::collection::vec("\\PC{0,200}", 0..10),
        max_width in 1usize..150,
    ) {
        let rows = cells.into_iter().map(|c| vec![CellValue::Text(c)]).collect();
        let dataset = Dataset::new(vec![header.clone()], rows).unwrap();
        let widths = column_widths(&dataset, max_width);

        prop_assert_eq!(widths.len(), 1);
        prop_assert!(widths[0] <= max_width);
        prop_assert!(widths[0] >= (display_width(&header) + 2).min(max_width));
    }

    #[test]
    fn sanitize_filename_removes_illegal_chars(s in "\\PC{0,400}") {
        let sanitized = sanitize_filename(&s);
        prop_assert!(!sanitized.contains(['<', '>', ':', '"', '/', '\\', '|', '?', '*']));
        prop_assert!(sanitized.chars().count() <= 255);
    }

    #[test]
    fn sheet_registry_never_repeats(bases in prop::collection::vec("[A-Za-z_]{1,40}", 1..20)) {
        let mut registry = SheetNameRegistry::new();
        for base in &bases {
            let name = registry.unique(base);
            prop_assert!(!registry.contains(&name));
            prop_assert!(name.chars().count() <= 31);
            registry.register(&name);
        }
        prop_assert_eq!(registry.len(), bases.len());
    }
}

#[test]
fn test_empty_string_has_zero_width() {
    assert_eq!(display_width(""), 0);
}
