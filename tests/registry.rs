mod common;

use common::{Schema, mol};
use molhilite::highlight::{ColorInfo, ColorInfoRegistry, ColumnId, ExclusionFlag, PurposeKind};
use molhilite::table::ColumnRemap;

fn substructure(column: usize, flag: u32) -> ColorInfo {
    ColorInfo::substructure_filter(
        ColumnId(column),
        ExclusionFlag(flag),
        false,
        vec![mol("c1ccccc1")],
        10,
    )
}

#[test]
fn new_table_tracks_every_structure_column() {
    let mut reg = ColorInfoRegistry::new(true);
    reg.put(substructure(0, 1));
    reg.on_new_table(&Schema::new(&[true, false, true], 3));

    assert_eq!(reg.len(), 2, "old entries cleared, one per structure column");
    assert!(reg.get(ColumnId(0), PurposeKind::SubstructureFilter).is_none());
    for c in [0, 2] {
        let info = reg.get(ColumnId(c), PurposeKind::SimilarityToCurrentRow).unwrap();
        assert!(info.references().is_empty());
    }
    assert!(reg.get(ColumnId(1), PurposeKind::SimilarityToCurrentRow).is_none());
}

#[test]
fn new_table_without_tracking_is_empty() {
    let mut reg = ColorInfoRegistry::new(false);
    reg.on_new_table(&Schema::new(&[true, true], 3));
    assert!(reg.is_empty());
}

#[test]
fn columns_added_only_covers_new_columns() {
    let mut reg = ColorInfoRegistry::new(true);
    reg.on_new_table(&Schema::new(&[true], 1));
    reg.on_current_row_changed(ColumnId(0), Some(mol("CCO")));

    reg.on_columns_added(&Schema::new(&[true, false, true], 1), ColumnId(1));
    assert_eq!(reg.len(), 2);
    assert!(reg.get(ColumnId(2), PurposeKind::SimilarityToCurrentRow).is_some());
    // existing entry untouched
    let first = reg.get(ColumnId(0), PurposeKind::SimilarityToCurrentRow).unwrap();
    assert_eq!(first.references().len(), 1);
}

#[test]
fn columns_removed_remaps_and_drops() {
    let mut reg = ColorInfoRegistry::new(false);
    reg.put(substructure(2, 1));
    reg.put(substructure(5, 2));
    reg.put(substructure(7, 3));

    let mut map = vec![None; 8];
    map[0] = Some(ColumnId(0));
    map[2] = Some(ColumnId(1));
    map[7] = Some(ColumnId(5));
    reg.on_columns_removed(&ColumnRemap::new(map), 7);

    let mut columns: Vec<usize> = reg.iter().map(|i| i.column().0).collect();
    columns.sort();
    assert_eq!(columns, vec![1, 5]);
    let moved = reg.get(ColumnId(5), PurposeKind::SubstructureFilter).unwrap();
    assert!(moved.is_bound_to(ExclusionFlag(3)), "entry formerly at 7 now at 5");
    let shifted = reg.get(ColumnId(1), PurposeKind::SubstructureFilter).unwrap();
    assert!(shifted.is_bound_to(ExclusionFlag(1)));
}

#[test]
fn removing_helper_shifts_following_columns() {
    let remap = ColumnRemap::removing(4, &[ColumnId(1)]);
    assert_eq!(remap.get(ColumnId(0)), Some(Some(ColumnId(0))));
    assert_eq!(remap.get(ColumnId(1)), Some(None));
    assert_eq!(remap.get(ColumnId(3)), Some(Some(ColumnId(2))));
    assert_eq!(remap.get(ColumnId(4)), None);
}

#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "out of sync"))]
fn desynchronized_entry_is_dropped() {
    let mut reg = ColorInfoRegistry::new(false);
    reg.put(substructure(3, 1));
    // remap only knows about two columns
    reg.on_columns_removed(&ColumnRemap::removing(2, &[]), 2);
    assert!(reg.is_empty());
}

#[test]
fn exclusion_removed_drops_bound_entry() {
    let mut reg = ColorInfoRegistry::new(false);
    reg.put(substructure(0, 4));
    reg.put(substructure(1, 5));

    let removed = reg.on_exclusion_removed(ExclusionFlag(4)).unwrap();
    assert_eq!(removed.column(), ColumnId(0));
    assert_eq!(reg.len(), 1);
    assert!(reg.on_exclusion_freed(ExclusionFlag(4)).is_none());
    assert!(reg.on_exclusion_freed(ExclusionFlag(5)).is_some());
    assert!(reg.is_empty());
}

#[test]
fn exclusion_inverted_toggles_all_bound_entries() {
    let mut reg = ColorInfoRegistry::new(false);
    reg.put(substructure(0, 9));
    reg.put(ColorInfo::similarity_filter(
        ColumnId(1),
        ExclusionFlag(9),
        false,
        vec![mol("CCO")],
        0.8,
        Default::default(),
        10,
    ));
    reg.put(substructure(2, 10));

    reg.on_exclusion_inverted(ExclusionFlag(9));
    assert!(reg.get(ColumnId(0), PurposeKind::SubstructureFilter).unwrap().is_inverse());
    assert!(reg.get(ColumnId(1), PurposeKind::SimilarityFilter).unwrap().is_inverse());
    assert!(!reg.get(ColumnId(2), PurposeKind::SubstructureFilter).unwrap().is_inverse());

    reg.on_exclusion_inverted(ExclusionFlag(9));
    assert!(reg.get(ColumnId(0), PurposeKind::SubstructureFilter).unwrap().is_active());
}

#[test]
fn exclusion_enabled_switches_activity() {
    let mut reg = ColorInfoRegistry::new(false);
    reg.put(substructure(0, 2).disabled());
    assert!(!reg.get(ColumnId(0), PurposeKind::SubstructureFilter).unwrap().is_active());

    reg.on_exclusion_enabled(ExclusionFlag(2), true);
    assert!(reg.get(ColumnId(0), PurposeKind::SubstructureFilter).unwrap().is_active());
}

#[test]
fn current_row_change_replaces_entry() {
    let mut reg = ColorInfoRegistry::new(true);
    reg.on_new_table(&Schema::new(&[true, false], 2));

    reg.on_current_row_changed(ColumnId(0), Some(mol("c1ccccc1O")));
    let info = reg.get(ColumnId(0), PurposeKind::SimilarityToCurrentRow).unwrap();
    assert_eq!(info.references()[0].atom_count(), 7);

    reg.on_current_row_changed(ColumnId(0), None);
    let info = reg.get(ColumnId(0), PurposeKind::SimilarityToCurrentRow).unwrap();
    assert!(info.references().is_empty());

    // untracked column stays untracked
    reg.on_current_row_changed(ColumnId(1), Some(mol("C")));
    assert!(reg.get(ColumnId(1), PurposeKind::SimilarityToCurrentRow).is_none());
}

#[test]
fn put_replaces_same_key() {
    let mut reg = ColorInfoRegistry::new(false);
    assert!(reg.put(substructure(0, 1)).is_none());
    let old = reg.put(substructure(0, 2)).unwrap();
    assert!(old.is_bound_to(ExclusionFlag(1)));
    assert_eq!(reg.len(), 1);
    assert!(reg.remove(ColumnId(0), PurposeKind::SubstructureFilter).is_some());
    assert!(reg.is_empty());
}
