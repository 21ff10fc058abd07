use audience_core::{
    AudiencePicker, Catalog, CatalogMode, Level, OwnershipIndex, PickerConfig, SavedSelection,
    SelectionPolicy, SelectionStore, TaxonomyLookup, TaxonomyNode, ToggleOutcome,
};
use std::collections::BTreeSet;
use std::sync::Arc;

fn technology() -> TaxonomyNode {
    TaxonomyNode::new("C1", "Technology")
        .child(TaxonomyNode::new("S1", "Fintech").child(TaxonomyNode::new("X1", "Payments")))
}

fn scenario_catalog() -> Catalog {
    Catalog::new(vec![
        TaxonomyNode::new("I1", "Entrepreneur").child(technology()),
        TaxonomyNode::new("I2", "Investor").child(technology()),
    ])
}

fn ids(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn subsub_selection_rolls_up_and_identity_deselect_prunes() {
    let mut picker = AudiencePicker::new(Arc::new(scenario_catalog()), PickerConfig::default());

    assert_eq!(picker.toggle_subsub("X1"), ToggleOutcome::Selected);
    let state = picker.selection().clone();
    assert_eq!(state.subsub_ids(), &ids(&["X1"]));
    assert_eq!(state.subcategory_ids(), &ids(&["S1"]));
    assert_eq!(state.category_ids(), &ids(&["C1"]));
    assert!(state.identity_ids().is_empty());
    assert_eq!(picker.count(Level::Subcategory, "S1"), Some(1));
    assert_eq!(picker.count(Level::Category, "C1"), Some(2));
    assert_eq!(picker.count(Level::Identity, "I1"), Some(3));

    assert_eq!(picker.toggle_identity("I1"), ToggleOutcome::Selected);
    assert_eq!(picker.selection().identity_ids(), &ids(&["I1"]));
    assert_eq!(picker.selection().category_ids(), &ids(&["C1"]));

    assert_eq!(picker.toggle_identity("I1"), ToggleOutcome::Deselected);
    assert!(picker.selection().is_empty());
}

#[test]
fn remaining_owner_keeps_shared_nodes_selected() {
    let mut picker = AudiencePicker::new(Arc::new(scenario_catalog()), PickerConfig::default());

    picker.toggle_identity("I2");
    picker.toggle_subsub("X1");
    picker.toggle_identity("I1");
    picker.toggle_identity("I1");

    let state = picker.selection();
    assert_eq!(state.identity_ids(), &ids(&["I2"]));
    assert_eq!(state.category_ids(), &ids(&["C1"]));
    assert_eq!(state.subcategory_ids(), &ids(&["S1"]));
    assert_eq!(state.subsub_ids(), &ids(&["X1"]));

    picker.toggle_identity("I2");
    assert!(picker.selection().is_empty());
}

#[test]
fn category_with_two_owners_survives_first_owner_deselect() {
    let index = OwnershipIndex::build(&scenario_catalog(), CatalogMode::Shared);
    let mut store = SelectionStore::new(&index, SelectionPolicy::default());

    store.toggle_identity("I1");
    store.toggle_identity("I2");
    store.toggle_category("C1");

    store.toggle_identity("I1");
    assert!(store.is_selected(Level::Category, "C1"));

    store.toggle_identity("I2");
    assert!(!store.is_selected(Level::Category, "C1"));
}

#[test]
fn exclusive_catalog_deselecting_identity_clears_its_subtree() {
    let catalog = Catalog::new(vec![
        TaxonomyNode::new("I1", "Entrepreneur").child(technology()),
        TaxonomyNode::new("I2", "Investor").child(TaxonomyNode::new("C2", "Real estate")),
    ]);
    let mut picker = AudiencePicker::new(Arc::new(catalog), PickerConfig::exclusive());
    assert!(picker.index().issues().is_empty());

    picker.toggle_subsub("X1");
    picker.toggle_category("C2");
    assert_eq!(picker.selection().identity_ids(), &ids(&["I1", "I2"]));

    picker.toggle_identity("I1");
    let state = picker.selection();
    assert_eq!(state.identity_ids(), &ids(&["I2"]));
    assert_eq!(state.category_ids(), &ids(&["C2"]));
    assert!(state.subcategory_ids().is_empty());
    assert!(state.subsub_ids().is_empty());
}

#[test]
fn auto_select_owner_is_skipped_for_shared_nodes() {
    let config = PickerConfig {
        auto_select_owner: true,
        ..PickerConfig::default()
    };
    let mut picker = AudiencePicker::new(Arc::new(scenario_catalog()), config);
    picker.toggle_subsub("X1");
    assert!(picker.selection().identity_ids().is_empty());
}

#[test]
fn hydrated_selection_is_emitted_in_host_shape() {
    let saved: SavedSelection = serde_json::from_str(
        r#"{
            "identityIds": ["I2"],
            "categoryIds": [],
            "subcategoryIds": ["S1"],
            "subsubIds": ["X1", "gone"]
        }"#,
    )
    .unwrap();
    let picker = AudiencePicker::with_saved_selection(
        Arc::new(scenario_catalog()),
        PickerConfig::default(),
        &saved,
    );

    let emitted = serde_json::to_value(picker.selection()).unwrap();
    assert_eq!(
        emitted,
        serde_json::json!({
            "identityIds": ["I2"],
            "categoryIds": ["C1"],
            "subcategoryIds": ["S1"],
            "subsubIds": ["X1"]
        })
    );
    assert_eq!(picker.saved_selection().subsub_ids, vec!["X1".to_string()]);
}

#[test]
fn display_only_nodes_cannot_be_toggled() {
    let catalog = Catalog::from_json_str(
        r#"[
            { "_id": "I1", "name": "Entrepreneur", "categories": [
                { "name": "Broken category", "subcategories": [{ "_id": "S9", "name": "Hidden" }] },
                { "_id": "C1", "name": "Technology" }
            ]}
        ]"#,
    )
    .unwrap();
    let mut picker = AudiencePicker::new(Arc::new(catalog), PickerConfig::default());

    assert_eq!(picker.index().issues().len(), 1);
    assert_eq!(picker.toggle_subcategory("S9"), ToggleOutcome::Ignored);
    assert_eq!(picker.toggle_category("C1"), ToggleOutcome::Selected);
    assert_eq!(picker.index().children_of(Level::Identity, "I1"), ["C1".to_string()]);
}

#[test]
fn subcategory_listed_under_one_copy_of_shared_category_survives_other_owner_deselect() {
    let catalog = Catalog::new(vec![
        TaxonomyNode::new("I1", "Entrepreneur").child(
            TaxonomyNode::new("C1", "Technology").child(TaxonomyNode::new("S1", "Fintech")),
        ),
        TaxonomyNode::new("I2", "Investor").child(
            TaxonomyNode::new("C1", "Technology").child(TaxonomyNode::new("S2", "Edtech")),
        ),
    ]);
    let mut picker = AudiencePicker::new(Arc::new(catalog), PickerConfig::default());

    picker.toggle_identity("I1");
    picker.toggle_identity("I2");
    picker.toggle_subcategory("S2");
    assert_eq!(picker.count(Level::Identity, "I1"), Some(2));

    picker.toggle_identity("I2");
    let state = picker.selection();
    assert_eq!(state.identity_ids(), &ids(&["I1"]));
    assert_eq!(state.category_ids(), &ids(&["C1"]));
    assert_eq!(state.subcategory_ids(), &ids(&["S2"]));
    assert_eq!(picker.count(Level::Identity, "I1"), Some(2));
}
