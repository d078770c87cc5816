//! Integration tests: block registry identity, ordering and metadata.

use lg_core::*;
use pretty_assertions::assert_eq;

fn bounds() -> Bounds {
    Bounds::new(Size::new(640.0, 480.0), Size::new(640.0, 480.0))
}

fn at(x: f32) -> AnchoredRect {
    AnchoredRect::px(x, 0.0, 10.0, 10.0)
}

// ─── Identity ────────────────────────────────────────────────────────────

#[test]
fn repeated_set_keeps_one_block() {
    let mut blocks = Blocks::new();
    let b = bounds();
    let first = blocks.set(&BlockLayout::new("card", at(0.0)), &b).unwrap();
    let second = blocks.set(&BlockLayout::new("card", at(50.0)), &b).unwrap();

    assert_eq!(first, second);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks.get(first).unwrap().rect().x, 50.0);
}

#[test]
fn update_keeps_runtime_state() {
    let mut blocks = Blocks::new();
    let b = bounds();
    let id = blocks.set(&BlockLayout::new("card", at(0.0)), &b).unwrap();
    {
        let card = blocks.get_mut(id).unwrap();
        card.z_index = 7;
        card.hidden = true;
        card.set_data(DataKey::Distance, DataValue::Number(12.0));
    }

    blocks.set(&BlockLayout::new("card", at(20.0)).with_layer(2), &b).unwrap();
    let card = blocks.get(id).unwrap();
    assert_eq!(card.z_index, 7);
    assert!(card.hidden);
    assert_eq!(card.number(&DataKey::Distance, 0.0), 12.0);
    assert_eq!(card.layer, 2);
}

// ─── Ordering ────────────────────────────────────────────────────────────

#[test]
fn insertion_order_is_stable_across_updates() {
    let mut blocks = Blocks::new();
    let b = bounds();
    for (i, name) in ["a", "b", "c"].iter().enumerate() {
        blocks.set(&BlockLayout::new(*name, at(i as f32)), &b).unwrap();
    }
    blocks.set(&BlockLayout::new("a", at(99.0)), &b).unwrap();

    let names: Vec<String> = blocks.names().map(|n| n.to_string()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(blocks.position(BlockId::intern("c")), Some(2));
    assert_eq!(blocks.find(1).unwrap().name(), BlockId::intern("b"));
    assert!(blocks.find(3).is_none());
}

#[test]
fn resolve_one_reports_unknown_block() {
    let mut blocks = Blocks::new();
    let err = blocks
        .resolve_one(BlockId::intern("nowhere"), &bounds())
        .unwrap_err();
    assert_eq!(err, LayoutError::unknown_block("nowhere"));
}

#[test]
fn clear_drops_everything() {
    let mut blocks = Blocks::new();
    let b = bounds();
    let list = blocks.set(&BlockLayout::new("list", at(0.0)), &b).unwrap();
    let item = blocks.set(&BlockLayout::new("item", at(1.0)), &b).unwrap();
    blocks.set_local_parent(item, Some(list)).unwrap();

    blocks.clear();
    assert!(blocks.is_empty());
    assert!(!blocks.contains(list));
    assert_eq!(blocks.local_parent(item), None);
    assert!(blocks.children(list).is_empty());
}

// ─── Metadata ────────────────────────────────────────────────────────────

#[test]
fn metadata_round_trip() {
    let mut blocks = Blocks::new();
    let id = blocks
        .set(&BlockLayout::new("meta", at(0.0)), &bounds())
        .unwrap();
    let block = blocks.get_mut(id).unwrap();

    block.set_data(DataKey::Hook, DataValue::Text("pathA".into()));
    block.set_data("note".into(), DataValue::Text("hello".into()));
    assert_eq!(
        block.data(&DataKey::Hook).and_then(DataValue::as_text),
        Some("pathA")
    );
    assert_eq!(
        block
            .data(&DataKey::Custom("note".into()))
            .and_then(DataValue::as_text),
        Some("hello")
    );
    assert!(block.remove_data(&DataKey::Hook).is_some());
    assert!(block.data(&DataKey::Hook).is_none());
}
