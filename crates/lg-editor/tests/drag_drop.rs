//! Integration tests: drag and drop between containers (lg-editor).
//!
//! Two lists side by side plus a trash bin; items are dragged from the
//! left list and dropped on containers that opt in through block data.

use lg_core::*;
use lg_editor::{DragDrop, drop_candidates, hit_test};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

struct Board {
    g: Generator,
    left: BlockId,
    right: BlockId,
    trash: BlockId,
    items: Vec<BlockId>,
    log: Log,
}

fn record(log: &Log, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

fn board() -> Board {
    let mut g = Generator::new("lists");
    g.set_container(Size::new(600.0, 400.0));
    let mut add = |name: &str, r: AnchoredRect| g.set_block(&BlockLayout::new(name, r)).unwrap();

    let left = add("left-list", AnchoredRect::px(0.0, 0.0, 200.0, 400.0));
    let right = add("right-list", AnchoredRect::px(300.0, 0.0, 200.0, 300.0));
    let trash = add("trash", AnchoredRect::px(300.0, 320.0, 200.0, 80.0));
    let items: Vec<BlockId> = (0..3)
        .map(|i| add(&format!("item{i}"), AnchoredRect::px(10.0, 10.0 + 50.0 * i as f32, 180.0, 40.0)))
        .collect();

    let log: Log = Rc::default();
    let blocks = g.blocks_mut();
    for item in &items {
        blocks.set_local_parent(*item, Some(left)).unwrap();
    }

    // Both lists accept anything; the trash only single items.
    for (list, name) in [(left, "left"), (right, "right")] {
        let b = blocks.get_mut(list).unwrap();
        b.set_data(DataKey::CanDrop, DataValue::predicate(|_| true));
        let l = Rc::clone(&log);
        b.set_data(
            DataKey::Drop,
            DataValue::predicate(move |ids| {
                record(&l, format!("{name} drop {}", ids.len()));
                true
            }),
        );
        let l = Rc::clone(&log);
        b.set_data(DataKey::DragEnter, DataValue::notify(move || record(&l, format!("{name} enter"))));
        let l = Rc::clone(&log);
        b.set_data(DataKey::DragLeave, DataValue::notify(move || record(&l, format!("{name} leave"))));
    }
    let l = Rc::clone(&log);
    blocks
        .get_mut(left)
        .unwrap()
        .set_data(DataKey::EndDrop, DataValue::action(move |ids| record(&l, format!("left end {}", ids.len()))));

    let t = blocks.get_mut(trash).unwrap();
    t.set_data(DataKey::CanDrop, DataValue::predicate(|ids| ids.len() == 1));
    t.set_data(DataKey::Drop, DataValue::predicate(|_| true));
    let l = Rc::clone(&log);
    t.set_data(DataKey::DragEnter, DataValue::notify(move || record(&l, "trash enter")));

    Board {
        g,
        left,
        right,
        trash,
        items,
        log,
    }
}

fn entries(b: &Board) -> Vec<String> {
    b.log.borrow().clone()
}

fn start(b: &Board, dd: &mut DragDrop, item: BlockId) {
    let rect = b.g.lookup(item).unwrap().rect();
    dd.start(b.g.blocks(), item, rect, rect.center()).unwrap();
}

// ─── Hit testing ─────────────────────────────────────────────────────────

#[test]
fn pointer_hits_topmost_item() {
    let b = board();
    assert_eq!(hit_test(b.g.blocks(), Point::new(50.0, 70.0)), Some(b.items[1]));
    assert_eq!(hit_test(b.g.blocks(), Point::new(5.0, 395.0)), Some(b.left));
    assert_eq!(hit_test(b.g.blocks(), Point::new(250.0, 10.0)), None);
}

#[test]
fn rect_intersection_examples() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
    assert!(!a.intersects(&Rect::new(20.0, 20.0, 10.0, 10.0)));
}

#[test]
fn source_list_is_never_a_candidate() {
    let b = board();
    let everywhere = Rect::new(0.0, 0.0, 600.0, 400.0);
    assert_eq!(
        drop_candidates(b.g.blocks(), &everywhere, Some(b.left)),
        vec![b.right, b.trash]
    );
}

// ─── Enter / leave ───────────────────────────────────────────────────────

#[test]
fn enter_and_leave_fire_once_per_transition() {
    let b = board();
    let mut dd = DragDrop::new(Rect::new(0.0, 0.0, 600.0, 400.0));
    start(&b, &mut dd, b.items[0]);
    let from = b.g.lookup(b.items[0]).unwrap().rect().center();

    // Into the right list, then wiggle inside it.
    dd.move_to(b.g.blocks(), from.x + 300.0, from.y);
    dd.move_to(b.g.blocks(), from.x + 310.0, from.y + 5.0);
    assert_eq!(dd.droppable(), &[b.right]);

    // Back home, then over the trash.
    dd.move_to(b.g.blocks(), from.x, from.y);
    assert!(dd.droppable().is_empty());
    dd.move_to(b.g.blocks(), from.x + 300.0, from.y + 330.0);

    assert_eq!(
        entries(&b),
        vec!["right enter", "right leave", "trash enter"]
    );
    dd.cancel();
    assert!(!dd.is_dragging());
}

// ─── Drop ────────────────────────────────────────────────────────────────

#[test]
fn drop_on_single_target_notifies_source() {
    let b = board();
    let mut dd = DragDrop::new(Rect::new(0.0, 0.0, 600.0, 400.0));
    start(&b, &mut dd, b.items[2]);
    let from = b.g.lookup(b.items[2]).unwrap().rect().center();
    dd.move_to(b.g.blocks(), from.x + 300.0, from.y);

    assert_eq!(dd.end(b.g.blocks()), Some(b.right));
    assert_eq!(
        entries(&b),
        vec!["right enter", "right drop 1", "left end 1"]
    );
    assert!(!dd.is_dragging());
}

#[test]
fn drag_data_provider_sets_payload() {
    let mut b = board();
    let all = b.items.clone();
    b.g.blocks_mut()
        .get_mut(b.left)
        .unwrap()
        .set_data(DataKey::DragData, DataValue::provider(move |_| all.clone()));

    let mut dd = DragDrop::new(Rect::new(0.0, 0.0, 600.0, 400.0));
    start(&b, &mut dd, b.items[0]);
    assert_eq!(dd.data(), b.items.as_slice());

    // The trash refuses more than one item.
    let from = b.g.lookup(b.items[0]).unwrap().rect().center();
    dd.move_to(b.g.blocks(), from.x + 300.0, from.y + 330.0);
    assert!(dd.droppable().is_empty());
    assert_eq!(dd.end(b.g.blocks()), None);
    assert!(entries(&b).is_empty());
}

#[test]
fn straddling_two_targets_does_not_drop() {
    let b = board();
    let mut dd = DragDrop::new(Rect::new(0.0, 0.0, 600.0, 400.0));
    start(&b, &mut dd, b.items[0]);
    let from = b.g.lookup(b.items[0]).unwrap().rect().center();
    // Tall enough to touch both the right list and the trash.
    dd.move_to(b.g.blocks(), from.x + 300.0, from.y + 280.0);
    assert_eq!(dd.end(b.g.blocks()), None);
    assert!(!entries(&b).iter().any(|e| e.contains("drop")));
}
