//! Hit testing: point → block lookup, marquee selection and drop targets.
//!
//! Stacking order, bottom to top: higher layers first (negative layers sit
//! on top), then ascending z-index, then insertion order.

use lg_core::{Block, BlockId, Blocks, DataKey, Point, Rect};

/// Paint order key; larger is closer to the viewer.
fn stacking_key(position: usize, block: &Block) -> (i32, i32, usize) {
    (-block.layer, block.z_index, position)
}

/// Visible blocks with their paint-order keys.
fn visible(blocks: &Blocks) -> impl Iterator<Item = ((i32, i32, usize), &Block)> + '_ {
    blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| !b.hidden)
        .map(|(i, b)| (stacking_key(i, b), b))
}

/// Find the topmost visible block containing `p`.
/// Returns `None` if no block is hit (background).
pub fn hit_test(blocks: &Blocks, p: Point) -> Option<BlockId> {
    let hit = visible(blocks)
        .filter(|(_, b)| b.rect().contains(p))
        .max_by_key(|(key, _)| *key)
        .map(|(_, b)| b.name());
    log::trace!("hit_test ({}, {}) → {hit:?}", p.x, p.y);
    hit
}

/// Every visible block whose rect intersects `rect`, topmost first.
/// Used for marquee (box) selection.
pub fn hit_test_rect(blocks: &Blocks, rect: &Rect) -> Vec<BlockId> {
    let mut hits: Vec<_> = visible(blocks)
        .filter(|(_, b)| b.rect().intersects(rect))
        .map(|(key, b)| (key, b.name()))
        .collect();
    hits.sort_by(|a, b| b.0.cmp(&a.0));
    hits.into_iter().map(|(_, name)| name).collect()
}

/// Blocks a drag from inside `drag_parent` could drop onto: those carrying
/// a `CanDrop` capability whose rect meets `rect`, excluding the source
/// container and everything it holds. Insertion order.
///
/// Without a source container nothing can be dropped.
pub fn drop_candidates(blocks: &Blocks, rect: &Rect, drag_parent: Option<BlockId>) -> Vec<BlockId> {
    let Some(parent) = drag_parent else {
        return Vec::new();
    };
    let siblings = blocks.children(parent);

    let candidates: Vec<BlockId> = blocks
        .iter()
        .filter(|b| b.data(&DataKey::CanDrop).is_some())
        .filter(|b| b.name() != parent && !siblings.contains(&b.name()))
        .filter(|b| b.rect().intersects(rect))
        .map(Block::name)
        .collect();
    log::trace!("drop candidates for {parent}: {candidates:?}");
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use lg_core::{AnchoredRect, BlockLayout, Bounds, DataValue, Size};
    use pretty_assertions::assert_eq;

    fn bounds() -> Bounds {
        Bounds::new(Size::new(200.0, 200.0), Size::new(200.0, 200.0))
    }

    fn add(blocks: &mut Blocks, name: &str, x: f32, y: f32, w: f32, h: f32) -> BlockId {
        blocks
            .set(&BlockLayout::new(name, AnchoredRect::px(x, y, w, h)), &bounds())
            .unwrap()
    }

    #[test]
    fn later_blocks_win_ties() {
        let mut blocks = Blocks::new();
        add(&mut blocks, "under", 0.0, 0.0, 50.0, 50.0);
        let over = add(&mut blocks, "over", 10.0, 10.0, 50.0, 50.0);
        assert_eq!(hit_test(&blocks, Point::new(20.0, 20.0)), Some(over));
        assert_eq!(hit_test(&blocks, Point::new(150.0, 150.0)), None);
    }

    #[test]
    fn z_index_and_layer_order_hits() {
        let mut blocks = Blocks::new();
        let low = add(&mut blocks, "low", 0.0, 0.0, 50.0, 50.0);
        let high = add(&mut blocks, "high", 0.0, 0.0, 50.0, 50.0);
        blocks.get_mut(low).unwrap().z_index = 3;
        assert_eq!(hit_test(&blocks, Point::new(5.0, 5.0)), Some(low));

        blocks.get_mut(high).unwrap().layer = -1;
        assert_eq!(hit_test(&blocks, Point::new(5.0, 5.0)), Some(high));
    }

    #[test]
    fn hidden_blocks_are_not_hit() {
        let mut blocks = Blocks::new();
        let below = add(&mut blocks, "below", 0.0, 0.0, 50.0, 50.0);
        let ghost = add(&mut blocks, "ghost", 0.0, 0.0, 50.0, 50.0);
        blocks.get_mut(ghost).unwrap().hidden = true;
        assert_eq!(hit_test(&blocks, Point::new(5.0, 5.0)), Some(below));
    }

    #[test]
    fn marquee_collects_topmost_first() {
        let mut blocks = Blocks::new();
        let a = add(&mut blocks, "a", 0.0, 0.0, 10.0, 10.0);
        let b = add(&mut blocks, "b", 5.0, 5.0, 10.0, 10.0);
        add(&mut blocks, "c", 20.0, 20.0, 10.0, 10.0);
        let hits = hit_test_rect(&blocks, &Rect::new(0.0, 0.0, 12.0, 12.0));
        assert_eq!(hits, vec![b, a]);
    }

    #[test]
    fn drop_candidates_skip_source_container() {
        let mut blocks = Blocks::new();
        let list = add(&mut blocks, "list", 0.0, 0.0, 100.0, 100.0);
        let item = add(&mut blocks, "item", 10.0, 10.0, 20.0, 20.0);
        let sibling = add(&mut blocks, "sibling", 10.0, 40.0, 20.0, 20.0);
        let bin = add(&mut blocks, "bin", 90.0, 0.0, 50.0, 50.0);
        blocks.set_local_parent(item, Some(list)).unwrap();
        blocks.set_local_parent(sibling, Some(list)).unwrap();
        for name in [list, sibling, bin] {
            blocks
                .get_mut(name)
                .unwrap()
                .set_data(DataKey::CanDrop, DataValue::predicate(|_| true));
        }

        let dragged = Rect::new(0.0, 0.0, 120.0, 60.0);
        assert_eq!(drop_candidates(&blocks, &dragged, Some(list)), vec![bin]);
        assert!(drop_candidates(&blocks, &dragged, None).is_empty());
    }
}
