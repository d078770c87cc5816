//! Z-order commands over a registry.
//!
//! Every change is written to the params under `"{name}ZIndex"` so a
//! rebuilt generator can restore it (see `Generator::set_block`).

use crate::error::LayoutError;
use crate::id::BlockId;
use crate::params::{ParamValue, Params};
use crate::registry::Blocks;

/// Params key holding a block's persisted z-index.
pub fn z_index_key(name: BlockId) -> String {
    format!("{name}ZIndex")
}

fn z_of(blocks: &Blocks, name: BlockId) -> Result<i32, LayoutError> {
    blocks
        .get(name)
        .map(|b| b.z_index)
        .ok_or_else(|| LayoutError::unknown_block(name))
}

fn store(blocks: &mut Blocks, params: &mut Params, name: BlockId, z: i32) -> Result<i32, LayoutError> {
    let block = blocks.require_mut(name)?;
    if block.z_index != z {
        log::debug!("z-index of {name}: {} -> {z}", block.z_index);
    }
    block.z_index = z;
    params.set(&z_index_key(name), ParamValue::Number(z as f32));
    Ok(z)
}

fn others(blocks: &Blocks, name: BlockId) -> impl Iterator<Item = i32> + '_ {
    blocks
        .iter()
        .filter(move |b| b.name() != name)
        .map(|b| b.z_index)
}

/// Global `(min, max)` z-index, `(0, 0)` for an empty registry.
fn min_max(blocks: &Blocks) -> (i32, i32) {
    let mut it = blocks.iter().map(|b| b.z_index);
    match it.next() {
        Some(first) => it.fold((first, first), |(lo, hi), z| (lo.min(z), hi.max(z))),
        None => (0, 0),
    }
}

/// Move one step up: just above the nearest higher block. A block tied
/// with others and already highest jumps above the maximum.
pub fn bring_forward(blocks: &mut Blocks, params: &mut Params, name: BlockId) -> Result<i32, LayoutError> {
    let current = z_of(blocks, name)?;

    let next = others(blocks, name).filter(|z| *z > current).min();
    let tied = others(blocks, name).any(|z| z == current);
    let z = match next {
        Some(above) => above + 1,
        None if tied => min_max(blocks).1 + 1,
        None => current,
    };
    store(blocks, params, name, z)
}

/// Mirror of [`bring_forward`]. Never goes below 0.
pub fn send_backward(blocks: &mut Blocks, params: &mut Params, name: BlockId) -> Result<i32, LayoutError> {
    let current = z_of(blocks, name)?;

    let prev = others(blocks, name).filter(|z| *z < current).max();
    let tied = others(blocks, name).any(|z| z == current);
    let z = match prev {
        Some(below) => (below - 1).max(0),
        None if tied => (min_max(blocks).0 - 1).max(0),
        None => current,
    };
    store(blocks, params, name, z)
}

/// Put every named block above all others (they tie with each other).
pub fn bring_front(blocks: &mut Blocks, params: &mut Params, names: &[BlockId]) -> Result<(), LayoutError> {
    for name in names {
        z_of(blocks, *name)?;
    }
    let z = min_max(blocks).1 + 1;
    for name in names {
        store(blocks, params, *name, z)?;
    }
    Ok(())
}

pub fn send_back(blocks: &mut Blocks, params: &mut Params, names: &[BlockId]) -> Result<(), LayoutError> {
    for name in names {
        z_of(blocks, *name)?;
    }
    let z = (min_max(blocks).0 - 1).max(0);
    for name in names {
        store(blocks, params, *name, z)?;
    }
    Ok(())
}
