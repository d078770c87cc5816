//! Integration tests: path hooks driving blocks through a generator.
//!
//! Ten 10×10 cards sit on layer 1 of a 1000×100 container; hooks move them
//! along horizontal paths and hand them between queues.

use lg_anim::*;
use lg_core::*;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn cards(g: &mut Generator, count: usize) -> Vec<BlockId> {
    (0..count)
        .map(|i| {
            g.set_block(
                &BlockLayout::new(
                    format!("card{i}").as_str(),
                    AnchoredRect::px(0.0, 0.0, 10.0, 10.0),
                )
                .with_layer(1),
            )
            .unwrap()
        })
        .collect()
}

fn setup() -> (Generator, Vec<BlockId>) {
    let mut g = Generator::new("conveyor");
    g.set_container(Size::new(1000.0, 100.0));
    g.set_viewport(Size::new(1000.0, 100.0));
    let ids = cards(&mut g, 10);
    (g, ids)
}

fn belt() -> PathBreakpoint {
    PathBreakpoint::any_width([
        UnitPoint::new(0, 0),
        UnitPoint::new(UnitValue::percent(100.0), 0),
    ])
}

fn filled(velocity: f32) -> PathHook {
    PathHook::new("belt", vec![belt()], "belt.in", "belt.out")
        .with_input(InputSource::Layer(1))
        .with_config(PathConfig {
            velocity,
            fill: true,
            ..PathConfig::default()
        })
}

fn distance(g: &Generator, id: BlockId) -> f32 {
    g.lookup(id).unwrap().number(&DataKey::Distance, -1.0)
}

fn x(g: &Generator, id: BlockId) -> f32 {
    g.lookup(id).unwrap().rect().x
}

// ─── Initialization ──────────────────────────────────────────────────────

#[test]
fn fill_places_as_many_as_fit() {
    let (mut g, ids) = setup();
    g.set_hook("belt", Box::new(filled(1.0)));
    g.tick(&TickContext::new(0.0, true)).unwrap();

    let placed: Vec<f32> = ids[..5].iter().map(|id| distance(&g, *id)).collect();
    assert_eq!(placed, vec![800.0, 600.0, 400.0, 200.0, 0.0]);
    let xs: Vec<f32> = ids[..5].iter().map(|id| x(&g, *id)).collect();
    assert_eq!(xs, vec![800.0, 600.0, 400.0, 200.0, 0.0]);
    assert!(ids[..5].iter().all(|id| !g.lookup(*id).unwrap().hidden));

    assert!(ids[5..].iter().all(|id| g.lookup(*id).unwrap().hidden));
    let queued: Vec<BlockId> = g.queue("belt.in").unwrap().iter().copied().collect();
    assert_eq!(queued.len(), 5);
    assert_eq!(g.params().number("beltinit"), Some(1.0));
    assert_eq!(
        g.lookup(ids[0]).unwrap().data(&DataKey::Hook).and_then(DataValue::as_text),
        Some("belt")
    );
}

#[test]
fn without_fill_everything_waits_in_the_update_queue() {
    let (mut g, ids) = setup();
    let hook = PathHook::new("belt", vec![belt()], "belt.in", "belt.out")
        .with_input(InputSource::Blocks(ids[..3].to_vec()));
    g.set_hook("belt", Box::new(hook));
    g.tick(&TickContext::new(0.0, true)).unwrap();

    assert_eq!(g.queue("belt.in").unwrap().len(), 3);
    assert!(ids[..3].iter().all(|id| g.lookup(*id).unwrap().hidden));
    // Blocks outside the input are left alone.
    assert!(!g.lookup(ids[3]).unwrap().hidden);
}

#[test]
fn empty_layer_defers_initialization() {
    let mut g = Generator::new("late");
    g.set_container(Size::new(1000.0, 100.0));
    g.set_hook("belt", Box::new(filled(1.0)));
    g.tick(&TickContext::new(16.0, true)).unwrap();
    assert_eq!(g.params().number("beltinit"), Some(0.0));

    let ids = cards(&mut g, 2);
    g.tick(&TickContext::new(0.0, true)).unwrap();
    assert_eq!(g.params().number("beltinit"), Some(1.0));
    assert_eq!(distance(&g, ids[0]), 200.0);
    assert_eq!(distance(&g, ids[1]), 0.0);
}

// ─── Motion ──────────────────────────────────────────────────────────────

#[test]
fn blocks_advance_and_exit_into_output() {
    let (mut g, ids) = setup();
    g.set_hook("belt", Box::new(filled(1.0)));
    g.tick(&TickContext::new(0.0, true)).unwrap();
    g.tick(&TickContext::new(205.0, true)).unwrap();

    // Past the end: reset, hidden, handed on.
    let first = g.lookup(ids[0]).unwrap();
    assert!(first.hidden);
    assert_eq!(first.number(&DataKey::Distance, -1.0), 0.0);
    let out: Vec<BlockId> = g.queue("belt.out").unwrap().iter().copied().collect();
    assert_eq!(out, vec![ids[0]]);

    assert_eq!(distance(&g, ids[1]), 805.0);
    assert_eq!(x(&g, ids[4]), 205.0);

    // The lead had room, so the next queued card entered and moved too.
    assert!(!g.lookup(ids[5]).unwrap().hidden);
    assert_eq!(distance(&g, ids[5]), 205.0);
    assert_eq!(g.queue("belt.in").unwrap().len(), 4);
}

#[test]
fn paused_ticks_freeze_the_path() {
    let (mut g, ids) = setup();
    g.set_hook("belt", Box::new(filled(1.0)));
    g.tick(&TickContext::new(0.0, true)).unwrap();
    g.tick(&TickContext::new(100.0, false)).unwrap();
    g.tick(&TickContext::paused()).unwrap();
    assert_eq!(distance(&g, ids[0]), 800.0);
    assert_eq!(x(&g, ids[0]), 800.0);

    // Resuming picks up from the frozen distances.
    g.tick(&TickContext::new(50.0, true)).unwrap();
    let resumed: Vec<f32> = ids[..5].iter().map(|id| distance(&g, *id)).collect();
    assert_eq!(resumed, vec![850.0, 650.0, 450.0, 250.0, 50.0]);
    assert_eq!(x(&g, ids[0]), 850.0);
}

#[test]
fn lone_point_is_not_a_path() {
    let (mut g, ids) = setup();
    let lone = PathBreakpoint::any_width([UnitPoint::new(0, 0)]);
    let hook = PathHook::new("belt", vec![lone], "belt.in", "belt.out")
        .with_input(InputSource::Layer(1))
        .with_config(PathConfig {
            fill: true,
            ..PathConfig::default()
        });
    g.set_hook("belt", Box::new(hook));
    for _ in 0..3 {
        g.tick(&TickContext::new(16.0, true)).unwrap();
    }

    assert_eq!(g.queue("belt.out").map(Queue::len), Some(0));
    assert!(ids.iter().all(|id| !g.lookup(*id).unwrap().hidden));
    assert_eq!(g.params().number("beltinit"), Some(0.0));
}

#[test]
fn right_edge_is_written_in_its_own_unit() {
    let mut g = Generator::new("rtl");
    g.set_container(Size::new(1000.0, 100.0));
    let id = g
        .set_block(
            &BlockLayout::new(
                "rtl-card",
                AnchoredRect::new()
                    .right(UnitValue::percent(0.0))
                    .width(10)
                    .top(0)
                    .height(10),
            )
            .with_layer(2),
        )
        .unwrap();
    let hook = PathHook::new("rtl", vec![belt()], "rtl.in", "rtl.out")
        .with_input(InputSource::Layer(2))
        .with_config(PathConfig {
            velocity: 1.0,
            ..PathConfig::default()
        });
    g.set_hook("rtl", Box::new(hook));
    g.tick(&TickContext::new(250.0, true)).unwrap();

    let loc = *g.lookup(id).unwrap().location();
    assert_eq!(loc.right, Some(UnitValue::percent(75.0)));
    assert_eq!(loc.left, None);
    assert_eq!(g.lookup(id).unwrap().rect().x, 240.0);
}

// ─── Chaining ────────────────────────────────────────────────────────────

#[test]
fn output_of_one_path_feeds_the_next() {
    let (mut g, ids) = setup();
    g.set_hook("belt", Box::new(filled(1.0)));
    let drop = PathBreakpoint::any_width([UnitPoint::new(500, 0), UnitPoint::new(500, 1000)]);
    let chute = PathHook::new("chute", vec![drop], "belt.out", "chute.out").with_config(PathConfig {
        velocity: 1.0,
        ..PathConfig::default()
    });
    g.set_hook("chute", Box::new(chute));

    g.tick(&TickContext::new(0.0, true)).unwrap();
    g.tick(&TickContext::new(205.0, true)).unwrap();

    let card = g.lookup(ids[0]).unwrap();
    assert!(!card.hidden);
    assert_eq!(card.data(&DataKey::Hook).and_then(DataValue::as_text), Some("chute"));
    assert_eq!(card.rect().origin(), Point::new(500.0, 205.0));
    assert!(g.queue("belt.out").unwrap().is_empty());
}

// ─── Collisions ──────────────────────────────────────────────────────────

#[test]
fn sprite_collisions_are_reported() {
    let (mut g, ids) = setup();
    let sprite = g
        .set_block(&BlockLayout::new("sprite", AnchoredRect::px(300.0, 0.0, 10.0, 10.0)))
        .unwrap();

    let config: PathConfig =
        serde_json::from_str(r#"{"velocity": 1.0, "fill": true, "sprite": "sprite"}"#).unwrap();
    assert_eq!(config.spacing, 200.0);

    let hits = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&hits);
    let hook = PathHook::new("belt", vec![belt()], "belt.in", "belt.out")
        .with_input(InputSource::Layer(1))
        .with_config(config)
        .on_collide(move |id| sink.borrow_mut().push(id));
    g.set_hook("belt", Box::new(hook));

    g.tick(&TickContext::new(0.0, true)).unwrap();
    assert!(hits.borrow().is_empty());

    g.tick(&TickContext::new(95.0, true)).unwrap();
    assert_eq!(*hits.borrow(), vec![ids[3]]);
    assert!(!g.lookup(sprite).unwrap().hidden);
}
