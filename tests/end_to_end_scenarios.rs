//! Black-box coverage of the six literal end-to-end scenarios: create and
//! query, archetype transition, destroy and recycle, parent/child destroy
//! propagation (both modes), array lifecycle, and query exclusion by tag.

use archetype_ecs::{BitMask, Entity, QueryFilter, World};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity {
    x: f32,
    y: f32,
}

struct Disabled;

#[test]
fn scenario_1_create_and_query() {
    let mut world = World::new();
    let e1 = world
        .create_with((Position { x: 1.0, y: 2.0 }, Velocity { x: 3.0, y: 4.0 }))
        .unwrap();
    let e2 = world.create_with((Position { x: 5.0, y: 6.0 },)).unwrap();
    let e3 = world
        .create_with((Position { x: 7.0, y: 8.0 }, Velocity { x: 9.0, y: 10.0 }))
        .unwrap();

    let mut both: Vec<_> = world
        .query::<(Position, Velocity)>()
        .map(|(e, (p, v))| (e, *p, *v))
        .collect();
    both.sort_by_key(|(e, ..)| e.index());
    assert_eq!(
        both,
        vec![
            (e1, Position { x: 1.0, y: 2.0 }, Velocity { x: 3.0, y: 4.0 }),
            (e3, Position { x: 7.0, y: 8.0 }, Velocity { x: 9.0, y: 10.0 }),
        ]
    );

    let position_idx = world.schema().component_index::<Position>().unwrap();
    let all_positions =
        archetype_ecs::query::entities_matching(&world, &QueryFilter::new().require_component(position_idx));
    let mut all_sorted = all_positions.clone();
    all_sorted.sort_by_key(|e| e.index());
    let mut expected = vec![e1, e2, e3];
    expected.sort_by_key(|e| e.index());
    assert_eq!(all_sorted, expected);
}

#[test]
fn scenario_2_archetype_transition() {
    let mut world = World::new();
    let e1 = world
        .create_with((Position { x: 1.0, y: 2.0 }, Velocity { x: 3.0, y: 4.0 }))
        .unwrap();
    let e2 = world.create_with((Position { x: 5.0, y: 6.0 },)).unwrap();
    let e3 = world
        .create_with((Position { x: 7.0, y: 8.0 }, Velocity { x: 9.0, y: 10.0 }))
        .unwrap();

    world.add_component(e2, Velocity { x: 11.0, y: 12.0 }).unwrap();

    assert_eq!(*world.get_component::<Velocity>(e2).unwrap(), Velocity { x: 11.0, y: 12.0 });
    assert_eq!(*world.get_component::<Position>(e2).unwrap(), Position { x: 5.0, y: 6.0 });

    let mut triple: Vec<_> = world
        .query::<(Position, Velocity)>()
        .map(|(e, _)| e)
        .collect();
    triple.sort_by_key(|e| e.index());
    let mut expected = vec![e1, e2, e3];
    expected.sort_by_key(|e| e.index());
    assert_eq!(triple, expected);
}

#[test]
fn scenario_3_destroy_and_recycle() {
    let mut world = World::new();
    let mask = {
        let pos = world.schema_mut().register_component::<Position>().unwrap();
        let vel = world.schema_mut().register_component::<Velocity>().unwrap();
        let mut m = BitMask::new();
        m.set(pos.0 as usize);
        m.set(vel.0 as usize);
        m
    };
    let e1 = world.create(mask);
    let original_generation = e1.generation();

    world.destroy(e1, false).unwrap();
    assert!(!world.is_live(e1));

    let reborn = world.create(mask);
    assert_eq!(reborn.index(), e1.index());
    assert_ne!(reborn.generation(), original_generation);
    assert_ne!(reborn, e1);
    assert_eq!(*world.get_component::<Position>(reborn).unwrap(), Position { x: 0.0, y: 0.0 });
    assert_eq!(*world.get_component::<Velocity>(reborn).unwrap(), Velocity { x: 0.0, y: 0.0 });
}

#[test]
fn scenario_4_parent_child_destroy_propagation_both_modes() {
    {
        let mut world = World::new();
        let parent = world.create(BitMask::new());
        let child_a = world.create(BitMask::new());
        let child_b = world.create(BitMask::new());
        world.set_parent(child_a, parent).unwrap();
        world.set_parent(child_b, parent).unwrap();

        world.destroy(parent, true).unwrap();
        assert_eq!(world.entity_count(), 0);
    }
    {
        let mut world = World::new();
        let parent = world.create(BitMask::new());
        let child_a = world.create(BitMask::new());
        let child_b = world.create(BitMask::new());
        world.set_parent(child_a, parent).unwrap();
        world.set_parent(child_b, parent).unwrap();

        world.destroy(parent, false).unwrap();
        assert!(world.is_live(child_a));
        assert!(world.is_live(child_b));
        assert_eq!(world.parent(child_a).unwrap(), Entity::NONE);
        assert_eq!(world.parent(child_b).unwrap(), Entity::NONE);
    }
}

#[test]
fn scenario_5_array_lifecycle() {
    let mut world = World::new();
    let e = world.create(BitMask::new());
    world.create_array::<u32>(e, 4).unwrap();
    world.get_array_mut::<u32>(e).unwrap().copy_from_slice(&[10, 20, 30, 40]);

    world.resize_array::<u32>(e, 6).unwrap();
    let arr = world.get_array::<u32>(e).unwrap();
    assert_eq!(arr[0], 10);
    assert_eq!(arr[1], 20);
    assert_eq!(arr[2], 30);
    assert_eq!(arr[3], 40);
    assert_eq!(arr[4], 0);
    assert_eq!(arr[5], 0);

    world.destroy_array::<u32>(e).unwrap();
    assert!(!world.contains_array::<u32>(e));
}

#[test]
fn scenario_6_query_exclusion_by_tag() {
    let mut world = World::new();
    let mut entities = Vec::new();
    for _ in 0..4 {
        entities.push(world.create_with((Position { x: 0.0, y: 0.0 },)).unwrap());
    }
    world.add_tag::<Disabled>(entities[0]).unwrap();
    world.add_tag::<Disabled>(entities[1]).unwrap();

    let pos_idx = world.schema().component_index::<Position>().unwrap();
    let disabled_idx = world.schema().tag_index::<Disabled>().unwrap();
    let filter = QueryFilter::new()
        .require_component(pos_idx)
        .exclude_tag(disabled_idx);

    let mut matched = archetype_ecs::query::entities_matching(&world, &filter);
    matched.sort_by_key(|e| e.index());
    let mut expected = vec![entities[2], entities[3]];
    expected.sort_by_key(|e| e.index());
    assert_eq!(matched, expected);
}
