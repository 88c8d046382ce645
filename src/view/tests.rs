use crate::entity::Entity;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity {
    dx: f32,
    dy: f32,
}

#[test]
fn single_component_view() {
    let mut world = World::new();

    let entity = world.spawn();

    world.insert(entity, Position { x: 1.0, y: 2.0 }).unwrap();

    let mut count = 0;

    world.view::<(Position,)>().each(|position: &mut Position| {
        assert_eq!(*position, Position { x: 1.0, y: 2.0 });
        count += 1;
    });

    assert_eq!(count, 1);
}

#[test]
fn multi_component_view() {
    let mut world = World::new();

    let entity = world.spawn();

    world.insert(entity, Position { x: 1.0, y: 2.0 }).unwrap();
    world.insert(entity, Velocity { dx: 3.0, dy: 4.0 }).unwrap();

    let mut count = 0;

    world.view::<(Position, Velocity)>().each(
        |position: &mut Position, velocity: &mut Velocity| {
            assert_eq!(*position, Position { x: 1.0, y: 2.0 });
            assert_eq!(*velocity, Velocity { dx: 3.0, dy: 4.0 });
            count += 1;
        },
    );

    assert_eq!(count, 1);
}

#[test]
fn entity_and_components_visitor() {
    let mut world = World::new();

    let entity = world.spawn();

    world.insert(entity, Position { x: 1.0, y: 2.0 }).unwrap();

    let mut visited = Vec::new();

    world.view::<(Position,)>().each(|e: Entity, position: &mut Position| {
        visited.push((e, *position));
    });

    assert_eq!(visited, vec![(entity, Position { x: 1.0, y: 2.0 })]);
}

#[test]
fn entity_only_visitor() {
    let mut world = World::new();

    let entity = world.spawn();

    world.insert(entity, Position { x: 1.0, y: 2.0 }).unwrap();
    world.insert(entity, Velocity { dx: 3.0, dy: 4.0 }).unwrap();

    let mut visited = Vec::new();

    world.view::<(Position, Velocity)>().each(|e: Entity| {
        visited.push(e);
    });

    assert_eq!(visited, vec![entity]);
}

#[test]
fn all_three_shapes_visit_the_same_set() {
    let mut world = World::new();

    let entity = world.spawn();

    world.insert(entity, Position { x: 1.0, y: 2.0 }).unwrap();
    world.insert(entity, Velocity { dx: 3.0, dy: 4.0 }).unwrap();

    let mut counts = [0, 0, 0];

    world.view::<(Position, Velocity)>().each(
        |_: Entity, _: &mut Position, _: &mut Velocity| counts[0] += 1,
    );
    world
        .view::<(Position, Velocity)>()
        .each(|_: &mut Position, _: &mut Velocity| counts[1] += 1);
    world.view::<(Position, Velocity)>().each(|_: Entity| counts[2] += 1);

    assert_eq!(counts, [1, 1, 1]);
}

#[test]
fn components_can_be_mutated_through_the_view() {
    let mut world = World::new();

    let entity = world.spawn();

    world.insert(entity, Position { x: 1.0, y: 2.0 }).unwrap();

    world.view::<(Position,)>().each(|position: &mut Position| {
        position.x = 5.0;
        position.y = 6.0;
    });

    assert_eq!(
        *world.get::<Position>(entity).unwrap(),
        Position { x: 5.0, y: 6.0 },
    );
}

#[test]
fn an_empty_view_visits_nothing() {
    let mut world = World::new();

    let mut count = 0;

    // the Position pool has never been populated
    world.view::<(Position,)>().each(|_: &mut Position| count += 1);

    assert_eq!(count, 0);
}

#[test]
fn an_empty_pool_empties_the_join() {
    let mut world = World::new();

    let entity = world.spawn();

    world.insert(entity, Position { x: 1.0, y: 2.0 }).unwrap();

    let mut count = 0;

    world
        .view::<(Position, Velocity)>()
        .each(|_: &mut Position, _: &mut Velocity| count += 1);

    assert_eq!(count, 0);
}

#[test]
fn views_iterate_multiple_entities() {
    let mut world = World::new();

    let e0 = world.spawn();
    let e1 = world.spawn();

    world.insert(e0, Position { x: 1.0, y: 2.0 }).unwrap();
    world.insert(e1, Position { x: 3.0, y: 4.0 }).unwrap();

    let mut count = 0;

    world.view::<(Position,)>().each(|_: &mut Position| count += 1);

    assert_eq!(count, 2);
}

#[test]
fn views_skip_entities_missing_a_component() {
    let mut world = World::new();

    let e0 = world.spawn();
    let e1 = world.spawn();

    world.insert(e0, Position { x: 1.0, y: 2.0 }).unwrap();
    world.insert(e0, Velocity { dx: 3.0, dy: 4.0 }).unwrap();
    world.insert(e1, Position { x: 5.0, y: 6.0 }).unwrap();

    let mut visited = Vec::new();

    world
        .view::<(Position, Velocity)>()
        .each(|e: Entity, _: &mut Position, _: &mut Velocity| visited.push(e));

    assert_eq!(visited, vec![e0]);
}

#[test]
fn the_join_visits_one_entity_with_both_components() {
    let mut world = World::new();

    let e0 = world.spawn();
    let e1 = world.spawn();

    world.insert(e0, Position { x: 1.0, y: 2.0 }).unwrap();
    world.insert(e1, Position { x: 3.0, y: 4.0 }).unwrap();
    world.insert(e1, Velocity { dx: 5.0, dy: 6.0 }).unwrap();

    let mut visited = Vec::new();

    world.view::<(Position, Velocity)>().each(
        |e: Entity, position: &mut Position, velocity: &mut Velocity| {
            visited.push((e, *position, *velocity));
        },
    );

    assert_eq!(
        visited,
        vec![(e1, Position { x: 3.0, y: 4.0 }, Velocity { dx: 5.0, dy: 6.0 })],
    );

    // a view over Position alone still sees both entities
    let mut count = 0;

    world.view::<(Position,)>().each(|_: &mut Position| count += 1);

    assert_eq!(count, 2);
}

#[test]
fn the_join_is_independent_of_the_driver_pool() {
    // A = {e0, e1}, B = {e1, e2}: the intersection is {e1} whichever
    // pool is smaller
    struct A;
    struct B;

    let mut world = World::new();

    let e0 = world.spawn();
    let e1 = world.spawn();
    let e2 = world.spawn();

    world.insert(e0, A).unwrap();
    world.insert(e1, A).unwrap();
    world.insert(e1, B).unwrap();
    world.insert(e2, B).unwrap();

    let mut visited = Vec::new();

    world.view::<(A, B)>().each(|e: Entity| visited.push(e));

    assert_eq!(visited, vec![e1]);

    // grow A past B so the driver flips to B
    let e3 = world.spawn();
    let e4 = world.spawn();

    world.insert(e3, A).unwrap();
    world.insert(e4, A).unwrap();

    let mut visited = Vec::new();

    world.view::<(A, B)>().each(|e: Entity| visited.push(e));

    assert_eq!(visited, vec![e1]);
}

#[test]
fn recycled_slots_do_not_resurface_components() {
    // a freed-then-reused slot must not resurface the old component
    struct Tag;

    let mut world = World::new();

    let old = world.spawn();

    world.insert(old, Position { x: 1.0, y: 2.0 }).unwrap();
    world.insert(old, Tag).unwrap();
    world.despawn(old).unwrap();

    let new = world.spawn();

    world.insert(new, Tag).unwrap();

    let mut count = 0;

    world.view::<(Position, Tag)>().each(|_: Entity| count += 1);

    assert_eq!(count, 0);
}

#[test]
fn three_way_join() {
    struct A(u32);
    struct B(u32);
    struct C(u32);

    let mut world = World::new();

    let e0 = world.spawn();
    let e1 = world.spawn();

    world.insert(e0, A(1)).unwrap();
    world.insert(e0, B(2)).unwrap();
    world.insert(e0, C(3)).unwrap();
    world.insert(e1, A(4)).unwrap();
    world.insert(e1, B(5)).unwrap();

    let mut visited = Vec::new();

    world.view::<(A, B, C)>().each(
        |e: Entity, a: &mut A, b: &mut B, c: &mut C| {
            visited.push((e, a.0, b.0, c.0));
        },
    );

    assert_eq!(visited, vec![(e0, 1, 2, 3)]);
}

#[test]
fn half_populated_join() {
    let mut world = World::new();

    for i in 0..1_000 {
        let entity = world.spawn();

        world.insert(entity, Position { x: i as f32, y: i as f32 }).unwrap();

        if i % 2 == 0 {
            world.insert(entity, Velocity { dx: 1.0, dy: 1.0 }).unwrap();
        }
    }

    let mut count = 0;

    world
        .view::<(Position, Velocity)>()
        .each(|_: &mut Position, _: &mut Velocity| count += 1);

    assert_eq!(count, 500);
}

#[test]
#[should_panic]
fn duplicate_component_types_panic() {
    let mut world = World::new();

    let entity = world.spawn();

    world.insert(entity, Position { x: 1.0, y: 2.0 }).unwrap();

    world
        .view::<(Position, Position)>()
        .each(|_: &mut Position, _: &mut Position| {});
}
