use dot_merge_core::{Cell, CellCoord, ColorId, Command, Event, SessionConfig};
use dot_merge_system_gravity::Gravity;
use dot_merge_world::{self as world, query, World};
use proptest::prelude::*;

/// Builds a playing world whose columns hold `columns[x]`, bottom cell first.
fn world_with_columns(columns: &[Vec<Option<u8>>]) -> World {
    let width = columns.len() as u32;
    let height = columns[0].len() as u32;
    let mut world = World::new(SessionConfig {
        width,
        height,
        ..SessionConfig::default()
    })
    .expect("valid config");

    let mut events = Vec::new();
    world::apply(&mut world, Command::ShowTutorial, &mut events);
    world::apply(&mut world, Command::StartRound, &mut events);
    for (column, cells) in columns.iter().enumerate() {
        for (row, color) in cells.iter().enumerate() {
            if let Some(color) = color {
                world::apply(
                    &mut world,
                    Command::SpawnDot {
                        cell: CellCoord::new(column as u32, row as u32),
                        color: ColorId::new(*color),
                    },
                    &mut events,
                );
            }
        }
    }
    world
}

fn collapse(world: &mut World) -> (Vec<Command>, Vec<Event>) {
    let mut commands = Vec::new();
    Gravity::new().handle(query::grid_view(world), &mut commands);
    let mut events = Vec::new();
    for command in commands.clone() {
        world::apply(world, command, &mut events);
    }
    (commands, events)
}

fn column_colors(world: &World, column: u32) -> Vec<Option<ColorId>> {
    query::grid(world)
        .column_cells(column)
        .expect("column in bounds")
        .map(|(_, cell)| cell.color())
        .collect()
}

fn at(column: u32, row: u32) -> CellCoord {
    CellCoord::new(column, row)
}

#[test]
fn dots_fall_into_gaps_keeping_their_order() {
    let mut world = world_with_columns(&[vec![None, Some(1), None, Some(2), Some(3)]]);

    let (_, events) = collapse(&mut world);

    assert_eq!(
        events,
        vec![
            Event::Moved {
                from: at(0, 1),
                to: at(0, 0),
                color: ColorId::new(1),
            },
            Event::Moved {
                from: at(0, 3),
                to: at(0, 1),
                color: ColorId::new(2),
            },
            Event::Moved {
                from: at(0, 4),
                to: at(0, 2),
                color: ColorId::new(3),
            },
        ]
    );
    assert_eq!(
        column_colors(&world, 0),
        vec![
            Some(ColorId::new(1)),
            Some(ColorId::new(2)),
            Some(ColorId::new(3)),
            None,
            None,
        ]
    );
}

#[test]
fn compact_columns_emit_nothing() {
    let mut world = world_with_columns(&[
        vec![Some(0), Some(1), None],
        vec![None, None, None],
        vec![Some(2), Some(2), Some(2)],
    ]);

    let (commands, events) = collapse(&mut world);

    assert!(commands.is_empty());
    assert!(events.is_empty());
}

#[test]
fn columns_are_processed_left_to_right() {
    let mut world = world_with_columns(&[
        vec![None, Some(0)],
        vec![Some(1), Some(1)],
        vec![None, Some(2)],
    ]);

    let (commands, _) = collapse(&mut world);

    assert_eq!(
        commands,
        vec![
            Command::MoveDot {
                from: at(0, 1),
                to: at(0, 0),
            },
            Command::MoveDot {
                from: at(2, 1),
                to: at(2, 0),
            },
        ]
    );
}

fn grid_strategy() -> impl Strategy<Value = Vec<Vec<Option<u8>>>> {
    (1usize..7, 1usize..7).prop_flat_map(|(width, height)| {
        proptest::collection::vec(
            proptest::collection::vec(proptest::option::of(0u8..5), height),
            width,
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn gravity_packs_every_column_stably(columns in grid_strategy()) {
        let mut world = world_with_columns(&columns);
        let occupied_before = query::grid_view(&world).occupied_count();

        let (commands, events) = collapse(&mut world);

        prop_assert_eq!(commands.len(), events.len(), "every move applies cleanly");
        prop_assert_eq!(query::grid_view(&world).occupied_count(), occupied_before);

        for (column, cells) in columns.iter().enumerate() {
            let expected: Vec<ColorId> = cells.iter().flatten().map(|color| ColorId::new(*color)).collect();
            let after = column_colors(&world, column as u32);
            let packed: Vec<ColorId> = after.iter().take(expected.len()).flatten().copied().collect();
            prop_assert_eq!(&packed, &expected);
            prop_assert!(after[expected.len()..].iter().all(Option::is_none));
        }

        let (again, _) = collapse(&mut world);
        prop_assert!(again.is_empty(), "a settled grid stays settled");
        let all_supported = query::grid_view(&world).iter().all(|(cell, contents)| {
            contents.is_empty() || cell.row() == 0 || query::grid(&world)
                .get(CellCoord::new(cell.column(), cell.row() - 1))
                .map(Cell::is_occupied)
                .unwrap_or(false)
        });
        prop_assert!(all_supported);
    }
}
