use std::sync::Arc;

use gaius_core::{
    Appearance, Command, Coordinate, Event, FootprintSize, PlacementError, TileMeta, TileStatus,
    TileType, VisualId,
};
use gaius_world::{self as world, query, World, WorldConfig};

fn road() -> Arc<TileMeta> {
    Arc::new(TileMeta::new("ROAD", TileType::Road, FootprintSize::SINGLE).with_cost(10.0))
}

fn park() -> Arc<TileMeta> {
    Arc::new(TileMeta::new("PARK", TileType::Park, FootprintSize::new(2, 2)))
}

fn run(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn interact(x: i32, z: i32, confirm: bool) -> Command {
    Command::Interact {
        hit: Some(Coordinate::new(x, z)),
        confirm,
    }
}

fn status_at(world: &World, x: i32, z: i32) -> TileStatus {
    query::cell(world, Coordinate::new(x, z))
        .map(|cell| cell.state().status)
        .expect("cell inside grid")
}

fn snapshot(world: &World) -> Vec<String> {
    query::cells(world)
        .map(|cell| {
            format!(
                "{cell} {:?} {:?} {:?}",
                cell.state().status,
                cell.chain_root(),
                cell.chain_nodes()
            )
        })
        .collect()
}

#[test]
fn road_placement_then_repeat_fails_without_change() {
    let mut world = World::new(WorldConfig::new(3, 3));
    let events = run(
        &mut world,
        vec![
            Command::SetPreviewTile { meta: road() },
            interact(1, 1, true),
        ],
    );

    assert_eq!(status_at(&world, 1, 1), TileStatus::Building);
    assert!(events.contains(&Event::TilePlaced {
        anchor: Coordinate::new(1, 1),
        meta_id: "ROAD".to_owned(),
        members: Vec::new(),
    }));
    assert!(query::preview(&world).is_none(), "placement consumes the preview");

    let before = snapshot(&world);
    let events = run(
        &mut world,
        vec![
            Command::SetPreviewTile { meta: road() },
            interact(1, 1, true),
        ],
    );

    assert_eq!(status_at(&world, 1, 1), TileStatus::Building);
    assert!(events.contains(&Event::PlacementRejected {
        at: Coordinate::new(1, 1),
        reason: PlacementError::Occupied,
    }));
    assert_eq!(
        query::cell(&world, Coordinate::new(1, 1)).and_then(|cell| cell.occupant()),
        Some(VisualId::new(0)),
        "the first placeholder stays the occupant"
    );
    assert_eq!(before, snapshot(&world));
}

#[test]
fn single_placement_on_one_cell_grid_reports_reset_health() {
    let meta = Arc::new(
        TileMeta::new("SHED", TileType::Residential, FootprintSize::SINGLE)
            .with_cost(100.0)
            .with_max_health(50.0),
    );
    let mut world = World::new(WorldConfig::new(1, 1));
    let _ = run(
        &mut world,
        vec![Command::SetPreviewTile { meta }, interact(0, 0, true)],
    );

    let cell = query::cell(&world, Coordinate::new(0, 0)).expect("origin cell");
    assert_eq!(cell.state().status, TileStatus::Building);
    assert_eq!(cell.meta().map(|meta| meta.id.as_str()), Some("SHED"));
    assert_eq!(cell.state().health, 0.0);
}

#[test]
fn park_chain_collects_every_non_anchor_member() {
    let mut world = World::new(WorldConfig::new(3, 3));
    assert_eq!(
        query::centered_selection(&world, Coordinate::new(1, 1), FootprintSize::new(2, 2)),
        Ok(vec![
            Coordinate::new(0, 0),
            Coordinate::new(0, 1),
            Coordinate::new(1, 0),
            Coordinate::new(1, 1),
        ])
    );

    let events = run(
        &mut world,
        vec![
            Command::SetPreviewTile { meta: park() },
            interact(1, 1, true),
        ],
    );

    let root = query::cell(&world, Coordinate::new(1, 1)).expect("anchor");
    assert_eq!(root.state().status, TileStatus::Building);
    assert!(root.chain_root().is_none());
    assert_eq!(
        root.chain_nodes(),
        &[
            Coordinate::new(0, 0),
            Coordinate::new(0, 1),
            Coordinate::new(1, 0),
        ]
    );
    for member in root.chain_nodes() {
        let cell = query::cell(&world, *member).expect("member");
        assert_eq!(cell.chain_root(), Some(Coordinate::new(1, 1)));
        assert!(
            cell.chain_nodes().is_empty(),
            "members never enumerate the chain"
        );
        assert!(!cell.can_place());
    }
    assert!(events.contains(&Event::TilePlaced {
        anchor: Coordinate::new(1, 1),
        meta_id: "PARK".to_owned(),
        members: vec![
            Coordinate::new(0, 0),
            Coordinate::new(0, 1),
            Coordinate::new(1, 0),
        ],
    }));
}

#[test]
fn chain_placement_is_all_or_nothing() {
    let mut world = World::new(WorldConfig::new(3, 3));
    let _ = run(
        &mut world,
        vec![
            Command::SetPreviewTile { meta: road() },
            interact(0, 1, true),
        ],
    );
    let before = snapshot(&world);

    let events = run(
        &mut world,
        vec![
            Command::SetPreviewTile { meta: park() },
            interact(1, 1, true),
        ],
    );

    assert_eq!(status_at(&world, 1, 1), TileStatus::Empty);
    assert_eq!(status_at(&world, 0, 0), TileStatus::Empty);
    assert!(query::cells(&world).all(|cell| cell.chain_root().is_none()));
    assert!(events.contains(&Event::PlacementRejected {
        at: Coordinate::new(1, 1),
        reason: PlacementError::Occupied,
    }));
    assert!(query::preview(&world).is_some(), "failed chain keeps the preview");
    let after: Vec<String> = snapshot(&world);
    assert_eq!(before, after);
}

#[test]
fn out_of_bounds_selection_fails_without_mutation() {
    let mut world = World::new(WorldConfig::new(3, 3));
    let size = FootprintSize::new(3, 3);

    assert_eq!(
        query::centered_selection(&world, Coordinate::new(0, 0), size),
        Err(PlacementError::OutOfBounds)
    );
    assert!(!query::can_place(&world, Coordinate::new(0, 0), size));

    let before = snapshot(&world);
    let events = run(
        &mut world,
        vec![
            Command::SetPreviewTile {
                meta: Arc::new(TileMeta::new("PLAZA", TileType::Park, size)),
            },
            interact(0, 0, true),
        ],
    );

    assert_eq!(before, snapshot(&world));
    assert!(events.contains(&Event::PlacementRejected {
        at: Coordinate::new(0, 0),
        reason: PlacementError::OutOfBounds,
    }));
    assert!(events.contains(&Event::PreviewValidityChanged {
        visual: VisualId::new(0),
        appearance: Appearance::Invalid,
    }));
}

#[test]
fn single_cell_can_place_matches_cell_can_place() {
    let mut world = World::new(WorldConfig::new(3, 3));
    let _ = run(
        &mut world,
        vec![
            Command::SetPreviewTile { meta: park() },
            interact(1, 1, true),
        ],
    );

    for cell in query::cells(&world) {
        assert_eq!(
            query::can_place(&world, cell.coordinate(), FootprintSize::SINGLE),
            cell.can_place(),
            "mismatch at {:?}",
            cell.coordinate()
        );
    }
}

#[test]
fn hover_is_exclusive_and_moves_preview() {
    let mut world = World::new(WorldConfig::new(3, 3));
    let _ = run(
        &mut world,
        vec![
            Command::SetPreviewTile { meta: road() },
            interact(0, 0, false),
        ],
    );
    assert!(query::cell(&world, Coordinate::new(0, 0))
        .is_some_and(|cell| cell.is_hovered() && cell.preview().is_some()));

    let events = run(&mut world, vec![interact(2, 1, false)]);

    let a = query::cell(&world, Coordinate::new(0, 0)).expect("cell a");
    let b = query::cell(&world, Coordinate::new(2, 1)).expect("cell b");
    assert!(!a.is_hovered());
    assert!(a.preview().is_none());
    assert!(b.is_hovered());
    assert!(b.preview().is_some());
    assert_eq!(query::hovered_cell(&world), Some(Coordinate::new(2, 1)));
    assert!(events.contains(&Event::HoverChanged {
        from: Some(Coordinate::new(0, 0)),
        to: Some(Coordinate::new(2, 1)),
    }));
}

#[test]
fn confirm_without_preview_selects_exclusively() {
    let mut world = World::new(WorldConfig::new(3, 3));
    let _ = run(&mut world, vec![interact(0, 0, true), interact(1, 2, true)]);

    assert_eq!(query::selected_cell(&world), Some(Coordinate::new(1, 2)));
    assert!(query::cell(&world, Coordinate::new(0, 0)).is_some_and(|cell| !cell.is_selected()));
    assert!(query::cell(&world, Coordinate::new(1, 2)).is_some_and(|cell| cell.is_selected()));
    assert!(query::cells(&world).all(|cell| cell.state().status == TileStatus::Empty));
}

#[test]
fn chain_hover_and_selection_forward_to_root() {
    let meta = Arc::new(TileMeta::new("BENCH", TileType::Park, FootprintSize::new(2, 1)));
    let mut world = World::new(WorldConfig::new(3, 3));
    let _ = run(
        &mut world,
        vec![Command::SetPreviewTile { meta }, interact(1, 0, true)],
    );
    let root = Coordinate::new(1, 0);
    let member = Coordinate::new(0, 0);
    assert_eq!(
        query::cell(&world, member).and_then(|cell| cell.chain_root()),
        Some(root)
    );

    let hovered = |world: &World| {
        (
            query::cell(world, root).is_some_and(|cell| cell.is_hovered()),
            query::cell(world, member).is_some_and(|cell| cell.is_hovered()),
        )
    };

    let _ = run(
        &mut world,
        vec![Command::SetChainHovered {
            cell: root,
            hovered: true,
        }],
    );
    assert_eq!(hovered(&world), (true, true));

    let _ = run(
        &mut world,
        vec![Command::SetChainHovered {
            cell: root,
            hovered: false,
        }],
    );
    assert_eq!(hovered(&world), (false, false));

    let _ = run(
        &mut world,
        vec![Command::SetChainHovered {
            cell: member,
            hovered: true,
        }],
    );
    assert_eq!(hovered(&world), (true, true));

    let _ = run(
        &mut world,
        vec![Command::SetChainSelected {
            cell: member,
            selected: true,
        }],
    );
    assert!(query::cell(&world, root).is_some_and(|cell| cell.is_selected()));
    assert!(query::cell(&world, member).is_some_and(|cell| cell.is_selected()));
    assert!(query::cell(&world, Coordinate::new(2, 0)).is_some_and(|cell| !cell.is_selected()));
}

#[test]
fn even_footprint_preview_anchor_is_shifted() {
    let mut world = World::new(WorldConfig::new(3, 3));
    let events = run(
        &mut world,
        vec![
            Command::SetPreviewTile { meta: park() },
            interact(2, 2, false),
        ],
    );

    assert!(events.contains(&Event::PreviewMoved {
        visual: VisualId::new(0),
        anchor: gaius_core::Anchor::new(1.5, 1.0, 1.5),
    }));
    assert!(events.contains(&Event::PreviewValidityChanged {
        visual: VisualId::new(0),
        appearance: Appearance::Preview,
    }));
}

#[test]
fn preview_attaches_to_already_hovered_cell() {
    let mut world = World::new(WorldConfig::new(3, 3));
    let _ = run(&mut world, vec![interact(1, 1, false)]);

    let events = run(&mut world, vec![Command::SetPreviewTile { meta: road() }]);

    assert!(query::cell(&world, Coordinate::new(1, 1)).is_some_and(|cell| cell.preview().is_some()));
    assert_eq!(
        events.first(),
        Some(&Event::PreviewSpawned {
            visual: VisualId::new(0),
            meta_id: "ROAD".to_owned(),
            appearance: Appearance::Preview,
        })
    );
}

#[test]
fn oversized_footprint_is_out_of_bounds_without_mutation() {
    let mut world = World::new(WorldConfig::new(3, 3));
    let huge = FootprintSize::new(i32::MAX as u32, i32::MAX as u32);

    assert!(!query::can_place(&world, Coordinate::new(1, 1), huge));
    assert_eq!(
        query::centered_selection(&world, Coordinate::new(1, 1), huge),
        Err(PlacementError::OutOfBounds)
    );
    assert_eq!(
        query::centered_selection(&world, Coordinate::new(1, 1), FootprintSize::new(u32::MAX, 1)),
        Err(PlacementError::OutOfBounds)
    );

    let before = snapshot(&world);
    let events = run(
        &mut world,
        vec![
            interact(1, 1, false),
            Command::SetPreviewTile {
                meta: Arc::new(TileMeta::new("MEGA", TileType::Park, huge)),
            },
            interact(1, 1, true),
        ],
    );

    assert!(events.contains(&Event::PreviewValidityChanged {
        visual: VisualId::new(0),
        appearance: Appearance::Invalid,
    }));
    assert!(events.contains(&Event::PlacementRejected {
        at: Coordinate::new(1, 1),
        reason: PlacementError::OutOfBounds,
    }));
    assert_eq!(before, snapshot(&world));
}
