//! End-to-end scenarios for the `runequest-core` engine.
//!
//! Each test builds a [`GameEngine`] on the default Lumbridge world with a
//! seeded RNG and drives it purely through public commands and
//! [`GameEngine::advance`].

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rand::SeedableRng;
use rand::rngs::SmallRng;
use runequest_core::{EngineEvent, GameConfig, GameEngine};
use runequest_types::{
    ActionKind, EntityId, ItemId, LoadedPlayer, LocationId, Position, Skill, Tile,
};
use runequest_world::{create_starting_world, items, locations};

fn engine_at(position: Position, seed: u64) -> GameEngine<SmallRng> {
    let mut loaded = LoadedPlayer::default();
    loaded.player.position = position;
    engine_from(loaded, seed)
}

fn engine_from(loaded: LoadedPlayer, seed: u64) -> GameEngine<SmallRng> {
    GameEngine::new(
        create_starting_world(),
        loaded,
        GameConfig::default(),
        SmallRng::seed_from_u64(seed),
    )
    .unwrap()
}

fn progress_values(events: &[EngineEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::ActionProgress { progress, .. } => Some(*progress),
            _ => None,
        })
        .collect()
}

#[test]
fn woodcutting_end_to_end() {
    let oak = EntityId::new("oak_1");
    let mut engine = engine_at(Position::new(6, 6), 11);
    assert!(engine.interact(&oak));
    assert_eq!(engine.active_action().map(|a| a.kind), Some(ActionKind::Woodcutting));

    engine.advance(3_000);
    let events = engine.drain_events();
    let progress = progress_values(&events);
    assert!(progress.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(progress.last(), Some(&100));
    assert!(events.contains(&EngineEvent::ActionCompleted {
        kind: ActionKind::Woodcutting
    }));
    assert!(events.contains(&EngineEvent::EntityHidden { id: oak.clone() }));

    assert!(engine.active_action().is_none());
    assert_eq!(engine.player().inventory.quantity(&ItemId::new(items::WOOD)), 1);
    assert_eq!(engine.player().stats.xp_for(Skill::Woodcutting), 25);
    assert!(engine.entities().get(&oak).unwrap().hidden);

    // Hidden entities cannot be interacted with.
    assert!(!engine.interact(&oak));

    engine.advance(10_000);
    let tree = engine.entities().get(&oak).unwrap();
    assert!(!tree.hidden);
    assert_eq!(engine.world().map().tile(tree.position), Some(Tile::Grass));
    assert!(engine.drain_events().iter().any(|e| matches!(
        e,
        EngineEvent::EntityRespawned { id, .. } if *id == oak
    )));
}

#[test]
fn crossing_level_boundary_logs_level_up() {
    let mut loaded = LoadedPlayer::default();
    loaded.player.position = Position::new(6, 6);
    loaded.player.xp.insert(Skill::Woodcutting, 60);
    let mut engine = engine_from(loaded, 3);

    assert_eq!(engine.level_info(Skill::Woodcutting).level, 1);
    assert!(engine.interact(&EntityId::new("oak_2")));
    engine.advance(3_000);

    assert_eq!(engine.player().stats.xp_for(Skill::Woodcutting), 85);
    assert_eq!(engine.level_info(Skill::Woodcutting).level, 2);
    assert!(engine.drain_events().contains(&EngineEvent::LevelUp {
        skill: Skill::Woodcutting,
        level: 2
    }));
    assert!(
        engine
            .log()
            .iter()
            .any(|l| l == "Congratulations! You just advanced your woodcutting level to 2.")
    );
}

#[test]
fn activities_are_mutually_exclusive() {
    let mut engine = engine_at(Position::new(10, 9), 5);
    assert!(engine.interact(&EntityId::new("man_1")));
    assert!(engine.combat().is_some());

    assert!(!engine.travel(&LocationId::new(locations::FOREST)));
    assert!(!engine.move_by(0, 1));
    assert!(!engine.interact(&EntityId::new("man_2")));
    assert!(engine.active_action().is_none());
    assert_eq!(engine.player().stats.position, Position::new(10, 9));
}

#[test]
fn combat_always_terminates_cleanly() {
    for seed in 0..20 {
        let mut engine = engine_at(Position::new(10, 9), seed);
        assert!(engine.interact(&EntityId::new("man_1")));

        let mut ticks = 0;
        while engine.combat().is_some() {
            engine.advance(2_400);
            ticks += 1;
            let stats = &engine.player().stats;
            assert!(stats.hp <= stats.max_hp);
            assert!(ticks < 500, "combat never ended for seed {seed}");
        }

        let events = engine.drain_events();
        let won = events
            .iter()
            .any(|e| matches!(e, EngineEvent::EnemyDefeated { .. }));
        let lost = events.contains(&EngineEvent::PlayerDefeated {
            enemy: String::from("Man"),
        });
        assert!(won ^ lost, "exactly one side falls (seed {seed})");
        if lost {
            assert_eq!(engine.player().stats.hp, engine.player().stats.max_hp);
        } else {
            assert!((5..=14).contains(&engine.player().stats.gold));
            assert!(engine.player().stats.xp_for(Skill::Attack) >= 10);
        }

        // Only the periodic autosave and chat timers remain.
        assert_eq!(engine.pending_timers(), 2);
        engine.advance(24_000);
        assert!(
            engine
                .drain_events()
                .iter()
                .all(|e| !matches!(e, EngineEvent::Hitsplat { .. }))
        );
    }
}

#[test]
fn cancelled_action_never_completes() {
    let mut engine = engine_at(Position::new(10, 10), 9);
    assert!(engine.travel(&LocationId::new(locations::FOREST)));
    engine.advance(1_000);
    assert!(engine.cancel_action());
    engine.advance(5_000);

    assert_eq!(engine.player().location.as_str(), locations::COURTYARD);
    let events = engine.drain_events();
    assert!(events.contains(&EngineEvent::ActionCancelled {
        kind: ActionKind::Traveling
    }));
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, EngineEvent::ActionCompleted { .. }))
    );
    assert!(progress_values(&events).iter().all(|p| *p < 100));
}

#[test]
fn smelting_from_mined_ore() {
    let mut engine = engine_at(Position::new(15, 14), 21);
    assert!(engine.interact(&EntityId::new("copper_1")));
    engine.advance(4_000);

    // Walk to the tin rock at (14,15).
    assert!(engine.move_by(-1, 0));
    assert!(engine.interact(&EntityId::new("tin_1")));
    engine.advance(4_000);

    // Too far from the forge at (5,15).
    assert!(!engine.smelt());

    for _ in 0..8 {
        assert!(engine.move_by(-1, 0));
    }
    assert_eq!(engine.player().stats.position, Position::new(6, 14));
    assert!(engine.smelt());
    engine.advance(5_000);

    let inventory = &engine.player().inventory;
    assert_eq!(inventory.quantity(&ItemId::new(items::COPPER_ORE)), 0);
    assert_eq!(inventory.quantity(&ItemId::new(items::TIN_ORE)), 0);
    assert_eq!(inventory.quantity(&ItemId::new(items::BRONZE_BAR)), 1);
    assert_eq!(engine.player().stats.xp_for(Skill::Smithing), 50);
    assert_eq!(engine.log().latest(), Some("You smelted a bronze bar."));
}

#[test]
fn snapshot_restores_into_a_new_engine() {
    let mut engine = engine_at(Position::new(6, 6), 13);
    assert!(engine.interact(&EntityId::new("oak_1")));
    engine.advance(3_000);
    assert!(engine.move_by(1, 0));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.username, "Adventurer");
    assert_eq!(snapshot.taken_at_ms, 3_000);

    let restored = engine_from(snapshot.clone().into_loaded(), 13);
    assert_eq!(restored.player().stats, engine.player().stats);
    assert_eq!(
        restored.player().inventory.quantity(&ItemId::new(items::WOOD)),
        1
    );
    assert_eq!(restored.player().location, engine.player().location);
    assert_eq!(restored.snapshot().inventory, snapshot.inventory);
}

#[test]
fn shutdown_discards_pending_effects() {
    let mut engine = engine_at(Position::new(6, 6), 17);
    assert!(engine.interact(&EntityId::new("oak_1")));
    engine.advance(1_500);
    engine.shutdown();
    engine.advance(10_000);

    assert!(engine.is_shut_down());
    assert_eq!(engine.pending_timers(), 0);
    assert_eq!(engine.player().inventory.quantity(&ItemId::new(items::WOOD)), 0);
    assert!(!engine.interact(&EntityId::new("oak_1")));
}
