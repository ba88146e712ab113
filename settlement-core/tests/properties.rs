//! Property-based tests for engine invariants
//!
//! Each test drives the engine with long seeded random command sequences and
//! checks properties that must hold after every step, whatever the commands.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use settlement_core::{
    BuildState, BuildType, GameState, RefineType, ResourceAmount, ResourceNode, ResourceType,
    SimConfig, ToolType, WorkerTask,
};

// === TEST FIXTURES ===

const SEEDS: [u64; 4] = [1, 7, 42, 1234];
const STEPS: usize = 400;

fn random_build(rng: &mut StdRng) -> BuildType {
    // Includes None
    match rng.random_range(0..7) {
        0 => BuildType::None,
        1 => BuildType::Castle,
        2 => BuildType::Bridge,
        3 => BuildType::Courtyard,
        4 => BuildType::Motte,
        5 => BuildType::Cathedral,
        _ => BuildType::Library,
    }
}

fn random_task(rng: &mut StdRng) -> WorkerTask {
    match rng.random_range(0..4) {
        0 => WorkerTask::Idle,
        1 => WorkerTask::GatherWood,
        2 => WorkerTask::GatherStone,
        _ => WorkerTask::Build(random_build(rng)),
    }
}

fn random_tool(rng: &mut StdRng) -> ToolType {
    match rng.random_range(0..3) {
        0 => ToolType::Axe,
        1 => ToolType::Pickaxe,
        _ => ToolType::Boots,
    }
}

fn seeded_state(rng: &mut StdRng) -> GameState {
    GameState::new(SimConfig {
        starting_workers: rng.random_range(1..5),
        starting_resources: vec![
            ResourceAmount::new(ResourceType::Wood, rng.random_range(0..200)),
            ResourceAmount::new(ResourceType::Stone, rng.random_range(0..400)),
        ],
        ..SimConfig::default()
    })
}

/// Issue one random command
fn random_step(state: &mut GameState, rng: &mut StdRng, rock: &mut ResourceNode) {
    match rng.random_range(0..9) {
        0 | 1 | 2 => state.advance(rng.random_range(0.0..3.0)),
        3 => {
            state.select_build(random_build(rng));
            state.try_start_construction();
        }
        4 => {
            let worker = rng.random_range(0..=state.workers.max_workers() + 1);
            let task = random_task(rng);
            state.assign_worker(worker, task);
        }
        5 => {
            state.set_worker_count(rng.random_range(0..20));
        }
        6 => {
            state.try_upgrade(random_tool(rng));
        }
        7 => {
            let refine = if rng.random_bool(0.5) {
                RefineType::Iron
            } else {
                RefineType::Planks
            };
            state.try_refine(refine);
        }
        _ => {
            if rng.random_bool(0.5) {
                state.harvest(&mut ResourceNode::tree());
            } else {
                state.harvest(rock);
            }
        }
    }
}

// === PROPERTIES ===

#[test]
fn property_ledger_matches_change_log() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = seeded_state(&mut rng);
        let mut rock = ResourceNode::rock();
        let initial = state.ledger.get_all();

        let mut net: HashMap<ResourceType, i64> = HashMap::new();
        for _ in 0..STEPS {
            random_step(&mut state, &mut rng, &mut rock);
            for change in state.take_resource_changes() {
                *net.entry(change.resource).or_insert(0) += change.delta;
            }
        }

        for resource in ResourceType::all() {
            assert_eq!(
                state.ledger.get(resource),
                initial[&resource] + net.get(&resource).copied().unwrap_or(0),
                "seed {seed}: {resource:?} drifted from its change log"
            );
        }
    }
}

#[test]
fn property_ledger_never_negative_through_commands() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = seeded_state(&mut rng);
        let mut rock = ResourceNode::rock();

        for step in 0..STEPS {
            random_step(&mut state, &mut rng, &mut rock);
            for (resource, qty) in state.ledger.get_all() {
                assert!(qty >= 0, "seed {seed} step {step}: {resource:?} = {qty}");
            }
        }
    }
}

#[test]
fn property_build_states_only_move_forward() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = seeded_state(&mut rng);
        let mut rock = ResourceNode::rock();
        let mut last: HashMap<BuildType, BuildState> = HashMap::new();

        for _ in 0..STEPS {
            random_step(&mut state, &mut rng, &mut rock);
            for build_type in BuildType::concrete() {
                let now = state.tracker.get_state(build_type);
                let before = last.insert(build_type, now).unwrap_or_default();
                assert!(now >= before, "seed {seed}: {build_type:?} went {before:?} -> {now:?}");
            }
            assert_eq!(state.tracker.get_state(BuildType::None), BuildState::NotBuilt);
        }
    }
}

#[test]
fn property_workers_only_build_in_progress_sites() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = seeded_state(&mut rng);
        let mut rock = ResourceNode::rock();

        for _ in 0..STEPS {
            random_step(&mut state, &mut rng, &mut rock);
            for (id, slot) in state.workers.slots() {
                if let Some(build_type) = slot.task.build_target() {
                    assert!(
                        state.tracker.is_in_progress(build_type),
                        "seed {seed}: worker {id} bound to {build_type:?} in state {:?}",
                        state.tracker.get_state(build_type)
                    );
                }
            }
        }
    }
}

#[test]
fn property_slots_are_contiguous_and_bounded() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = seeded_state(&mut rng);
        let mut rock = ResourceNode::rock();

        for _ in 0..STEPS {
            random_step(&mut state, &mut rng, &mut rock);
            // The admin lever caps at 16; building unlocks (5 in total in
            // the standard catalog) may push past it
            let max = state.workers.max_workers();
            assert!((1..=21).contains(&max));
            let ids: Vec<u32> = state.workers.slots().map(|(id, _)| id).collect();
            assert_eq!(ids, (1..=max).collect::<Vec<_>>());
        }
    }
}

#[test]
fn property_tool_levels_never_decrease() {
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = seeded_state(&mut rng);
        let mut rock = ResourceNode::rock();
        let mut last: HashMap<ToolType, u32> = HashMap::new();

        for _ in 0..STEPS {
            random_step(&mut state, &mut rng, &mut rock);
            for tool in ToolType::all() {
                let level = state.tools.level(tool);
                assert!(level >= last.get(&tool).copied().unwrap_or(0));
                assert!(level <= state.tools.max_level(tool, &state.catalog));
                last.insert(tool, level);
            }
        }
    }
}
