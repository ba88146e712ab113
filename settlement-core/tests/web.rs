//! Smoke tests for the wasm bindings. Run with `wasm-pack test --node`.

#![cfg(target_arch = "wasm32")]

use settlement_core::{BuildState, BuildType, ResourceType, Simulation, WorkerTask};
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn new_simulation_has_one_idle_worker() {
    let sim = Simulation::new();
    assert_eq!(sim.get_max_workers(), 1);
    assert_eq!(sim.get_worker_task(1), WorkerTask::Idle);
}

#[wasm_bindgen_test]
fn build_castle_from_json_config() {
    let mut sim = Simulation::from_config_json(
        r#"{ "starting_workers": 2, "starting_resources": [
            { "resource": "Wood", "amount": 30 },
            { "resource": "Stone", "amount": 40 }
        ] }"#,
    )
    .unwrap_or_default();

    sim.select_build(BuildType::Castle);
    assert!(sim.try_start_construction());
    assert!(sim.assign_worker(1, WorkerTask::Build(BuildType::Castle)));
    assert!(sim.assign_worker(2, WorkerTask::Build(BuildType::Castle)));
    sim.advance(15.0);

    assert_eq!(sim.get_state(BuildType::Castle), BuildState::Built);
    assert_eq!(sim.get_resource(ResourceType::Wood), 0);
    assert_eq!(sim.get_max_workers(), 3);
}

#[wasm_bindgen_test]
fn bad_config_json_is_an_error() {
    assert!(Simulation::from_config_json("not json").is_err());
}
