use std::fs;
use std::path::PathBuf;

use idle_economy::{
    Decimal, EngineConfig, FileStorage, GameState, MemoryStorage, Resource, SaveStorage,
    SaveSystem,
};
use idle_economy::save::snapshot_from_state;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("idle_economy_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn sample_state() -> GameState {
    let mut state = GameState::new_game(1_000);
    state
        .ledger
        .add(Resource::Credits, "3.5e1200".parse::<Decimal>().expect("literal"));
    state.settings.player_name = "Linus".to_string();
    state
}

#[test]
fn file_slots_round_trip() {
    let dir = scratch_dir("round_trip");
    let config = EngineConfig::default();
    let mut saves = SaveSystem::new(FileStorage::new(&dir), &config);
    saves.init().expect("creates the save directory");

    let snapshot = snapshot_from_state(&sample_state(), 2_000);
    saves.save(0, &snapshot).expect("writes slot file");
    assert!(dir.join("save_slot_0.json").exists());
    assert_eq!(saves.load(0), Some(snapshot));

    let slots = saves.list_slots();
    let metadata = slots[0].as_ref().expect("slot 0 listed");
    assert_eq!(metadata.player_name, "Linus");
    assert_eq!(metadata.last_played, 1_000);

    saves.delete(0).expect("removes slot file");
    assert!(!dir.join("save_slot_0.json").exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn corrupt_files_are_rejected_without_panicking() {
    let dir = scratch_dir("corrupt");
    let config = EngineConfig::default();
    let mut storage = FileStorage::new(&dir);
    storage.prepare().expect("creates dir");
    storage
        .write("save_slot_1", "{ not json")
        .expect("raw write");

    let saves = SaveSystem::new(storage, &config);
    assert_eq!(saves.load(1), None);
    assert!(saves.list_slots().iter().all(Option::is_none));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn exports_move_between_storages() {
    let config = EngineConfig::default();
    let mut source = SaveSystem::new(MemoryStorage::default(), &config);
    let snapshot = snapshot_from_state(&sample_state(), 2_000);
    source.save(0, &snapshot).expect("save");
    let encoded = source.export(0).expect("export");

    let dir = scratch_dir("import");
    let mut target = SaveSystem::new(FileStorage::new(&dir), &config);
    assert_eq!(target.import(1, &encoded), Some(snapshot.clone()));
    assert_eq!(target.load(1), Some(snapshot));
    let _ = fs::remove_dir_all(&dir);
}
