mod bridge;
mod codec;
mod migrate;
mod model;
mod slots;
mod validate;

pub use bridge::{snapshot_from_state, state_from_snapshot};
pub use codec::{export_to_base64, import_from_base64, load_from_json_string, save_to_json_string};
pub use migrate::migrate;
pub use model::{
    CURRENT_SAVE_VERSION, SaveMinigame, SaveSettings, SaveSlotMetadata, SaveSnapshot, SaveStats,
};
pub use slots::{FileStorage, MemoryStorage, SaveStorage, SaveSystem};
pub use validate::{SaveError, validate_envelope, validate_snapshot};

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{
        MemoryStorage, SaveMinigame, SaveSettings, SaveSnapshot, SaveStats, SaveStorage,
        SaveSystem, export_to_base64, import_from_base64, load_from_json_string,
        save_to_json_string, snapshot_from_state, state_from_snapshot,
    };
    use crate::Decimal;
    use crate::core::{GameState, MinigameId, Resource};
    use crate::data::{Automation, EngineConfig, Rules};

    const CAP: usize = 5;

    fn d(text: &str) -> Decimal {
        text.parse().expect("valid decimal literal")
    }

    fn sample_snapshot() -> SaveSnapshot {
        SaveSnapshot {
            version: "1.2.0".to_string(),
            last_saved: 1_700_000_050_000,
            last_played: 1_700_000_000_000,
            resources: BTreeMap::from([
                ("credits".to_string(), d("1.2345e400")),
                ("techniquePoints".to_string(), d("12")),
                ("renownPoints".to_string(), d("0.5")),
            ]),
            minigames: BTreeMap::from([(
                "codeBreaker".to_string(),
                SaveMinigame {
                    unlocked: true,
                    top_scores: vec![d("900"), d("450"), d("450")],
                    play_count: 14,
                    upgrades: BTreeMap::from([("extendedTimer".to_string(), 3)]),
                },
            )]),
            upgrades: BTreeMap::from([
                ("autoTyper".to_string(), 7),
                ("breakerDaemon".to_string(), 1),
            ]),
            settings: SaveSettings {
                offline_progress_enabled: false,
                player_name: "Ada".to_string(),
            },
            stats: SaveStats {
                total_play_time: 98_765.25,
                total_resources_earned: BTreeMap::from([
                    ("credits".to_string(), d("2e400")),
                    ("techniquePoints".to_string(), d("40")),
                ]),
            },
        }
    }

    #[test]
    fn save_json_round_trip() {
        let original = sample_snapshot();
        let json = save_to_json_string(&original).expect("save JSON should serialize");
        let restored = load_from_json_string(&json, CAP).expect("save JSON should deserialize");

        assert_eq!(restored, original);
        assert!(json.contains("\"credits\":\"1.2345e400\""));
    }

    #[test]
    fn save_base64_round_trip() {
        let original = sample_snapshot();
        let encoded = export_to_base64(&original).expect("save should export to base64");
        let restored = import_from_base64(&encoded, CAP).expect("save should import from base64");

        assert_eq!(restored, original);
    }

    #[test]
    fn garbage_imports_are_rejected() {
        assert!(import_from_base64("not base64!", CAP).is_err());
        assert!(import_from_base64("eyJ2ZXJzaW9uIjoxfQ==", CAP).is_err());
        assert!(load_from_json_string("{\"version\":\"1.2.0\"}", CAP).is_err());
    }

    #[test]
    fn old_saves_load_through_migration() {
        let json = r#"{
            "version": "1.0.0",
            "lastSaved": 10,
            "lastPlayed": 5,
            "resources": { "credits": "42" },
            "minigames": {},
            "upgrades": {},
            "stats": { "totalPlayTime": 100 }
        }"#;
        let snapshot = load_from_json_string(json, CAP).expect("1.0.0 save migrates");
        assert_eq!(snapshot.version, "1.2.0");
        assert!(snapshot.settings.offline_progress_enabled);
        assert_eq!(snapshot.resources.get("renownPoints"), Some(&Decimal::ZERO));
        assert_eq!(
            snapshot.stats.total_resources_earned.get("credits"),
            Some(&d("42"))
        );
    }

    #[test]
    fn state_bridge_round_trip() {
        let rules = Rules::default();
        let mut state = GameState::new_game(1_000);
        state.ledger.add(Resource::Credits, d("5e350"));
        state.ledger.try_subtract(Resource::Credits, d("1e350"));
        state.ledger.add(Resource::RenownPoints, d("3"));
        state.minigame_mut(MinigameId::CodeBreaker).top_scores = vec![d("70"), d("20")];
        state.minigame_mut(MinigameId::CodeBreaker).play_count = 9;
        state.minigame_mut(MinigameId::CodeRunner).unlocked = true;
        state.upgrades.insert("runnerDaemon".to_string(), 1);
        state.refresh_automations(&rules.catalog);
        state.settings.player_name = "Grace".to_string();
        state.stats.total_play_time_ms = 4_321.0;

        let snapshot = snapshot_from_state(&state, state.last_saved_ms);
        let restored = state_from_snapshot(&snapshot, &rules);

        assert_eq!(restored, state);
        assert!(restored.is_automation_enabled(Automation::AutoRunner));
        assert_eq!(restored.ledger.lifetime(Resource::Credits), d("5e350"));
    }

    #[test]
    fn bridge_drops_unknown_ids_and_clamps_levels() {
        let rules = Rules::default();
        let mut snapshot = sample_snapshot();
        snapshot.resources.insert("gold".to_string(), d("1"));
        snapshot.upgrades.insert("warpDrive".to_string(), 2);
        snapshot.upgrades.insert("mechanicalKeyboard".to_string(), 99);
        snapshot.upgrades.insert("extendedTimer".to_string(), 1);

        let state = state_from_snapshot(&snapshot, &rules);
        assert_eq!(state.upgrades.get("warpDrive"), None);
        assert_eq!(state.upgrades.get("extendedTimer"), None);
        assert_eq!(state.upgrades.get("mechanicalKeyboard"), Some(&20));
        assert!(state.is_automation_enabled(Automation::AutoBreaker));
        assert_eq!(state.ledger.current(Resource::RenownPoints), d("0.5"));
        assert_eq!(state.ledger.lifetime(Resource::RenownPoints), d("0.5"));
    }

    #[test]
    fn slots_save_load_list_and_delete() {
        let config = EngineConfig::default();
        let mut saves = SaveSystem::new(MemoryStorage::default(), &config);
        saves.init().expect("memory storage init");
        saves.init().expect("second init is ignored");

        let snapshot = sample_snapshot();
        saves.save(1, &snapshot).expect("slot in range");
        assert!(saves.save(config.max_save_slots, &snapshot).is_err());
        assert_eq!(saves.load(1), Some(snapshot.clone()));
        assert_eq!(saves.load(0), None);

        let slots = saves.list_slots();
        assert_eq!(slots.len(), config.max_save_slots);
        let metadata = slots[1].as_ref().expect("slot 1 metadata");
        assert_eq!(metadata.player_name, "Ada");
        assert_eq!(metadata.credits, d("1.2345e400"));
        assert!(slots[0].is_none());

        saves.delete(1).expect("delete slot");
        assert_eq!(saves.load(1), None);
    }

    #[test]
    fn corrupt_slot_loads_as_none() {
        let config = EngineConfig::default();
        let mut storage = MemoryStorage::default();
        storage
            .write("save_slot_0", "{\"version\":\"1.2.0\",\"resources\":[]}")
            .expect("memory write");
        let saves = SaveSystem::new(storage, &config);
        assert_eq!(saves.load(0), None);
        assert_eq!(saves.list_slots()[0], None);
    }

    #[test]
    fn export_then_import_into_another_slot() {
        let config = EngineConfig::default();
        let mut saves = SaveSystem::new(MemoryStorage::default(), &config);
        saves.save(0, &sample_snapshot()).expect("save");

        let encoded = saves.export(0).expect("slot 0 exports");
        assert_eq!(saves.import(2, &encoded), Some(sample_snapshot()));
        assert_eq!(saves.load(2), Some(sample_snapshot()));
        assert_eq!(saves.import(2, "%%%"), None);
        assert_eq!(saves.export(1), None);
    }
}
