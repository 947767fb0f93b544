use crate::model::RootState;
use crate::util::Dice;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Whole-document persistence for the root state. Single writer, last
/// write wins.
pub(crate) trait Store {
    /// `None` when nothing usable is stored (missing or corrupt).
    fn load(&self) -> Option<RootState>;
    fn save(&mut self, root: &RootState) -> Result<()>;
}

pub(crate) struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Option<RootState> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!("no state at {}: {err}", self.path.display());
                return None;
            }
        };
        match serde_json::from_str::<RootState>(&raw) {
            Ok(root) => Some(root),
            Err(err) => {
                warn!("ignoring unreadable state at {}: {err}", self.path.display());
                None
            }
        }
    }

    fn save(&mut self, root: &RootState) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(root)?;
        fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
        atomic_rename(&tmp, &self.path)?;
        debug!("saved state to {}", self.path.display());
        Ok(())
    }
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename-over-existing fails on Windows, so clear the target first
    if cfg!(windows) && to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to).with_context(|| format!("replacing {}", to.display()))?;
    Ok(())
}

/// Holds the document in memory; stands in for a browser-style key/value
/// host.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryStore {
    pub(crate) blob: Option<String>,
}

#[cfg(test)]
impl Store for MemoryStore {
    fn load(&self) -> Option<RootState> {
        self.blob
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    fn save(&mut self, root: &RootState) -> Result<()> {
        self.blob = Some(serde_json::to_string(root)?);
        Ok(())
    }
}

/// Loads the stored state, or bootstraps a fresh one when there is none.
pub(crate) fn load_or_bootstrap<S, D>(store: &S, dice: &mut D, now: DateTime<Utc>) -> RootState
where
    S: Store + ?Sized,
    D: Dice + ?Sized,
{
    store.load().unwrap_or_else(|| {
        debug!("bootstrapping fresh state");
        RootState::bootstrap(dice, now)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Achievement, Stage};
    use crate::util::ScriptedDice;

    fn temp_file(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "pet-me-storage-{label}-{}-{}",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ))
    }

    fn sample() -> RootState {
        let mut dice = ScriptedDice::quiet();
        let mut root = RootState::bootstrap(&mut dice, Utc::now());
        root.adopt("Luna", &mut dice, Utc::now());
        for pet in root.pets.values_mut() {
            pet.hunger = 12.345_678_9;
            pet.age_days = 7.25;
            pet.stage = Stage::Adult;
            pet.sick = true;
            pet.perfect_diet_streak = 3;
            pet.achievements.insert(Achievement::PerfectDiet5);
        }
        root.config.notifications = true;
        root
    }

    #[test]
    fn file_round_trip_is_exact() {
        let dir = temp_file("roundtrip");
        let path = dir.join("nested").join("state.json");
        let mut store = JsonFileStore::new(path.clone());
        let root = sample();
        store.save(&root).expect("save");
        assert_eq!(store.load(), Some(root));
        assert!(!path.with_extension("json.tmp").exists());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_file_bootstraps() {
        let store = JsonFileStore::new(temp_file("missing").join("state.json"));
        assert_eq!(store.load(), None);
        let root = load_or_bootstrap(&store, &mut ScriptedDice::quiet(), Utc::now());
        assert_eq!(root.pets.len(), 1);
    }

    #[test]
    fn corrupt_file_is_treated_as_absent() {
        let path = temp_file("corrupt");
        fs::write(&path, "{ not json").expect("write");
        let store = JsonFileStore::new(path.clone());
        assert_eq!(store.load(), None);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn wire_format_uses_camel_case_names() {
        let mut store = MemoryStore::default();
        store.save(&sample()).expect("save");
        let raw = store.blob.clone().unwrap_or_default();
        for key in [
            "currentPetId",
            "hungerRatePerHour",
            "randomEventHourlyChance",
            "ageDays",
            "lastUpdate",
            "perfectDietStreak",
            "\"PERFECT_DIET_5\"",
            "\"adult\"",
        ] {
            assert!(raw.contains(key), "missing {key} in {raw}");
        }
    }

    #[test]
    fn sparse_documents_fill_defaults() {
        let raw = r#"{
            "currentPetId": "abcde",
            "pets": {
                "abcde": {
                    "id": "abcde", "name": "Old", "stage": "teen",
                    "hunger": 10, "happiness": 50, "health": 75,
                    "inventory": { "food": 2 },
                    "ageDays": 3.5, "lastUpdate": "2024-01-01T00:00:00.000Z",
                    "alive": true
                }
            }
        }"#;
        let store = MemoryStore {
            blob: Some(raw.to_string()),
        };
        let root = store.load().expect("parses");
        let pet = root.current().expect("selected");
        assert_eq!(pet.inventory.food, 2);
        assert_eq!(pet.inventory.meds, 0);
        assert!(!pet.sick);
        assert!(pet.achievements.is_empty());
        assert_eq!(root.config, crate::config::Config::default());
        assert!(root.log.is_empty());
    }

    #[test]
    fn partial_config_keeps_pets_and_log() {
        let path = temp_file("partial-config");
        let raw = r#"{
            "currentPetId": "old01",
            "pets": {
                "old01": {
                    "id": "old01", "name": "Old", "stage": "baby",
                    "hunger": 20, "happiness": 60, "health": 90,
                    "inventory": { "food": 1, "toys": 0, "meds": 0 },
                    "ageDays": 1.5, "lastUpdate": "2024-01-01T00:00:00.000Z",
                    "alive": true
                }
            },
            "config": {
                "hungerRatePerHour": 7,
                "happinessDecayPerHour": 3,
                "healthDecayPerHour": 2,
                "randomEventHourlyChance": 0.2
            },
            "log": ["x"]
        }"#;
        fs::write(&path, raw).expect("write");
        let store = JsonFileStore::new(path.clone());
        let root = load_or_bootstrap(&store, &mut ScriptedDice::quiet(), Utc::now());
        assert_eq!(root.current().map(|p| p.name.as_str()), Some("Old"));
        assert_eq!(root.log, vec!["x".to_string()]);
        assert_eq!(root.config.hunger_rate_per_hour, 7.0);
        assert!(!root.config.notifications);
        let _ = fs::remove_file(path);
    }
}
