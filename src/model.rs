use crate::config::Config;
use crate::util::{short_id, stamp, Dice};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::{fmt, str::FromStr};
use thiserror::Error;

pub(crate) const DEFAULT_PET_NAME: &str = "Pixel";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Stage {
    Egg,
    Baby,
    Teen,
    Adult,
}

impl Stage {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Stage::Egg => "egg",
            Stage::Baby => "baby",
            Stage::Teen => "teen",
            Stage::Adult => "adult",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mood {
    Happy,
    Neutral,
    Sad,
    Sick,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Item {
    Food,
    Toys,
    Meds,
}

impl Item {
    pub(crate) const ALL: [Item; 3] = [Item::Food, Item::Toys, Item::Meds];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Item::Food => "food",
            Item::Toys => "toys",
            Item::Meds => "meds",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown item `{0}` (expected food, toys or meds)")]
pub(crate) struct ParseItemError(pub(crate) String);

impl FromStr for Item {
    type Err = ParseItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Item::ALL
            .into_iter()
            .find(|i| i.label() == lowered)
            .ok_or_else(|| ParseItemError(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Inventory {
    pub(crate) food: u32,
    pub(crate) toys: u32,
    pub(crate) meds: u32,
}

impl Inventory {
    pub(crate) fn count(&self, item: Item) -> u32 {
        match item {
            Item::Food => self.food,
            Item::Toys => self.toys,
            Item::Meds => self.meds,
        }
    }

    fn slot(&mut self, item: Item) -> &mut u32 {
        match item {
            Item::Food => &mut self.food,
            Item::Toys => &mut self.toys,
            Item::Meds => &mut self.meds,
        }
    }

    pub(crate) fn add(&mut self, item: Item, n: u32) {
        let slot = self.slot(item);
        *slot = slot.saturating_add(n);
    }

    /// Removes one unit; false if there was none.
    pub(crate) fn take(&mut self, item: Item) -> bool {
        let slot = self.slot(item);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub(crate) enum Achievement {
    #[serde(rename = "WEEK_SURVIVOR")]
    WeekSurvivor,
    #[serde(rename = "MONTH_KEEPER")]
    MonthKeeper,
    #[serde(rename = "PERFECT_DIET_5")]
    PerfectDiet5,
    #[serde(rename = "PEAK_HAPPY")]
    PeakHappy,
    #[serde(rename = "GROWN_UP")]
    GrownUp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Pet {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) stage: Stage,
    /// 0 is sated, 100 is starving.
    pub(crate) hunger: f64,
    pub(crate) happiness: f64,
    pub(crate) health: f64,
    #[serde(default)]
    pub(crate) inventory: Inventory,
    pub(crate) age_days: f64,
    pub(crate) last_update: DateTime<Utc>,
    pub(crate) alive: bool,
    #[serde(default)]
    pub(crate) sick: bool,
    #[serde(default)]
    pub(crate) perfect_diet_streak: u32,
    #[serde(default)]
    pub(crate) achievements: BTreeSet<Achievement>,
}

impl Pet {
    pub(crate) fn new(id: String, name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.to_string(),
            stage: Stage::Egg,
            hunger: 40.0,
            happiness: 70.0,
            health: 100.0,
            inventory: Inventory {
                food: 1,
                toys: 1,
                meds: 0,
            },
            age_days: 0.0,
            last_update: now,
            alive: true,
            sick: false,
            perfect_diet_streak: 0,
            achievements: BTreeSet::new(),
        }
    }

    pub(crate) fn whole_days(&self) -> u64 {
        self.age_days.max(0.0).floor() as u64
    }

    /// (100 - hunger) + happiness + health, in `[0, 300]`.
    pub(crate) fn care_score(&self) -> f64 {
        (100.0 - self.hunger) + self.happiness + self.health
    }

    pub(crate) fn mood(&self) -> Mood {
        if !self.alive {
            Mood::Sad
        } else if self.sick {
            Mood::Sick
        } else if self.hunger > 75.0 {
            Mood::Sad
        } else if self.happiness > 60.0 {
            Mood::Happy
        } else {
            Mood::Neutral
        }
    }

    fn answers_to(&self, needle: &str) -> bool {
        self.id == needle || self.name.to_lowercase() == needle.to_lowercase()
    }
}

/// The current pet together with the state the engine needs beside it.
pub(crate) struct Tended<'a> {
    pub(crate) pet: &'a mut Pet,
    pub(crate) config: &'a Config,
    pub(crate) log: &'a mut Vec<String>,
}

/// Everything persisted between invocations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RootState {
    pub(crate) current_pet_id: Option<String>,
    #[serde(default)]
    pub(crate) pets: BTreeMap<String, Pet>,
    #[serde(default)]
    pub(crate) config: Config,
    #[serde(default)]
    pub(crate) log: Vec<String>,
}

impl RootState {
    /// First-run state: one fresh egg, selected.
    pub(crate) fn bootstrap<D: Dice + ?Sized>(dice: &mut D, now: DateTime<Utc>) -> Self {
        let mut root = Self {
            current_pet_id: None,
            pets: BTreeMap::new(),
            config: Config::default(),
            log: Vec::new(),
        };
        root.adopt(DEFAULT_PET_NAME, dice, now);
        root
    }

    /// Hatches a new pet, selects it and returns its id.
    pub(crate) fn adopt<D: Dice + ?Sized>(
        &mut self,
        name: &str,
        dice: &mut D,
        now: DateTime<Utc>,
    ) -> String {
        let mut id = short_id(dice);
        while self.pets.contains_key(&id) {
            id = short_id(dice);
        }
        let pet = Pet::new(id.clone(), name, now);
        stamp(&mut self.log, now, format!("Hatched {} ({}).", pet.name, pet.id));
        self.pets.insert(id.clone(), pet);
        self.current_pet_id = Some(id.clone());
        id
    }

    /// Id of the pet a bare `id or name` argument refers to.
    pub(crate) fn find_id(&self, needle: &str) -> Option<String> {
        self.pets
            .values()
            .find(|p| p.answers_to(needle))
            .map(|p| p.id.clone())
    }

    pub(crate) fn current(&self) -> Option<&Pet> {
        self.current_pet_id
            .as_ref()
            .and_then(|id| self.pets.get(id))
    }

    /// Makes sure a valid pet is selected: the stored selection, else the
    /// first pet, else a freshly hatched default.
    fn select_current<D: Dice + ?Sized>(&mut self, dice: &mut D, now: DateTime<Utc>) -> String {
        let valid = self
            .current_pet_id
            .clone()
            .filter(|id| self.pets.contains_key(id))
            .or_else(|| self.pets.keys().next().cloned());
        match valid {
            Some(id) => {
                self.current_pet_id = Some(id.clone());
                id
            }
            None => self.adopt(DEFAULT_PET_NAME, dice, now),
        }
    }

    pub(crate) fn tend<D: Dice + ?Sized>(&mut self, dice: &mut D, now: DateTime<Utc>) -> Tended<'_> {
        let id = self.select_current(dice, now);
        let RootState {
            pets, config, log, ..
        } = self;
        // select_current guarantees the entry exists
        let pet = pets
            .entry(id)
            .or_insert_with_key(|id| Pet::new(id.clone(), DEFAULT_PET_NAME, now));
        Tended { pet, config, log }
    }

    /// Removes a pet; the selection falls back to the first remaining one.
    pub(crate) fn release(&mut self, id: &str) -> Option<Pet> {
        let gone = self.pets.remove(id)?;
        self.current_pet_id = self.pets.keys().next().cloned();
        Some(gone)
    }
}
