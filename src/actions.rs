use crate::config::ConfigKey;
use crate::minigame::{rock_paper_scissors, Move, RoundResult};
use crate::model::{Item, Pet, RootState, DEFAULT_PET_NAME};
use crate::sim::advance;
use crate::util::{hours_between, stamp, Dice};
use chrono::{DateTime, Utc};
use log::debug;

/// Below this (~72 seconds) a command skips the catch-up tick.
pub(crate) const CATCH_UP_MIN_HOURS: f64 = 0.02;
pub(crate) const DEFAULT_LOG_LIMIT: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Status,
    Feed(String),
    Play(Option<String>),
    Medicate,
    Hatch(String),
    List,
    Switch(Option<String>),
    Rename(Option<String>),
    Release(Option<String>),
    Log(usize),
    Config {
        key: Option<String>,
        value: Option<String>,
    },
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tone {
    Plain,
    Heading,
    Muted,
    Good,
    Warn,
    Bad,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Note {
    pub(crate) tone: Tone,
    pub(crate) text: String,
}

/// What one command produced, for the presentation layer.
#[derive(Clone, Debug, Default)]
pub(crate) struct Outcome {
    /// Log lines written by this invocation's catch-up tick, when the
    /// notifications flag is on.
    pub(crate) recap: Vec<String>,
    pub(crate) notes: Vec<Note>,
    /// Snapshot of the pet to draw after the notes.
    pub(crate) status: Option<Pet>,
    pub(crate) persist: bool,
}

impl Outcome {
    fn note(&mut self, tone: Tone, text: impl Into<String>) {
        self.notes.push(Note {
            tone,
            text: text.into(),
        });
    }
}

/// One invocation's view of the world: the loaded state, a random source
/// and a fixed "now".
pub(crate) struct Session<D> {
    pub(crate) root: RootState,
    pub(crate) dice: D,
    pub(crate) now: DateTime<Utc>,
}

impl<D: Dice> Session<D> {
    pub(crate) fn new(root: RootState, dice: D, now: DateTime<Utc>) -> Self {
        Self { root, dice, now }
    }

    pub(crate) fn apply(&mut self, action: Action) -> Outcome {
        debug!("applying {:?}", action);
        match action {
            Action::Status => self.status(),
            Action::Feed(item) => self.feed(&item),
            Action::Play(mv) => self.play(mv.as_deref()),
            Action::Medicate => self.medicate(),
            Action::Hatch(name) => self.hatch(&name),
            Action::List => self.list(),
            Action::Switch(target) => self.switch(target.as_deref()),
            Action::Rename(name) => self.rename(name.as_deref()),
            Action::Release(target) => self.release(target.as_deref()),
            Action::Log(limit) => self.log(limit),
            Action::Config { key, value } => self.config(key.as_deref(), value.as_deref()),
            Action::Reset => self.reset(),
        }
    }

    /// Brings the current pet up to date and returns a snapshot of it.
    fn catch_up(&mut self, out: &mut Outcome) -> Pet {
        let now = self.now;
        let tended = self.root.tend(&mut self.dice, now);
        let mark = tended.log.len();
        let hours = hours_between(tended.pet.last_update, now);
        if hours > CATCH_UP_MIN_HOURS {
            debug!("catching {} up by {:.3}h", tended.pet.id, hours);
            advance(tended.pet, hours, tended.config, &mut self.dice, tended.log, now);
        }
        if tended.config.notifications {
            out.recap.extend(tended.log[mark..].iter().cloned());
        }
        out.persist = true;
        tended.pet.clone()
    }

    fn current_mut(&mut self) -> &mut Pet {
        let now = self.now;
        self.root.tend(&mut self.dice, now).pet
    }

    fn log_line(&mut self, msg: impl AsRef<str>) {
        stamp(&mut self.root.log, self.now, msg);
    }

    fn status(&mut self) -> Outcome {
        let mut out = Outcome::default();
        let pet = self.catch_up(&mut out);
        out.status = Some(pet);
        out
    }

    fn feed(&mut self, raw_item: &str) -> Outcome {
        let mut out = Outcome::default();
        let pet = self.catch_up(&mut out);
        if !pet.alive {
            out.note(Tone::Bad, "💀 Cannot feed a deceased pet.");
            return out;
        }
        let item = match raw_item.parse::<Item>() {
            Ok(item @ (Item::Food | Item::Toys)) => item,
            Ok(Item::Meds) => {
                out.note(Tone::Warn, "Meds are not food. Try \"pet-me medicate\".");
                return out;
            }
            Err(err) => {
                out.note(Tone::Warn, format!("Cannot feed that: {err}."));
                return out;
            }
        };

        let pet = self.current_mut();
        if !pet.inventory.take(item) {
            let snapshot = pet.clone();
            out.note(Tone::Warn, format!("No {item} in inventory."));
            out.status = Some(snapshot);
            return out;
        }
        pet.eat();
        let name = pet.name.clone();
        self.log_line(format!("Fed {name} ({item})."));
        out.note(Tone::Good, "🥕 Nom! Hunger down.");
        out.status = Some(self.current_mut().clone());
        out
    }

    fn play(&mut self, raw_move: Option<&str>) -> Outcome {
        let mut out = Outcome::default();
        let pet = self.catch_up(&mut out);
        if !pet.alive {
            out.note(Tone::Bad, "💀 Cannot play with a deceased pet.");
            return out;
        }

        let player = raw_move.and_then(|m| m.parse::<Move>().ok());
        let round = rock_paper_scissors(player, &mut self.dice);
        match round.result {
            RoundResult::NoContest => {
                out.note(
                    Tone::Warn,
                    "Choose a move with: pet-me play rock|paper|scissors",
                );
            }
            RoundResult::Draw => {
                out.note(Tone::Warn, format!("Draw! CPU picked {}.", round.cpu));
            }
            RoundResult::Win => {
                out.note(Tone::Good, format!("You win! CPU picked {}.", round.cpu));
            }
            RoundResult::Lose => {
                out.note(Tone::Bad, format!("You lose! CPU picked {}.", round.cpu));
            }
        }

        round.result.apply(self.current_mut());
        self.log_line(format!("Played game (rps: {}).", round.result.label()));
        out.status = Some(self.current_mut().clone());
        out
    }

    fn medicate(&mut self) -> Outcome {
        let mut out = Outcome::default();
        let pet = self.catch_up(&mut out);
        if !pet.alive {
            out.note(Tone::Bad, "💀 Cannot medicate a deceased pet.");
            return out;
        }
        if !pet.sick {
            out.note(Tone::Good, "✅ Not sick.");
            return out;
        }

        let pet = self.current_mut();
        if !pet.inventory.take(Item::Meds) {
            out.note(Tone::Warn, "No meds in inventory.");
            return out;
        }
        pet.cure();
        let name = pet.name.clone();
        self.log_line(format!("Gave medicine to {name}."));
        out.note(Tone::Good, "💊 Feeling better!");
        out.status = Some(self.current_mut().clone());
        out
    }

    fn hatch(&mut self, name: &str) -> Outcome {
        let mut out = Outcome {
            persist: true,
            ..Outcome::default()
        };
        let name = match name.trim() {
            "" => DEFAULT_PET_NAME,
            trimmed => trimmed,
        };
        let id = self.root.adopt(name, &mut self.dice, self.now);
        out.note(
            Tone::Good,
            format!("🐣 A new pet has hatched! Name: {name} (id: {id})"),
        );
        out.status = self.root.current().cloned();
        out
    }

    fn list(&mut self) -> Outcome {
        let mut out = Outcome::default();
        out.note(Tone::Heading, "Your Pets");
        if self.root.pets.is_empty() {
            out.note(Tone::Plain, "(none)");
        }
        for pet in self.root.pets.values() {
            let row = format!(
                "{}  {:<10}  {:<5}  {}  day {}",
                pet.id,
                pet.name,
                pet.stage.label(),
                if pet.alive { "💚" } else { "💀" },
                pet.whole_days()
            );
            out.note(Tone::Plain, row);
        }
        let current = self.root.current_pet_id.as_deref().unwrap_or("(none)");
        out.note(Tone::Muted, format!("current: {current}"));
        out
    }

    fn switch(&mut self, target: Option<&str>) -> Outcome {
        let mut out = Outcome::default();
        let Some(target) = target else {
            out.note(Tone::Warn, "Provide a pet id or name.");
            return out;
        };
        let Some(id) = self.root.find_id(target) else {
            out.note(Tone::Warn, "Pet not found.");
            return out;
        };
        self.root.current_pet_id = Some(id.clone());
        let name = self.current_mut().name.clone();
        self.log_line(format!("Switched to {name} ({id})."));
        out.note(Tone::Good, format!("Switched to {name}."));
        out.persist = true;
        out.status = Some(self.current_mut().clone());
        out
    }

    fn rename(&mut self, new_name: Option<&str>) -> Outcome {
        let mut out = Outcome::default();
        let Some(new_name) = new_name.map(str::trim).filter(|n| !n.is_empty()) else {
            out.note(Tone::Warn, "Provide a new name.");
            return out;
        };
        let pet = self.current_mut();
        let old = std::mem::replace(&mut pet.name, new_name.to_string());
        self.log_line(format!("Renamed {old} to {new_name}."));
        out.note(Tone::Good, format!("Renamed to {new_name}."));
        out.persist = true;
        out.status = Some(self.current_mut().clone());
        out
    }

    fn release(&mut self, target: Option<&str>) -> Outcome {
        let mut out = Outcome::default();
        let id = match target {
            Some(needle) => match self.root.find_id(needle) {
                Some(id) => id,
                None => {
                    out.note(Tone::Warn, "Pet not found.");
                    return out;
                }
            },
            None => match self.root.current_pet_id.clone() {
                Some(id) => id,
                None => {
                    out.note(Tone::Warn, "No current pet to release.");
                    return out;
                }
            },
        };
        let Some(gone) = self.root.release(&id) else {
            out.note(Tone::Warn, "Pet not found.");
            return out;
        };
        self.log_line(format!("Released {} ({}).", gone.name, gone.id));
        out.note(Tone::Bad, format!("Released {}.", gone.name));
        out.persist = true;
        out.status = self.root.current().cloned();
        out
    }

    fn log(&mut self, limit: usize) -> Outcome {
        let mut out = Outcome::default();
        let log = &self.root.log;
        let tail = &log[log.len().saturating_sub(limit)..];
        let lines: Vec<String> = tail.to_vec();
        out.note(Tone::Heading, format!("Last {} events:", lines.len()));
        for line in lines {
            out.note(Tone::Plain, line);
        }
        out
    }

    fn config(&mut self, key: Option<&str>, value: Option<&str>) -> Outcome {
        let mut out = Outcome::default();
        let Some(raw_key) = key else {
            for key in ConfigKey::ALL {
                out.note(
                    Tone::Plain,
                    format!("{key} = {}", self.root.config.get(key)),
                );
            }
            out.note(
                Tone::Muted,
                format!("Tip: pet-me config <key> <value>. Keys: {}", ConfigKey::names()),
            );
            out.status = Some(self.catch_up(&mut out));
            return out;
        };

        let key = match raw_key.parse::<ConfigKey>() {
            Ok(key) => key,
            Err(_) => {
                out.note(
                    Tone::Warn,
                    format!("Unknown config key. Valid: {}", ConfigKey::names()),
                );
                return out;
            }
        };
        let Some(raw_value) = value else {
            out.note(Tone::Plain, format!("{key} = {}", self.root.config.get(key)));
            return out;
        };

        match self.root.config.set(key, raw_value) {
            Ok(parsed) => {
                self.log_line(format!("Config {key}={parsed}"));
                out.note(Tone::Good, format!("Config updated: {key}={parsed}"));
                out.persist = true;
            }
            Err(err) => {
                out.note(Tone::Warn, format!("Config not changed: {err}."));
            }
        }
        out
    }

    fn reset(&mut self) -> Outcome {
        let mut out = Outcome {
            persist: true,
            ..Outcome::default()
        };
        self.root.pets.clear();
        self.root.current_pet_id = None;
        self.log_line("Reset all state.");
        out.note(
            Tone::Bad,
            "All data cleared. A fresh egg will appear next run.",
        );
        out
    }
}
