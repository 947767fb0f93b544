use crate::achievements::awardable;
use crate::config::Config;
use crate::model::{Item, Pet, Stage};
use crate::util::{clamp_vital, stamp, Dice};
use chrono::{DateTime, Utc};
use log::debug;

/// Ticks shorter than this (6 minutes) never roll a random event.
pub(crate) const EVENT_MIN_HOURS: f64 = 0.1;

const STARVING_HUNGER: f64 = 80.0;
const STARVING_HEALTH_PER_HOUR: f64 = 1.5;
const GLUM_HAPPINESS: f64 = 20.0;
const GLUM_HEALTH_PER_HOUR: f64 = 1.0;
const SICK_DECAY_FACTOR: f64 = 2.0;

const FEED_HUNGER_RELIEF: f64 = 35.0;
const FEED_HAPPINESS: f64 = 5.0;
const DIET_HUNGER_LIMIT: f64 = 50.0;
const MEDICINE_HEALTH: f64 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RandomEvent {
    Found(Item),
    Breeze,
    CaughtBug,
}

/// Age-driven promotion, then care-driven demotion.
///
/// Promotion only ever raises the stage to the one the age has earned;
/// demotion drops teen to baby below care 120 and adult to teen below 140.
/// Nothing demotes to egg.
pub(crate) fn evolve(pet: &mut Pet) {
    let d = pet.age_days;
    let earned = if d >= 7.0 {
        Stage::Adult
    } else if d >= 3.0 {
        Stage::Teen
    } else if d >= 1.0 {
        Stage::Baby
    } else {
        Stage::Egg
    };
    pet.stage = pet.stage.max(earned);

    let care = pet.care_score();
    if care < 120.0 && pet.stage == Stage::Teen {
        pet.stage = Stage::Baby;
    }
    if care < 140.0 && pet.stage == Stage::Adult {
        pet.stage = Stage::Teen;
    }
}

/// At most one event per call: 40% item, 25% breeze, 35% sickness.
pub(crate) fn random_event<D: Dice + ?Sized>(
    pet: &mut Pet,
    config: &Config,
    dice: &mut D,
    log: &mut Vec<String>,
    now: DateTime<Utc>,
) -> Option<RandomEvent> {
    if !dice.chance(config.random_event_hourly_chance) {
        return None;
    }

    let roll = dice.unit();
    let event = if roll < 0.4 {
        let item = Item::ALL[dice.pick(Item::ALL.len())];
        pet.inventory.add(item, 1);
        stamp(log, now, format!("{} found {}!", pet.name, item));
        RandomEvent::Found(item)
    } else if roll < 0.65 {
        pet.happiness = clamp_vital(pet.happiness + 10.0);
        stamp(log, now, format!("{} enjoyed a breeze. Happiness +10", pet.name));
        RandomEvent::Breeze
    } else {
        pet.sick = true;
        pet.health = clamp_vital(pet.health - 20.0);
        stamp(
            log,
            now,
            format!("{} caught a bug 🤒 (use \"pet-me medicate\")", pet.name),
        );
        RandomEvent::CaughtBug
    };
    debug!("random event for {}: {:?}", pet.id, event);
    Some(event)
}

/// Advances a living pet by `hours` of wall-clock time.
///
/// Order: decay, age, event roll, death check, stage evolution, badges,
/// heartbeat. A dead pet is left untouched.
pub(crate) fn advance<D: Dice + ?Sized>(
    pet: &mut Pet,
    hours: f64,
    config: &Config,
    dice: &mut D,
    log: &mut Vec<String>,
    now: DateTime<Utc>,
) {
    if !pet.alive {
        return;
    }
    let hours = hours.max(0.0);

    pet.hunger = clamp_vital(pet.hunger + hours * config.hunger_rate_per_hour);
    pet.happiness = clamp_vital(pet.happiness - hours * config.happiness_decay_per_hour);
    let sick_factor = if pet.sick { SICK_DECAY_FACTOR } else { 1.0 };
    let mut health_decay = hours * config.health_decay_per_hour * sick_factor;
    if pet.hunger > STARVING_HUNGER {
        health_decay += hours * STARVING_HEALTH_PER_HOUR;
    }
    if pet.happiness < GLUM_HAPPINESS {
        health_decay += hours * GLUM_HEALTH_PER_HOUR;
    }
    pet.health = clamp_vital(pet.health - health_decay);

    pet.age_days += hours / 24.0;

    if hours > EVENT_MIN_HOURS {
        random_event(pet, config, dice, log, now);
    }

    if pet.health <= 0.0 || (pet.hunger >= 100.0 && pet.happiness <= 5.0) {
        pet.alive = false;
        stamp(log, now, format!("{} has passed on 💀", pet.name));
    }

    evolve(pet);

    let earned = awardable(pet);
    for badge in &earned {
        stamp(log, now, format!("Achievement unlocked: {}", badge.label()));
    }
    pet.achievements.extend(earned);

    pet.last_update = now;
    debug!(
        "advanced {} by {:.3}h: hunger {:.1} happiness {:.1} health {:.1} stage {:?} alive {}",
        pet.id, hours, pet.hunger, pet.happiness, pet.health, pet.stage, pet.alive
    );
}

impl Pet {
    /// Eating lowers hunger and lifts happiness; a meal that still leaves
    /// the pet at hunger 50 or above breaks the perfect-diet streak.
    pub(crate) fn eat(&mut self) {
        self.hunger = clamp_vital(self.hunger - FEED_HUNGER_RELIEF);
        self.happiness = clamp_vital(self.happiness + FEED_HAPPINESS);
        if self.hunger >= DIET_HUNGER_LIMIT {
            self.perfect_diet_streak = 0;
        } else {
            self.perfect_diet_streak = self.perfect_diet_streak.saturating_add(1);
        }
    }

    pub(crate) fn cure(&mut self) {
        self.sick = false;
        self.health = clamp_vital(self.health + MEDICINE_HEALTH);
    }
}
