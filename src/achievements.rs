use crate::model::{Achievement, Pet, Stage};
use std::collections::BTreeSet;

impl Achievement {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Achievement::WeekSurvivor => "🏆 7-day Survivor",
            Achievement::MonthKeeper => "🏆 30-day Keeper",
            Achievement::PerfectDiet5 => "🥗 5 Perfect Meals",
            Achievement::PeakHappy => "🎉 Peak Happiness",
            Achievement::GrownUp => "🌟 All Grown Up",
        }
    }
}

/// Badges the pet qualifies for right now and does not hold yet.
///
/// Pure; merging into `pet.achievements` is the caller's job, and a badge
/// once granted stays even if its condition lapses.
pub(crate) fn awardable(pet: &Pet) -> BTreeSet<Achievement> {
    let days = pet.whole_days();
    let rules = [
        (Achievement::WeekSurvivor, days >= 7),
        (Achievement::MonthKeeper, days >= 30),
        (Achievement::PerfectDiet5, pet.perfect_diet_streak >= 5),
        (Achievement::PeakHappy, pet.happiness >= 95.0),
        (Achievement::GrownUp, pet.stage == Stage::Adult),
    ];
    rules
        .into_iter()
        .filter(|(badge, qualifies)| *qualifies && !pet.achievements.contains(badge))
        .map(|(badge, _)| badge)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pet() -> Pet {
        Pet::new("abcde".into(), "Pixel", Utc::now())
    }

    #[test]
    fn fresh_pet_earns_nothing() {
        assert!(awardable(&pet()).is_empty());
    }

    #[test]
    fn age_uses_whole_days() {
        let mut p = pet();
        p.age_days = 6.99;
        assert!(awardable(&p).is_empty());
        p.age_days = 7.0;
        assert_eq!(
            awardable(&p),
            BTreeSet::from([Achievement::WeekSurvivor])
        );
        p.age_days = 30.5;
        assert_eq!(
            awardable(&p),
            BTreeSet::from([Achievement::WeekSurvivor, Achievement::MonthKeeper])
        );
    }

    #[test]
    fn each_rule_stands_alone() {
        let mut p = pet();
        p.perfect_diet_streak = 5;
        p.happiness = 95.0;
        p.stage = Stage::Adult;
        assert_eq!(
            awardable(&p),
            BTreeSet::from([
                Achievement::PerfectDiet5,
                Achievement::PeakHappy,
                Achievement::GrownUp
            ])
        );
    }

    #[test]
    fn held_badges_are_not_offered_again() {
        let mut p = pet();
        p.happiness = 100.0;
        p.achievements.insert(Achievement::PeakHappy);
        assert!(awardable(&p).is_empty());
    }

    #[test]
    fn earned_set_only_grows_as_conditions_accumulate() {
        let mut p = pet();
        p.age_days = 8.0;
        let first = awardable(&p);
        p.achievements.extend(first.iter().copied());
        p.stage = Stage::Adult;
        let second = awardable(&p);
        p.achievements.extend(second.iter().copied());
        assert!(first.is_subset(&p.achievements));
        assert!(p.achievements.contains(&Achievement::GrownUp));
    }
}
