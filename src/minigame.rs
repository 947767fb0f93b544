use crate::model::Pet;
use crate::util::{clamp_vital, Dice};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    pub(crate) const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Move::Rock => "rock",
            Move::Paper => "paper",
            Move::Scissors => "scissors",
        }
    }

    fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Move::Rock, Move::Scissors) | (Move::Paper, Move::Rock) | (Move::Scissors, Move::Paper)
        )
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown move `{0}` (expected rock, paper or scissors)")]
pub(crate) struct ParseMoveError(pub(crate) String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Move::ALL
            .into_iter()
            .find(|m| m.label() == lowered)
            .ok_or_else(|| ParseMoveError(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RoundResult {
    Win,
    Draw,
    Lose,
    /// No valid move was offered; distinct from losing.
    NoContest,
}

impl RoundResult {
    pub(crate) fn label(self) -> &'static str {
        match self {
            RoundResult::Win => "win",
            RoundResult::Draw => "draw",
            RoundResult::Lose => "lose",
            RoundResult::NoContest => "none",
        }
    }

    /// (happiness, hunger) deltas.
    pub(crate) fn effect(self) -> (f64, f64) {
        match self {
            RoundResult::Win => (25.0, 8.0),
            RoundResult::Draw => (5.0, 3.0),
            RoundResult::Lose => (-5.0, 0.0),
            RoundResult::NoContest => (0.0, 0.0),
        }
    }

    pub(crate) fn apply(self, pet: &mut Pet) {
        let (happiness, hunger) = self.effect();
        pet.happiness = clamp_vital(pet.happiness + happiness);
        pet.hunger = clamp_vital(pet.hunger + hunger);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Round {
    pub(crate) result: RoundResult,
    pub(crate) cpu: Move,
}

/// One round against a uniformly random opponent. The opponent is drawn
/// even when the player offers no move.
pub(crate) fn rock_paper_scissors<D: Dice + ?Sized>(player: Option<Move>, dice: &mut D) -> Round {
    let cpu = Move::ALL[dice.pick(Move::ALL.len())];
    let result = match player {
        None => RoundResult::NoContest,
        Some(m) if m == cpu => RoundResult::Draw,
        Some(m) if m.beats(cpu) => RoundResult::Win,
        Some(_) => RoundResult::Lose,
    };
    Round { result, cpu }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ScriptedDice;
    use chrono::Utc;

    // pick(3): [0, 1/3) rock, [1/3, 2/3) paper, [2/3, 1) scissors
    const ROCK: f64 = 0.1;
    const PAPER: f64 = 0.5;
    const SCISSORS: f64 = 0.9;

    fn play(player: Option<Move>, cpu_draw: f64) -> Round {
        rock_paper_scissors(player, &mut ScriptedDice::new(&[cpu_draw]))
    }

    #[test]
    fn full_outcome_table() {
        use Move::*;
        let cases = [
            (Rock, ROCK, RoundResult::Draw),
            (Rock, PAPER, RoundResult::Lose),
            (Rock, SCISSORS, RoundResult::Win),
            (Paper, ROCK, RoundResult::Win),
            (Paper, PAPER, RoundResult::Draw),
            (Paper, SCISSORS, RoundResult::Lose),
            (Scissors, ROCK, RoundResult::Lose),
            (Scissors, PAPER, RoundResult::Win),
            (Scissors, SCISSORS, RoundResult::Draw),
        ];
        for (player, draw, expected) in cases {
            assert_eq!(play(Some(player), draw).result, expected, "{player} vs {draw}");
        }
    }

    #[test]
    fn missing_move_is_no_contest_not_a_loss() {
        let round = play(None, SCISSORS);
        assert_eq!(round.result, RoundResult::NoContest);
        assert_eq!(round.cpu, Move::Scissors);
        assert_eq!(round.result.effect(), (0.0, 0.0));
    }

    #[test]
    fn effects_are_clamped() {
        let mut pet = Pet::new("abcde".into(), "Pixel", Utc::now());
        pet.happiness = 90.0;
        pet.hunger = 95.0;
        RoundResult::Win.apply(&mut pet);
        assert_eq!((pet.happiness, pet.hunger), (100.0, 100.0));

        pet.happiness = 3.0;
        RoundResult::Lose.apply(&mut pet);
        assert_eq!((pet.happiness, pet.hunger), (0.0, 100.0));

        pet.happiness = 50.0;
        pet.hunger = 50.0;
        RoundResult::Draw.apply(&mut pet);
        assert_eq!((pet.happiness, pet.hunger), (55.0, 53.0));
    }

    #[test]
    fn moves_parse_loosely() {
        assert_eq!(" Paper ".parse::<Move>(), Ok(Move::Paper));
        assert!("lizard".parse::<Move>().is_err());
    }
}
