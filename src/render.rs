use crate::actions::{Note, Outcome, Tone};
use crate::model::{Item, Mood, Pet, Stage};
use crossterm::style::{StyledContent, Stylize};
use std::io::{self, Write};

const BAR_WIDTH: usize = 10;

const HELP: &str = "\
pet-me: your console Tamagotchi

Usage:
  pet-me <command> [options]

Commands:
  status                     Show pet status
  feed [food|toys]           Feed your pet (default: food)
  play [rock|paper|scissors] Play mini-game (RPS)
  medicate                   Use medicine if sick
  hatch [--name NAME]        Hatch a new pet and switch to it
  list                       List all pets
  switch <id|name>           Switch current pet
  rename <name>              Rename current pet
  release [<id|name>]        Release a pet (default: current)
  log [N]                    Show last N events (default 20)
  config [key [value]]       View or set config; keys:
                               hungerRatePerHour, happinessDecayPerHour,
                               healthDecayPerHour, randomEventHourlyChance,
                               notifications
  reset                      Clear ALL data (fresh start)
  help                       Show this help menu
  version                    Show version

Options:
  --state <PATH>             Use this state file instead of the default
  --seed <N>                 Seed the random source
  -h, --help                 Show help
  -V, --version              Show version

Examples:
  pet-me status
  pet-me hatch --name Luna
  pet-me play rock
  pet-me feed
  pet-me config hungerRatePerHour 3";

fn art(stage: Stage, mood: Mood) -> &'static [&'static str] {
    match (stage, mood) {
        (Stage::Egg, Mood::Happy) => &["   ____  ", "  / __ \\ ", " | |  | |  ☆", " | |__| |", "  \\____/ "],
        (Stage::Egg, Mood::Sad) => &["   ____  ", "  / __ \\ ", " | |  | |  .", " | |__| |", "  \\____/ "],
        (Stage::Egg, Mood::Sick) => &["   ____  ", "  / __ \\ ", " | |  | |  ~", " | |__| |", "  \\____/ "],
        (Stage::Egg, Mood::Neutral) => &["   ____  ", "  / __ \\ ", " | |  | |", " | |__| |", "  \\____/ "],
        (Stage::Baby, Mood::Happy) => &["  (\\_/)  ", "  ( ^‿^) ✧", "  / >o   "],
        (Stage::Baby, Mood::Sad) => &["  (\\_/)  ", "  ( •︵•)", "  /      "],
        (Stage::Baby, Mood::Sick) => &["  (\\_/)  ", "  ( x_x)", "  /  ~   "],
        (Stage::Baby, Mood::Neutral) => &["  (\\_/)  ", "  ( •_•)", "  / >o   "],
        (Stage::Teen, Mood::Happy) => &["  /^‿^\\  ", " ( ^ ^ ) ", " /  ✨  \\ "],
        (Stage::Teen, Mood::Sad) => &["  /^_ _\\ ", " ( - - ) ", " /      \\ "],
        (Stage::Teen, Mood::Sick) => &["  /^_ _\\ ", " ( - x ) ", " /  ~~  \\ "],
        (Stage::Teen, Mood::Neutral) => &["  /^_^\\  ", " ( o o ) ", " /      \\ "],
        (Stage::Adult, Mood::Happy) => &["  /\\___/\\ ", " (  ^ ^  )", " (  >♡<  )"],
        (Stage::Adult, Mood::Sad) => &["  /\\___/\\ ", " (  - -  )", " (   ⌒   )"],
        (Stage::Adult, Mood::Sick) => &["  /\\___/\\ ", " (  - x  )", " (   ~   )"],
        (Stage::Adult, Mood::Neutral) => &["  /\\___/\\ ", " (  • •  )", " (  >♡<  )"],
    }
}

fn icon(item: Item) -> &'static str {
    match item {
        Item::Food => "🍎",
        Item::Toys => "🎲",
        Item::Meds => "💊",
    }
}

fn bar(value: f64) -> String {
    let v = (value / 100.0).clamp(0.0, 1.0);
    let fill = (v * BAR_WIDTH as f64 + 0.5) as usize;
    let mut s = String::with_capacity(BAR_WIDTH * 3 + 2);
    s.push('[');
    for i in 0..BAR_WIDTH {
        s.push(if i < fill { '█' } else { '░' });
    }
    s.push(']');
    s
}

fn meter(label: &str, value: f64, tint: fn(String) -> StyledContent<String>) -> String {
    format!("{label:<9}: {} {}", tint(bar(value)), value.round())
}

fn paint(note: &Note) -> String {
    let text = note.text.clone();
    match note.tone {
        Tone::Plain => text,
        Tone::Heading => text.bold().to_string(),
        Tone::Muted => text.dim().to_string(),
        Tone::Good => text.green().to_string(),
        Tone::Warn => text.yellow().to_string(),
        Tone::Bad => text.red().to_string(),
    }
}

pub(crate) fn status_lines(pet: &Pet) -> Vec<String> {
    let heart = if pet.alive { "💚" } else { "💀" };
    let mut lines = vec![
        format!(
            "{} ({}) {heart}  day {}",
            pet.name.as_str().bold(),
            pet.stage.label(),
            pet.whole_days()
        ),
        format!("id: {}", pet.id).dim().to_string(),
        String::new(),
    ];
    lines.extend(art(pet.stage, pet.mood()).iter().map(|l| l.to_string()));
    lines.push(String::new());
    lines.push(meter("Hunger", pet.hunger, |s| s.yellow()));
    lines.push(meter("Happiness", pet.happiness, |s| s.green()));
    lines.push(meter("Health", pet.health, |s| s.cyan()));
    lines.push(String::new());
    let stock: Vec<String> = Item::ALL
        .into_iter()
        .map(|item| format!("{} {item} x{}", icon(item), pet.inventory.count(item)))
        .collect();
    lines.push(format!("Inventory: {}", stock.join("  ")).dim().to_string());
    if !pet.achievements.is_empty() {
        let badges: Vec<&str> = pet.achievements.iter().map(|a| a.label()).collect();
        lines.push(format!("Badges: {}", badges.join("  ")));
    }
    if pet.sick {
        lines.push("Status: Sick (use \"pet-me medicate\")".red().to_string());
    }
    if !pet.alive {
        lines.push(
            "Status: Deceased (use \"pet-me hatch\" to start anew, or \"release\")"
                .red()
                .to_string(),
        );
    }
    lines
}

pub(crate) fn outcome_lines(out: &Outcome) -> Vec<String> {
    let mut lines = Vec::new();
    if !out.recap.is_empty() {
        lines.push("While you were away…".bold().to_string());
        lines.extend(out.recap.iter().map(|l| l.as_str().dim().to_string()));
        lines.push(String::new());
    }
    lines.extend(out.notes.iter().map(paint));
    if let Some(pet) = &out.status {
        lines.extend(status_lines(pet));
    }
    lines
}

pub(crate) fn help_text(prefix: Option<&str>) -> String {
    match prefix {
        Some(p) => format!("{p}\n\n{HELP}\n"),
        None => format!("{HELP}\n"),
    }
}

pub(crate) fn print_lines<W: Write>(out: &mut W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Achievement;
    use chrono::Utc;

    fn pet() -> Pet {
        Pet::new("abcde".into(), "Pixel", Utc::now())
    }

    #[test]
    fn bars_round_to_tenths() {
        assert_eq!(bar(0.0), "[░░░░░░░░░░]");
        assert_eq!(bar(44.0), "[████░░░░░░]");
        assert_eq!(bar(46.0), "[█████░░░░░]");
        assert_eq!(bar(100.0), "[██████████]");
    }

    #[test]
    fn every_stage_and_mood_has_art() {
        for stage in [Stage::Egg, Stage::Baby, Stage::Teen, Stage::Adult] {
            for mood in [Mood::Happy, Mood::Neutral, Mood::Sad, Mood::Sick] {
                assert!(!art(stage, mood).is_empty());
            }
        }
    }

    #[test]
    fn status_mentions_vitals_and_hints() {
        let mut p = pet();
        p.sick = true;
        p.achievements.insert(Achievement::GrownUp);
        let joined = status_lines(&p).join("\n");
        assert!(joined.contains("Pixel"));
        assert!(joined.contains("id: abcde"));
        assert!(joined.contains("Hunger"));
        assert!(joined.contains("food x1"));
        assert!(joined.contains("All Grown Up"));
        assert!(joined.contains("Status: Sick"));
        assert!(!joined.contains("Deceased"));
    }

    #[test]
    fn recap_comes_before_notes() {
        let out = Outcome {
            recap: vec!["t Pixel found food!".into()],
            notes: vec![Note {
                tone: Tone::Plain,
                text: "hello".into(),
            }],
            status: None,
            persist: false,
        };
        let lines = outcome_lines(&out);
        let recap_at = lines.iter().position(|l| l.contains("found food")).expect("recap");
        let note_at = lines.iter().position(|l| l == "hello").expect("note");
        assert!(recap_at < note_at);
    }

    #[test]
    fn help_can_carry_a_prefix() {
        let text = help_text(Some("Unknown command: dance"));
        assert!(text.starts_with("Unknown command: dance\n\n"));
        assert!(text.contains("config [key [value]]"));
    }
}
