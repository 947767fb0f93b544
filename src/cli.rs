use crate::actions::{Action, DEFAULT_LOG_LIMIT};
use crate::model::DEFAULT_PET_NAME;
use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser, Subcommand};
use log::debug;
use std::path::PathBuf;

/// Global flags that take a value.
const VALUE_FLAGS: [&str; 2] = ["--state", "--seed"];

#[derive(Parser, Debug)]
#[command(name = "pet-me")]
#[command(about = "Your console Tamagotchi")]
#[command(disable_help_flag = true)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// State file to use instead of the per-user default
    #[arg(long, global = true, value_name = "PATH")]
    state: Option<PathBuf>,

    /// Seed the random source for a reproducible run
    #[arg(long, global = true, value_name = "N")]
    seed: Option<u64>,

    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    help: bool,

    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    version: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Status,
    Feed {
        #[arg(default_value = "food")]
        item: String,
    },
    Play {
        #[arg(value_name = "MOVE")]
        mv: Option<String>,
    },
    Medicate,
    Hatch {
        #[arg(long, default_value = DEFAULT_PET_NAME)]
        name: String,
    },
    List,
    Switch {
        target: Option<String>,
    },
    Rename {
        name: Option<String>,
    },
    Release {
        target: Option<String>,
    },
    Log {
        #[arg(default_value_t = DEFAULT_LOG_LIMIT)]
        limit: usize,
    },
    Config {
        key: Option<String>,
        #[arg(allow_negative_numbers = true)]
        value: Option<String>,
    },
    Reset,
    Help,
    Version,
    #[command(external_subcommand)]
    External(Vec<String>),
}

/// What one invocation asks for, before any state is touched.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Request {
    Act(Action),
    Help,
    Version,
    Unknown(String),
}

/// A parsed command line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub(crate) state: Option<PathBuf>,
    pub(crate) seed: Option<u64>,
    pub(crate) request: Request,
}

impl Invocation {
    fn bare(request: Request) -> Self {
        Self {
            state: None,
            seed: None,
            request,
        }
    }
}

impl Cli {
    fn request(&self) -> Request {
        if self.help {
            return Request::Help;
        }
        if self.version {
            return Request::Version;
        }
        let Some(command) = &self.command else {
            return Request::Act(Action::Status);
        };
        let action = match command {
            Command::Status => Action::Status,
            Command::Feed { item } => Action::Feed(item.clone()),
            Command::Play { mv } => Action::Play(mv.clone()),
            Command::Medicate => Action::Medicate,
            Command::Hatch { name } => Action::Hatch(name.clone()),
            Command::List => Action::List,
            Command::Switch { target } => Action::Switch(target.clone()),
            Command::Rename { name } => Action::Rename(name.clone()),
            Command::Release { target } => Action::Release(target.clone()),
            Command::Log { limit } => Action::Log(*limit),
            Command::Config { key, value } => Action::Config {
                key: key.clone(),
                value: value.clone(),
            },
            Command::Reset => Action::Reset,
            Command::Help => return Request::Help,
            Command::Version => return Request::Version,
            Command::External(words) => {
                return Request::Unknown(words.first().cloned().unwrap_or_default())
            }
        };
        Request::Act(action)
    }

    fn invocation(self) -> Invocation {
        let request = self.request();
        Invocation {
            state: self.state,
            seed: self.seed,
            request,
        }
    }
}

/// Index of the first word that is not a global flag or a flag's value.
fn first_word(args: &[String]) -> Option<usize> {
    let mut i = 1;
    while let Some(word) = args.get(i) {
        if VALUE_FLAGS.contains(&word.as_str()) {
            i += 2;
        } else {
            return Some(i);
        }
    }
    None
}

/// Index of the command word: the first word that is not a flag.
fn command_word(args: &[String]) -> Option<usize> {
    let mut i = first_word(args)?;
    while let Some(word) = args.get(i) {
        if VALUE_FLAGS.contains(&word.as_str()) {
            i += 2;
        } else if word.starts_with('-') {
            i += 1;
        } else {
            return Some(i);
        }
    }
    None
}

/// Reads a full argv (program name first).
///
/// The command word matches regardless of case. Words a command does not
/// take are dropped from the end, so `log lots` falls back to the default
/// limit. Anything clap still rejects becomes an unknown command.
pub(crate) fn read_args(mut args: Vec<String>) -> Invocation {
    if args.iter().skip(1).any(|a| a == "-h" || a == "--help") {
        return Invocation::bare(Request::Help);
    }
    let at = command_word(&args);
    if let Some(word) = at.and_then(|i| args.get_mut(i)) {
        let lowered = word.to_lowercase();
        if Cli::command().find_subcommand(&lowered).is_some() {
            *word = lowered;
        }
    }

    loop {
        match Cli::try_parse_from(args.iter()) {
            Ok(cli) => return cli.invocation(),
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                return Invocation::bare(Request::Help)
            }
            Err(err) if at.is_some_and(|i| args.len() > i + 1) => {
                if let Some(dropped) = args.pop() {
                    debug!("ignoring `{dropped}` ({:?})", err.kind());
                }
            }
            Err(err) => {
                debug!("unusable command line: {:?}", err.kind());
                let token = first_word(&args)
                    .and_then(|i| args.get(i))
                    .cloned()
                    .unwrap_or_default();
                return Invocation::bare(Request::Unknown(token));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(args: &[&str]) -> Invocation {
        let argv = std::iter::once("pet-me").chain(args.iter().copied());
        read_args(argv.map(String::from).collect())
    }

    fn request(args: &[&str]) -> Request {
        read(args).request
    }

    #[test]
    fn bare_invocation_shows_status() {
        assert_eq!(request(&[]), Request::Act(Action::Status));
    }

    #[test]
    fn defaults_fill_optional_arguments() {
        assert_eq!(request(&["feed"]), Request::Act(Action::Feed("food".into())));
        assert_eq!(request(&["play"]), Request::Act(Action::Play(None)));
        assert_eq!(request(&["hatch"]), Request::Act(Action::Hatch("Pixel".into())));
        assert_eq!(request(&["log"]), Request::Act(Action::Log(20)));
        assert_eq!(request(&["release"]), Request::Act(Action::Release(None)));
    }

    #[test]
    fn arguments_are_forwarded() {
        assert_eq!(
            request(&["hatch", "--name", "Luna"]),
            Request::Act(Action::Hatch("Luna".into()))
        );
        assert_eq!(
            request(&["play", "rock"]),
            Request::Act(Action::Play(Some("rock".into())))
        );
        assert_eq!(request(&["log", "5"]), Request::Act(Action::Log(5)));
        assert_eq!(
            request(&["config", "hungerRatePerHour", "-2.5"]),
            Request::Act(Action::Config {
                key: Some("hungerRatePerHour".into()),
                value: Some("-2.5".into()),
            })
        );
    }

    #[test]
    fn help_and_version_in_every_spelling() {
        for args in [&["help"][..], &["-h"], &["--help"], &["feed", "-h"]] {
            assert_eq!(request(args), Request::Help, "{args:?}");
        }
        for args in [&["version"][..], &["-V"], &["--version"]] {
            assert_eq!(request(args), Request::Version, "{args:?}");
        }
    }

    #[test]
    fn unknown_commands_are_reported_by_name() {
        assert_eq!(request(&["dance", "now"]), request(&["dance"]));
        assert_eq!(request(&["Dance"]), Request::Unknown("Dance".into()));
    }

    #[test]
    fn unknown_flags_are_unknown_commands() {
        assert_eq!(request(&["--bogus"]), Request::Unknown("--bogus".into()));
        assert_eq!(
            request(&["--state", "x.json", "--bogus", "feed"]),
            Request::Unknown("--bogus".into())
        );
    }

    #[test]
    fn command_words_ignore_case() {
        assert_eq!(request(&["Status"]), Request::Act(Action::Status));
        assert_eq!(
            request(&["FEED", "toys"]),
            Request::Act(Action::Feed("toys".into()))
        );
    }

    #[test]
    fn surplus_and_malformed_words_are_dropped() {
        assert_eq!(
            request(&["feed", "food", "extra"]),
            Request::Act(Action::Feed("food".into()))
        );
        assert_eq!(request(&["log", "lots"]), Request::Act(Action::Log(20)));
        assert_eq!(request(&["status", "now", "please"]), Request::Act(Action::Status));
    }

    #[test]
    fn global_flags_work_on_either_side_of_the_command() {
        let after = read(&["status", "--state", "x.json", "--seed", "7"]);
        let before = read(&["--state", "x.json", "--seed", "7", "status"]);
        assert_eq!(after, before);
        assert_eq!(after.state, Some(PathBuf::from("x.json")));
        assert_eq!(after.seed, Some(7));
        assert_eq!(after.request, Request::Act(Action::Status));
    }
}
