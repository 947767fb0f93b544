use crate::actions::{Action, Session};
use crate::cli::{read_args, Invocation, Request};
use crate::config::state_path;
use crate::render::{help_text, outcome_lines, print_lines};
use crate::storage::{load_or_bootstrap, JsonFileStore, Store};
use crate::util::RngDice;
use chrono::Utc;
use log::info;
use rand::rngs::StdRng;
use std::io;
use std::process::ExitCode;

pub(crate) struct App {
    store: JsonFileStore,
    session: Session<RngDice<StdRng>>,
}

impl App {
    fn init(inv: &Invocation) -> anyhow::Result<Self> {
        let path = state_path(inv.state.clone())?;
        info!("state file: {}", path.display());
        let store = JsonFileStore::new(path);

        let now = Utc::now();
        let mut dice = RngDice::seeded(inv.seed);
        let root = load_or_bootstrap(&store, &mut dice, now);

        Ok(Self {
            store,
            session: Session::new(root, dice, now),
        })
    }

    fn run_action(&mut self, action: Action) -> anyhow::Result<()> {
        let outcome = self.session.apply(action);
        if outcome.persist {
            self.store.save(&self.session.root)?;
        }
        print_lines(&mut io::stdout().lock(), &outcome_lines(&outcome))?;
        Ok(())
    }
}

pub(crate) fn run() -> anyhow::Result<ExitCode> {
    let args = std::env::args_os()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let inv = read_args(args);
    let mut out = io::stdout().lock();

    match &inv.request {
        Request::Help => {
            print_lines(&mut out, &[help_text(None)])?;
        }
        Request::Version => {
            print_lines(&mut out, &[format!("pet-me v{}", env!("CARGO_PKG_VERSION"))])?;
        }
        Request::Unknown(token) => {
            let prefix = format!("Unknown command: {token}");
            print_lines(&mut out, &[help_text(Some(&prefix))])?;
            return Ok(ExitCode::from(1));
        }
        Request::Act(action) => {
            drop(out);
            App::init(&inv)?.run_action(action.clone())?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
