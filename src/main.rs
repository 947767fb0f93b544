mod achievements;
mod actions;
mod app;
mod cli;
mod config;
mod minigame;
mod model;
mod render;
mod sim;
mod storage;
mod util;

use anyhow::Result;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    env_logger::init();
    app::run()
}
