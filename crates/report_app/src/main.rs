mod app;
mod config;
mod form;
mod logging;
mod presenter;
mod render;

use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    app::run(std::env::args().skip(1).collect())
}
