mod actions;
mod cli;
mod clock;
mod config;
mod dispatch;
mod error;
mod gestures;
mod history;
mod idle;
mod logging;
mod pipeline;
mod recognizer;
mod source;
mod state;

fn main() -> anyhow::Result<()> {
    logging::init();
    cli::run()
}
