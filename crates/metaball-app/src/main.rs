use std::io;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;

use metaball_app::cli::Args;
use metaball_app::console::{self, ConsoleExit};
use metaball_app::state::AppState;
use metaball_app::surface::CanvasSurface;
use metaball_sim::SimulationWorld;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();
    let args = Args::parse();

    let scenario = args.scenario().context("failed to load scenario")?;
    let mut world = SimulationWorld::from_scenario(&scenario, args.world_config())
        .context("failed to build world")?;

    let state = AppState::new();
    world.run(CanvasSurface::new(state.latest_frame.clone()))?;

    let dispatcher = world.dispatcher();
    match args.duration() {
        Some(duration) => {
            // Console reads on its own thread; the process exits on the timer
            // or on `quit`, whichever comes first.
            let _console = thread::Builder::new()
                .name("metaball-console".into())
                .spawn(move || {
                    let exit = console::run(io::stdin().lock(), io::stdout(), &dispatcher, &state);
                    if let Ok(ConsoleExit::Quit) = exit {
                        std::process::exit(0);
                    }
                })
                .context("failed to spawn console thread")?;
            thread::sleep(duration);
        }
        None => {
            let exit = console::run(io::stdin().lock(), io::stdout(), &dispatcher, &state)?;
            if exit == ConsoleExit::EndOfInput {
                log::info!("stdin closed, running until interrupted");
                loop {
                    thread::park();
                }
            }
        }
    }

    let report = world.report();
    log::info!(
        "exiting: engine {} ticks ({} missed), render {} frames ({} missed)",
        report.engine.ticks,
        report.engine.missed,
        report.render.ticks,
        report.render.missed
    );
    Ok(())
}
