//! Switchboard exhibit entrypoint so the panel, surface, and call session start as one runtime.
//!
//! # Architecture
//!
//! - Input thread: reads console commands and drives the simulated sense lines
//! - Surface thread: shows text and LEDs, owns the audio deck, reports finished tracks
//! - Event loop: debouncer, call session, and timers, all on the main thread

mod event_loop;
mod input;
mod surface;

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, unbounded};
use std::panic;
use std::time::Instant;
use switchboard::captions::CaptionDir;
use switchboard::config::AppConfig;
use switchboard::exhibit::Exhibit;
use switchboard::panel::SimulatedPanel;
use switchboard::script::{validate_script, ConversationScript, PersonDirectory};
use switchboard::session::CallSessionMachine;
use switchboard::{init_logging, init_tracing, log_debug, log_file_path, log_panic};

use crate::event_loop::run_event_loop;
use crate::input::spawn_input_thread;
use crate::surface::spawn_surface_thread;

/// Max pending panel and audio events before senders block.
const LOOP_CHANNEL_CAPACITY: usize = 256;

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    init_tracing(&config);
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        log_panic(info);
        default_hook(info);
    }));
    log_debug("=== Switchboard Started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let script = ConversationScript::load(&config.script)?;
    let persons = PersonDirectory::load(&config.persons)?;
    validate_script(&script, &persons).context("conversation script rejected")?;
    log_debug(&format!(
        "loaded {} calls and {} persons",
        script.len(),
        persons.len()
    ));

    let (loop_tx, loop_rx) = bounded(LOOP_CHANNEL_CAPACITY);
    // The loop must never block on output, so effects are unbounded.
    let (effect_tx, effect_rx) = unbounded();

    let surface_handle = spawn_surface_thread(config.clone(), effect_rx, loop_tx.clone());
    let panel = SimulatedPanel::new(loop_tx.clone());
    let _input_handle = spawn_input_thread(panel.clone(), loop_tx);

    let session = CallSessionMachine::new(
        script,
        persons,
        config.session_timings(),
        Box::new(CaptionDir::new(&config.captions_dir)),
    );
    let mut exhibit = Exhibit::new(panel, config.debounce_timings(), session, effect_tx);
    exhibit.boot();

    run_event_loop(&mut exhibit, &loop_rx);

    exhibit.shutdown(Instant::now());
    if surface_handle.join().is_err() {
        log_debug("surface thread panicked");
    }
    log_debug("=== Switchboard Exiting ===");
    Ok(())
}
