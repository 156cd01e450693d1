//! Console commands standing in for hands on the panel.

use anyhow::{bail, Context, Result};
use crossbeam_channel::Sender;
use std::io::{self, BufRead};
use std::thread;
use switchboard::events::{LoopEvent, JACK_COUNT, START_BUTTON_LINE};
use switchboard::log_debug;
use switchboard::panel::{SenseLines, SimulatedPanel};

pub(crate) const HELP_TEXT: &str = "commands: plug N | unplug N | wiggle N | bounce N | start | quit   (N = jack 0-11)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConsoleCommand {
    Plug(u8),
    Unplug(u8),
    Wiggle(u8),
    /// Toggle the jack with contact chatter.
    Bounce(u8),
    Start,
    Quit,
    Help,
}

pub(crate) fn parse_command(line: &str) -> Result<ConsoleCommand> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        bail!("empty command");
    };
    let command = match verb.to_ascii_lowercase().as_str() {
        "start" | "s" => ConsoleCommand::Start,
        "quit" | "q" | "exit" => ConsoleCommand::Quit,
        "help" | "?" => ConsoleCommand::Help,
        "plug" | "p" => ConsoleCommand::Plug(jack_arg(words.next())?),
        "unplug" | "u" => ConsoleCommand::Unplug(jack_arg(words.next())?),
        "wiggle" | "w" => ConsoleCommand::Wiggle(jack_arg(words.next())?),
        "bounce" | "b" => ConsoleCommand::Bounce(jack_arg(words.next())?),
        other => bail!("unknown command {other:?}"),
    };
    if let Some(extra) = words.next() {
        bail!("unexpected argument {extra:?}");
    }
    Ok(command)
}

fn jack_arg(word: Option<&str>) -> Result<u8> {
    let word = word.context("missing jack number")?;
    let jack: u8 = word
        .parse()
        .with_context(|| format!("{word:?} is not a jack number"))?;
    if usize::from(jack) >= JACK_COUNT {
        bail!("jack {jack} does not exist (0-{})", JACK_COUNT - 1);
    }
    Ok(jack)
}

/// Apply one command to the panel. Returns false when the console should stop.
pub(crate) fn apply_command(
    command: ConsoleCommand,
    panel: &SimulatedPanel,
    events: &Sender<LoopEvent>,
) -> bool {
    match command {
        ConsoleCommand::Plug(jack) => panel.set_grounded(jack, true),
        ConsoleCommand::Unplug(jack) => panel.set_grounded(jack, false),
        ConsoleCommand::Wiggle(jack) => panel.wiggle(jack),
        ConsoleCommand::Bounce(jack) => panel.bounce(jack, !panel.is_grounded(jack)),
        ConsoleCommand::Start => panel.press(START_BUTTON_LINE),
        ConsoleCommand::Help => {
            println!("{HELP_TEXT}");
            true
        }
        ConsoleCommand::Quit => {
            let _ = events.send(LoopEvent::Quit);
            false
        }
    }
}

pub(crate) fn spawn_input_thread(
    panel: SimulatedPanel,
    events: Sender<LoopEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        println!("{HELP_TEXT}");
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    log_debug(&format!("stdin read error: {err}"));
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Ok(command) => {
                    if !apply_command(command, &panel, &events) {
                        return;
                    }
                }
                Err(err) => println!("{err:#}"),
            }
        }
        // Console closed: shut the exhibit down with it.
        let _ = events.send(LoopEvent::Quit);
    })
}
