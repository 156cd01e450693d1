//! Sense-line levels and a console-driven stand-in for the input expander.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::events::{LoopEvent, PanelEvent, SENSE_LINE_COUNT};
use crate::lock_or_recover;

/// Settled electrical level of each sense line. Lines are pulled up, so a plugged
/// jack tip or a pressed button reads as grounded.
pub trait SenseLines {
    fn is_grounded(&self, line: u8) -> bool;

    fn any_grounded(&self, mut lines: std::ops::Range<u8>) -> bool {
        lines.any(|line| self.is_grounded(line))
    }
}

/// Shared pin levels for running the exhibit without the expander board.
///
/// Writers flip a level and post a raw edge, the way the expander's interrupt line
/// would; the event loop reads levels back through [`SenseLines`].
#[derive(Debug, Clone)]
pub struct SimulatedPanel {
    levels: Arc<Mutex<[bool; SENSE_LINE_COUNT as usize]>>,
    events: Sender<LoopEvent>,
}

/// Chatter edges a simulated bounce emits before the settling edge.
const BOUNCE_EDGES: usize = 4;
const BOUNCE_GAP: Duration = Duration::from_millis(12);
const WIGGLE_GAP: Duration = Duration::from_millis(30);
const BUTTON_HOLD: Duration = Duration::from_millis(200);

impl SimulatedPanel {
    pub fn new(events: Sender<LoopEvent>) -> Self {
        Self {
            levels: Arc::new(Mutex::new([false; SENSE_LINE_COUNT as usize])),
            events,
        }
    }

    /// Set a line's level and raise an edge. Returns false once the loop is gone.
    pub fn set_grounded(&self, line: u8, grounded: bool) -> bool {
        if line >= SENSE_LINE_COUNT {
            crate::log_debug(&format!("simulated panel: no sense line {line}"));
            return true;
        }
        {
            let mut levels = lock_or_recover(&self.levels, "simulated panel");
            levels[usize::from(line)] = grounded;
        }
        self.events
            .send(LoopEvent::Panel(PanelEvent::Edge(line)))
            .is_ok()
    }

    /// Plug or unplug with contact chatter before the level settles.
    pub fn bounce(&self, line: u8, grounded: bool) -> bool {
        for step in 0..BOUNCE_EDGES {
            let level = if step % 2 == 0 { grounded } else { !grounded };
            if !self.set_grounded(line, level) {
                return false;
            }
            thread::sleep(BOUNCE_GAP);
        }
        self.set_grounded(line, grounded)
    }

    /// Jostle a plugged jack: a brief open circuit that recovers.
    pub fn wiggle(&self, line: u8) -> bool {
        if !self.set_grounded(line, false) {
            return false;
        }
        thread::sleep(WIGGLE_GAP);
        self.set_grounded(line, true)
    }

    /// Press and release a button line. The release edge reads high and is ignored.
    pub fn press(&self, line: u8) -> bool {
        if !self.set_grounded(line, true) {
            return false;
        }
        thread::sleep(BUTTON_HOLD);
        self.set_grounded(line, false)
    }
}

impl SenseLines for SimulatedPanel {
    fn is_grounded(&self, line: u8) -> bool {
        let levels = lock_or_recover(&self.levels, "simulated panel");
        levels.get(usize::from(line)).copied().unwrap_or(false)
    }
}
