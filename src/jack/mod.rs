//! Jack records and the debouncer that turns raw edges into plug events.

mod debounce;
#[cfg(test)]
mod tests;

pub use debounce::JackDebouncer;

use crate::events::{PersonId, JACK_COUNT};

/// Debounced state of one jack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jack {
    pub index: PersonId,
    pub is_plugged_in: bool,
}

/// The twelve jack records, indexed by person.
///
/// Only validated event handling changes these; raw electrical levels live behind
/// [`crate::panel::SenseLines`].
#[derive(Debug, Clone)]
pub struct JackBank {
    jacks: [Jack; JACK_COUNT],
}

impl Default for JackBank {
    fn default() -> Self {
        Self::new()
    }
}

impl JackBank {
    pub fn new() -> Self {
        let jacks = std::array::from_fn(|slot| Jack {
            index: PersonId(slot as u8),
            is_plugged_in: false,
        });
        Self { jacks }
    }

    pub fn is_plugged_in(&self, person: PersonId) -> bool {
        self.jacks
            .get(person.slot())
            .is_some_and(|jack| jack.is_plugged_in)
    }

    pub fn set_plugged_in(&mut self, person: PersonId, plugged: bool) {
        match self.jacks.get_mut(person.slot()) {
            Some(jack) => jack.is_plugged_in = plugged,
            None => crate::log_debug(&format!("no jack for person {person}; ignoring")),
        }
    }

    pub fn reset(&mut self) {
        for jack in &mut self.jacks {
            jack.is_plugged_in = false;
        }
    }
}
