use crate::events::PersonId;

/// Why the line is not engaged even though a call is under way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnplugStatus {
    #[default]
    None,
    WrongNumberInProgress,
    CallerUnplugged,
}

/// One end of the phone line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineEnd {
    pub index: Option<PersonId>,
    pub is_plugged: bool,
}

impl LineEnd {
    pub fn is(&self, person: PersonId) -> bool {
        self.index == Some(person)
    }
}

/// The single phone line the operator is working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhoneLine {
    pub is_engaged: bool,
    pub unplug_status: UnplugStatus,
    pub caller: LineEnd,
    pub callee: LineEnd,
}

impl PhoneLine {
    /// Engaged requires both ends, and a wrong number is never engaged.
    pub fn invariants_hold(&self) -> bool {
        let engaged_ok = !self.is_engaged || (self.caller.is_plugged && self.callee.is_plugged);
        let wrong_number_ok =
            self.unplug_status != UnplugStatus::WrongNumberInProgress || !self.is_engaged;
        engaged_ok && wrong_number_ok
    }

    /// A callee is settled once the call is live or a wrong number is being handled.
    pub fn callee_resolved(&self) -> bool {
        self.is_engaged || self.unplug_status == UnplugStatus::WrongNumberInProgress
    }
}

/// Where the conversation stands, for logging and for the `Completed` guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallPhase {
    #[default]
    Idle,
    Ringing,
    AwaitingCallee,
    WrongNumberFlow,
    Engaged,
    CallerDropped,
    CalleeDropped,
    Completed,
}

impl CallPhase {
    pub fn label(self) -> &'static str {
        match self {
            CallPhase::Idle => "idle",
            CallPhase::Ringing => "ringing",
            CallPhase::AwaitingCallee => "awaiting_callee",
            CallPhase::WrongNumberFlow => "wrong_number",
            CallPhase::Engaged => "engaged",
            CallPhase::CallerDropped => "caller_dropped",
            CallPhase::CalleeDropped => "callee_dropped",
            CallPhase::Completed => "completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_line_is_clear_and_consistent() {
        let line = PhoneLine::default();
        assert!(!line.is_engaged);
        assert_eq!(line.unplug_status, UnplugStatus::None);
        assert_eq!(line.caller.index, None);
        assert!(line.invariants_hold());
    }

    #[test]
    fn engaged_without_callee_breaks_invariant() {
        let line = PhoneLine {
            is_engaged: true,
            caller: LineEnd {
                index: Some(PersonId(3)),
                is_plugged: true,
            },
            ..PhoneLine::default()
        };
        assert!(!line.invariants_hold());
    }

    #[test]
    fn engaged_wrong_number_breaks_invariant() {
        let plugged = LineEnd {
            index: Some(PersonId(1)),
            is_plugged: true,
        };
        let line = PhoneLine {
            is_engaged: true,
            unplug_status: UnplugStatus::WrongNumberInProgress,
            caller: plugged,
            callee: plugged,
        };
        assert!(!line.invariants_hold());
    }
}
