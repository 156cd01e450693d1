//! The phone line and the scripted call the operator is working through.
//!
//! Every handler runs on the event loop thread, mutates the line, and reports what
//! should happen through [`Io`]: audio, text, LEDs, and timers. Nothing here returns
//! an error; an event that makes no sense in the current phase is logged and dropped.

mod blink;
mod channels;
mod line;

use std::time::Duration;

pub use blink::Blinker;
pub use channels::{AudioChannels, TrackHook};
pub use line::{CallPhase, LineEnd, PhoneLine, UnplugStatus};

use crate::captions::{CaptionSequencer, CaptionSource};
use crate::config::SessionTimings;
use crate::events::{AudioChannel, Io, PersonId, Timer, TrackToken};
use crate::jack::JackBank;
use crate::script::{CallEntry, ConversationScript, PersonDirectory};
use crate::timer::TimerId;
use crate::{log_debug, log_debug_content};

pub const WELCOME_TEXT: &str = "Keep your ears open for incoming calls!";
pub const INCOMING_TEXT: &str = "Incoming call..";
pub const WRONG_JACK_TEXT: &str =
    "That's not the jack for the person who is asking you to connect!";
pub const DISCONNECTED_TEXT: &str = "Call disconnected..";
pub const FINISHED_TEXT: &str =
    "Congratulations -- you finished your first shift as a switchboard operator!";

pub struct CallSessionMachine {
    script: ConversationScript,
    persons: PersonDirectory,
    timings: SessionTimings,
    line: PhoneLine,
    phase: CallPhase,
    /// Index of the scripted call being worked; never past the script length.
    cursor: usize,
    current_caller: Option<PersonId>,
    current_callee: Option<PersonId>,
    completion_recorded: bool,
    channels: AudioChannels,
    blinker: Blinker,
    captions: CaptionSequencer,
    call_timer: Option<TimerId>,
    regreet_timer: Option<TimerId>,
}

impl CallSessionMachine {
    pub fn new(
        script: ConversationScript,
        persons: PersonDirectory,
        timings: SessionTimings,
        captions: Box<dyn CaptionSource>,
    ) -> Self {
        let blinker = Blinker::new(timings.blink_interval);
        Self {
            script,
            persons,
            timings,
            line: PhoneLine::default(),
            phase: CallPhase::Idle,
            cursor: 0,
            current_caller: None,
            current_callee: None,
            completion_recorded: false,
            channels: AudioChannels::new(),
            blinker,
            captions: CaptionSequencer::new(captions),
            call_timer: None,
            regreet_timer: None,
        }
    }

    pub fn line(&self) -> &PhoneLine {
        &self.line
    }

    pub fn phase(&self) -> CallPhase {
        self.phase
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_caller(&self) -> Option<PersonId> {
        self.current_caller
    }

    pub fn current_callee(&self) -> Option<PersonId> {
        self.current_callee
    }

    pub fn channels(&self) -> &AudioChannels {
        &self.channels
    }

    pub fn captions(&self) -> &CaptionSequencer {
        &self.captions
    }

    pub fn blinking(&self) -> Option<PersonId> {
        self.blinker.blinking()
    }

    pub fn call_pending(&self) -> bool {
        self.call_timer.is_some()
    }

    pub fn regreet_pending(&self) -> bool {
        self.regreet_timer.is_some()
    }

    /// Start the script from the top; the first call rings after the start delay.
    pub fn handle_start(&mut self, io: &mut Io<'_>) {
        self.reset(io);
        self.schedule_call(self.timings.start_delay, io);
    }

    /// Silence everything and return to a clear line at the first call.
    pub fn reset(&mut self, io: &mut Io<'_>) {
        self.halt(io);
        self.line = PhoneLine::default();
        self.cursor = 0;
        self.current_caller = None;
        self.current_callee = None;
        self.completion_recorded = false;
        self.enter(CallPhase::Idle);
        io.show_text(WELCOME_TEXT);
    }

    /// Stop audio, captions, blinking and pending session timers. Line state is kept.
    pub fn halt(&mut self, io: &mut Io<'_>) {
        self.channels.stop_all(io);
        self.captions.stop();
        self.blinker.stop(io);
        self.cancel_call_timer(io);
        self.cancel_regreet(io);
    }

    /// Ring the caller at the cursor, or finish the shift once the script is exhausted.
    pub fn initiate_call(&mut self, io: &mut Io<'_>) {
        if self.phase == CallPhase::Completed {
            log_debug("initiate_call after the script finished; ignoring");
            return;
        }
        let Some(entry) = self.script.get(self.cursor) else {
            self.finish(io);
            return;
        };
        let (caller, callee) = (entry.caller.id(), entry.callee.id());
        self.current_caller = Some(caller);
        self.current_callee = Some(callee);
        self.completion_recorded = false;

        self.channels
            .play(AudioChannel::Ring, &self.timings.ring_track, None, io);
        self.blinker.start(caller, io);
        io.show_text(INCOMING_TEXT);
        log_debug(&format!(
            "call {}: {} ({caller}) asking for {} ({callee})",
            self.cursor,
            self.persons.name(caller),
            self.persons.name(callee)
        ));
        self.enter(CallPhase::Ringing);
    }

    pub fn handle_plug_in(&mut self, person: PersonId, io: &mut Io<'_>, jacks: &mut JackBank) {
        jacks.set_plugged_in(person, true);

        let caller_again = self.line.caller.is_plugged && self.line.caller.is(person);
        let callee_again = self.line.callee.is_plugged && self.line.callee.is(person);
        if caller_again || callee_again {
            log_debug(&format!("jack {person} is already on the line; ignoring"));
        } else if !self.line.caller.is_plugged {
            self.plug_caller(person, io);
        } else if self.line.callee_resolved() {
            log_debug(&format!(
                "jack {person} plugged while the callee end is settled ({}); ignoring",
                self.phase.label()
            ));
        } else {
            self.plug_callee(person, io);
        }
        self.check_line();
    }

    pub fn handle_unplug(&mut self, person: PersonId, io: &mut Io<'_>, jacks: &mut JackBank) {
        if self.line.is_engaged {
            self.unplug_while_engaged(person, io);
        } else if self.line.caller.is_plugged && self.line.caller.is(person) {
            log_debug(&format!("caller {person} hung up before connecting; abandoning"));
            self.channels.stop_all(io);
            self.captions.stop();
            self.clear_line(io);
            self.schedule_call(self.timings.recall_delay, io);
            self.enter(CallPhase::Idle);
        } else if self.line.unplug_status == UnplugStatus::WrongNumberInProgress {
            self.channels.stop(AudioChannel::Tone, io);
            self.channels.stop(AudioChannel::Conversation, io);
            self.line.unplug_status = UnplugStatus::None;
            self.line.callee = LineEnd::default();
            io.set_led(person, false);
            self.enter(CallPhase::AwaitingCallee);
        } else if self.line.callee.is_plugged && self.line.callee.is(person) {
            // Callee left while the caller was away.
            self.line.callee.is_plugged = false;
            io.set_led(person, false);
        } else {
            log_debug(&format!("unplug of jack {person} changes nothing"));
        }
        jacks.set_plugged_in(person, false);
        self.check_line();
    }

    /// A track finished. Only the subscription of the track still on the channel fires.
    pub fn on_end_of_track(&mut self, channel: AudioChannel, token: TrackToken, io: &mut Io<'_>) {
        let Some(hook) = self.channels.take_hook(channel, token) else {
            tracing::debug!(channel = channel.label(), token = token.0, "end of track ignored");
            return;
        };
        tracing::debug!(channel = channel.label(), ?hook, "end of track");
        match hook {
            TrackHook::StartConversation => {
                if !self.line.is_engaged {
                    log_debug("outgoing tone ended on a dropped line; ignoring");
                    return;
                }
                if let Some(entry) = self.entry() {
                    self.play_conversation(&entry, io);
                }
            }
            TrackHook::WrongNumberMessage(person) => self.play_wrong_number(person, io),
            TrackHook::RequestCorrectNumber => self.request_correct_number(io),
            TrackHook::GreetingOnlyFinished => {
                self.clear_line(io);
                self.advance_and_recall(io);
            }
            TrackHook::CallCompleted => {
                self.captions.stop();
                self.clear_line(io);
                if self.completion_recorded {
                    log_debug("call already recorded as complete");
                } else {
                    self.completion_recorded = true;
                    self.advance_and_recall(io);
                }
            }
        }
        self.check_line();
    }

    pub fn on_timer(&mut self, timer: Timer, io: &mut Io<'_>) {
        match timer {
            Timer::InitiateCall => {
                self.call_timer = None;
                self.initiate_call(io);
            }
            Timer::ReGreet => {
                self.regreet_timer = None;
                self.re_greet(io);
            }
            Timer::Blink => self.blinker.on_tick(io),
            Timer::CaptionCue { epoch, cue } => self.captions.on_cue(epoch, cue, io),
            other => log_debug(&format!("session got a jack timer {other:?}; ignoring")),
        }
        self.check_line();
    }

    fn plug_caller(&mut self, person: PersonId, io: &mut Io<'_>) {
        let Some(expected) = self.current_caller else {
            log_debug(&format!("jack {person} plugged with no call waiting"));
            return;
        };
        if person != expected {
            io.show_text(WRONG_JACK_TEXT);
            log_debug(&format!("wrong jack {person}; {expected} is calling"));
            return;
        }

        self.cancel_call_timer(io);
        self.channels.stop(AudioChannel::Ring, io);
        self.blinker.stop(io);
        io.set_led(person, true);
        self.line.caller = LineEnd {
            index: Some(person),
            is_plugged: true,
        };

        if self.line.unplug_status == UnplugStatus::CallerUnplugged {
            self.line.unplug_status = UnplugStatus::None;
            let callee_waiting =
                self.line.callee.is_plugged && self.line.callee.index == self.current_callee;
            if callee_waiting {
                self.resume_conversation(io);
                return;
            }
            log_debug(&format!("caller {person} back but the callee left; greeting again"));
        }
        self.play_hello(io);
        self.enter(CallPhase::AwaitingCallee);
    }

    fn plug_callee(&mut self, person: PersonId, io: &mut Io<'_>) {
        let Some(entry) = self.entry() else {
            return;
        };
        if entry.hello_only {
            log_debug(&format!("greeting-only call has no callee; ignoring jack {person}"));
            return;
        }

        self.channels.stop(AudioChannel::Conversation, io);
        self.cancel_regreet(io);
        io.set_led(person, true);
        self.line.callee.index = Some(person);

        if Some(person) == self.current_callee {
            self.line.callee.is_plugged = true;
            self.line.is_engaged = true;
            self.channels.play(
                AudioChannel::Tone,
                &self.timings.tone_track,
                Some(TrackHook::StartConversation),
                io,
            );
            self.enter(CallPhase::Engaged);
        } else {
            self.line.unplug_status = UnplugStatus::WrongNumberInProgress;
            self.channels.play(
                AudioChannel::Tone,
                &self.timings.tone_track,
                Some(TrackHook::WrongNumberMessage(person)),
                io,
            );
            self.enter(CallPhase::WrongNumberFlow);
        }
    }

    fn unplug_while_engaged(&mut self, person: PersonId, io: &mut Io<'_>) {
        if self.line.callee.is(person) {
            self.stop_conversation(io);
            io.show_text(DISCONNECTED_TEXT);
            io.set_led(person, false);
            self.line.callee.is_plugged = false;
            self.line.is_engaged = false;
            self.cancel_regreet(io);
            self.regreet_timer = Some(io.timers.after(
                io.now,
                self.timings.recall_delay,
                Timer::ReGreet,
            ));
            self.enter(CallPhase::CalleeDropped);
        } else if self.line.caller.is(person) {
            self.stop_conversation(io);
            io.show_text(DISCONNECTED_TEXT);
            io.set_led(person, false);
            self.line.caller.is_plugged = false;
            self.line.is_engaged = false;
            self.line.unplug_status = UnplugStatus::CallerUnplugged;
            self.schedule_call(self.timings.recall_delay, io);
            self.enter(CallPhase::CallerDropped);
        } else {
            // Neither end of the call: the conversation keeps playing and no
            // "disconnected" text is shown, unlike a pull of the caller or callee.
            log_debug(&format!("unplug of jack {person} is not part of the live call"));
        }
    }

    fn re_greet(&mut self, io: &mut Io<'_>) {
        if !self.line.caller.is_plugged || self.line.is_engaged {
            log_debug("re-greet skipped; line changed meanwhile");
            return;
        }
        self.play_hello(io);
        self.enter(CallPhase::AwaitingCallee);
    }

    fn resume_conversation(&mut self, io: &mut Io<'_>) {
        let Some(entry) = self.entry() else {
            return;
        };
        self.line.is_engaged = true;
        if !entry.convo_text.is_empty() {
            io.show_text(entry.convo_text.clone());
        }
        self.play_conversation(&entry, io);
        self.enter(CallPhase::Engaged);
    }

    fn play_hello(&mut self, io: &mut Io<'_>) {
        let Some(entry) = self.entry() else {
            log_debug(&format!("no script entry at cursor {}", self.cursor));
            return;
        };
        let hook = entry.hello_only.then_some(TrackHook::GreetingOnlyFinished);
        self.channels
            .play(AudioChannel::Conversation, &entry.hello_file, hook, io);
        io.show_text(entry.hello_text.clone());
        log_debug_content(&format!("greeting: {}", entry.hello_text));
    }

    fn play_conversation(&mut self, entry: &CallEntry, io: &mut Io<'_>) {
        self.channels.play(
            AudioChannel::Conversation,
            &entry.convo_file,
            Some(TrackHook::CallCompleted),
            io,
        );
        self.captions.start(entry.caption_ref(), io);
    }

    fn play_wrong_number(&mut self, person: PersonId, io: &mut Io<'_>) {
        if self.line.unplug_status != UnplugStatus::WrongNumberInProgress {
            return;
        }
        let Some(wrong) = self.persons.get(person).cloned() else {
            log_debug(&format!("person {person} missing from the directory"));
            self.request_correct_number(io);
            return;
        };
        if !wrong.wrong_num_text.is_empty() {
            io.show_text(wrong.wrong_num_text.clone());
        }
        if wrong.wrong_num_file.is_empty() {
            self.request_correct_number(io);
            return;
        }
        self.channels.play(
            AudioChannel::Conversation,
            &wrong.wrong_num_file,
            Some(TrackHook::RequestCorrectNumber),
            io,
        );
    }

    fn request_correct_number(&mut self, io: &mut Io<'_>) {
        let Some(entry) = self.entry() else {
            return;
        };
        if !entry.retry_after_wrong_text.is_empty() {
            io.show_text(entry.retry_after_wrong_text.clone());
        }
        if !entry.retry_after_wrong_file.is_empty() {
            self.channels.play(
                AudioChannel::Conversation,
                &entry.retry_after_wrong_file,
                None,
                io,
            );
        }
    }

    fn finish(&mut self, io: &mut Io<'_>) {
        self.current_caller = None;
        self.current_callee = None;
        self.channels.stop(AudioChannel::Ring, io);
        self.channels.stop(AudioChannel::Tone, io);
        self.blinker.stop(io);
        io.show_text(FINISHED_TEXT);
        self.channels.play(
            AudioChannel::Conversation,
            &self.timings.finished_track,
            None,
            io,
        );
        self.enter(CallPhase::Completed);
    }

    fn stop_conversation(&mut self, io: &mut Io<'_>) {
        self.channels.stop(AudioChannel::Tone, io);
        self.channels.stop(AudioChannel::Conversation, io);
        self.captions.stop();
    }

    /// Both ends off the line; LEDs of the recorded ends go dark.
    fn clear_line(&mut self, io: &mut Io<'_>) {
        for end in [self.line.caller, self.line.callee] {
            if let Some(person) = end.index {
                io.set_led(person, false);
            }
        }
        self.line = PhoneLine::default();
        self.current_caller = None;
        self.current_callee = None;
        self.cancel_regreet(io);
    }

    fn advance_and_recall(&mut self, io: &mut Io<'_>) {
        self.cursor = (self.cursor + 1).min(self.script.len());
        log_debug(&format!("call finished; cursor now {}", self.cursor));
        self.schedule_call(self.timings.recall_delay, io);
        self.enter(CallPhase::Idle);
    }

    fn schedule_call(&mut self, delay: Duration, io: &mut Io<'_>) {
        self.cancel_call_timer(io);
        self.call_timer = Some(io.timers.after(io.now, delay, Timer::InitiateCall));
    }

    fn cancel_call_timer(&mut self, io: &mut Io<'_>) {
        if let Some(id) = self.call_timer.take() {
            io.timers.cancel(id);
        }
    }

    fn cancel_regreet(&mut self, io: &mut Io<'_>) {
        if let Some(id) = self.regreet_timer.take() {
            io.timers.cancel(id);
        }
    }

    fn entry(&self) -> Option<CallEntry> {
        self.script.get(self.cursor).cloned()
    }

    fn enter(&mut self, phase: CallPhase) {
        if self.phase == phase {
            return;
        }
        tracing::info!(
            from = self.phase.label(),
            to = phase.label(),
            cursor = self.cursor,
            "call phase"
        );
        log_debug(&format!(
            "phase {} -> {} (call {})",
            self.phase.label(),
            phase.label(),
            self.cursor
        ));
        self.phase = phase;
    }

    fn check_line(&self) {
        if !self.line.invariants_hold() {
            tracing::error!(line = ?self.line, "phone line invariant broken");
            log_debug(&format!("phone line invariant broken: {:?}", self.line));
        }
    }
}
