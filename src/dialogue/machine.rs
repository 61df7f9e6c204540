//! Dialogue state machine
//!
//! An explicit finite-state machine: one flat [`DialogueState`] enum (regions
//! are encoded in the variant grouping), an entry effect per state, and a
//! transition function with one pure guard predicate per conditional edge.
//! The machine processes one event at a time to completion; exactly one state
//! is active at any instant.

use std::time::Duration;

use crate::events::{EngineCommand, EngineEvent, Recognition};

use super::grammar;

/// Inclusive confidence threshold for grammar-gated slot filling
pub const CONFIDENCE_THRESHOLD: f32 = 0.7;

/// No-match timeout on the initial menu listen
pub const MENU_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Prompt spoken when the session starts
pub const GREETING_PROMPT: &str = "Hello, how can I help you today? Do you want to create a meeting or know about someone?";

/// Prompt spoken after the menu listen times out
pub const RETRY_PROMPT: &str = "I didn't catch that. Could you try again? Do you want to create a meeting or know about someone?";

/// Prompt asking for the meeting person
pub const ASK_NAME_PROMPT: &str = "Who would you like to meet?";

/// Prompt asking for the meeting day
pub const ASK_DAY_PROMPT: &str = "Which day would you like to schedule the meeting?";

/// Prompt asking whether the meeting takes the whole day
pub const ASK_WHOLE_DAY_PROMPT: &str = "Will it take the whole day?";

/// Prompt asking for the meeting time
pub const ASK_TIME_PROMPT: &str = "What time is your meeting?";

/// Outcome sentence for a confirmed appointment
pub const CREATED_PROMPT: &str = "Your appointment has been created.";

/// Outcome sentence for a declined appointment
pub const NOT_CREATED_PROMPT: &str = "Your appointment has not been created.";

/// Prompt asking which person to look up
pub const ASK_WHO_PROMPT: &str = "Who would you like to know more about?";

/// Prompt asking whether more help is needed
pub const MORE_HELP_PROMPT: &str = "Do you need anything else?";

/// Closing message spoken before the session restarts
pub const CLOSING_PROMPT: &str = "Thank you for using this App!";

/// Fallback when a known person has no canned response
pub const NO_INFO_RESPONSE: &str = "I don't have information about that person.";

/// Fallback when the name was not confidently recognized
pub const NOT_CONFIDENT_RESPONSE: &str = "I'm sorry, I couldn't confidently recognize the name.";

/// Intent label for the appointment-creation flow
pub const INTENT_CREATE_MEETING: &str = "create a meeting";

/// Intent label for the person-lookup flow
pub const INTENT_KNOW_WHO: &str = "know who";

/// Intent label for an affirmative answer
pub const INTENT_YES: &str = "yes";

/// Intent label for a negative answer
pub const INTENT_NO: &str = "no";

/// Conversational states
///
/// Flat enumeration; `CreateAppointment` and `KnowWho` are the two nested
/// regions, both wrapped by the `Prepare`/`Complete` lifecycle pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    /// Spawn and initialize the speech engine
    Prepare,
    /// Speak the closing message, then loop back to `Prepare`
    Complete,

    // -- CreateAppointment region --
    /// Speak the greeting/menu prompt
    Start,
    /// Listen for the top-level menu intent
    ListenToStart,
    /// Speak the retry prompt after a menu timeout
    PromptRetry,
    /// Ask who the meeting is with
    AskName,
    /// Listen for a grammar-known person name
    MeetingWithName,
    /// Ask for the meeting day
    GetMeetingDay,
    /// Listen for the meeting day
    ListenMeetingDay,
    /// Ask whether the meeting takes the whole day
    IsWholeDay,
    /// Listen for a yes/no whole-day answer
    CheckWholeDay,
    /// Ask for the meeting time
    GetMeetingTime,
    /// Listen for the meeting time
    ListenMeetingTime,
    /// Confirm a whole-day appointment
    ConfirmWholeDayAppointment,
    /// Confirm a timed appointment
    ConfirmAppointment,
    /// Listen for a yes/no confirmation
    ListenConfirmation,
    /// Speak the created-outcome sentence (terminal for the region)
    AppointmentCreated,
    /// Speak the not-created-outcome sentence (terminal for the region)
    AppointmentNotCreated,

    // -- KnowWho region --
    /// Ask which person to look up
    AskWho,
    /// Listen for a grammar-known person name
    ListenKnowWho,
    /// Speak the person lookup response
    GivePersonalInfo,
    /// Ask whether more help is needed
    MoreHelp,
    /// Listen for a yes/no more-help answer
    ListenCheckMoreHelp,
}

impl DialogueState {
    /// State name for transition logging
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Prepare => "Prepare",
            Self::Complete => "Complete",
            Self::Start => "CreateAppointment.Start",
            Self::ListenToStart => "CreateAppointment.ListenToStart",
            Self::PromptRetry => "CreateAppointment.PromptRetry",
            Self::AskName => "CreateAppointment.AskName",
            Self::MeetingWithName => "CreateAppointment.MeetingWithName",
            Self::GetMeetingDay => "CreateAppointment.GetMeetingDay",
            Self::ListenMeetingDay => "CreateAppointment.ListenMeetingDay",
            Self::IsWholeDay => "CreateAppointment.IsWholeDay",
            Self::CheckWholeDay => "CreateAppointment.CheckWholeDay",
            Self::GetMeetingTime => "CreateAppointment.GetMeetingTime",
            Self::ListenMeetingTime => "CreateAppointment.ListenMeetingTime",
            Self::ConfirmWholeDayAppointment => "CreateAppointment.ConfirmWholeDayAppointment",
            Self::ConfirmAppointment => "CreateAppointment.ConfirmAppointment",
            Self::ListenConfirmation => "CreateAppointment.ListenConfirmation",
            Self::AppointmentCreated => "CreateAppointment.AppointmentCreated",
            Self::AppointmentNotCreated => "CreateAppointment.AppointmentNotCreated",
            Self::AskWho => "KnowWho.AskWho",
            Self::ListenKnowWho => "KnowWho.ListenKnowWho",
            Self::GivePersonalInfo => "KnowWho.GivePersonalInfo",
            Self::MoreHelp => "KnowWho.MoreHelp",
            Self::ListenCheckMoreHelp => "KnowWho.ListenCheckMoreHelp",
        }
    }

    /// True for the single state whose listen races a no-match timeout
    #[must_use]
    pub const fn has_menu_timeout(self) -> bool {
        matches!(self, Self::ListenToStart)
    }
}

/// Mutable conversational context, one instance per session
///
/// Slot fields stay empty until their conversational state captures them,
/// and are reset when the session restarts through `Prepare`.
#[derive(Debug, Clone, Default)]
pub struct DialogueContext {
    /// Number of recognized turns consumed by the machine
    pub turns: u32,
    /// Full name of the person the meeting is with
    pub meeting_with_person_name: String,
    /// Captured meeting date (raw lowercased utterance)
    pub meeting_date: String,
    /// Captured meeting time (raw lowercased utterance)
    pub meeting_time: String,
    /// Whether the appointment takes the whole day
    pub whole_day: bool,
    /// Response computed by the last person lookup
    pub last_lookup_response: String,
}

impl DialogueContext {
    /// Clear all captured slots for a fresh session
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The command issued on entering a state, if any
///
/// `Prepare` asks the engine to initialize; every other state is a strict
/// alternation of speaking a prompt and listening for a matching response.
#[must_use]
pub fn entry_command(state: DialogueState, ctx: &DialogueContext) -> Option<EngineCommand> {
    let speak = |utterance: String| Some(EngineCommand::Speak { utterance });
    match state {
        DialogueState::Prepare => Some(EngineCommand::Prepare),
        DialogueState::Complete => speak(CLOSING_PROMPT.to_string()),
        DialogueState::Start => speak(GREETING_PROMPT.to_string()),
        DialogueState::PromptRetry => speak(RETRY_PROMPT.to_string()),
        DialogueState::AskName => speak(ASK_NAME_PROMPT.to_string()),
        DialogueState::GetMeetingDay => speak(ASK_DAY_PROMPT.to_string()),
        DialogueState::IsWholeDay => speak(ASK_WHOLE_DAY_PROMPT.to_string()),
        DialogueState::GetMeetingTime => speak(ASK_TIME_PROMPT.to_string()),
        DialogueState::ConfirmWholeDayAppointment => speak(confirm_whole_day_sentence(ctx)),
        DialogueState::ConfirmAppointment => speak(confirm_timed_sentence(ctx)),
        DialogueState::AppointmentCreated => speak(CREATED_PROMPT.to_string()),
        DialogueState::AppointmentNotCreated => speak(NOT_CREATED_PROMPT.to_string()),
        DialogueState::AskWho => speak(ASK_WHO_PROMPT.to_string()),
        DialogueState::GivePersonalInfo => speak(personal_info_sentence(ctx)),
        DialogueState::MoreHelp => speak(MORE_HELP_PROMPT.to_string()),
        DialogueState::ListenToStart
        | DialogueState::MeetingWithName
        | DialogueState::ListenMeetingDay
        | DialogueState::CheckWholeDay
        | DialogueState::ListenMeetingTime
        | DialogueState::ListenConfirmation
        | DialogueState::ListenKnowWho
        | DialogueState::ListenCheckMoreHelp => Some(EngineCommand::Listen { nlu: true }),
    }
}

/// Confirmation sentence for a whole-day appointment
#[must_use]
pub fn confirm_whole_day_sentence(ctx: &DialogueContext) -> String {
    format!(
        "Do you want to create an appointment with {} on {} for the whole day?",
        ctx.meeting_with_person_name, ctx.meeting_date
    )
}

/// Confirmation sentence for a timed appointment
#[must_use]
pub fn confirm_timed_sentence(ctx: &DialogueContext) -> String {
    format!(
        "Do you want to create an appointment with {} on {} at {}?",
        ctx.meeting_with_person_name, ctx.meeting_date, ctx.meeting_time
    )
}

/// Sentence spoken in `GivePersonalInfo`
#[must_use]
pub fn personal_info_sentence(ctx: &DialogueContext) -> String {
    format!("You asked about {}", ctx.last_lookup_response)
}

// -- Guards --
//
// One pure predicate per conditional transition.

fn wants_meeting(_ctx: &DialogueContext, rec: &Recognition) -> bool {
    rec.top_intent() == Some(INTENT_CREATE_MEETING)
}

fn wants_person_info(_ctx: &DialogueContext, rec: &Recognition) -> bool {
    rec.top_intent() == Some(INTENT_KNOW_WHO)
}

fn said_yes(_ctx: &DialogueContext, rec: &Recognition) -> bool {
    rec.top_intent() == Some(INTENT_YES)
}

fn said_no(_ctx: &DialogueContext, rec: &Recognition) -> bool {
    rec.top_intent() == Some(INTENT_NO)
}

/// True iff the transcript is a grammar key and the confidence clears the
/// inclusive 0.7 threshold
fn confident_grammar_name(_ctx: &DialogueContext, rec: &Recognition) -> bool {
    grammar::is_known(&rec.utterance) && rec.confidence >= CONFIDENCE_THRESHOLD
}

/// Response for a person lookup, covering all confidence branches
fn lookup_response(rec: &Recognition) -> String {
    if confident_grammar_name(&DialogueContext::default(), rec) {
        grammar::response_for(&rec.utterance)
            .unwrap_or(NO_INFO_RESPONSE)
            .to_string()
    } else {
        NOT_CONFIDENT_RESPONSE.to_string()
    }
}

/// Apply one engine event to the active state
///
/// Returns the target state when a transition fires, or `None` when no guard
/// matches (the machine stays where it is; slot-filling states deliberately
/// stall on low-confidence or unknown input).
pub fn handle_event(
    state: DialogueState,
    ctx: &mut DialogueContext,
    event: &EngineEvent,
) -> Option<DialogueState> {
    match (state, event) {
        (DialogueState::Prepare, EngineEvent::Ready) => Some(DialogueState::Start),

        // Speak states advance on completion
        (DialogueState::Start | DialogueState::PromptRetry, EngineEvent::SpeakComplete) => {
            Some(DialogueState::ListenToStart)
        }
        (DialogueState::AskName, EngineEvent::SpeakComplete) => {
            Some(DialogueState::MeetingWithName)
        }
        (DialogueState::GetMeetingDay, EngineEvent::SpeakComplete) => {
            Some(DialogueState::ListenMeetingDay)
        }
        (DialogueState::IsWholeDay, EngineEvent::SpeakComplete) => {
            Some(DialogueState::CheckWholeDay)
        }
        (DialogueState::GetMeetingTime, EngineEvent::SpeakComplete) => {
            Some(DialogueState::ListenMeetingTime)
        }
        (
            DialogueState::ConfirmWholeDayAppointment | DialogueState::ConfirmAppointment,
            EngineEvent::SpeakComplete,
        ) => Some(DialogueState::ListenConfirmation),
        (
            DialogueState::AppointmentCreated | DialogueState::AppointmentNotCreated,
            EngineEvent::SpeakComplete,
        ) => Some(DialogueState::Complete),
        (DialogueState::AskWho, EngineEvent::SpeakComplete) => Some(DialogueState::ListenKnowWho),
        (DialogueState::GivePersonalInfo, EngineEvent::SpeakComplete) => {
            Some(DialogueState::MoreHelp)
        }
        (DialogueState::MoreHelp, EngineEvent::SpeakComplete) => {
            Some(DialogueState::ListenCheckMoreHelp)
        }
        (DialogueState::Complete, EngineEvent::SpeakComplete) => Some(DialogueState::Prepare),

        // Listen states branch on the recognition result
        (DialogueState::ListenToStart, EngineEvent::Recognised(rec)) => {
            if wants_meeting(ctx, rec) {
                ctx.turns += 1;
                Some(DialogueState::AskName)
            } else if wants_person_info(ctx, rec) {
                ctx.turns += 1;
                Some(DialogueState::AskWho)
            } else {
                None
            }
        }
        (DialogueState::MeetingWithName, EngineEvent::Recognised(rec)) => {
            if confident_grammar_name(ctx, rec) {
                ctx.turns += 1;
                ctx.meeting_with_person_name = grammar::person_for(&rec.utterance).to_string();
                Some(DialogueState::GetMeetingDay)
            } else {
                // Stall: no re-prompt path is defined for this state
                None
            }
        }
        (DialogueState::ListenMeetingDay, EngineEvent::Recognised(rec)) => {
            ctx.turns += 1;
            ctx.meeting_date = rec.utterance.to_lowercase();
            Some(DialogueState::IsWholeDay)
        }
        (DialogueState::CheckWholeDay, EngineEvent::Recognised(rec)) => {
            if said_yes(ctx, rec) {
                ctx.turns += 1;
                ctx.whole_day = true;
                Some(DialogueState::ConfirmWholeDayAppointment)
            } else if said_no(ctx, rec) {
                ctx.turns += 1;
                ctx.whole_day = false;
                Some(DialogueState::GetMeetingTime)
            } else {
                None
            }
        }
        (DialogueState::ListenMeetingTime, EngineEvent::Recognised(rec)) => {
            ctx.turns += 1;
            ctx.meeting_time = rec.utterance.to_lowercase();
            Some(DialogueState::ConfirmAppointment)
        }
        (DialogueState::ListenConfirmation, EngineEvent::Recognised(rec)) => {
            if said_yes(ctx, rec) {
                ctx.turns += 1;
                Some(DialogueState::AppointmentCreated)
            } else if said_no(ctx, rec) {
                ctx.turns += 1;
                Some(DialogueState::AppointmentNotCreated)
            } else {
                None
            }
        }
        (DialogueState::ListenKnowWho, EngineEvent::Recognised(rec)) => {
            if confident_grammar_name(ctx, rec) {
                ctx.turns += 1;
                ctx.meeting_with_person_name = grammar::person_for(&rec.utterance).to_string();
                ctx.last_lookup_response = lookup_response(rec);
                Some(DialogueState::GivePersonalInfo)
            } else {
                // Stall, same as MeetingWithName
                None
            }
        }
        (DialogueState::ListenCheckMoreHelp, EngineEvent::Recognised(rec)) => {
            if said_yes(ctx, rec) {
                ctx.turns += 1;
                Some(DialogueState::Prepare)
            } else if said_no(ctx, rec) {
                ctx.turns += 1;
                Some(DialogueState::Complete)
            } else {
                None
            }
        }

        _ => None,
    }
}

/// Apply the menu no-match timeout to the active state
///
/// Only `ListenToStart` defines a timeout edge; every other state ignores it.
#[must_use]
pub fn handle_menu_timeout(state: DialogueState) -> Option<DialogueState> {
    if state.has_menu_timeout() {
        Some(DialogueState::PromptRetry)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognition(utterance: &str, confidence: f32, intents: &[&str]) -> Recognition {
        Recognition {
            utterance: utterance.to_string(),
            confidence,
            intents: intents.iter().map(ToString::to_string).collect(),
            entities: Vec::new(),
        }
    }

    #[test]
    fn ready_signal_enters_start() {
        let mut ctx = DialogueContext::default();
        let next = handle_event(DialogueState::Prepare, &mut ctx, &EngineEvent::Ready);
        assert_eq!(next, Some(DialogueState::Start));
    }

    #[test]
    fn menu_routes_create_meeting_intent_to_ask_name() {
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(recognition(
            "create a meeting",
            0.9,
            &[INTENT_CREATE_MEETING],
        ));
        let next = handle_event(DialogueState::ListenToStart, &mut ctx, &event);
        assert_eq!(next, Some(DialogueState::AskName));
    }

    #[test]
    fn menu_routes_know_who_intent_to_ask_who() {
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(recognition("know who", 0.9, &[INTENT_KNOW_WHO]));
        let next = handle_event(DialogueState::ListenToStart, &mut ctx, &event);
        assert_eq!(next, Some(DialogueState::AskWho));
    }

    #[test]
    fn menu_ignores_unmatched_intent() {
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(recognition("pizza", 0.9, &["order pizza"]));
        assert_eq!(handle_event(DialogueState::ListenToStart, &mut ctx, &event), None);
    }

    #[test]
    fn name_slot_fills_on_confident_grammar_match() {
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(recognition("Vlad", 0.9, &[]));
        let next = handle_event(DialogueState::MeetingWithName, &mut ctx, &event);
        assert_eq!(next, Some(DialogueState::GetMeetingDay));
        assert_eq!(ctx.meeting_with_person_name, "Vladislav Maraev");
    }

    #[test]
    fn name_slot_stalls_below_threshold() {
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(recognition("vlad", 0.5, &[]));
        assert_eq!(handle_event(DialogueState::MeetingWithName, &mut ctx, &event), None);
        assert!(ctx.meeting_with_person_name.is_empty());
    }

    #[test]
    fn name_slot_threshold_is_inclusive() {
        let mut ctx = DialogueContext::default();
        let at_threshold = EngineEvent::Recognised(recognition("vlad", 0.7, &[]));
        assert_eq!(
            handle_event(DialogueState::MeetingWithName, &mut ctx, &at_threshold),
            Some(DialogueState::GetMeetingDay)
        );

        let mut ctx = DialogueContext::default();
        let below = EngineEvent::Recognised(recognition("vlad", 0.699_999, &[]));
        assert_eq!(handle_event(DialogueState::MeetingWithName, &mut ctx, &below), None);
    }

    #[test]
    fn name_slot_stalls_on_unknown_name() {
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(recognition("beethoven", 0.99, &[]));
        assert_eq!(handle_event(DialogueState::MeetingWithName, &mut ctx, &event), None);
    }

    #[test]
    fn day_slot_captures_raw_lowercased_utterance() {
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(recognition("Monday", 0.4, &[]));
        let next = handle_event(DialogueState::ListenMeetingDay, &mut ctx, &event);
        assert_eq!(next, Some(DialogueState::IsWholeDay));
        assert_eq!(ctx.meeting_date, "monday");
    }

    #[test]
    fn whole_day_yes_sets_flag_and_confirms() {
        let mut ctx = DialogueContext {
            meeting_with_person_name: "Vladislav Maraev".to_string(),
            meeting_date: "monday".to_string(),
            ..DialogueContext::default()
        };
        let event = EngineEvent::Recognised(recognition("yes", 0.9, &[INTENT_YES]));
        let next = handle_event(DialogueState::CheckWholeDay, &mut ctx, &event);
        assert_eq!(next, Some(DialogueState::ConfirmWholeDayAppointment));
        assert!(ctx.whole_day);
        assert_eq!(
            confirm_whole_day_sentence(&ctx),
            "Do you want to create an appointment with Vladislav Maraev on monday for the whole day?"
        );
    }

    #[test]
    fn whole_day_no_clears_flag_and_asks_time() {
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(recognition("no", 0.9, &[INTENT_NO]));
        let next = handle_event(DialogueState::CheckWholeDay, &mut ctx, &event);
        assert_eq!(next, Some(DialogueState::GetMeetingTime));
        assert!(!ctx.whole_day);
    }

    #[test]
    fn timed_confirmation_interpolates_all_slots() {
        let ctx = DialogueContext {
            meeting_with_person_name: "Rasmus Blanck".to_string(),
            meeting_date: "tuesday".to_string(),
            meeting_time: "10".to_string(),
            ..DialogueContext::default()
        };
        assert_eq!(
            confirm_timed_sentence(&ctx),
            "Do you want to create an appointment with Rasmus Blanck on tuesday at 10?"
        );
    }

    #[test]
    fn confirmation_yes_creates_appointment() {
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(recognition("yes", 0.9, &[INTENT_YES]));
        assert_eq!(
            handle_event(DialogueState::ListenConfirmation, &mut ctx, &event),
            Some(DialogueState::AppointmentCreated)
        );
    }

    #[test]
    fn confirmation_no_declines_appointment() {
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(recognition("no", 0.9, &[INTENT_NO]));
        assert_eq!(
            handle_event(DialogueState::ListenConfirmation, &mut ctx, &event),
            Some(DialogueState::AppointmentNotCreated)
        );
    }

    #[test]
    fn person_lookup_speaks_canned_response() {
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(recognition("nelson mandela", 0.95, &[]));
        let next = handle_event(DialogueState::ListenKnowWho, &mut ctx, &event);
        assert_eq!(next, Some(DialogueState::GivePersonalInfo));
        assert_eq!(ctx.meeting_with_person_name, "Nelson Mandela");
        assert_eq!(
            personal_info_sentence(&ctx),
            "You asked about Nelson Mandela was South Africa's President."
        );
    }

    #[test]
    fn person_lookup_falls_back_for_known_person_without_response() {
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(recognition("vlad", 0.95, &[]));
        let next = handle_event(DialogueState::ListenKnowWho, &mut ctx, &event);
        assert_eq!(next, Some(DialogueState::GivePersonalInfo));
        assert_eq!(ctx.last_lookup_response, NO_INFO_RESPONSE);
    }

    #[test]
    fn more_help_yes_restarts_session() {
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(recognition("yes", 0.9, &[INTENT_YES]));
        assert_eq!(
            handle_event(DialogueState::ListenCheckMoreHelp, &mut ctx, &event),
            Some(DialogueState::Prepare)
        );
    }

    #[test]
    fn more_help_no_completes_session() {
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(recognition("no", 0.9, &[INTENT_NO]));
        assert_eq!(
            handle_event(DialogueState::ListenCheckMoreHelp, &mut ctx, &event),
            Some(DialogueState::Complete)
        );
    }

    #[test]
    fn menu_timeout_only_fires_in_listen_to_start() {
        assert_eq!(
            handle_menu_timeout(DialogueState::ListenToStart),
            Some(DialogueState::PromptRetry)
        );
        assert_eq!(handle_menu_timeout(DialogueState::MeetingWithName), None);
        assert_eq!(handle_menu_timeout(DialogueState::Prepare), None);
    }

    #[test]
    fn retry_prompt_loops_back_to_listening() {
        let mut ctx = DialogueContext::default();
        assert_eq!(
            handle_event(DialogueState::PromptRetry, &mut ctx, &EngineEvent::SpeakComplete),
            Some(DialogueState::ListenToStart)
        );
    }

    #[test]
    fn terminal_states_route_through_complete_to_prepare() {
        let mut ctx = DialogueContext::default();
        assert_eq!(
            handle_event(DialogueState::AppointmentCreated, &mut ctx, &EngineEvent::SpeakComplete),
            Some(DialogueState::Complete)
        );
        assert_eq!(
            handle_event(DialogueState::Complete, &mut ctx, &EngineEvent::SpeakComplete),
            Some(DialogueState::Prepare)
        );
    }

    #[test]
    fn empty_recognition_propagates_empty_slot() {
        // Missing collaborator data degrades to empty values, which can flow
        // into a later confirmation sentence.
        let mut ctx = DialogueContext::default();
        let event = EngineEvent::Recognised(Recognition::empty());
        let next = handle_event(DialogueState::ListenMeetingDay, &mut ctx, &event);
        assert_eq!(next, Some(DialogueState::IsWholeDay));
        assert_eq!(ctx.meeting_date, "");
        assert_eq!(
            confirm_whole_day_sentence(&ctx),
            "Do you want to create an appointment with  on  for the whole day?"
        );
    }

    #[test]
    fn entry_commands_alternate_speak_and_listen() {
        let ctx = DialogueContext::default();
        assert_eq!(entry_command(DialogueState::Prepare, &ctx), Some(EngineCommand::Prepare));
        assert_eq!(
            entry_command(DialogueState::Start, &ctx),
            Some(EngineCommand::Speak {
                utterance: GREETING_PROMPT.to_string()
            })
        );
        assert_eq!(
            entry_command(DialogueState::ListenToStart, &ctx),
            Some(EngineCommand::Listen { nlu: true })
        );
    }
}
