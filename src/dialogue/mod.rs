//! Dialogue module
//!
//! The state machine, its conversational context, and the grammar table.
//! The machine itself is pure; the session loop in `session.rs` feeds it
//! engine events and executes its entry commands.

pub mod grammar;
mod machine;

pub use machine::{
    ASK_DAY_PROMPT, ASK_NAME_PROMPT, ASK_TIME_PROMPT, ASK_WHO_PROMPT, ASK_WHOLE_DAY_PROMPT,
    CLOSING_PROMPT, CONFIDENCE_THRESHOLD, CREATED_PROMPT, DialogueContext, DialogueState,
    GREETING_PROMPT, INTENT_CREATE_MEETING, INTENT_KNOW_WHO, INTENT_NO, INTENT_YES, MENU_TIMEOUT,
    MORE_HELP_PROMPT, NO_INFO_RESPONSE, NOT_CONFIDENT_RESPONSE, NOT_CREATED_PROMPT, RETRY_PROMPT,
    confirm_timed_sentence, confirm_whole_day_sentence, entry_command, handle_event,
    handle_menu_timeout, personal_info_sentence,
};
