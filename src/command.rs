//! The command library: one operation per AGI verb, plus the shared types
//! every verb module builds on.
//!
//! Grounded on the teacher's `AGICommand`/`InnerAGIResponse`/`AGIStatusParseError`
//! triad (`src/command.rs`), generalized from the teacher's
//! `TryFrom<(&str, Option<&str>)>` (a single result token plus one
//! "operational data" token) to `TryFrom<Response>` (the full ordered
//! argument bag from [`crate::response`]), since verbs here read more than
//! one named argument (`CPLAYBACKSTATUS`, `DIALSTATUS`, `endpos`, ...).
use crate::response::Response;

pub mod assertive;
pub mod break_cmd;
pub mod channel_status;
pub mod control_stream;
pub mod database;
pub mod dial;
pub mod dtmf;
pub mod get_full_variable;
pub mod get_variable;
pub mod playback;
pub mod raw_command;
pub mod record;
pub mod set_variable;
pub mod verbose;

pub use assertive::{
    Answer, GoSub, Hangup, Noop, SendImage, SendText, SetAutoHangup, SetContext, SetExtension,
    SetMusic, SetPriority, TddMode,
};
pub use break_cmd::Break;
pub use channel_status::{AsteriskChannelState, ChannelStatus};
pub use control_stream::{ControlStreamFile, PlaybackStatus};
pub use database::{DatabaseDel, DatabaseDelTree, DatabaseGet, DatabasePut};
pub use dial::{Dial, DialStatus};
pub use dtmf::{get_data, GetData, GetDataResult, ReceiveChar, ReceiveText, WaitForDigit};
pub use get_full_variable::GetFullVariable;
pub use get_variable::GetVariable;
pub use playback::{
    GetOption, SayAlpha, SayDate, SayDateTime, SayDigits, SayNumber, SayPhonetic, SayTime,
    StreamFile,
};
pub use raw_command::RawCommand;
pub use record::RecordFile;
pub use set_variable::SetVariable;
pub use verbose::Verbose;

/// A command whose leading verb was answered with `200` but whose `result`
/// (or some other expected field) was not what the verb considers success.
#[derive(Debug, PartialEq)]
pub struct CommandError {
    pub(crate) response_to_command: &'static str,
    pub(crate) result: i64,
    pub(crate) detail: Option<String>,
}
impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.detail {
            Some(d) => write!(
                f,
                "{} returned an unexpected result {} ({d})",
                self.response_to_command, self.result
            ),
            None => write!(
                f,
                "{} returned an unexpected result {}",
                self.response_to_command, self.result
            ),
        }
    }
}
impl std::error::Error for CommandError {}

/// A value that can be formatted as an AGI verb and whose `200` response
/// parses into a verb-specific [`AGICommand::Response`].
pub trait AGICommand: std::fmt::Display + std::fmt::Debug + Send + Sync {
    type Response: TryFrom<Response, Error = CommandError>;
}

/// A single DTMF key, including `*` and `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Characters {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Star,
    Pound,
}

/// A single DTMF digit (no `*`/`#`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digit {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
}
impl From<Digit> for Characters {
    fn from(d: Digit) -> Self {
        match d {
            Digit::Zero => Characters::Zero,
            Digit::One => Characters::One,
            Digit::Two => Characters::Two,
            Digit::Three => Characters::Three,
            Digit::Four => Characters::Four,
            Digit::Five => Characters::Five,
            Digit::Six => Characters::Six,
            Digit::Seven => Characters::Seven,
            Digit::Eight => Characters::Eight,
            Digit::Nine => Characters::Nine,
        }
    }
}

impl Characters {
    /// Parse a single ASCII DTMF character as sent by Asterisk.
    pub fn from_ascii(c: char) -> Option<Self> {
        Some(match c {
            '0' => Characters::Zero,
            '1' => Characters::One,
            '2' => Characters::Two,
            '3' => Characters::Three,
            '4' => Characters::Four,
            '5' => Characters::Five,
            '6' => Characters::Six,
            '7' => Characters::Seven,
            '8' => Characters::Eight,
            '9' => Characters::Nine,
            '*' => Characters::Star,
            '#' => Characters::Pound,
            _ => return None,
        })
    }
}

/// A verb whose only failure mode is `result != expected` reports it this way.
pub(crate) fn expect_result(
    response: &Response,
    response_to_command: &'static str,
    expected: i64,
) -> Result<(), CommandError> {
    if response.result == expected {
        Ok(())
    } else {
        Err(CommandError {
            response_to_command,
            result: response.result,
            detail: None,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn digit_converts_into_characters() {
        assert_eq!(Characters::from(Digit::Seven), Characters::Seven);
    }

    #[test]
    fn ascii_star_and_pound_parse() {
        assert_eq!(Characters::from_ascii('*'), Some(Characters::Star));
        assert_eq!(Characters::from_ascii('#'), Some(Characters::Pound));
        assert_eq!(Characters::from_ascii('x'), None);
    }
}
