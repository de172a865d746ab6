//! Playback verbs (`STREAM FILE`, `GET OPTION`, the `SAY …` family), per spec
//! §4.5's "playback" group: on success, return the interrupting digit (if
//! any) and the end position.
use super::{AGICommand, CommandError};
use crate::response::Response;

/// The shared outcome of every playback verb: the DTMF digit that
/// interrupted playback (if any, as its ASCII character) and the position
/// (in milliseconds) playback reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackResult {
    pub digit: Option<String>,
    pub endpos: i64,
}
impl TryFrom<Response> for PlaybackResult {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        if response.result < 0 {
            return Err(CommandError {
                response_to_command: "playback",
                result: response.result,
                detail: None,
            });
        }
        let digit = if response.result == 0 {
            None
        } else {
            response.arguments.char("result")
        };
        Ok(PlaybackResult {
            digit,
            endpos: response.arguments.number("endpos"),
        })
    }
}

macro_rules! playback_command {
    ($name:ident, $fmt:expr) => {
        #[derive(Debug)]
        pub struct $name {
            pub filename: String,
            pub escape_digits: String,
            pub offset: Option<i64>,
        }
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                #[allow(unused_variables)]
                let this = self;
                write!(f, "{}", $fmt(this))
            }
        }
        impl AGICommand for $name {
            type Response = PlaybackResult;
        }
    };
}

playback_command!(StreamFile, |this: &StreamFile| match this.offset {
    Some(offset) => format!(
        "STREAM FILE {} \"{}\" {offset}\n",
        this.filename, this.escape_digits
    ),
    None => format!("STREAM FILE {} \"{}\"\n", this.filename, this.escape_digits),
});

playback_command!(SayAlpha, |this: &SayAlpha| format!(
    "SAY ALPHA {} \"{}\"\n",
    this.filename, this.escape_digits
));
playback_command!(SayDigits, |this: &SayDigits| format!(
    "SAY DIGITS {} \"{}\"\n",
    this.filename, this.escape_digits
));
playback_command!(SayNumber, |this: &SayNumber| format!(
    "SAY NUMBER {} \"{}\"\n",
    this.filename, this.escape_digits
));
playback_command!(SayPhonetic, |this: &SayPhonetic| format!(
    "SAY PHONETIC {} \"{}\"\n",
    this.filename, this.escape_digits
));
playback_command!(SayDate, |this: &SayDate| format!(
    "SAY DATE {} \"{}\"\n",
    this.filename, this.escape_digits
));
playback_command!(SayTime, |this: &SayTime| format!(
    "SAY TIME {} \"{}\"\n",
    this.filename, this.escape_digits
));
playback_command!(SayDateTime, |this: &SayDateTime| format!(
    "SAY DATETIME {} \"{}\"\n",
    this.filename, this.escape_digits
));

/// `GET OPTION`: stream a file and wait for one of `escape_digits`, with an
/// explicit per-call timeout in seconds.
#[derive(Debug)]
pub struct GetOption {
    pub filename: String,
    pub escape_digits: String,
    pub timeout_secs: Option<u32>,
}
impl std::fmt::Display for GetOption {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.timeout_secs {
            Some(timeout) => writeln!(
                f,
                "GET OPTION {} \"{}\" {timeout}",
                self.filename, self.escape_digits
            ),
            None => writeln!(f, "GET OPTION {} \"{}\"", self.filename, self.escape_digits),
        }
    }
}
impl AGICommand for GetOption {
    type Response = PlaybackResult;
}

/// `STREAM FILE`, additionally requiring `PLAYBACKSTATUS == SUCCESS` afterward,
/// per spec §4.5 ("streamFile additionally reads PLAYBACKSTATUS via getVariable
/// and requires SUCCESS").
pub async fn stream_file(
    channel: &crate::channel::Channel,
    cmd: StreamFile,
) -> Result<PlaybackResult, crate::error::AgiError> {
    let result = channel.send(cmd).await?;
    let status = channel
        .send(super::GetVariable::new("PLAYBACKSTATUS".to_owned()))
        .await;
    match status {
        Ok(v) if v.value == "SUCCESS" => Ok(result),
        Ok(v) => Err(crate::error::AgiError::CommandRejected {
            command: "STREAM FILE".to_owned(),
            reason: format!("PLAYBACKSTATUS was {:?}, expected SUCCESS", v.value),
        }),
        Err(_) => Err(crate::error::AgiError::CommandRejected {
            command: "STREAM FILE".to_owned(),
            reason: "PLAYBACKSTATUS was not set".to_owned(),
        }),
    }
}
