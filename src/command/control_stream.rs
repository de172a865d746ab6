//! `CONTROL STREAM FILE`, per spec §4.5's "control stream" verb: stream a
//! file with rewind/fast-forward/pause keys, then read `CPLAYBACKSTATUS` and
//! `CPLAYBACKOFFSET` back via `GET VARIABLE`.
use super::{AGICommand, CommandError};
use crate::channel::Channel;
use crate::error::AgiError;
use crate::response::Response;

/// `CONTROL STREAM FILE filename escape_digits [skipms] [ffchar] [rewchar] [pausechar]`,
/// the wire command only; see [`control_stream_file`] for the full
/// operation including the status read-back.
#[derive(Debug)]
pub struct ControlStreamFile {
    pub filename: String,
    pub escape_digits: String,
    pub skip_ms: Option<i64>,
    pub forward_char: Option<char>,
    pub rewind_char: Option<char>,
    pub pause_char: Option<char>,
}
impl std::fmt::Display for ControlStreamFile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "CONTROL STREAM FILE {} \"{}\"",
            self.filename, self.escape_digits
        )?;
        if self.forward_char.is_some() || self.rewind_char.is_some() || self.pause_char.is_some() {
            write!(f, " {}", self.skip_ms.unwrap_or(0))?;
        } else if let Some(skip_ms) = self.skip_ms {
            write!(f, " {skip_ms}")?;
        }
        if let Some(c) = self.forward_char {
            write!(f, " {c}")?;
        }
        if let Some(c) = self.rewind_char {
            write!(f, " {c}")?;
        }
        if let Some(c) = self.pause_char {
            write!(f, " {c}")?;
        }
        writeln!(f)
    }
}
impl AGICommand for ControlStreamFile {
    type Response = ControlStreamResult;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlStreamResult {
    pub digit: Option<String>,
}
impl TryFrom<Response> for ControlStreamResult {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        if response.result < 0 {
            return Err(CommandError {
                response_to_command: "CONTROL STREAM FILE",
                result: response.result,
                detail: None,
            });
        }
        Ok(ControlStreamResult {
            digit: if response.result == 0 {
                None
            } else {
                response.arguments.char("result")
            },
        })
    }
}

/// The outcome Asterisk reports via the `CPLAYBACKSTATUS` channel variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Success,
    Failed,
    RemoteStopped,
}
impl PlaybackStatus {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "SUCCESS" => PlaybackStatus::Success,
            "FAILED" => PlaybackStatus::Failed,
            "REMOTESTOPPED" => PlaybackStatus::RemoteStopped,
            _ => return None,
        })
    }
}

/// The final state of a controlled playback: status plus the stream offset
/// (in milliseconds) playback stopped at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPlaybackOutcome {
    pub status: PlaybackStatus,
    pub offset_ms: i64,
}

/// Issue `CONTROL STREAM FILE`, then read `CPLAYBACKSTATUS`/`CPLAYBACKOFFSET`
/// and map them to [`ControlPlaybackOutcome`].
pub async fn control_stream_file(
    channel: &Channel,
    cmd: ControlStreamFile,
) -> Result<ControlPlaybackOutcome, AgiError> {
    channel.send(cmd).await?;
    let status = channel
        .send(super::GetVariable::new("CPLAYBACKSTATUS".to_owned()))
        .await?;
    let status = PlaybackStatus::parse(&status.value).ok_or_else(|| AgiError::CommandRejected {
        command: "CONTROL STREAM FILE".to_owned(),
        reason: format!("unrecognized CPLAYBACKSTATUS {:?}", status.value),
    })?;
    let offset = channel
        .send(super::GetVariable::new("CPLAYBACKOFFSET".to_owned()))
        .await?;
    let offset_ms = offset
        .value
        .parse()
        .map_err(|_| AgiError::CommandRejected {
            command: "CONTROL STREAM FILE".to_owned(),
            reason: format!("CPLAYBACKOFFSET was not a number: {:?}", offset.value),
        })?;
    Ok(ControlPlaybackOutcome { status, offset_ms })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::response::{ParsedLine, ResponseParser};

    fn response(line: &str) -> Response {
        let ParsedLine::Response(response) = ResponseParser::parse(line).unwrap() else {
            panic!("expected response")
        };
        response
    }

    #[test]
    fn formats_without_controls() {
        let cmd = ControlStreamFile {
            filename: "welcome".to_owned(),
            escape_digits: "#".to_owned(),
            skip_ms: None,
            forward_char: None,
            rewind_char: None,
            pause_char: None,
        };
        assert_eq!(cmd.to_string(), "CONTROL STREAM FILE welcome \"#\"\n");
    }

    #[test]
    fn formats_with_controls() {
        let cmd = ControlStreamFile {
            filename: "welcome".to_owned(),
            escape_digits: "#".to_owned(),
            skip_ms: Some(3000),
            forward_char: Some('*'),
            rewind_char: Some('0'),
            pause_char: None,
        };
        assert_eq!(
            cmd.to_string(),
            "CONTROL STREAM FILE welcome \"#\" 3000 * 0\n"
        );
    }

    #[test]
    fn parses_known_status() {
        assert_eq!(
            PlaybackStatus::parse("SUCCESS"),
            Some(PlaybackStatus::Success)
        );
        assert_eq!(PlaybackStatus::parse("BOGUS"), None);
    }

    #[test]
    fn no_digit_when_result_zero() {
        let result = ControlStreamResult::try_from(response("200 result=0\n")).unwrap();
        assert_eq!(result.digit, None);
    }
}
