//! `RECORD FILE`, per spec §4.5's "recording" verb.
use super::{AGICommand, CommandError};
use crate::response::Response;

/// Record audio to `filename.format`, stopping on silence, `escape_digits`,
/// or `timeout_ms` (`-1` for unlimited).
#[derive(Debug)]
pub struct RecordFile {
    pub filename: String,
    pub format: String,
    pub escape_digits: String,
    pub timeout_ms: i64,
    pub offset: Option<i64>,
    pub beep: bool,
    pub silence_secs: Option<u32>,
}
impl std::fmt::Display for RecordFile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "RECORD FILE {} {} \"{}\" {}",
            self.filename, self.format, self.escape_digits, self.timeout_ms
        )?;
        if let Some(offset) = self.offset {
            write!(f, " {offset}")?;
        }
        if self.beep {
            write!(f, " BEEP")?;
        }
        if let Some(silence) = self.silence_secs {
            write!(f, " s={silence}")?;
        }
        writeln!(f)
    }
}
impl AGICommand for RecordFile {
    type Response = RecordResult;
}

/// The digit (if any) that stopped recording, the final position, and
/// whether recording ended in a timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordResult {
    pub digit: Option<String>,
    pub endpos: i64,
    pub timeout: bool,
}
impl TryFrom<Response> for RecordResult {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        if response.result < 0 {
            return Err(CommandError {
                response_to_command: "RECORD FILE",
                result: response.result,
                detail: None,
            });
        }
        Ok(RecordResult {
            digit: if response.result == 0 {
                None
            } else {
                response.arguments.char("result")
            },
            endpos: response.arguments.number("endpos"),
            timeout: response.arguments.boolean("timeout"),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::response::{ParsedLine, ResponseParser};

    #[test]
    fn formats_without_optional_flags() {
        let cmd = RecordFile {
            filename: "msg".to_owned(),
            format: "wav".to_owned(),
            escape_digits: "#".to_owned(),
            timeout_ms: -1,
            offset: None,
            beep: false,
            silence_secs: None,
        };
        assert_eq!(cmd.to_string(), "RECORD FILE msg wav \"#\" -1\n");
    }

    #[test]
    fn formats_with_beep_and_silence() {
        let cmd = RecordFile {
            filename: "msg".to_owned(),
            format: "wav".to_owned(),
            escape_digits: "#".to_owned(),
            timeout_ms: 10000,
            offset: None,
            beep: true,
            silence_secs: Some(3),
        };
        assert_eq!(
            cmd.to_string(),
            "RECORD FILE msg wav \"#\" 10000 BEEP s=3\n"
        );
    }

    #[test]
    fn parses_timeout_flag() {
        let ParsedLine::Response(response) =
            ResponseParser::parse("200 result=0 endpos=24000 (timeout)\n").unwrap()
        else {
            panic!("expected response")
        };
        let result = RecordResult::try_from(response).unwrap();
        assert!(result.timeout);
        assert_eq!(result.endpos, 24000);
    }
}
