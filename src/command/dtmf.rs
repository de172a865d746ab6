//! DTMF collection verbs (`WAIT FOR DIGIT`, `RECEIVE CHAR`, `RECEIVE TEXT`,
//! `GET DATA`), plus the composite multi-digit collector of spec §4.5.1.
use super::{AGICommand, CommandError};
use crate::channel::Channel;
use crate::error::AgiError;
use crate::response::Response;
use std::time::{Duration, Instant};

/// Wait up to `timeout_ms` for a single DTMF key press. The verb itself
/// takes its timeout in seconds, rounded up so a sub-second request still
/// waits at least one second.
#[derive(Debug)]
pub struct WaitForDigit {
    pub timeout_ms: u64,
}
impl std::fmt::Display for WaitForDigit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let timeout_secs = self.timeout_ms.div_ceil(1000);
        writeln!(f, "WAIT FOR DIGIT {timeout_secs}")
    }
}
impl AGICommand for WaitForDigit {
    type Response = DigitResult;
}

/// Read a single character, interrupting any currently-streaming file.
#[derive(Debug)]
pub struct ReceiveChar {
    pub timeout_ms: u64,
}
impl std::fmt::Display for ReceiveChar {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "RECEIVE CHAR {}", self.timeout_ms)
    }
}
impl AGICommand for ReceiveChar {
    type Response = DigitResult;
}

/// The outcome shared by `WAIT FOR DIGIT` and `RECEIVE CHAR`: the digit
/// pressed, if any, and whether the call timed out (§4.5: "a timeout boolean
/// derived from the presence of the `(timeout)` flag in arguments").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitResult {
    pub digit: Option<String>,
    pub timeout: bool,
}
impl TryFrom<Response> for DigitResult {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        if response.result < 0 {
            return Err(CommandError {
                response_to_command: "DTMF collection",
                result: response.result,
                detail: None,
            });
        }
        Ok(DigitResult {
            digit: if response.result == 0 {
                None
            } else {
                response.arguments.char("result")
            },
            timeout: response.arguments.boolean("timeout"),
        })
    }
}

/// Read up to `max_length` characters of text over a modem/TTY-style channel.
#[derive(Debug)]
pub struct ReceiveText {
    pub timeout_secs: u32,
}
impl std::fmt::Display for ReceiveText {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "RECEIVE TEXT {}", self.timeout_secs)
    }
}
impl AGICommand for ReceiveText {
    type Response = TextResult;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResult {
    pub text: String,
    pub timeout: bool,
}
impl TryFrom<Response> for TextResult {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        if response.result < 0 {
            return Err(CommandError {
                response_to_command: "RECEIVE TEXT",
                result: response.result,
                detail: None,
            });
        }
        Ok(TextResult {
            text: response.arguments.nokey().unwrap_or_default().to_owned(),
            timeout: response.arguments.boolean("timeout"),
        })
    }
}

/// The native `GET DATA` verb: collect up to `max_digits` with a single
/// total timeout. Used directly in simple mode; composed by [`get_data`]
/// in composite mode.
#[derive(Debug)]
pub struct GetData {
    pub sound_file: String,
    pub total_timeout_ms: u64,
    pub max_digits: Option<u32>,
}
impl std::fmt::Display for GetData {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.max_digits {
            Some(max_digits) => writeln!(
                f,
                "GET DATA {} {} {max_digits}",
                self.sound_file, self.total_timeout_ms
            ),
            None => writeln!(f, "GET DATA {} {}", self.sound_file, self.total_timeout_ms),
        }
    }
}
impl AGICommand for GetData {
    type Response = GetDataResult;
}

/// The outcome of digit collection: everything gathered so far, and whether
/// the collection ended in a timeout with *zero* digits collected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GetDataResult {
    pub digits: String,
    pub timeout: bool,
}
impl TryFrom<Response> for GetDataResult {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        if response.result < 0 {
            return Err(CommandError {
                response_to_command: "GET DATA",
                result: response.result,
                detail: None,
            });
        }
        Ok(GetDataResult {
            digits: response.arguments.nokey().unwrap_or_default().to_owned(),
            timeout: response.arguments.boolean("timeout"),
        })
    }
}

/// `getData`, spec §4.5.1: simple mode delegates straight to the native
/// `GET DATA` verb; composite mode (`max_digits > 1` and an explicit
/// `inter_digit_timeout_ms`) builds an inter-digit timeout from
/// `STREAM FILE` + repeated `WAIT FOR DIGIT`, since native `GET DATA` cannot
/// express that distinction.
pub async fn get_data(
    channel: &Channel,
    sound_file: &str,
    total_timeout_ms: u64,
    max_digits: Option<u32>,
    inter_digit_timeout_ms: Option<u64>,
) -> Result<GetDataResult, AgiError> {
    let (Some(max_digits), Some(inter_digit_timeout_ms)) = (max_digits, inter_digit_timeout_ms)
    else {
        return channel
            .send(GetData {
                sound_file: sound_file.to_owned(),
                total_timeout_ms,
                max_digits,
            })
            .await;
    };
    if max_digits <= 1 {
        return channel
            .send(GetData {
                sound_file: sound_file.to_owned(),
                total_timeout_ms,
                max_digits: Some(max_digits),
            })
            .await;
    }

    let mut digits = String::new();

    let played = channel
        .send(super::StreamFile {
            filename: sound_file.to_owned(),
            escape_digits: "0123456789*#".to_owned(),
            offset: None,
        })
        .await?;
    if let Some(digit) = played.digit {
        digits.push_str(&digit);
    }
    if digits.chars().count() >= max_digits as usize {
        return Ok(GetDataResult {
            digits,
            timeout: false,
        });
    }

    let deadline = Instant::now() + Duration::from_millis(total_timeout_ms);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            let timeout = digits.is_empty();
            return Ok(GetDataResult { digits, timeout });
        }
        let per_call_timeout_ms = inter_digit_timeout_ms.min(remaining.as_millis() as u64);
        let result = channel
            .send(WaitForDigit {
                timeout_ms: per_call_timeout_ms,
            })
            .await?;
        match result.digit {
            None => {
                let timeout = digits.is_empty();
                return Ok(GetDataResult { digits, timeout });
            }
            Some(digit) => {
                digits.push_str(&digit);
                if digits.chars().count() >= max_digits as usize {
                    return Ok(GetDataResult {
                        digits,
                        timeout: false,
                    });
                }
            }
        }
    }
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
    fn wait_for_digit_formats_timeout_in_seconds() {
        assert_eq!(
            WaitForDigit { timeout_ms: 5000 }.to_string(),
            "WAIT FOR DIGIT 5\n"
        );
    }

    #[test]
    fn wait_for_digit_rounds_sub_second_timeout_up() {
        assert_eq!(
            WaitForDigit { timeout_ms: 2500 }.to_string(),
            "WAIT FOR DIGIT 3\n"
        );
        assert_eq!(
            WaitForDigit { timeout_ms: 1 }.to_string(),
            "WAIT FOR DIGIT 1\n"
        );
    }

    #[test]
    fn get_data_formats_with_and_without_max_digits() {
        assert_eq!(
            GetData {
                sound_file: "prompt".to_owned(),
                total_timeout_ms: 10000,
                max_digits: None,
            }
            .to_string(),
            "GET DATA prompt 10000\n"
        );
        assert_eq!(
            GetData {
                sound_file: "prompt".to_owned(),
                total_timeout_ms: 10000,
                max_digits: Some(4),
            }
            .to_string(),
            "GET DATA prompt 10000 4\n"
        );
    }

    #[test]
    fn digit_result_zero_is_no_digit() {
        let result = DigitResult::try_from(response("200 result=0 (timeout)\n")).unwrap();
        assert_eq!(result.digit, None);
        assert!(result.timeout);
    }

    #[test]
    fn digit_result_nonzero_is_ascii_char() {
        let result = DigitResult::try_from(response("200 result=53\n")).unwrap();
        assert_eq!(result.digit.as_deref(), Some("5"));
    }
}
