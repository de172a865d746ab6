//! Defines the `GET VARIABLE` AGI command.
//!
//! Grounded on the teacher's `GetFullVariable` (`src/command/get_full_variable.rs`):
//! same quoted-argument formatting, same "`result` selects success vs.
//! not-set" interpretation, narrowed to the getter pattern of spec §4.5
//! ("success requires `result == 1`; value is read via `arguments.nokey()`").
use super::{AGICommand, CommandError};
use crate::response::Response;

/// The `GET VARIABLE` command: read a channel variable by name.
#[derive(Debug)]
pub struct GetVariable {
    pub name: String,
}
impl GetVariable {
    pub fn new(name: String) -> Self {
        Self { name }
    }
}
impl std::fmt::Display for GetVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "GET VARIABLE {}", self.name)
    }
}
impl AGICommand for GetVariable {
    type Response = GetVariableResponse;
}

/// The value of a successfully-read variable.
#[derive(Debug, PartialEq, Eq)]
pub struct GetVariableResponse {
    pub value: String,
}
impl TryFrom<Response> for GetVariableResponse {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        match response.result {
            1 => Ok(GetVariableResponse {
                value: response.arguments.nokey().unwrap_or_default().to_owned(),
            }),
            _ => Err(CommandError {
                response_to_command: "GET VARIABLE",
                result: response.result,
                detail: Some("variable not set".to_owned()),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::response::ResponseParser;

    #[test]
    fn formats_bare_name() {
        assert_eq!(
            GetVariable::new("FOO".to_owned()).to_string(),
            "GET VARIABLE FOO\n"
        );
    }

    #[test]
    fn parses_set_variable() {
        let crate::response::ParsedLine::Response(response) =
            ResponseParser::parse("200 result=1 (bar)\n").unwrap()
        else {
            panic!("expected response")
        };
        assert_eq!(
            GetVariableResponse::try_from(response).unwrap(),
            GetVariableResponse {
                value: "bar".to_owned()
            }
        );
    }

    #[test]
    fn unset_variable_is_an_error() {
        let crate::response::ParsedLine::Response(response) =
            ResponseParser::parse("200 result=0\n").unwrap()
        else {
            panic!("expected response")
        };
        assert!(GetVariableResponse::try_from(response).is_err());
    }
}
