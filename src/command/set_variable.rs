//! Defines the `SET VARIABLE` AGI command.
//!
//! Grounded on the teacher's module of the same name.
use super::{expect_result, AGICommand, CommandError};
use crate::response::Response;

/// Set `var_name` to `value` on the current channel.
#[derive(Debug)]
pub struct SetVariable {
    var_name: String,
    value: String,
}
impl SetVariable {
    pub fn new(var_name: String, value: String) -> Self {
        Self { var_name, value }
    }
}
impl std::fmt::Display for SetVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "SET VARIABLE \"{}\" \"{}\"", self.var_name, self.value)
    }
}
impl AGICommand for SetVariable {
    type Response = SetVariableResponse;
}

/// There is only one acceptable response: `200 result=1`.
#[derive(Debug, PartialEq, Eq)]
pub struct SetVariableResponse;
impl TryFrom<Response> for SetVariableResponse {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        expect_result(&response, "SET VARIABLE", 1).map(|()| SetVariableResponse)
    }
}
