//! Defines the `VERBOSE` AGI command.
//!
//! Grounded on the teacher's module of the same name.
use super::{expect_result, AGICommand, CommandError};
use crate::response::Response;

/// Send `content` to Asterisk's verbose/debug log.
#[derive(Debug)]
pub struct Verbose {
    content: String,
}
impl Verbose {
    pub fn new(message: String) -> Self {
        Self { content: message }
    }
}
impl std::fmt::Display for Verbose {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "VERBOSE \"{}\"", self.content)
    }
}
impl AGICommand for Verbose {
    type Response = VerboseResponse;
}

#[derive(Debug, PartialEq, Eq)]
pub struct VerboseResponse;
impl TryFrom<Response> for VerboseResponse {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        expect_result(&response, "VERBOSE", 1).map(|()| VerboseResponse)
    }
}
