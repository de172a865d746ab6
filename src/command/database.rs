//! The `DATABASE GET`/`PUT`/`DEL`/`DELTREE` verbs, per spec §4.5's "database
//! mutators" group.
use super::{expect_result, AGICommand, CommandError};
use crate::response::Response;

/// Read a value from the Asterisk database.
#[derive(Debug)]
pub struct DatabaseGet {
    pub family: String,
    pub key: String,
}
impl std::fmt::Display for DatabaseGet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "DATABASE GET {} {}", self.family, self.key)
    }
}
impl AGICommand for DatabaseGet {
    type Response = DatabaseGetResponse;
}

#[derive(Debug, PartialEq, Eq)]
pub struct DatabaseGetResponse {
    pub value: String,
}
impl TryFrom<Response> for DatabaseGetResponse {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        match response.result {
            1 => Ok(DatabaseGetResponse {
                value: response.arguments.nokey().unwrap_or_default().to_owned(),
            }),
            other => Err(CommandError {
                response_to_command: "DATABASE GET",
                result: other,
                detail: Some("key not found".to_owned()),
            }),
        }
    }
}

/// Write `value` under `family`/`key`.
#[derive(Debug)]
pub struct DatabasePut {
    pub family: String,
    pub key: String,
    pub value: String,
}
impl std::fmt::Display for DatabasePut {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(
            f,
            "DATABASE PUT {} {} {}",
            self.family, self.key, self.value
        )
    }
}
impl AGICommand for DatabasePut {
    type Response = DatabasePutResponse;
}

#[derive(Debug, PartialEq, Eq)]
pub struct DatabasePutResponse;
impl TryFrom<Response> for DatabasePutResponse {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        expect_result(&response, "DATABASE PUT", 1).map(|()| DatabasePutResponse)
    }
}

/// Delete a single `family`/`key` entry.
#[derive(Debug)]
pub struct DatabaseDel {
    pub family: String,
    pub key: String,
}
impl std::fmt::Display for DatabaseDel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "DATABASE DEL {} {}", self.family, self.key)
    }
}
impl AGICommand for DatabaseDel {
    type Response = DatabaseDelResponse;
}

#[derive(Debug, PartialEq, Eq)]
pub struct DatabaseDelResponse;
impl TryFrom<Response> for DatabaseDelResponse {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        expect_result(&response, "DATABASE DEL", 1).map(|()| DatabaseDelResponse)
    }
}

/// Delete an entire family, or a subtree under `family`/`key_tree`.
#[derive(Debug)]
pub struct DatabaseDelTree {
    pub family: String,
    pub key_tree: Option<String>,
}
impl std::fmt::Display for DatabaseDelTree {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.key_tree {
            Some(key_tree) => writeln!(f, "DATABASE DELTREE {} {key_tree}", self.family),
            None => writeln!(f, "DATABASE DELTREE {}", self.family),
        }
    }
}
impl AGICommand for DatabaseDelTree {
    type Response = DatabaseDelTreeResponse;
}

/// Whether the tree existed (and was deleted).
#[derive(Debug, PartialEq, Eq)]
pub struct DatabaseDelTreeResponse {
    pub existed: bool,
}
impl TryFrom<Response> for DatabaseDelTreeResponse {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        Ok(DatabaseDelTreeResponse {
            existed: response.result == 1,
        })
    }
}
