use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const PREFIX: &str = "~M";
const LINE_END: &str = "\r\n";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("command must start with `~M`: {0:?}")]
    MissingPrefix(String),
    #[error("command code must be digits: {0:?}")]
    InvalidCode(String),
    #[error("invalid command argument: {0:?}")]
    InvalidArgument(String),
}

/// A single `~M<code>[ <argument>]` command.
///
/// Commands are immutable once built; the argument is free text but never
/// empty and never contains a line break, so a command always encodes to
/// exactly one wire line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    code: u32,
    argument: Option<String>,
}

impl Command {
    pub fn new(code: u32) -> Self {
        Self { code, argument: None }
    }

    pub fn with_argument(self, argument: &str) -> Result<Self, CommandError> {
        if argument.is_empty() || argument.contains(['\r', '\n']) {
            return Err(CommandError::InvalidArgument(argument.to_string()));
        }
        Ok(Self {
            code: self.code,
            argument: Some(argument.to_string()),
        })
    }

    /// `~M601 S1`: switches the controller into the mode that answers
    /// status queries. Sent before every query.
    pub fn mode_switch() -> Self {
        Self::known(601, Some("S1"))
    }

    /// `~M115`: machine information.
    pub fn info_query() -> Self {
        Self::known(115, None)
    }

    /// `~M27 C`: print progress by bytes and layers.
    pub fn progress_query() -> Self {
        Self::known(27, Some("C"))
    }

    fn known(code: u32, argument: Option<&str>) -> Self {
        Self {
            code,
            argument: argument.map(str::to_string),
        }
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// The command as sent on the wire, CRLF terminated.
    pub fn to_wire(&self) -> String {
        format!("{self}{LINE_END}")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(argument) => write!(f, "{PREFIX}{} {argument}", self.code),
            None => write!(f, "{PREFIX}{}", self.code),
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| CommandError::MissingPrefix(s.to_string()))?;
        let (digits, argument) = match body.split_once(' ') {
            Some((digits, argument)) => (digits, Some(argument)),
            None => (body, None),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CommandError::InvalidCode(digits.to_string()));
        }
        let code = digits
            .parse()
            .map_err(|_| CommandError::InvalidCode(digits.to_string()))?;
        let command = Command::new(code);
        match argument {
            Some(argument) => command.with_argument(argument),
            None => Ok(command),
        }
    }
}
