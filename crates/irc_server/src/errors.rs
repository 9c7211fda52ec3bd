use thiserror::Error;

/// Errors raised while parsing a single wire line into a [`crate::message::Message`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("empty line")]
    Empty,
    #[error("missing command")]
    MissingCommand,
}

/// Errors raised while parsing a channel `MODE` string (`(+|-)<letters> [args...]`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    #[error("mode string '{0}' has no leading +/-")]
    MissingSign(String),
    #[error("mode letter '{0}' requires an argument that was not supplied")]
    MissingArgument(char),
    #[error("unknown mode letter '{0}'")]
    UnknownLetter(char),
}

/// Internal server invariants that should never be violated by correct dispatch code.
///
/// These never reach a client directly; callers log them and recover defensively rather
/// than unwind, since no per-connection error may terminate the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrcError {
    #[error("parsing error: {0}")]
    Parsing(String),
    #[error("fd {0} has no associated user")]
    UnknownUser(i32),
    #[error("channel '{0}' does not exist")]
    UnknownChannel(String),
}
