//! Wire-format `Message` and its parser.
//!
//! ```text
//! message = [ ":" prefix SPACE ] command [ params ] crlf
//! params  = *14( SPACE middle ) [ SPACE ":" trailing ]
//! ```
//!
//! The core only ever parses messages it *receives* (client to server), so `prefix` is parsed
//! but discarded: RFC 2812 says a server must ignore a prefix supplied by a client (§2.3, 2.4).

use nom::{
    IResult, Parser,
    bytes::complete::{tag, take_while, take_while1, take_while_m_n},
    combinator::{opt, recognize},
    sequence::preceded,
};

use crate::errors::MessageError;

/// Maximum number of middle (non-trailing) parameters, per RFC 2812 §2.3.1.
const MAX_MIDDLE_PARAMS: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Command verb, always uppercased (`JOIN`, `PRIVMSG`) or a 3-digit numeric.
    pub command: String,
    pub params: Vec<String>,
}

impl Message {
    pub fn new(command: impl Into<String>, params: Vec<String>) -> Self {
        Message {
            command: command.into(),
            params,
        }
    }

    /// Parses one already-unframed line (CR/LF already stripped by the caller's line reader).
    pub fn parse(line: &str) -> Result<Message, MessageError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(MessageError::Empty);
        }
        let (rest, _) = opt(preceded(tag(":"), prefix_parser)).parse(line).map_err(|_| MessageError::MissingCommand)?;
        let rest = rest.trim_start_matches(' ');
        let (rest, command) = command_parser(rest).map_err(|_| MessageError::MissingCommand)?;
        if command.is_empty() {
            return Err(MessageError::MissingCommand);
        }
        let (_, params) = params_parser(rest).map_err(|_| MessageError::MissingCommand)?;
        Ok(Message {
            command: command.to_ascii_uppercase(),
            params: params.into_iter().map(str::to_owned).collect(),
        })
    }

    pub fn param(&self, i: usize) -> Option<&str> {
        self.params.get(i).map(String::as_str)
    }
}

fn is_nospcrlfcl(c: char) -> bool {
    let b = c as u32;
    matches!(b, 0x01..=0x09 | 0x0B..=0x0C | 0x0E..=0x1F | 0x21..=0x39 | 0x3B..=0xFF)
}

// prefix = servername / ( nickname [ [ "!" user ] "@" host ] ); we only need to skip past it.
fn prefix_parser(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != ' ').parse(input)
}

// command = 1*letter / 3digit
fn command_parser(input: &str) -> IResult<&str, &str> {
    nom::branch::alt((
        take_while1(|c: char| c.is_ascii_alphabetic()),
        take_while_m_n(3, 3, |c: char| c.is_ascii_digit()),
    ))
    .parse(input)
}

fn middle_parser(input: &str) -> IResult<&str, &str> {
    recognize((take_while1(is_nospcrlfcl), take_while(|c| c == ':' || is_nospcrlfcl(c)))).parse(input)
}

fn trailing_parser(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c == ':' || c == ' ' || is_nospcrlfcl(c)).parse(input)
}

fn params_parser(input: &str) -> IResult<&str, Vec<&str>> {
    let mut params = Vec::new();
    let mut rest = input;
    for _ in 0..MAX_MIDDLE_PARAMS {
        let trimmed = rest.trim_start_matches(' ');
        if trimmed.is_empty() {
            return Ok((trimmed, params));
        }
        if let Some(trailing) = trimmed.strip_prefix(':') {
            params.push(trailing);
            return Ok(("", params));
        }
        match middle_parser(trimmed) {
            Ok((remainder, word)) => {
                params.push(word);
                rest = remainder;
            }
            Err(_) => return Ok((trimmed, params)),
        }
    }
    let trimmed = rest.trim_start_matches(' ');
    if let Some(trailing) = trimmed.strip_prefix(':') {
        params.push(trailing);
    } else if !trimmed.is_empty() {
        let (_, t) = trailing_parser(trimmed)?;
        params.push(t);
    }
    Ok(("", params))
}

/// Wraps a single already-formatted reply line (no embedded CR/LF) for transmission, appending
/// the terminator if the caller omitted it. Send buffering is owned directly by
/// [`crate::user::User`] rather than routed through a message-passing channel.
pub fn frame(line: &str) -> String {
    if line.ends_with("\r\n") {
        line.to_owned()
    } else {
        format!("{line}\r\n")
    }
}

/// Splits a raw recv buffer into complete CRLF- or LF-terminated lines, returning the unconsumed
/// remainder to be kept in the connection's input buffer for the next read.
pub fn split_lines(buf: &str) -> (Vec<&str>, &str) {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = buf.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            let mut end = i;
            if end > start && bytes[end - 1] == b'\r' {
                end -= 1;
            }
            lines.push(&buf[start..end]);
            start = i + 1;
        }
        i += 1;
    }
    (lines, &buf[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_command() {
        let m = Message::parse("NICK alice").unwrap();
        assert_eq!(m.command, "NICK");
        assert_eq!(m.params, vec!["alice"]);
    }

    #[test]
    fn parses_trailing_param() {
        let m = Message::parse("PRIVMSG #chan :hello there friend").unwrap();
        assert_eq!(m.command, "PRIVMSG");
        assert_eq!(m.params, vec!["#chan", "hello there friend"]);
    }

    #[test]
    fn trailing_param_can_be_empty() {
        let m = Message::parse("TOPIC #chan :").unwrap();
        assert_eq!(m.params, vec!["#chan", ""]);
    }

    #[test]
    fn ignores_client_supplied_prefix() {
        let m = Message::parse(":ignored NICK bob").unwrap();
        assert_eq!(m.command, "NICK");
        assert_eq!(m.params, vec!["bob"]);
    }

    #[test]
    fn numeric_commands_are_accepted() {
        let m = Message::parse("001 :hi").unwrap();
        assert_eq!(m.command, "001");
    }

    #[test]
    fn uppercases_command() {
        let m = Message::parse("join #chan").unwrap();
        assert_eq!(m.command, "JOIN");
    }

    #[test]
    fn rejects_empty_line() {
        assert_eq!(Message::parse(""), Err(MessageError::Empty));
        assert_eq!(Message::parse("\r\n"), Err(MessageError::Empty));
    }

    #[test]
    fn rejects_missing_command() {
        assert!(Message::parse(" ").is_err());
    }

    #[test]
    fn split_lines_keeps_partial_remainder() {
        let (lines, rest) = split_lines("NICK a\r\nUSER b 0 * :c\r\nPAR");
        assert_eq!(lines, vec!["NICK a", "USER b 0 * :c"]);
        assert_eq!(rest, "PAR");
    }

    #[test]
    fn split_lines_handles_bare_lf() {
        let (lines, rest) = split_lines("PING :x\n");
        assert_eq!(lines, vec!["PING :x"]);
        assert_eq!(rest, "");
    }

    #[test]
    fn frame_appends_crlf_once() {
        assert_eq!(frame("PING :x"), "PING :x\r\n");
        assert_eq!(frame("PING :x\r\n"), "PING :x\r\n");
    }
}
