//! RFC 2812 §2.3.1 grammar fragments used to validate identifiers once a [`crate::message::Message`]
//! has already been split into command + params.
//!
//! These are deliberately independent of [`crate::message`]'s line-splitting parser: that one only
//! needs to find word boundaries, these decide whether a given word is a legal nickname, channel
//! name, or key.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::satisfy,
    combinator::{recognize, verify},
    multi::separated_list1,
    sequence::pair,
};

pub const MAX_NICKNAME_LEN: usize = 9;
pub const MAX_KEY_LEN: usize = 23;

fn is_nickname_tail_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-[]\\`^{}".contains(c)
}

fn is_nickname_first_char(c: char) -> bool {
    c.is_ascii_alphabetic() || "[]\\`^{}".contains(c)
}

/// `nickname = ( letter / special ) *8( letter / digit / special / "-" )`
pub fn nickname_parser(input: &str) -> IResult<&str, &str> {
    let first = satisfy(is_nickname_first_char);
    let tail = nom::bytes::complete::take_while(is_nickname_tail_char);
    let parser = recognize(pair(first, tail));
    verify(parser, |s: &str| s.len() <= MAX_NICKNAME_LEN).parse(input)
}

/// A nickname is well-formed and fits the wire-length budget.
pub fn is_valid_nickname(s: &str) -> bool {
    matches!(nickname_parser(s), Ok((rest, matched)) if rest.is_empty() && matched == s)
}

// chanstring = any octet except NUL, BELL, CR, LF, " ", "," and ":"
fn is_chan_char(c: char) -> bool {
    !matches!(c, '\u{0000}' | '\u{0007}' | '\r' | '\n' | ' ' | ',' | ':') && (c as u32) <= 0xFF
}

fn chanstring_parser(input: &str) -> IResult<&str, &str> {
    take_while1(is_chan_char)(input)
}

fn channel_prefix_parser(input: &str) -> IResult<&str, &str> {
    alt((tag("#"), tag("&"), tag("+"))).parse(input)
}

/// `channel = ( "#" / "+" / "&" ) chanstring`
///
/// Supports the three plain channel-name prefixes; `!<channelid>` safe channels are not
/// implemented.
pub fn channel_parser(input: &str) -> IResult<&str, &str> {
    recognize(pair(channel_prefix_parser, chanstring_parser)).parse(input)
}

pub fn is_valid_channel_name(s: &str, max_len: usize) -> bool {
    if s.len() > max_len {
        return false;
    }
    matches!(channel_parser(s), Ok((rest, matched)) if rest.is_empty() && matched == s)
}

fn is_key_char(c: char) -> bool {
    if !c.is_ascii() {
        return false;
    }
    let b = c as u8;
    matches!(b, 0x01..=0x05 | 0x07..=0x08 | 0x0C | 0x0E..=0x1F | 0x21..=0x7F)
}

/// `key = 1*23( any 7-bit US-ASCII char except NUL, CR, LF, FF, tabs, space )`
pub fn key_parser(input: &str) -> IResult<&str, &str> {
    verify(take_while1(is_key_char), |s: &str| s.len() <= MAX_KEY_LEN).parse(input)
}

pub fn is_valid_key(s: &str) -> bool {
    matches!(key_parser(s), Ok((rest, matched)) if rest.is_empty() && matched == s)
}

/// Splits a comma-separated list of targets (`JOIN #a,#b`, `PRIVMSG nick1,nick2`).
pub fn comma_list(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(tag(","), take_while1(|c: char| c != ',' && c != ' ')).parse(input)
}

/// Matches a single IRC wildcard mask character against a literal byte (`*` = any run, `?` = any one).
/// Used by ban/except list matching in [`crate::channel`].
pub fn mask_matches(mask: &str, text: &str) -> bool {
    fn rec(mask: &[u8], text: &[u8]) -> bool {
        match mask.first() {
            None => text.is_empty(),
            Some(b'*') => {
                rec(&mask[1..], text)
                    || (!text.is_empty() && rec(mask, &text[1..]))
            }
            Some(b'?') => !text.is_empty() && rec(&mask[1..], &text[1..]),
            Some(&c) => {
                !text.is_empty()
                    && text[0].to_ascii_lowercase() == c.to_ascii_lowercase()
                    && rec(&mask[1..], &text[1..])
            }
        }
    }
    rec(mask.as_bytes(), text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_rejects_leading_digit() {
        assert!(!is_valid_nickname("1abc"));
    }

    #[test]
    fn nickname_accepts_specials() {
        assert!(is_valid_nickname("t[est]"));
        assert!(is_valid_nickname("j`k"));
    }

    #[test]
    fn nickname_enforces_length() {
        assert!(!is_valid_nickname("abcdefghij"));
        assert!(is_valid_nickname("abcdefghi"));
    }

    #[test]
    fn channel_requires_prefix() {
        assert!(is_valid_channel_name("#general", 200));
        assert!(is_valid_channel_name("&local", 200));
        assert!(!is_valid_channel_name("general", 200));
    }

    #[test]
    fn channel_respects_configured_max_len() {
        assert!(!is_valid_channel_name("#toolongname", 5));
    }

    #[test]
    fn mask_matches_wildcards() {
        assert!(mask_matches("*!*@*.example.com", "nick!user@host.example.com"));
        assert!(!mask_matches("*!*@*.example.com", "nick!user@host.other.com"));
        assert!(mask_matches("nick?", "nicks"));
    }
}
