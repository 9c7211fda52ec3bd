//! Parses a channel `MODE` command's mode-string and argument list into a flat sequence of
//! atomic changes, so the handler can apply (or reject) them one at a time.

use crate::errors::ModeError;
use crate::flags::ChannelModes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

/// One `(+|-)<letter>` mode change, with its argument already resolved if the letter takes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeChange {
    Simple(Sign, ChannelModes),
    Key(Sign, Option<String>),
    Limit(Sign, Option<u32>),
    Op(Sign, String),
    Voice(Sign, String),
    Ban(Sign, String),
}

/// Parses `modestring [arguments...]` as passed to `MODE <target> <modestring> [args...]`.
///
/// `modestring` is a run of one or more `(+|-)<letters>` groups, e.g. `+o-v+k`, `+ntk`. Each
/// letter in `bklov` (ban, key, limit, op, voice) consumes one positional argument, taken in
/// order from `args`. `b` with no argument (bare `MODE #chan b`) is treated by the caller as a
/// ban-list query rather than reaching this parser.
pub fn parse_channel_mode(modestring: &str, args: &[String]) -> Result<Vec<ModeChange>, ModeError> {
    let mut changes = Vec::new();
    let mut sign = None;
    let mut arg_iter = args.iter();

    for c in modestring.chars() {
        match c {
            '+' => sign = Some(Sign::Plus),
            '-' => sign = Some(Sign::Minus),
            letter => {
                let sign = sign.ok_or_else(|| ModeError::MissingSign(modestring.to_owned()))?;
                changes.push(build_change(sign, letter, &mut arg_iter)?);
            }
        }
    }
    Ok(changes)
}

fn build_change<'a>(
    sign: Sign,
    letter: char,
    args: &mut impl Iterator<Item = &'a String>,
) -> Result<ModeChange, ModeError> {
    match letter {
        'o' => Ok(ModeChange::Op(sign, next_arg(letter, args)?)),
        'v' => Ok(ModeChange::Voice(sign, next_arg(letter, args)?)),
        'b' => Ok(ModeChange::Ban(sign, next_arg(letter, args)?)),
        'k' => Ok(ModeChange::Key(sign, match sign {
            Sign::Plus => Some(next_arg(letter, args)?),
            Sign::Minus => args.next().cloned(),
        })),
        'l' => match sign {
            Sign::Plus => {
                let raw = next_arg(letter, args)?;
                let n = raw.parse::<u32>().map_err(|_| ModeError::MissingArgument('l'))?;
                Ok(ModeChange::Limit(sign, Some(n)))
            }
            Sign::Minus => Ok(ModeChange::Limit(sign, None)),
        },
        other => match ChannelModes::letter_to_flag(other) {
            Some(flag) => Ok(ModeChange::Simple(sign, flag)),
            None => Err(ModeError::UnknownLetter(other)),
        },
    }
}

fn next_arg<'a>(letter: char, args: &mut impl Iterator<Item = &'a String>) -> Result<String, ModeError> {
    args.next().cloned().ok_or(ModeError::MissingArgument(letter))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_simple_flags() {
        let changes = parse_channel_mode("+in", &[]).unwrap();
        assert_eq!(
            changes,
            vec![
                ModeChange::Simple(Sign::Plus, ChannelModes::INVITE_ONLY),
                ModeChange::Simple(Sign::Plus, ChannelModes::NO_EXTERNAL),
            ]
        );
    }

    #[test]
    fn parses_mixed_sign_groups() {
        let changes = parse_channel_mode("+o-v", &args(&["alice", "bob"])).unwrap();
        assert_eq!(
            changes,
            vec![
                ModeChange::Op(Sign::Plus, "alice".into()),
                ModeChange::Voice(Sign::Minus, "bob".into()),
            ]
        );
    }

    #[test]
    fn key_removal_arg_is_optional() {
        let changes = parse_channel_mode("-k", &[]).unwrap();
        assert_eq!(changes, vec![ModeChange::Key(Sign::Minus, None)]);
    }

    #[test]
    fn limit_removal_has_no_value() {
        let changes = parse_channel_mode("-l", &[]).unwrap();
        assert_eq!(changes, vec![ModeChange::Limit(Sign::Minus, None)]);
    }

    #[test]
    fn missing_sign_is_an_error() {
        assert_eq!(
            parse_channel_mode("it", &[]),
            Err(ModeError::MissingSign("it".into()))
        );
    }

    #[test]
    fn missing_argument_is_an_error() {
        assert_eq!(parse_channel_mode("+o", &[]), Err(ModeError::MissingArgument('o')));
    }

    #[test]
    fn unknown_letter_is_an_error() {
        assert_eq!(parse_channel_mode("+z", &[]), Err(ModeError::UnknownLetter('z')));
    }
}
