//! Numeric and named reply formatting.
//!
//! The teacher's `IrcReply` enum hand-rolled one variant per numeric; the full RFC 1459/2812
//! surface this core speaks is several times larger, so replies are built with a single
//! generic [`numeric`] formatter plus a handful of named constructors for the lines that are
//! not of the form `<code> <target> <params...> :<text>` (JOIN/PART/QUIT/PRIVMSG and friends,
//! which carry a `nick!user@host` prefix instead of the server name).

use crate::constants::*;

/// `:<server> <code:03> <target> <trailing rest, space-joined> :<text>`
///
/// `rest` are already-formatted positional params (e.g. a channel name); `text` becomes the
/// final `:`-prefixed trailing parameter. Pass `""` for `text` to omit the trailing colon
/// entirely when a numeric has no free-text tail.
pub fn numeric(server_name: &str, code: u16, target: &str, rest: &[&str], text: &str) -> String {
    let mut line = format!(":{server_name} {code:03} {target}");
    for r in rest {
        line.push(' ');
        line.push_str(r);
    }
    if !text.is_empty() {
        line.push_str(" :");
        line.push_str(text);
    }
    line
}

/// `:<nick>!<user>@<host> <COMMAND> <params...>`, the prefix form used for messages relayed
/// between clients (JOIN, PART, QUIT, NICK, PRIVMSG, NOTICE, MODE, TOPIC, KICK, INVITE).
pub fn prefixed(nick: &str, user: &str, host: &str, command: &str, rest: &[&str]) -> String {
    let mut line = format!(":{nick}!{user}@{host} {command}");
    for r in rest {
        line.push(' ');
        line.push_str(r);
    }
    line
}

/// Same as [`prefixed`] but for the final, possibly-empty `:trailing` parameter (PRIVMSG text,
/// QUIT reason, PART reason, TOPIC text).
pub fn prefixed_trailing(nick: &str, user: &str, host: &str, command: &str, rest: &[&str], text: &str) -> String {
    let mut line = prefixed(nick, user, host, command, rest);
    line.push_str(" :");
    line.push_str(text);
    line
}

pub fn welcome(server_name: &str, nick: &str, user: &str, host: &str) -> String {
    numeric(
        server_name,
        RPL_WELCOME_NB,
        nick,
        &[],
        &format!("{RPL_WELCOME_STR} {nick}!{user}@{host}"),
    )
}

pub fn yourhost(server_name: &str, nick: &str, version: &str) -> String {
    numeric(
        server_name,
        RPL_YOURHOST_NB,
        nick,
        &[],
        &format!("{RPL_YOURHOST_STR} {server_name}, running version {version}"),
    )
}

pub fn created(server_name: &str, nick: &str, date: &str) -> String {
    numeric(server_name, RPL_CREATED_NB, nick, &[], &format!("{RPL_CREATED_STR} {date}"))
}

pub fn myinfo(server_name: &str, nick: &str, version: &str, user_modes: &str, chan_modes: &str) -> String {
    numeric(
        server_name,
        RPL_MYINFO_NB,
        nick,
        &[server_name, version, user_modes, chan_modes],
        "",
    )
}

pub fn isupport(server_name: &str, nick: &str, tokens: &[String]) -> String {
    let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
    numeric(server_name, RPL_ISUPPORT_NB, nick, &refs, RPL_ISUPPORT_STR)
}

pub fn err_unknown_command(server_name: &str, nick: &str, command: &str) -> String {
    numeric(server_name, ERR_UNKNOWNCOMMAND_NB, nick, &[command], ERR_UNKNOWNCOMMAND_STR)
}

pub fn err_need_more_params(server_name: &str, nick: &str, command: &str) -> String {
    numeric(server_name, ERR_NEEDMOREPARAMS_NB, nick, &[command], ERR_NEEDMOREPARAMS_STR)
}

pub fn err_not_registered(server_name: &str, nick: &str) -> String {
    numeric(server_name, ERR_NOTREGISTERED_NB, nick, &[], ERR_NOTREGISTERED_STR)
}

pub fn err_already_registered(server_name: &str, nick: &str) -> String {
    numeric(server_name, ERR_ALREADYREGISTRED_NB, nick, &[], ERR_ALREADYREGISTRED_STR)
}

pub fn err_no_such_nick(server_name: &str, nick: &str, target: &str) -> String {
    numeric(server_name, ERR_NOSUCHNICK_NB, nick, &[target], ERR_NOSUCHNICK_STR)
}

pub fn err_no_such_channel(server_name: &str, nick: &str, channel: &str) -> String {
    numeric(server_name, ERR_NOSUCHCHANNEL_NB, nick, &[channel], ERR_NOSUCHCHANNEL_STR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_matches_rfc_shape() {
        assert_eq!(
            welcome("irc.local", "alice", "~a", "host.example"),
            ":irc.local 001 alice :Welcome to the Internet Relay Network alice!~a@host.example"
        );
    }

    #[test]
    fn prefixed_join_has_no_trailing_colon() {
        assert_eq!(
            prefixed("alice", "~a", "host", "JOIN", &["#chan"]),
            ":alice!~a@host JOIN #chan"
        );
    }

    #[test]
    fn prefixed_trailing_appends_colon_text() {
        assert_eq!(
            prefixed_trailing("alice", "~a", "host", "QUIT", &[], "goodbye"),
            ":alice!~a@host QUIT :goodbye"
        );
    }

    #[test]
    fn numeric_omits_trailing_when_text_empty() {
        assert_eq!(numeric("irc.local", 324, "alice", &["#chan", "+nt"], ""), ":irc.local 324 alice #chan +nt");
    }
}
