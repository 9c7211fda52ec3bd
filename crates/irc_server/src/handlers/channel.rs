//! JOIN/PART/TOPIC/MODE/INVITE/KICK/NAMES/LIST.

use std::time::SystemTime;

use crate::constants::*;
use crate::dispatch::Outcome;
use crate::errors::IrcError;
use crate::flags::{ChannelModes, UserFlags};
use crate::message::Message;
use crate::mode::{ModeChange, Sign, parse_channel_mode};
use crate::parsers::{comma_list, is_valid_channel_name};
use crate::reply;
use crate::server::Server;

use super::need_more_params;

fn require_registered_nick(server: &Server, fd: i32) -> Option<String> {
    server.users.get(&fd)?.nickname.clone()
}

pub fn join(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    if need_more_params(server, fd, "JOIN", &message.params, 1) {
        return Ok(Outcome::Continue);
    }
    let nick = require_registered_nick(server, fd).ok_or(IrcError::UnknownUser(fd))?;
    let user = &server.users[&fd];
    let hostmask = user.prefix();
    let username = user.username.clone().unwrap_or_default();
    let hostname = user.hostname.clone();
    let max_len = server.config.limits.max_channel_name_length;
    let max_channels = server.config.limits.max_channels_per_user;

    let (_, names) = comma_list(&message.params[0]).map_err(|_| IrcError::Parsing(message.params[0].clone()))?;
    let keys: Vec<&str> = message.param(1).map(|k| k.split(',').collect()).unwrap_or_default();

    for (i, chan_name) in names.iter().copied().enumerate() {
        if !is_valid_channel_name(chan_name, max_len) {
            server.send_numeric(fd, ERR_NOSUCHCHANNEL_NB, &[chan_name], ERR_NOSUCHCHANNEL_STR);
            continue;
        }
        if server.users[&fd].channels.len() >= max_channels {
            server.send_numeric(fd, ERR_TOOMANYCHANNELS_NB, &[chan_name], ERR_TOOMANYCHANNELS_STR);
            continue;
        }
        let supplied_key = keys.get(i).copied();
        let is_new = server.channel(chan_name).is_none();

        if !is_new {
            let channel = server.channel(chan_name).unwrap();
            if channel.is_member(&nick) {
                continue;
            }
            if channel.modes.contains(ChannelModes::INVITE_ONLY) && !channel.invited.contains(&nick) {
                server.send_numeric(fd, ERR_INVITEONLYCHAN_NB, &[chan_name], ERR_INVITEONLYCHAN_STR);
                continue;
            }
            if channel.modes.contains(ChannelModes::KEY) && channel.key.as_deref() != supplied_key {
                server.send_numeric(fd, ERR_BADCHANNELKEY_NB, &[chan_name], ERR_BADCHANNELKEY_STR);
                continue;
            }
            if channel.is_full() {
                server.send_numeric(fd, ERR_CHANNELISFULL_NB, &[chan_name], ERR_CHANNELISFULL_STR);
                continue;
            }
            if channel.is_banned(&hostmask) {
                server.send_numeric(fd, ERR_BANNEDFROMCHAN_NB, &[chan_name], ERR_BANNEDFROMCHAN_STR);
                continue;
            }
        }

        let channel = server.get_or_create_channel(chan_name);
        channel.add_member(&nick, is_new);
        let canonical_name = channel.name.clone();
        let topic = channel.topic.clone();
        let names_list = channel.names_list();

        server.users.get_mut(&fd).unwrap().channels.insert(crate::casemap::irc_lower(&canonical_name));

        let join_line = reply::prefixed(&nick, &username, &hostname, "JOIN", &[&canonical_name]);
        server.broadcast_to_channel(&canonical_name, &join_line, None);

        match &topic {
            Some(topic) => server.send_numeric(fd, RPL_TOPIC_NB, &[&canonical_name], topic),
            None => server.send_numeric(fd, RPL_NOTOPIC_NB, &[&canonical_name], RPL_NOTOPIC_STR),
        }
        let joined = names_list.join(" ");
        server.send_numeric(fd, RPL_NAMREPLY_NB, &["=", &canonical_name], &joined);
        server.send_numeric(fd, RPL_ENDOFNAMES_NB, &[&canonical_name], RPL_ENDOFNAMES_STR);
    }

    Ok(Outcome::Continue)
}

pub fn part(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    if need_more_params(server, fd, "PART", &message.params, 1) {
        return Ok(Outcome::Continue);
    }
    let nick = require_registered_nick(server, fd).ok_or(IrcError::UnknownUser(fd))?;
    let user = &server.users[&fd];
    let username = user.username.clone().unwrap_or_default();
    let hostname = user.hostname.clone();
    let reason = message.param(1).unwrap_or(&nick).to_owned();

    let (_, names) = comma_list(&message.params[0]).map_err(|_| IrcError::Parsing(message.params[0].clone()))?;
    for chan_name in names {
        let Some(channel) = server.channel(chan_name) else {
            server.send_numeric(fd, ERR_NOSUCHCHANNEL_NB, &[chan_name], ERR_NOSUCHCHANNEL_STR);
            continue;
        };
        if !channel.is_member(&nick) {
            server.send_numeric(fd, ERR_NOTONCHANNEL_NB, &[chan_name], ERR_NOTONCHANNEL_STR);
            continue;
        }
        let canonical_name = channel.name.clone();
        let part_line = reply::prefixed_trailing(&nick, &username, &hostname, "PART", &[&canonical_name], &reason);
        server.broadcast_to_channel(&canonical_name, &part_line, None);

        let key = crate::casemap::irc_lower(&canonical_name);
        server.channel_mut(&canonical_name).unwrap().remove_member(&nick);
        server.users.get_mut(&fd).unwrap().channels.remove(&key);
    }
    Ok(Outcome::Continue)
}

pub fn topic(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    if need_more_params(server, fd, "TOPIC", &message.params, 1) {
        return Ok(Outcome::Continue);
    }
    let nick = require_registered_nick(server, fd).ok_or(IrcError::UnknownUser(fd))?;
    let chan_name = &message.params[0];
    let Some(channel) = server.channel(chan_name) else {
        server.send_numeric(fd, ERR_NOSUCHCHANNEL_NB, &[chan_name], ERR_NOSUCHCHANNEL_STR);
        return Ok(Outcome::Continue);
    };
    if !channel.is_member(&nick) {
        server.send_numeric(fd, ERR_NOTONCHANNEL_NB, &[chan_name], ERR_NOTONCHANNEL_STR);
        return Ok(Outcome::Continue);
    }

    if message.params.len() == 1 {
        let canonical = channel.name.clone();
        let topic = channel.topic.clone();
        match topic {
            Some(topic) => server.send_numeric(fd, RPL_TOPIC_NB, &[&canonical], &topic),
            None => server.send_numeric(fd, RPL_NOTOPIC_NB, &[&canonical], RPL_NOTOPIC_STR),
        }
        return Ok(Outcome::Continue);
    }

    if channel.modes.contains(ChannelModes::TOPIC_LOCK) && !channel.is_operator(&nick) {
        server.send_numeric(fd, ERR_CHANOPRIVSNEEDED_NB, &[chan_name], ERR_CHANOPRIVSNEEDED_STR);
        return Ok(Outcome::Continue);
    }

    let new_topic = message.params[1].clone();
    let canonical_name = channel.name.clone();
    let user = &server.users[&fd];
    let username = user.username.clone().unwrap_or_default();
    let hostname = user.hostname.clone();

    let channel = server.channel_mut(&canonical_name).unwrap();
    channel.topic = Some(new_topic.clone());
    channel.topic_set_by = Some(nick.clone());
    channel.topic_set_at = Some(SystemTime::now());

    let line = reply::prefixed_trailing(&nick, &username, &hostname, "TOPIC", &[&canonical_name], &new_topic);
    server.broadcast_to_channel(&canonical_name, &line, None);
    Ok(Outcome::Continue)
}

pub fn mode(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    if need_more_params(server, fd, "MODE", &message.params, 1) {
        return Ok(Outcome::Continue);
    }
    let target = &message.params[0];
    if !target.starts_with('#') && !target.starts_with('&') {
        return user_mode(server, fd, target, message.params.get(1).map(String::as_str));
    }

    let nick = require_registered_nick(server, fd).ok_or(IrcError::UnknownUser(fd))?;
    let Some(channel) = server.channel(target) else {
        server.send_numeric(fd, ERR_NOSUCHCHANNEL_NB, &[target], ERR_NOSUCHCHANNEL_STR);
        return Ok(Outcome::Continue);
    };

    if message.params.len() == 1 {
        let canonical = channel.name.clone();
        let modestring = channel.modes.to_mode_string();
        server.send_numeric(fd, RPL_CHANNELMODEIS_NB, &[&canonical, &modestring], "");
        return Ok(Outcome::Continue);
    }

    // `MODE #chan b` with no args is a ban-list query, not a mode change.
    if message.params[1] == "b" && message.params.len() == 2 {
        let canonical = channel.name.clone();
        let bans: Vec<String> = channel.bans.iter().cloned().collect();
        for mask in bans {
            server.send_numeric(fd, RPL_BANLIST_NB, &[&canonical, &mask], "");
        }
        server.send_numeric(fd, RPL_ENDOFBANLIST_NB, &[&canonical], RPL_ENDOFBANLIST_STR);
        return Ok(Outcome::Continue);
    }

    if !channel.is_operator(&nick) {
        server.send_numeric(fd, ERR_CHANOPRIVSNEEDED_NB, &[target], ERR_CHANOPRIVSNEEDED_STR);
        return Ok(Outcome::Continue);
    }

    let args = &message.params[2..];
    let changes = match parse_channel_mode(&message.params[1], args) {
        Ok(c) => c,
        Err(_) => {
            server.send_numeric(fd, ERR_UNKNOWNMODE_NB, &[&message.params[1]], ERR_UNKNOWNMODE_STR);
            return Ok(Outcome::Continue);
        }
    };

    let canonical_name = channel.name.clone();
    let mut applied_tokens = Vec::new();
    let mut applied_args = Vec::new();

    for change in changes {
        let channel = server.channel_mut(&canonical_name).unwrap();
        match change {
            ModeChange::Simple(sign, flag) => {
                match sign {
                    Sign::Plus => channel.modes.insert(flag),
                    Sign::Minus => channel.modes.remove(flag),
                }
                applied_tokens.push(format!("{}{}", sign_char(sign), flag_letter(flag)));
            }
            ModeChange::Key(sign, key) => {
                match sign {
                    Sign::Plus => {
                        if channel.modes.contains(ChannelModes::KEY) {
                            server.send_numeric(fd, ERR_KEYSET_NB, &[&canonical_name], ERR_KEYSET_STR);
                            continue;
                        }
                        let channel = server.channel_mut(&canonical_name).unwrap();
                        channel.modes.insert(ChannelModes::KEY);
                        channel.key = key.clone();
                        applied_tokens.push("+k".to_owned());
                        if let Some(k) = key {
                            applied_args.push(k);
                        }
                    }
                    Sign::Minus => {
                        channel.modes.remove(ChannelModes::KEY);
                        channel.key = None;
                        applied_tokens.push("-k".to_owned());
                    }
                }
            }
            ModeChange::Limit(sign, limit) => match sign {
                Sign::Plus => {
                    channel.modes.insert(ChannelModes::LIMIT);
                    channel.user_limit = limit;
                    applied_tokens.push("+l".to_owned());
                    if let Some(l) = limit {
                        applied_args.push(l.to_string());
                    }
                }
                Sign::Minus => {
                    channel.modes.remove(ChannelModes::LIMIT);
                    channel.user_limit = None;
                    applied_tokens.push("-l".to_owned());
                }
            },
            ModeChange::Op(sign, target_nick) => {
                if !channel.is_member(&target_nick) {
                    server.send_numeric(fd, ERR_USERNOTINCHANNEL_NB, &[&target_nick, &canonical_name], ERR_USERNOTINCHANNEL_STR);
                    continue;
                }
                let mut role = channel.role_of(&target_nick);
                match sign {
                    Sign::Plus => role.insert(crate::flags::MemberRole::OP),
                    Sign::Minus => role.remove(crate::flags::MemberRole::OP),
                }
                channel.members.insert(target_nick.clone(), role);
                applied_tokens.push(format!("{}o", sign_char(sign)));
                applied_args.push(target_nick);
            }
            ModeChange::Voice(sign, target_nick) => {
                if !channel.is_member(&target_nick) {
                    server.send_numeric(fd, ERR_USERNOTINCHANNEL_NB, &[&target_nick, &canonical_name], ERR_USERNOTINCHANNEL_STR);
                    continue;
                }
                let mut role = channel.role_of(&target_nick);
                match sign {
                    Sign::Plus => role.insert(crate::flags::MemberRole::VOICE),
                    Sign::Minus => role.remove(crate::flags::MemberRole::VOICE),
                }
                channel.members.insert(target_nick.clone(), role);
                applied_tokens.push(format!("{}v", sign_char(sign)));
                applied_args.push(target_nick);
            }
            ModeChange::Ban(sign, mask) => {
                match sign {
                    Sign::Plus => {
                        channel.bans.insert(mask.clone());
                    }
                    Sign::Minus => {
                        channel.bans.remove(&mask);
                    }
                }
                applied_tokens.push(format!("{}b", sign_char(sign)));
                applied_args.push(mask);
            }
        }
    }

    if !applied_tokens.is_empty() {
        let mut rest: Vec<&str> = vec![&canonical_name];
        let modestring = applied_tokens.concat();
        rest.push(&modestring);
        let arg_refs: Vec<&str> = applied_args.iter().map(String::as_str).collect();
        rest.extend(arg_refs);
        let user = &server.users[&fd];
        let line = reply::prefixed(&nick, user.username.as_deref().unwrap_or(""), &user.hostname, "MODE", &rest);
        server.broadcast_to_channel(&canonical_name, &line, None);
    }

    Ok(Outcome::Continue)
}

/// `MODE <nick> [(+|-)<letters>]` — a user may only change their own modes; any other nick
/// yields `ERR_USERSDONTMATCH` (502). With no mode-string, reports the current set as
/// `RPL_UMODEIS` (221).
fn user_mode(server: &mut Server, fd: i32, target_nick: &str, modestring: Option<&str>) -> Result<Outcome, IrcError> {
    let nick = require_registered_nick(server, fd).ok_or(IrcError::UnknownUser(fd))?;
    if !crate::casemap::irc_eq(&nick, target_nick) {
        server.send_numeric(fd, ERR_USERSDONTMATCH_NB, &[], ERR_USERSDONTMATCH_STR);
        return Ok(Outcome::Continue);
    }

    let Some(modestring) = modestring else {
        let current = server.users[&fd].flags.to_mode_string();
        server.send_numeric(fd, RPL_UMODEIS_NB, &[&format!("+{current}")], "");
        return Ok(Outcome::Continue);
    };

    let mut sign = Sign::Plus;
    let mut applied = String::new();
    for c in modestring.chars() {
        match c {
            '+' => sign = Sign::Plus,
            '-' => sign = Sign::Minus,
            // `+o` (server operator) is only ever granted by an OPER command this core does
            // not implement; a client asking for it is simply refused, not told why.
            'o' if sign == Sign::Plus => {
                server.send_numeric(fd, ERR_NOPRIVILEGES_NB, &[], ERR_NOPRIVILEGES_STR);
            }
            letter => match UserFlags::letter_to_flag(letter) {
                Some(flag) if flag == UserFlags::OPER => {
                    let user = server.users.get_mut(&fd).unwrap();
                    user.flags.remove(UserFlags::OPER);
                    applied.push('-');
                    applied.push(letter);
                }
                Some(flag) => {
                    let user = server.users.get_mut(&fd).unwrap();
                    match sign {
                        Sign::Plus => user.flags.insert(flag),
                        Sign::Minus => user.flags.remove(flag),
                    }
                    applied.push(if sign == Sign::Plus { '+' } else { '-' });
                    applied.push(letter);
                }
                None => {
                    server.send_numeric(fd, ERR_UMODEUNKNOWNFLAG_NB, &[], ERR_UMODEUNKNOWNFLAG_STR);
                }
            },
        }
    }

    if !applied.is_empty() {
        let prefix = server.users[&fd].prefix();
        let line = format!(":{prefix} MODE {nick} {applied}");
        server.send_line(fd, &line);
    }
    Ok(Outcome::Continue)
}

fn sign_char(sign: Sign) -> char {
    match sign {
        Sign::Plus => '+',
        Sign::Minus => '-',
    }
}

fn flag_letter(flag: ChannelModes) -> char {
    if flag.contains(ChannelModes::INVITE_ONLY) {
        'i'
    } else if flag.contains(ChannelModes::TOPIC_LOCK) {
        't'
    } else if flag.contains(ChannelModes::NO_EXTERNAL) {
        'n'
    } else if flag.contains(ChannelModes::SECRET) {
        's'
    } else if flag.contains(ChannelModes::MODERATED) {
        'm'
    } else {
        '?'
    }
}

pub fn invite(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    if need_more_params(server, fd, "INVITE", &message.params, 2) {
        return Ok(Outcome::Continue);
    }
    let nick = require_registered_nick(server, fd).ok_or(IrcError::UnknownUser(fd))?;
    let target_nick = message.params[0].clone();
    let chan_name = message.params[1].clone();

    let Some(channel) = server.channel(&chan_name) else {
        server.send_numeric(fd, ERR_NOSUCHCHANNEL_NB, &[&chan_name], ERR_NOSUCHCHANNEL_STR);
        return Ok(Outcome::Continue);
    };
    if !channel.is_member(&nick) {
        server.send_numeric(fd, ERR_NOTONCHANNEL_NB, &[&chan_name], ERR_NOTONCHANNEL_STR);
        return Ok(Outcome::Continue);
    }
    if channel.modes.contains(ChannelModes::INVITE_ONLY) && !channel.is_operator(&nick) {
        server.send_numeric(fd, ERR_CHANOPRIVSNEEDED_NB, &[&chan_name], ERR_CHANOPRIVSNEEDED_STR);
        return Ok(Outcome::Continue);
    }
    if channel.is_member(&target_nick) {
        server.send_numeric(fd, ERR_USERONCHANNEL_NB, &[&target_nick, &chan_name], ERR_USERONCHANNEL_STR);
        return Ok(Outcome::Continue);
    }

    let Some(target_fd) = server.fd_for_nick(&target_nick) else {
        server.send_numeric(fd, ERR_NOSUCHNICK_NB, &[&target_nick], ERR_NOSUCHNICK_STR);
        return Ok(Outcome::Continue);
    };

    let canonical_name = channel.name.clone();
    server.channel_mut(&canonical_name).unwrap().invited.insert(target_nick.clone());
    server.send_numeric(fd, RPL_INVITING_NB, &[&target_nick, &canonical_name], "");

    let inviter = &server.users[&fd];
    let line = reply::prefixed(&nick, inviter.username.as_deref().unwrap_or(""), &inviter.hostname, "INVITE", &[&target_nick, &canonical_name]);
    server.send_line(target_fd, &line);
    Ok(Outcome::Continue)
}

pub fn kick(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    if need_more_params(server, fd, "KICK", &message.params, 2) {
        return Ok(Outcome::Continue);
    }
    let nick = require_registered_nick(server, fd).ok_or(IrcError::UnknownUser(fd))?;
    let chan_name = message.params[0].clone();
    let target_nick = message.params[1].clone();
    let reason = message.param(2).unwrap_or(&nick).to_owned();

    let Some(channel) = server.channel(&chan_name) else {
        server.send_numeric(fd, ERR_NOSUCHCHANNEL_NB, &[&chan_name], ERR_NOSUCHCHANNEL_STR);
        return Ok(Outcome::Continue);
    };
    if !channel.is_operator(&nick) {
        server.send_numeric(fd, ERR_CHANOPRIVSNEEDED_NB, &[&chan_name], ERR_CHANOPRIVSNEEDED_STR);
        return Ok(Outcome::Continue);
    }
    if !channel.is_member(&target_nick) {
        server.send_numeric(fd, ERR_USERNOTINCHANNEL_NB, &[&target_nick, &chan_name], ERR_USERNOTINCHANNEL_STR);
        return Ok(Outcome::Continue);
    }

    let canonical_name = channel.name.clone();
    let user = &server.users[&fd];
    let username = user.username.clone().unwrap_or_default();
    let hostname = user.hostname.clone();
    let line = reply::prefixed_trailing(&nick, &username, &hostname, "KICK", &[&canonical_name, &target_nick], &reason);
    server.broadcast_to_channel(&canonical_name, &line, None);

    server.channel_mut(&canonical_name).unwrap().remove_member(&target_nick);
    if let Some(target_fd) = server.fd_for_nick(&target_nick) {
        let key = crate::casemap::irc_lower(&canonical_name);
        if let Some(target_user) = server.users.get_mut(&target_fd) {
            target_user.channels.remove(&key);
        }
    }
    Ok(Outcome::Continue)
}

pub fn names(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    let Some(chan_name) = message.param(0) else {
        server.send_numeric(fd, RPL_ENDOFNAMES_NB, &["*"], RPL_ENDOFNAMES_STR);
        return Ok(Outcome::Continue);
    };
    let chan_name = chan_name.to_owned();
    match server.channel(&chan_name) {
        Some(channel) => {
            let canonical = channel.name.clone();
            let joined = channel.names_list().join(" ");
            server.send_numeric(fd, RPL_NAMREPLY_NB, &["=", &canonical], &joined);
            server.send_numeric(fd, RPL_ENDOFNAMES_NB, &[&canonical], RPL_ENDOFNAMES_STR);
        }
        None => server.send_numeric(fd, RPL_ENDOFNAMES_NB, &[&chan_name], RPL_ENDOFNAMES_STR),
    }
    Ok(Outcome::Continue)
}

pub fn list(server: &mut Server, fd: i32, _message: &Message) -> Result<Outcome, IrcError> {
    let nick = require_registered_nick(server, fd).ok_or(IrcError::UnknownUser(fd))?;
    server.send_numeric(fd, RPL_LISTSTART_NB, &["Channel"], "Users  Name");
    let entries: Vec<(String, usize, String)> = server
        .channels
        .values()
        .filter(|c| !c.modes.contains(ChannelModes::SECRET) || c.is_member(&nick))
        .map(|c| (c.name.clone(), c.members.len(), c.topic.clone().unwrap_or_default()))
        .collect();
    for (name, count, topic) in entries {
        server.send_numeric(fd, RPL_LIST_NB, &[&name, &count.to_string()], &topic);
    }
    server.send_numeric(fd, RPL_LISTEND_NB, &[], RPL_LISTEND_STR);
    Ok(Outcome::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::time::Instant;

    fn test_server() -> (Server, i32) {
        let mut config = Config::default();
        config.network.port = 0;
        let mut server = Server::bind(config).expect("bind ephemeral port for test");
        let fd = 9001;
        let mut user = crate::user::User::new(fd, "test.host".into(), Instant::now());
        user.nickname = Some("alice".into());
        user.username = Some("alice".into());
        user.status = crate::user::RegistrationStatus::Registered;
        server.users.insert(fd, user);
        server.index_nick(fd, "alice");
        (server, fd)
    }

    #[test]
    fn join_creates_channel_and_ops_founder() {
        let (mut server, fd) = test_server();
        let msg = Message::new("JOIN", vec!["#test".into()]);
        join(&mut server, fd, &msg).unwrap();
        let channel = server.channel("#test").unwrap();
        assert!(channel.is_operator("alice"));
    }

    #[test]
    fn join_invite_only_without_invite_is_rejected() {
        let (mut server, fd) = test_server();
        server.get_or_create_channel("#test").modes.insert(ChannelModes::INVITE_ONLY);

        let other_fd = 9002;
        let mut bob = crate::user::User::new(other_fd, "test.host".into(), Instant::now());
        bob.nickname = Some("bob".into());
        bob.username = Some("bob".into());
        bob.status = crate::user::RegistrationStatus::Registered;
        server.users.insert(other_fd, bob);
        server.index_nick(other_fd, "bob");

        let msg = Message::new("JOIN", vec!["#test".into()]);
        join(&mut server, other_fd, &msg).unwrap();
        assert!(!server.channel("#test").unwrap().is_member("bob"));
    }

    #[test]
    fn kick_by_non_operator_is_rejected() {
        let (mut server, fd) = test_server();
        join(&mut server, fd, &Message::new("JOIN", vec!["#test".into()])).unwrap();

        let other_fd = 9003;
        let mut bob = crate::user::User::new(other_fd, "test.host".into(), Instant::now());
        bob.nickname = Some("bob".into());
        bob.username = Some("bob".into());
        bob.status = crate::user::RegistrationStatus::Registered;
        server.users.insert(other_fd, bob);
        server.index_nick(other_fd, "bob");
        join(&mut server, other_fd, &Message::new("JOIN", vec!["#test".into()])).unwrap();

        let msg = Message::new("KICK", vec!["#test".into(), "alice".into()]);
        kick(&mut server, other_fd, &msg).unwrap();
        assert!(server.channel("#test").unwrap().is_member("alice"));
    }

    #[test]
    fn user_mode_sets_own_wallops_flag() {
        let (mut server, fd) = test_server();
        let msg = Message::new("MODE", vec!["alice".into(), "+w".into()]);
        mode(&mut server, fd, &msg).unwrap();
        assert!(server.users[&fd].flags.contains(crate::flags::UserFlags::WALLOPS));
    }

    #[test]
    fn user_mode_rejects_other_nicks() {
        let (mut server, fd) = test_server();
        let msg = Message::new("MODE", vec!["bob".into(), "+w".into()]);
        mode(&mut server, fd, &msg).unwrap();
        let outq = String::from_utf8_lossy(&server.users[&fd].outq).into_owned();
        assert!(outq.contains("502"));
    }
}
