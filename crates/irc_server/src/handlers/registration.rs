//! PASS/NICK/USER handshake, liveness (PING/PONG), CAP stub, and QUIT.

use crate::constants::*;
use crate::dispatch::Outcome;
use crate::errors::IrcError;
use crate::message::Message;
use crate::parsers::is_valid_nickname;
use crate::reply;
use crate::server::Server;
use crate::user::RegistrationStatus;

use super::need_more_params;

pub fn pass(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    if need_more_params(server, fd, "PASS", &message.params, 1) {
        return Ok(Outcome::Continue);
    }
    if server.users.get(&fd).map(|u| u.is_registered()).unwrap_or(false) {
        server.send_numeric(fd, ERR_ALREADYREGISTRED_NB, &[], ERR_ALREADYREGISTRED_STR);
        return Ok(Outcome::Continue);
    }
    let user = server.users.get_mut(&fd).ok_or(IrcError::UnknownUser(fd))?;
    user.pass_supplied = Some(message.params[0].clone());
    Ok(Outcome::Continue)
}

pub fn nick(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    if message.params.is_empty() || message.params[0].is_empty() {
        server.send_numeric(fd, ERR_NONICKNAMEGIVEN_NB, &[], ERR_NONICKNAMEGIVEN_STR);
        return Ok(Outcome::Continue);
    }
    let new_nick = &message.params[0];
    let max_len = server.config.limits.max_nickname_length;
    if !is_valid_nickname(new_nick) || new_nick.len() > max_len {
        server.send_numeric(fd, ERR_ERRONEUSNICKNAME_NB, &[new_nick], ERR_ERRONEUSNICKNAME_STR);
        return Ok(Outcome::Continue);
    }

    if let Some(holder_fd) = server.fd_for_nick(new_nick) {
        if holder_fd != fd {
            server.send_numeric(fd, ERR_NICKNAMEINUSE_NB, &[new_nick], ERR_NICKNAMEINUSE_STR);
            return Ok(Outcome::Continue);
        }
    }

    let old_nick = server.users.get(&fd).and_then(|u| u.nickname.clone());
    if let Some(old) = &old_nick {
        let prefix = server.users[&fd].prefix();
        let line = format!(":{prefix} NICK :{new_nick}");
        let channels: Vec<String> = server.users[&fd].channels.iter().cloned().collect();
        let mut notified = std::collections::HashSet::new();
        for chan_key in &channels {
            let Some(channel) = server.channel_mut(chan_key) else { continue };
            channel.rename_member(old, new_nick);
            let members: Vec<String> = channel.members.keys().cloned().collect();
            for member_nick in &members {
                if let Some(f) = server.fd_for_nick(member_nick) {
                    notified.insert(f);
                }
            }
        }
        notified.insert(fd);
        for target_fd in notified {
            server.send_line(target_fd, &line);
        }
        server.unindex_nick(old);
    }

    server.index_nick(fd, new_nick);
    server.users.get_mut(&fd).unwrap().nickname = Some(new_nick.clone());
    maybe_complete_registration(server, fd);
    Ok(Outcome::Continue)
}

pub fn user(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    if need_more_params(server, fd, "USER", &message.params, 4) {
        return Ok(Outcome::Continue);
    }
    if server.users.get(&fd).map(|u| u.is_registered()).unwrap_or(false) {
        server.send_numeric(fd, ERR_ALREADYREGISTRED_NB, &[], ERR_ALREADYREGISTRED_STR);
        return Ok(Outcome::Continue);
    }
    let user = server.users.get_mut(&fd).ok_or(IrcError::UnknownUser(fd))?;
    user.username = Some(message.params[0].clone());
    user.realname = Some(message.params[3].clone());
    maybe_complete_registration(server, fd);
    Ok(Outcome::Continue)
}

fn maybe_complete_registration(server: &mut Server, fd: i32) {
    let Some(user) = server.users.get(&fd) else { return };
    if user.is_registered() || user.nickname.is_none() || user.username.is_none() {
        return;
    }
    if server.config.requires_password() {
        let supplied_ok = user
            .pass_supplied
            .as_deref()
            .map(|p| p == server.config.server.password)
            .unwrap_or(false);
        if !supplied_ok {
            server.send_numeric(fd, ERR_PASSWDMISMATCH_NB, &[], ERR_PASSWDMISMATCH_STR);
            server.quit_user_with_reason(fd, "Password incorrect");
            return;
        }
    }

    server.users.get_mut(&fd).unwrap().status = RegistrationStatus::Registered;
    send_welcome_burst(server, fd);
}

fn send_welcome_burst(server: &mut Server, fd: i32) {
    let server_name = server.server_name.clone();
    let version = server.config.server.version.clone();
    let user = &server.users[&fd];
    let nick = user.nickname.clone().unwrap();
    let username = user.username.clone().unwrap();
    let hostname = user.hostname.clone();

    server.send_line(fd, &reply::welcome(&server_name, &nick, &username, &hostname));
    server.send_line(fd, &reply::yourhost(&server_name, &nick, &version));
    server.send_line(fd, &reply::created(&server_name, &nick, "at server startup"));
    server.send_line(fd, &reply::myinfo(&server_name, &nick, &version, "iow", "itnsmkl"));
    server.send_line(
        fd,
        &reply::isupport(
            &server_name,
            &nick,
            &[
                format!("CASEMAPPING={}", crate::casemap::CASEMAPPING),
                "CHANTYPES=#&".to_owned(),
                format!("NICKLEN={}", server.config.limits.max_nickname_length),
                format!("CHANNELLEN={}", server.config.limits.max_channel_name_length),
                format!("TOPICLEN={}", server.config.limits.max_topic_length),
            ],
        ),
    );

    match server.motd.clone() {
        Some(lines) => {
            server.send_numeric(fd, RPL_MOTDSTART_NB, &[], &format!("- {server_name} Message of the Day -"));
            for line in &lines {
                server.send_numeric(fd, RPL_MOTD_NB, &[], &format!("- {line}"));
            }
            server.send_numeric(fd, RPL_ENDOFMOTD_NB, &[], RPL_ENDOFMOTD_STR);
        }
        None => {
            server.send_numeric(fd, ERR_NOMOTD_NB, &[], ERR_NOMOTD_STR);
        }
    }
}

pub fn quit(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    let reason = message.param(0).unwrap_or("Client quit").to_owned();
    server.quit_user_with_reason(fd, &reason);
    Ok(Outcome::Disconnect)
}

pub fn ping(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    let server_name = server.server_name.clone();
    let token = message.param(0).unwrap_or(&server_name).to_owned();
    server.send_line(fd, &format!(":{server_name} PONG {server_name} :{token}"));
    Ok(Outcome::Continue)
}

pub fn pong(_server: &mut Server, _fd: i32, _message: &Message) -> Result<Outcome, IrcError> {
    // last_activity/ping_sent_at are already cleared unconditionally on any inbound line
    // in Server::read_and_dispatch, so PONG itself needs no special handling.
    Ok(Outcome::Continue)
}

/// The core does not negotiate any capabilities; `CAP LS` gets an empty list and `CAP END`
/// is acknowledged silently so capability-aware clients can still complete registration.
pub fn cap(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    let sub = message.param(0).unwrap_or("").to_ascii_uppercase();
    if sub == "LS" || sub == "LIST" {
        server.send_line(fd, &format!("CAP * {sub} :"));
    }
    Ok(Outcome::Continue)
}
