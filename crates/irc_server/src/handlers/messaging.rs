//! PRIVMSG/NOTICE/AWAY/WALLOPS.

use crate::constants::*;
use crate::dispatch::Outcome;
use crate::errors::IrcError;
use crate::flags::{ChannelModes, UserFlags};
use crate::message::Message;
use crate::parsers::comma_list;
use crate::reply;
use crate::server::Server;

use super::need_more_params;

/// Shared delivery path for PRIVMSG/NOTICE; `notice` is `true` for NOTICE, which never
/// generates automatic error replies.
fn deliver(server: &mut Server, fd: i32, message: &Message, notice: bool) -> Result<Outcome, IrcError> {
    let command = if notice { "NOTICE" } else { "PRIVMSG" };
    if message.param(0).is_none() {
        if !notice {
            server.send_numeric(fd, ERR_NORECIPIENT_NB, &[], &format!("{ERR_NORECIPIENT_STR} ({command})"));
        }
        return Ok(Outcome::Continue);
    }
    if message.param(1).is_none() {
        if !notice {
            server.send_numeric(fd, ERR_NOTEXTTOSEND_NB, &[], ERR_NOTEXTTOSEND_STR);
        }
        return Ok(Outcome::Continue);
    }

    let nick = server.users.get(&fd).and_then(|u| u.nickname.clone()).ok_or(IrcError::UnknownUser(fd))?;
    let user = &server.users[&fd];
    let username = user.username.clone().unwrap_or_default();
    let hostname = user.hostname.clone();
    let text = message.params[1].clone();

    let (_, targets) = comma_list(&message.params[0]).map_err(|_| IrcError::Parsing(message.params[0].clone()))?;

    for target in targets {
        if target.starts_with('#') || target.starts_with('&') {
            let check = server
                .channel(target)
                .map(|c| (c.name.clone(), c.modes.contains(ChannelModes::NO_EXTERNAL) && !c.is_member(&nick), c.modes.contains(ChannelModes::MODERATED) && !c.can_speak(&nick)));
            let Some((canonical, blocked_external, blocked_moderated)) = check else {
                if !notice {
                    server.send_numeric(fd, ERR_NOSUCHCHANNEL_NB, &[target], ERR_NOSUCHCHANNEL_STR);
                }
                continue;
            };
            if blocked_external || blocked_moderated {
                if !notice {
                    server.send_numeric(fd, ERR_CANNOTSENDTOCHAN_NB, &[&canonical], ERR_CANNOTSENDTOCHAN_STR);
                }
                continue;
            }
            let line = reply::prefixed_trailing(&nick, &username, &hostname, command, &[&canonical], &text);
            server.broadcast_to_channel(&canonical, &line, Some(fd));
        } else {
            let Some(target_fd) = server.fd_for_nick(target) else {
                if !notice {
                    server.send_numeric(fd, ERR_NOSUCHNICK_NB, &[target], ERR_NOSUCHNICK_STR);
                }
                continue;
            };
            let line = reply::prefixed_trailing(&nick, &username, &hostname, command, &[target], &text);
            server.send_line(target_fd, &line);
            if !notice {
                let away = server.users.get(&target_fd).and_then(|u| u.away_message.clone());
                if let Some(away) = away {
                    server.send_numeric(fd, RPL_AWAY_NB, &[target], &away);
                }
            }
        }
    }
    Ok(Outcome::Continue)
}

pub fn privmsg(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    deliver(server, fd, message, false)
}

pub fn notice(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    deliver(server, fd, message, true)
}

pub fn away(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    let text = message.param(0).filter(|s| !s.is_empty()).map(str::to_owned);
    let user = server.users.get_mut(&fd).ok_or(IrcError::UnknownUser(fd))?;
    user.away_message = text;
    let is_away = user.away_message.is_some();
    if is_away {
        server.send_numeric(fd, RPL_NOWAWAY_NB, &[], RPL_NOWAWAY_STR);
    } else {
        server.send_numeric(fd, RPL_UNAWAY_NB, &[], RPL_UNAWAY_STR);
    }
    Ok(Outcome::Continue)
}

/// Relayed only to users who opted in with user mode `+w`; the sender needs no special
/// privilege to send one.
pub fn wallops(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    if need_more_params(server, fd, "WALLOPS", &message.params, 1) {
        return Ok(Outcome::Continue);
    }
    let nick = server.users.get(&fd).and_then(|u| u.nickname.clone()).ok_or(IrcError::UnknownUser(fd))?;
    let user = &server.users[&fd];
    let username = user.username.clone().unwrap_or_default();
    let hostname = user.hostname.clone();
    let text = message.params[0].clone();
    let line = reply::prefixed_trailing(&nick, &username, &hostname, "WALLOPS", &[], &text);

    let targets: Vec<i32> = server.users.values().filter(|u| u.flags.contains(UserFlags::WALLOPS)).map(|u| u.fd).collect();
    for target_fd in targets {
        server.send_line(target_fd, &line);
    }
    Ok(Outcome::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::time::Instant;

    fn test_server() -> Server {
        let mut config = Config::default();
        config.network.port = 0;
        Server::bind(config).expect("bind ephemeral port for test")
    }

    fn add_user(server: &mut Server, fd: i32, nick: &str) {
        let mut user = crate::user::User::new(fd, "test.host".into(), Instant::now());
        user.nickname = Some(nick.into());
        user.username = Some(nick.into());
        user.status = crate::user::RegistrationStatus::Registered;
        server.users.insert(fd, user);
        server.index_nick(fd, nick);
    }

    #[test]
    fn privmsg_to_unknown_nick_is_401() {
        let mut server = test_server();
        add_user(&mut server, 1, "alice");
        let msg = Message::new("PRIVMSG", vec!["bob".into(), "hi".into()]);
        privmsg(&mut server, 1, &msg).unwrap();
        let outq = &server.users[&1].outq;
        assert!(String::from_utf8_lossy(outq).contains("401"));
    }

    #[test]
    fn notice_to_unknown_nick_sends_nothing() {
        let mut server = test_server();
        add_user(&mut server, 1, "alice");
        let msg = Message::new("NOTICE", vec!["bob".into(), "hi".into()]);
        notice(&mut server, 1, &msg).unwrap();
        assert!(server.users[&1].outq.is_empty());
    }

    #[test]
    fn away_toggles_between_numerics() {
        let mut server = test_server();
        add_user(&mut server, 1, "alice");
        away(&mut server, 1, &Message::new("AWAY", vec!["gone fishing".into()])).unwrap();
        assert!(server.users[&1].is_away());
        server.users.get_mut(&1).unwrap().outq.clear();
        away(&mut server, 1, &Message::new("AWAY", vec![])).unwrap();
        assert!(!server.users[&1].is_away());
    }
}
