//! WHO/WHOIS/WHOWAS/ISON/USERHOST/VERSION/INFO/ADMIN/TIME — informational queries that read
//! server state without mutating it (besides AWAY/WALLOPS, which live in [`super::messaging`]).

use crate::constants::*;
use crate::dispatch::Outcome;
use crate::errors::IrcError;
use crate::flags::{MemberRole, UserFlags};
use crate::message::Message;
use crate::parsers::mask_matches;
use crate::server::Server;
use crate::user::User;

use super::need_more_params;

/// `H`/`G` (here/gone), `*` for server operators, then the channel-role prefix (`@`/`+`) when
/// answering a channel-scoped WHO.
fn who_flags(user: &User, role: MemberRole) -> String {
    let mut s = String::new();
    s.push(if user.is_away() { 'G' } else { 'H' });
    if user.flags.contains(UserFlags::OPER) {
        s.push('*');
    }
    s.push_str(role.prefix());
    s
}

pub fn who(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    let mask = message.param(0).unwrap_or("*").to_owned();
    let server_name = server.server_name.clone();

    if mask.starts_with('#') || mask.starts_with('&') {
        let Some(channel) = server.channel(&mask) else {
            server.send_numeric(fd, RPL_ENDOFWHO_NB, &[&mask], RPL_ENDOFWHO_STR);
            return Ok(Outcome::Continue);
        };
        let canonical = channel.name.clone();
        let members: Vec<(String, MemberRole)> = channel.members.iter().map(|(n, r)| (n.clone(), *r)).collect();

        let mut rows = Vec::new();
        for (nick, role) in members {
            let Some(who_fd) = server.fd_for_nick(&nick) else { continue };
            let Some(user) = server.users.get(&who_fd) else { continue };
            rows.push((
                user.username.clone().unwrap_or_default(),
                user.hostname.clone(),
                nick,
                who_flags(user, role),
                user.realname.clone().unwrap_or_default(),
            ));
        }
        for (username, hostname, nick, flags, realname) in rows {
            server.send_numeric(
                fd,
                RPL_WHOREPLY_NB,
                &[&canonical, &username, &hostname, &server_name, &nick, &flags],
                &format!("0 {realname}"),
            );
        }
        server.send_numeric(fd, RPL_ENDOFWHO_NB, &[&canonical], RPL_ENDOFWHO_STR);
    } else {
        let mut rows = Vec::new();
        for user in server.users.values() {
            if !user.is_registered() {
                continue;
            }
            let nick = user.nickname.as_deref().unwrap_or("");
            if mask != "*" && !mask_matches(&mask, nick) {
                continue;
            }
            rows.push((
                user.username.clone().unwrap_or_default(),
                user.hostname.clone(),
                nick.to_owned(),
                who_flags(user, MemberRole::empty()),
                user.realname.clone().unwrap_or_default(),
            ));
        }
        for (username, hostname, nick, flags, realname) in rows {
            server.send_numeric(
                fd,
                RPL_WHOREPLY_NB,
                &["*", &username, &hostname, &server_name, &nick, &flags],
                &format!("0 {realname}"),
            );
        }
        server.send_numeric(fd, RPL_ENDOFWHO_NB, &[&mask], RPL_ENDOFWHO_STR);
    }
    Ok(Outcome::Continue)
}

pub fn whois(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    if need_more_params(server, fd, "WHOIS", &message.params, 1) {
        return Ok(Outcome::Continue);
    }
    let target_nick = message.params[0].clone();
    let Some(target_fd) = server.fd_for_nick(&target_nick) else {
        server.send_numeric(fd, ERR_NOSUCHNICK_NB, &[&target_nick], ERR_NOSUCHNICK_STR);
        return Ok(Outcome::Continue);
    };
    let server_name = server.server_name.clone();

    let user = &server.users[&target_fd];
    let nick = user.nickname.clone().unwrap_or_default();
    let username = user.username.clone().unwrap_or_default();
    let hostname = user.hostname.clone();
    let realname = user.realname.clone().unwrap_or_default();
    let is_oper = user.flags.contains(UserFlags::OPER);
    let idle_secs = user.last_activity.elapsed().as_secs().to_string();
    let channel_keys: Vec<String> = user.channels.iter().cloned().collect();

    let channel_list: Vec<String> = channel_keys
        .iter()
        .filter_map(|key| server.channels.get(key))
        .map(|c| format!("{}{}", c.role_of(&nick).prefix(), c.name))
        .collect();

    server.send_numeric(fd, RPL_WHOISUSER_NB, &[&nick, &username, &hostname, "*"], &realname);
    server.send_numeric(fd, RPL_WHOISSERVER_NB, &[&nick, &server_name], "single-threaded IRC core");
    if is_oper {
        server.send_numeric(fd, RPL_WHOISOPERATOR_NB, &[&nick], RPL_WHOISOPERATOR_STR);
    }
    server.send_numeric(fd, RPL_WHOISIDLE_NB, &[&nick, &idle_secs], RPL_WHOISIDLE_STR);
    if !channel_list.is_empty() {
        server.send_numeric(fd, RPL_WHOISCHANNELS_NB, &[&nick], &channel_list.join(" "));
    }
    server.send_numeric(fd, RPL_ENDOFWHOIS_NB, &[&nick], RPL_ENDOFWHOIS_STR);
    Ok(Outcome::Continue)
}

pub fn whowas(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    if need_more_params(server, fd, "WHOWAS", &message.params, 1) {
        return Ok(Outcome::Continue);
    }
    let target_nick = message.params[0].clone();
    let entries: Vec<_> = server.whowas(&target_nick).map(|s| s.to_vec()).unwrap_or_default();
    if entries.is_empty() {
        server.send_numeric(fd, ERR_WASNOSUCHNICK_NB, &[&target_nick], ERR_WASNOSUCHNICK_STR);
        return Ok(Outcome::Continue);
    }
    for entry in entries {
        server.send_numeric(
            fd,
            RPL_WHOWASUSER_NB,
            &[&target_nick, &entry.username, &entry.hostname, "*"],
            &entry.realname,
        );
    }
    server.send_numeric(fd, RPL_ENDOFWHOWAS_NB, &[&target_nick], RPL_ENDOFWHOWAS_STR);
    Ok(Outcome::Continue)
}

/// Accepts either `ISON a b c` (separate middle params) or `ISON :a b c` (one trailing param),
/// since real clients send both shapes.
pub fn ison(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    let nicks: Vec<&str> = message.params.iter().flat_map(|p| p.split_whitespace()).collect();
    let present: Vec<&str> = nicks.into_iter().filter(|n| server.nick_taken(n)).collect();
    server.send_numeric(fd, RPL_ISON_NB, &[], &present.join(" "));
    Ok(Outcome::Continue)
}

pub fn userhost(server: &mut Server, fd: i32, message: &Message) -> Result<Outcome, IrcError> {
    let nicks: Vec<String> = message.params.iter().flat_map(|p| p.split_whitespace()).take(5).map(str::to_owned).collect();
    let mut parts = Vec::new();
    for nick in nicks {
        let Some(target_fd) = server.fd_for_nick(&nick) else { continue };
        let user = &server.users[&target_fd];
        let op_marker = if user.flags.contains(UserFlags::OPER) { "*" } else { "" };
        let away_marker = if user.is_away() { '-' } else { '+' };
        parts.push(format!("{nick}{op_marker}={away_marker}{}", user.hostname));
    }
    server.send_numeric(fd, RPL_USERHOST_NB, &[], &parts.join(" "));
    Ok(Outcome::Continue)
}

pub fn version(server: &mut Server, fd: i32, _message: &Message) -> Result<Outcome, IrcError> {
    let server_name = server.server_name.clone();
    let version = server.config.server.version.clone();
    server.send_numeric(fd, RPL_VERSION_NB, &[&version, &server_name], "single-threaded poll(2) core");
    Ok(Outcome::Continue)
}

pub fn info(server: &mut Server, fd: i32, _message: &Message) -> Result<Outcome, IrcError> {
    for line in ["a line-oriented RFC 1459/2812 subset server", "single-threaded, non-blocking, no TLS or server linking"] {
        server.send_numeric(fd, RPL_INFO_NB, &[], line);
    }
    server.send_numeric(fd, RPL_ENDOFINFO_NB, &[], RPL_ENDOFINFO_STR);
    Ok(Outcome::Continue)
}

pub fn admin(server: &mut Server, fd: i32, _message: &Message) -> Result<Outcome, IrcError> {
    let server_name = server.server_name.clone();
    server.send_numeric(fd, RPL_ADMINME_NB, &[&server_name], "Administrative info");
    server.send_numeric(fd, RPL_ADMINLOC1_NB, &[], "unspecified location");
    server.send_numeric(fd, RPL_ADMINLOC2_NB, &[], "unspecified organisation");
    server.send_numeric(fd, RPL_ADMINEMAIL_NB, &[], "admin@localhost");
    Ok(Outcome::Continue)
}

pub fn time(server: &mut Server, fd: i32, _message: &Message) -> Result<Outcome, IrcError> {
    let server_name = server.server_name.clone();
    let now = chrono::Local::now().to_rfc2822();
    server.send_numeric(fd, RPL_TIME_NB, &[&server_name], &now);
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
    fn ison_only_reports_connected_nicks() {
        let mut server = test_server();
        add_user(&mut server, 1, "alice");
        let msg = Message::new("ISON", vec!["alice".into(), "bob".into()]);
        ison(&mut server, 1, &msg).unwrap();
        let outq = String::from_utf8_lossy(&server.users[&1].outq).into_owned();
        assert!(outq.contains(":alice"));
        assert!(!outq.contains("bob"));
    }

    #[test]
    fn whowas_reports_after_disconnect() {
        let mut server = test_server();
        add_user(&mut server, 1, "alice");
        server.quit_user_with_reason(1, "bye");
        let msg = Message::new("WHOWAS", vec!["alice".into()]);
        whowas(&mut server, 1, &msg).unwrap();
        // fd 1 is mid-teardown but still present; the reply still lands in its outq.
        let outq = String::from_utf8_lossy(&server.users[&1].outq).into_owned();
        assert!(outq.contains("314"));
    }

    #[test]
    fn whois_unknown_nick_is_401() {
        let mut server = test_server();
        add_user(&mut server, 1, "alice");
        let msg = Message::new("WHOIS", vec!["ghost".into()]);
        whois(&mut server, 1, &msg).unwrap();
        let outq = String::from_utf8_lossy(&server.users[&1].outq).into_owned();
        assert!(outq.contains("401"));
    }
}
