//! Server state and the single-threaded event loop.
//!
//! Owns every [`crate::user::User`] and [`crate::channel::Channel`] outright; channels reference
//! members only by nickname, never by a borrowed/shared pointer, so there is nothing here that
//! needs a lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, SystemTime};

use log::{debug, error, info, warn};

use crate::casemap::irc_lower;
use crate::channel::Channel;
use crate::config::Config;
use crate::constants::*;
use crate::dispatch::{self, DispatchTable, Outcome};
use crate::message::{self, Message};
use crate::net::{self, PollRequest};
use crate::reply;
use crate::user::{RegistrationStatus, User, WhowasEntry};

/// Scratch buffer size for a single non-blocking `recv`.
const READ_CHUNK: usize = 4096;
/// `poll` timeout per event-loop tick.
const TICK: Duration = Duration::from_millis(200);
/// How many historical entries `WHOWAS` keeps per case-folded nickname.
const WHOWAS_HISTORY_PER_NICK: usize = 3;

/// Set from a `SIGINT`/`SIGTERM` handler; [`Server::run`] checks this once per tick so the
/// signal handler itself only has to do an async-signal-safe atomic store.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn request_shutdown_signal(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Installs handlers for `SIGINT`/`SIGTERM` that flag [`Server::run`]'s loop to exit cleanly
/// on the next tick instead of killing the process mid-flush.
pub fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGINT, request_shutdown_signal as libc::sighandler_t);
        libc::signal(libc::SIGTERM, request_shutdown_signal as libc::sighandler_t);
    }
}

pub struct Server {
    pub config: Config,
    pub server_name: String,
    pub motd: Option<Vec<String>>,
    pub start_time: SystemTime,
    listen_fd: i32,
    pub users: HashMap<i32, User>,
    /// Case-folded nickname -> fd, kept in lockstep with `users[fd].nickname`.
    nick_index: HashMap<String, i32>,
    /// Case-folded channel name -> Channel.
    pub channels: HashMap<String, Channel>,
    /// Case-folded nickname -> most recent [`WhowasEntry`] snapshots, newest first.
    whowas: HashMap<String, Vec<WhowasEntry>>,
    dispatch: DispatchTable,
    shutting_down: bool,
}

impl Server {
    pub fn bind(config: Config) -> std::io::Result<Self> {
        let listen_fd = net::listen(&config.network.bind_address, config.network.port)?;
        let motd = crate::motd::load(&config.server.motd_path);
        let server_name = config.server.name.clone();
        info!(
            "listening on {}:{} as {server_name}",
            config.network.bind_address, config.network.port
        );
        Ok(Server {
            config,
            server_name,
            motd,
            start_time: SystemTime::now(),
            listen_fd,
            users: HashMap::new(),
            nick_index: HashMap::new(),
            channels: HashMap::new(),
            whowas: HashMap::new(),
            dispatch: dispatch::build_table(),
            shutting_down: false,
        })
    }

    pub fn request_shutdown(&mut self) {
        self.shutting_down = true;
    }

    /// The port actually bound by the listening socket; differs from `config.network.port`
    /// when that was configured as `0` (OS-assigned, used by tests).
    pub fn local_port(&self) -> std::io::Result<u16> {
        net::local_port(self.listen_fd)
    }

    pub(crate) fn dispatch_table(&self) -> &DispatchTable {
        &self.dispatch
    }

    /// Runs the event loop until `request_shutdown` is called (typically from a signal
    /// handler installed by the binary). Each iteration: accept, poll, read+dispatch,
    /// housekeeping, flush.
    pub fn run(&mut self) {
        while !self.shutting_down && !SHUTDOWN_REQUESTED.load(Ordering::SeqCst) {
            self.accept_pending();

            let requests: Vec<PollRequest> = self
                .users
                .values()
                .map(|u| PollRequest {
                    fd: u.fd,
                    want_write: !u.outq.is_empty(),
                })
                .collect();

            let ready = match net::poll(&requests, Some(TICK.as_millis() as i32)) {
                Ok(ready) => ready,
                Err(err) => {
                    error!("poll failed: {err}");
                    continue;
                }
            };

            for (fd, readable, writable, hup_or_err) in ready {
                if hup_or_err {
                    self.quit_user_with_reason(fd, "Connection reset by peer");
                    continue;
                }
                if readable {
                    self.read_and_dispatch(fd);
                }
                if writable {
                    self.flush_one(fd);
                }
            }

            self.housekeeping();
            self.flush_all();
        }
        self.shutdown();
    }

    fn accept_pending(&mut self) {
        loop {
            match net::accept(self.listen_fd) {
                Ok(Some((fd, addr))) => {
                    info!("accepted connection from {addr} on fd {fd}");
                    let user = User::new(fd, addr.ip().to_string(), Instant::now());
                    self.users.insert(fd, user);
                }
                Ok(None) => break,
                Err(err) => {
                    warn!("accept failed: {err}");
                    break;
                }
            }
        }
    }

    fn read_and_dispatch(&mut self, fd: i32) {
        let mut buf = [0u8; READ_CHUNK];
        let n = match net::recv_nonblocking(fd, &mut buf) {
            Ok(n) if n == usize::MAX => return,
            Ok(0) => {
                self.quit_user_with_reason(fd, "Connection closed");
                return;
            }
            Ok(n) => n,
            Err(err) => {
                debug!("recv failed on fd {fd}: {err}");
                self.quit_user_with_reason(fd, "Connection reset by peer");
                return;
            }
        };

        let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
        let Some(user) = self.users.get_mut(&fd) else { return };
        user.inbuf.push_str(&chunk);
        if user.inbuf.len() > MAX_LINE_LEN * 16 {
            warn!("fd {fd} exceeded input buffer budget, disconnecting");
            self.quit_user_with_reason(fd, "Input buffer exceeded");
            return;
        }

        let (lines, remainder): (Vec<String>, String) = {
            let (lines, rest) = message::split_lines(&user.inbuf);
            (lines.into_iter().map(str::to_owned).collect(), rest.to_owned())
        };
        user.inbuf = remainder;
        user.last_activity = Instant::now();
        user.ping_sent_at = None;

        for line in lines {
            if !self.users.contains_key(&fd) {
                break;
            }
            self.dispatch_line(fd, &line);
        }
    }

    fn dispatch_line(&mut self, fd: i32, line: &str) {
        let message = match Message::parse(line) {
            Ok(m) => m,
            Err(_) => return,
        };
        debug!("fd {fd} -> {} {:?}", message.command, message.params);
        match dispatch::dispatch(self, fd, &message) {
            Outcome::Continue => {}
            Outcome::Disconnect => self.mark_closing(fd),
        }
    }

    fn housekeeping(&mut self) {
        let now = Instant::now();
        let idle = Duration::from_secs(self.config.limits.ping_idle_seconds);
        let timeout = Duration::from_secs(self.config.limits.ping_timeout_seconds);
        let server_name = self.server_name.clone();

        let mut to_ping = Vec::new();
        let mut to_close = Vec::new();
        for user in self.users.values() {
            if user.status == RegistrationStatus::Closing {
                continue;
            }
            match user.ping_sent_at {
                Some(sent) if now.duration_since(sent) > timeout => to_close.push(user.fd),
                Some(_) => {}
                None if now.duration_since(user.last_activity) > idle => to_ping.push(user.fd),
                None => {}
            }
        }

        for fd in to_ping {
            if let Some(user) = self.users.get_mut(&fd) {
                user.queue(&format!("PING :{server_name}"));
                user.ping_sent_at = Some(now);
            }
        }

        for fd in to_close {
            self.quit_user_with_reason(fd, "Ping timeout");
        }

        self.reap_closing_connections();
        self.channels.retain(|name, channel| {
            let keep = !channel.is_empty();
            if !keep {
                debug!("dropping empty channel {name}");
            }
            keep
        });
    }

    fn reap_closing_connections(&mut self) {
        let closing: Vec<i32> = self
            .users
            .iter()
            .filter(|(_, u)| u.status == RegistrationStatus::Closing)
            .map(|(fd, _)| *fd)
            .collect();

        for fd in closing {
            self.flush_one(fd);
            if let Some(user) = self.users.remove(&fd) {
                if let Some(nick) = &user.nickname {
                    self.nick_index.remove(&irc_lower(nick));
                }
                net::close(fd);
                info!("closed connection on fd {fd}");
            }
        }
    }

    fn mark_closing(&mut self, fd: i32) {
        if let Some(user) = self.users.get_mut(&fd) {
            user.status = RegistrationStatus::Closing;
        }
    }

    /// Sets `Closing`, broadcasts QUIT to every channel the user belonged to, and removes
    /// membership from those channels. The fd itself is reaped on the next housekeeping pass
    /// so any already-queued replies still get flushed first.
    pub fn quit_user_with_reason(&mut self, fd: i32, reason: &str) {
        let Some(user) = self.users.get(&fd) else { return };
        let prefix = user.prefix();
        let channels: Vec<String> = user.channels.iter().cloned().collect();
        let nick = user.nickname.clone();

        if let Some(nick) = &nick {
            self.record_whowas(nick, fd);
        }

        let quit_line = format!(":{prefix} QUIT :{reason}");
        let mut notified = std::collections::HashSet::new();
        for chan_key in &channels {
            if let Some(channel) = self.channels.get_mut(chan_key) {
                for member_nick in channel.members.keys() {
                    if let Some(&member_fd) = self.nick_index.get(&irc_lower(member_nick)) {
                        notified.insert(member_fd);
                    }
                }
                if let Some(nick) = &nick {
                    channel.remove_member(nick);
                }
            }
        }
        for member_fd in notified {
            if member_fd != fd {
                self.send_line(member_fd, &quit_line);
            }
        }

        if let Some(user) = self.users.get_mut(&fd) {
            user.status = RegistrationStatus::Closing;
            user.channels.clear();
        }
    }

    fn flush_one(&mut self, fd: i32) {
        let Some(user) = self.users.get_mut(&fd) else { return };
        if user.outq.is_empty() {
            return;
        }
        match net::send_nonblocking(fd, &user.outq) {
            Ok(0) => {}
            Ok(n) => {
                user.outq.drain(..n);
            }
            Err(err) => {
                debug!("send failed on fd {fd}: {err}");
                user.status = RegistrationStatus::Closing;
                user.channels.clear();
            }
        }
    }

    fn flush_all(&mut self) {
        let fds: Vec<i32> = self.users.keys().copied().collect();
        for fd in fds {
            self.flush_one(fd);
        }
    }

    fn shutdown(&mut self) {
        info!("shutting down, closing {} connection(s)", self.users.len());
        for fd in self.users.keys().copied().collect::<Vec<_>>() {
            self.flush_one(fd);
            net::close(fd);
        }
        self.users.clear();
        self.channels.clear();
        net::close(self.listen_fd);
    }

    // --- helpers used by command handlers ---

    pub fn send_line(&mut self, fd: i32, line: &str) {
        if let Some(user) = self.users.get_mut(&fd) {
            user.queue(line);
        }
    }

    pub fn send_numeric(&mut self, fd: i32, code: u16, rest: &[&str], text: &str) {
        let target = self
            .users
            .get(&fd)
            .and_then(|u| u.nickname.clone())
            .unwrap_or_else(|| "*".to_owned());
        let server_name = self.server_name.clone();
        let line = reply::numeric(&server_name, code, &target, rest, text);
        self.send_line(fd, &line);
    }

    pub fn fd_for_nick(&self, nick: &str) -> Option<i32> {
        self.nick_index.get(&irc_lower(nick)).copied()
    }

    pub fn nick_taken(&self, nick: &str) -> bool {
        self.nick_index.contains_key(&irc_lower(nick))
    }

    pub fn index_nick(&mut self, fd: i32, nick: &str) {
        self.nick_index.insert(irc_lower(nick), fd);
    }

    pub fn unindex_nick(&mut self, nick: &str) {
        self.nick_index.remove(&irc_lower(nick));
    }

    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.get_mut(&irc_lower(name))
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&irc_lower(name))
    }

    pub fn get_or_create_channel(&mut self, name: &str) -> &mut Channel {
        let key = irc_lower(name);
        self.channels
            .entry(key)
            .or_insert_with(|| Channel::new(name.to_owned(), SystemTime::now()))
    }

    /// Snapshots a still-connected user's identity under its case-folded nickname, newest
    /// entry first, trimmed to [`WHOWAS_HISTORY_PER_NICK`]. Called just before the user is
    /// torn down so `WHOWAS` can still answer after the connection is gone.
    fn record_whowas(&mut self, nick: &str, fd: i32) {
        let Some(user) = self.users.get(&fd) else { return };
        let entry = WhowasEntry {
            username: user.username.clone().unwrap_or_default(),
            hostname: user.hostname.clone(),
            realname: user.realname.clone().unwrap_or_default(),
        };
        let history = self.whowas.entry(irc_lower(nick)).or_default();
        history.insert(0, entry);
        history.truncate(WHOWAS_HISTORY_PER_NICK);
    }

    pub fn whowas(&self, nick: &str) -> Option<&[WhowasEntry]> {
        self.whowas.get(&irc_lower(nick)).map(Vec::as_slice)
    }

    /// Sends `line` to every member of `channel_name`, optionally skipping one fd (the
    /// originating sender, so it doesn't see its own PRIVMSG echoed back).
    pub fn broadcast_to_channel(&mut self, channel_name: &str, line: &str, skip_fd: Option<i32>) {
        let Some(channel) = self.channel(channel_name) else { return };
        let targets: Vec<i32> = channel
            .members
            .keys()
            .filter_map(|nick| self.fd_for_nick(nick))
            .filter(|fd| Some(*fd) != skip_fd)
            .collect();
        for fd in targets {
            self.send_line(fd, line);
        }
    }
}
