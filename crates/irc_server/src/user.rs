//! Per-connection user state.
//!
//! The server is single-threaded, so a [`User`] is owned outright by the
//! [`crate::server::Server`]'s connection table and mutated through plain `&mut` — there is no
//! concurrent access to guard against.

use std::collections::HashSet;
use std::time::Instant;

use crate::flags::UserFlags;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// Connected, but hasn't completed PASS/NICK/USER.
    Handshaking,
    /// NICK and USER both received (and PASS matched, if a server password is configured);
    /// the welcome burst has been sent.
    Registered,
    /// QUIT was received or a read/write error tore down the socket. Kept one event-loop
    /// tick so the server can flush the quit message to peers before the fd is dropped.
    Closing,
}

#[derive(Debug)]
pub struct User {
    pub fd: i32,
    pub nickname: Option<String>,
    pub username: Option<String>,
    pub realname: Option<String>,
    /// Resolved at accept time from the peer address; RFC 2812 prefixes use this as `<host>`.
    pub hostname: String,
    pub pass_supplied: Option<String>,
    pub status: RegistrationStatus,
    pub flags: UserFlags,
    pub away_message: Option<String>,
    pub channels: HashSet<String>,
    /// Bytes read from the socket but not yet split into complete lines.
    pub inbuf: String,
    /// Bytes formatted for this connection but not yet written to the socket (backpressure).
    pub outq: Vec<u8>,
    pub connected_at: Instant,
    pub last_activity: Instant,
    /// Set once a PING has been sent while idle; cleared on any line received from the client.
    pub ping_sent_at: Option<Instant>,
}

impl User {
    pub fn new(fd: i32, hostname: String, now: Instant) -> Self {
        User {
            fd,
            nickname: None,
            username: None,
            realname: None,
            hostname,
            pass_supplied: None,
            status: RegistrationStatus::Handshaking,
            flags: UserFlags::empty(),
            away_message: None,
            channels: HashSet::new(),
            inbuf: String::new(),
            outq: Vec::new(),
            connected_at: now,
            last_activity: now,
            ping_sent_at: None,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.status == RegistrationStatus::Registered
    }

    /// `nick!user@host`, as used in every message prefix relayed to other clients.
    pub fn prefix(&self) -> String {
        format!(
            "{}!{}@{}",
            self.nickname.as_deref().unwrap_or("*"),
            self.username.as_deref().unwrap_or("*"),
            self.hostname
        )
    }

    pub fn queue(&mut self, line: &str) {
        self.outq.extend_from_slice(crate::message::frame(line).as_bytes());
    }

    pub fn is_away(&self) -> bool {
        self.away_message.is_some()
    }
}

/// Snapshot of a departed user's identity, kept around for `WHOWAS` lookups.
#[derive(Debug, Clone)]
pub struct WhowasEntry {
    pub username: String,
    pub hostname: String,
    pub realname: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_uses_placeholders_before_registration() {
        let u = User::new(4, "host.example".into(), Instant::now());
        assert_eq!(u.prefix(), "*!*@host.example");
    }

    #[test]
    fn prefix_after_registration() {
        let mut u = User::new(4, "host.example".into(), Instant::now());
        u.nickname = Some("alice".into());
        u.username = Some("alicia".into());
        assert_eq!(u.prefix(), "alice!alicia@host.example");
    }

    #[test]
    fn queue_appends_framed_bytes() {
        let mut u = User::new(4, "h".into(), Instant::now());
        u.queue("PING :x");
        assert_eq!(u.outq, b"PING :x\r\n");
    }
}
