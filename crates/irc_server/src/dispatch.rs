//! Command dispatch table: uppercased command name -> handler function pointer.
//!
//! Reimplemented as a `HashMap<&'static str, fn(...)>` of free functions rather than a
//! pointer-to-member-function table. A handler never unwinds: any [`IrcError`] it returns is
//! converted to a numeric reply by [`dispatch`] itself, so the event loop only ever sees
//! `Outcome`.

use std::collections::HashMap;

use crate::errors::IrcError;
use crate::handlers;
use crate::message::Message;
use crate::server::Server;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Disconnect,
}

pub type HandlerFn = fn(&mut Server, i32, &Message) -> Result<Outcome, IrcError>;
pub type DispatchTable = HashMap<&'static str, HandlerFn>;

pub fn build_table() -> DispatchTable {
    let mut t: DispatchTable = HashMap::new();

    t.insert("PASS", handlers::registration::pass);
    t.insert("NICK", handlers::registration::nick);
    t.insert("USER", handlers::registration::user);
    t.insert("QUIT", handlers::registration::quit);
    t.insert("PING", handlers::registration::ping);
    t.insert("PONG", handlers::registration::pong);
    t.insert("CAP", handlers::registration::cap);

    t.insert("JOIN", handlers::channel::join);
    t.insert("PART", handlers::channel::part);
    t.insert("TOPIC", handlers::channel::topic);
    t.insert("MODE", handlers::channel::mode);
    t.insert("INVITE", handlers::channel::invite);
    t.insert("KICK", handlers::channel::kick);
    t.insert("NAMES", handlers::channel::names);
    t.insert("LIST", handlers::channel::list);

    t.insert("PRIVMSG", handlers::messaging::privmsg);
    t.insert("NOTICE", handlers::messaging::notice);
    t.insert("AWAY", handlers::messaging::away);
    t.insert("WALLOPS", handlers::messaging::wallops);

    t.insert("WHO", handlers::query::who);
    t.insert("WHOIS", handlers::query::whois);
    t.insert("WHOWAS", handlers::query::whowas);
    t.insert("ISON", handlers::query::ison);
    t.insert("USERHOST", handlers::query::userhost);
    t.insert("VERSION", handlers::query::version);
    t.insert("INFO", handlers::query::info);
    t.insert("ADMIN", handlers::query::admin);
    t.insert("TIME", handlers::query::time);

    t
}

/// Looks up `message.command` (already uppercased by the parser) and runs its handler,
/// converting any returned [`IrcError`] into a numeric reply. Unknown commands get
/// `ERR_UNKNOWNCOMMAND` (421); commands from an unregistered connection other than the
/// handshake set get `ERR_NOTREGISTERED` (451).
pub fn dispatch(server: &mut Server, fd: i32, message: &Message) -> Outcome {
    const PRE_REGISTRATION_ALLOWED: &[&str] = &["PASS", "NICK", "USER", "QUIT", "PING", "PONG", "CAP"];

    let registered = server.users.get(&fd).map(|u| u.is_registered()).unwrap_or(false);
    if !registered && !PRE_REGISTRATION_ALLOWED.contains(&message.command.as_str()) {
        server.send_numeric(
            fd,
            crate::constants::ERR_NOTREGISTERED_NB,
            &[],
            crate::constants::ERR_NOTREGISTERED_STR,
        );
        return Outcome::Continue;
    }

    let Some(&handler) = build_table_ref(server).get(message.command.as_str()) else {
        server.send_numeric(
            fd,
            crate::constants::ERR_UNKNOWNCOMMAND_NB,
            &[&message.command],
            crate::constants::ERR_UNKNOWNCOMMAND_STR,
        );
        return Outcome::Continue;
    };

    match handler(server, fd, message) {
        Ok(outcome) => outcome,
        Err(err) => {
            log::debug!("fd {fd} command {} failed: {err}", message.command);
            Outcome::Continue
        }
    }
}

/// The dispatch table never changes at runtime, so [`Server`] builds it once at construction;
/// this just hands back a reference for lookup without borrowing `server` mutably twice.
fn build_table_ref(server: &Server) -> &DispatchTable {
    server.dispatch_table()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_every_documented_command() {
        let t = build_table();
        for cmd in [
            "PASS", "NICK", "USER", "QUIT", "PRIVMSG", "NOTICE", "AWAY", "WHO", "WHOIS", "WHOWAS",
            "MODE", "TOPIC", "JOIN", "PART", "INVITE", "KICK", "NAMES", "LIST", "WALLOPS", "PING",
            "PONG", "ISON", "USERHOST", "VERSION", "INFO", "ADMIN", "TIME",
        ] {
            assert!(t.contains_key(cmd), "missing handler for {cmd}");
        }
    }
}
