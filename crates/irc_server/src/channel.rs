//! Channel state.
//!
//! Membership and ban lists are plain `HashMap`/`HashSet`s; there is no `broadcast` channel —
//! [`crate::server::Server`] iterates `members` directly and writes to each connection's
//! `outq`.

use std::collections::{HashMap, HashSet};
use std::time::SystemTime;

use crate::flags::{ChannelModes, MemberRole};
use crate::parsers::mask_matches;

#[derive(Debug)]
pub struct Channel {
    pub name: String,
    pub topic: Option<String>,
    pub topic_set_by: Option<String>,
    pub topic_set_at: Option<SystemTime>,
    /// Member nickname (the map key used everywhere else) -> role bits for this channel.
    pub members: HashMap<String, MemberRole>,
    pub modes: ChannelModes,
    pub key: Option<String>,
    pub user_limit: Option<u32>,
    /// Ban masks (`nick!user@host`, wildcards allowed).
    pub bans: HashSet<String>,
    /// Nicknames invited past `+i`; cleared once the invited user joins or parts unused.
    pub invited: HashSet<String>,
    pub created_at: SystemTime,
}

impl Channel {
    pub fn new(name: impl Into<String>, now: SystemTime) -> Self {
        Channel {
            name: name.into(),
            topic: None,
            topic_set_by: None,
            topic_set_at: None,
            members: HashMap::new(),
            modes: ChannelModes::empty(),
            key: None,
            user_limit: None,
            bans: HashSet::new(),
            invited: HashSet::new(),
            created_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_member(&self, nick: &str) -> bool {
        self.members.contains_key(nick)
    }

    pub fn role_of(&self, nick: &str) -> MemberRole {
        self.members.get(nick).copied().unwrap_or_default()
    }

    pub fn is_operator(&self, nick: &str) -> bool {
        self.role_of(nick).contains(MemberRole::OP)
    }

    pub fn can_speak(&self, nick: &str) -> bool {
        if !self.modes.contains(ChannelModes::MODERATED) {
            return true;
        }
        let role = self.role_of(nick);
        role.contains(MemberRole::OP) || role.contains(MemberRole::VOICE)
    }

    pub fn is_banned(&self, hostmask: &str) -> bool {
        self.bans.iter().any(|mask| mask_matches(mask, hostmask))
    }

    pub fn is_full(&self) -> bool {
        match self.user_limit {
            Some(limit) => self.modes.contains(ChannelModes::LIMIT) && self.members.len() as u32 >= limit,
            None => false,
        }
    }

    /// Ops the first joiner automatically, mirroring the reference server's behaviour for a
    /// freshly-created channel (`Server.cpp`'s `Channel::addClient` grants `@` when the
    /// channel was just created).
    pub fn add_member(&mut self, nick: &str, is_founder: bool) {
        let role = if is_founder { MemberRole::OP } else { MemberRole::empty() };
        self.members.insert(nick.to_owned(), role);
        self.invited.remove(nick);
    }

    pub fn remove_member(&mut self, nick: &str) {
        self.members.remove(nick);
    }

    pub fn rename_member(&mut self, old: &str, new: &str) {
        if let Some(role) = self.members.remove(old) {
            self.members.insert(new.to_owned(), role);
        }
    }

    /// Comma-joined `NAMES`-style member list with `@`/`+` prefixes, in insertion-independent
    /// (alphabetical) order for deterministic output.
    pub fn names_list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .members
            .iter()
            .map(|(nick, role)| format!("{}{}", role.prefix(), nick))
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chan() -> Channel {
        Channel::new("#test", SystemTime::now())
    }

    #[test]
    fn founder_is_opped_on_join() {
        let mut c = chan();
        c.add_member("alice", true);
        assert!(c.is_operator("alice"));
    }

    #[test]
    fn later_joiners_are_not_opped() {
        let mut c = chan();
        c.add_member("alice", true);
        c.add_member("bob", false);
        assert!(!c.is_operator("bob"));
    }

    #[test]
    fn moderated_blocks_unvoiced_members() {
        let mut c = chan();
        c.add_member("alice", true);
        c.add_member("bob", false);
        c.modes.insert(ChannelModes::MODERATED);
        assert!(c.can_speak("alice"));
        assert!(!c.can_speak("bob"));
    }

    #[test]
    fn ban_matching_is_wildcard_aware() {
        let mut c = chan();
        c.bans.insert("*!*@bad.example.com".into());
        assert!(c.is_banned("troll!user@bad.example.com"));
        assert!(!c.is_banned("troll!user@good.example.com"));
    }

    #[test]
    fn full_channel_requires_limit_mode_set() {
        let mut c = chan();
        c.add_member("alice", true);
        c.user_limit = Some(1);
        assert!(!c.is_full());
        c.modes.insert(ChannelModes::LIMIT);
        assert!(c.is_full());
    }

    #[test]
    fn names_list_is_sorted_and_prefixed() {
        let mut c = chan();
        c.add_member("zed", false);
        c.add_member("alice", true);
        assert_eq!(c.names_list(), vec!["@alice".to_string(), "zed".to_string()]);
    }

    #[test]
    fn rename_member_preserves_role() {
        let mut c = chan();
        c.add_member("alice", true);
        c.rename_member("alice", "alice2");
        assert!(c.is_operator("alice2"));
        assert!(!c.is_member("alice"));
    }
}
