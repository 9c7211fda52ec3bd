//! Bitset types for user modes, channel modes, and per-membership roles.

use bitflags::bitflags;

bitflags! {
    /// User modes settable via `MODE <nick> (+|-)<letters>`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UserFlags: u8 {
        /// `+i`: hidden from `WHO`/`NAMES` unless sharing a channel with the viewer.
        const INVISIBLE = 0b0000_0001;
        /// `+o`: server operator, grants `KILL`/`OPER`-guarded command access.
        const OPER      = 0b0000_0010;
        /// `+w`: receives `WALLOPS` broadcasts.
        const WALLOPS   = 0b0000_0100;
    }
}

impl UserFlags {
    /// Renders the set flags as a mode-letter string, e.g. `"iw"`, for `RPL_UMODEIS`.
    pub fn to_mode_string(self) -> String {
        let mut s = String::new();
        if self.contains(UserFlags::INVISIBLE) {
            s.push('i');
        }
        if self.contains(UserFlags::OPER) {
            s.push('o');
        }
        if self.contains(UserFlags::WALLOPS) {
            s.push('w');
        }
        s
    }

    pub fn letter_to_flag(c: char) -> Option<UserFlags> {
        match c {
            'i' => Some(UserFlags::INVISIBLE),
            'o' => Some(UserFlags::OPER),
            'w' => Some(UserFlags::WALLOPS),
            _ => None,
        }
    }
}

bitflags! {
    /// Channel modes settable via `MODE #chan (+|-)<letters> [args...]`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChannelModes: u16 {
        /// `+i`: JOIN requires a matching invite.
        const INVITE_ONLY  = 0b0000_0001;
        /// `+t`: TOPIC restricted to channel operators.
        const TOPIC_LOCK   = 0b0000_0010;
        /// `+n`: PRIVMSG from outside the channel is rejected.
        const NO_EXTERNAL  = 0b0000_0100;
        /// `+s`: channel hidden from `LIST`/`WHOIS` for non-members.
        const SECRET       = 0b0000_1000;
        /// `+m`: only voiced/op members may speak.
        const MODERATED    = 0b0001_0000;
        /// `+k`: JOIN requires the configured key.
        const KEY          = 0b0010_0000;
        /// `+l`: JOIN rejected once membership reaches the configured limit.
        const LIMIT        = 0b0100_0000;
    }
}

impl ChannelModes {
    /// Renders the set flags (excluding `+k`/`+l`, which carry their own value fields) as a
    /// mode-letter string for `RPL_CHANNELMODEIS`.
    pub fn to_mode_string(self) -> String {
        let mut s = String::from("+");
        if self.contains(ChannelModes::INVITE_ONLY) {
            s.push('i');
        }
        if self.contains(ChannelModes::TOPIC_LOCK) {
            s.push('t');
        }
        if self.contains(ChannelModes::NO_EXTERNAL) {
            s.push('n');
        }
        if self.contains(ChannelModes::SECRET) {
            s.push('s');
        }
        if self.contains(ChannelModes::MODERATED) {
            s.push('m');
        }
        if self.contains(ChannelModes::KEY) {
            s.push('k');
        }
        if self.contains(ChannelModes::LIMIT) {
            s.push('l');
        }
        s
    }

    pub fn letter_to_flag(c: char) -> Option<ChannelModes> {
        match c {
            'i' => Some(ChannelModes::INVITE_ONLY),
            't' => Some(ChannelModes::TOPIC_LOCK),
            'n' => Some(ChannelModes::NO_EXTERNAL),
            's' => Some(ChannelModes::SECRET),
            'm' => Some(ChannelModes::MODERATED),
            'k' => Some(ChannelModes::KEY),
            'l' => Some(ChannelModes::LIMIT),
            _ => None,
        }
    }

    /// Mode letters that carry an argument when set (`k`, `l`) or, for `b`/`o`/`v` (handled
    /// separately as membership/ban operations), always.
    pub fn takes_arg_when_setting(c: char) -> bool {
        matches!(c, 'k' | 'l')
    }
}

bitflags! {
    /// Per-membership role within a single channel. `OP` and `VOICE` are independent: a
    /// member can hold both simultaneously.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MemberRole: u8 {
        const OP    = 0b0000_0001;
        const VOICE = 0b0000_0010;
    }
}

impl MemberRole {
    /// Prefix used in `NAMES`/`WHO` replies: `@` outranks `+`.
    pub fn prefix(self) -> &'static str {
        if self.contains(MemberRole::OP) {
            "@"
        } else if self.contains(MemberRole::VOICE) {
            "+"
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_flags_round_trip_mode_string() {
        let f = UserFlags::INVISIBLE | UserFlags::WALLOPS;
        assert_eq!(f.to_mode_string(), "iw");
    }

    #[test]
    fn channel_modes_mode_string_is_sorted_by_declaration() {
        let m = ChannelModes::NO_EXTERNAL | ChannelModes::INVITE_ONLY;
        assert_eq!(m.to_mode_string(), "+in");
    }

    #[test]
    fn op_outranks_voice_in_prefix() {
        let r = MemberRole::OP | MemberRole::VOICE;
        assert_eq!(r.prefix(), "@");
        assert_eq!(MemberRole::VOICE.prefix(), "+");
        assert_eq!(MemberRole::empty().prefix(), "");
    }
}
