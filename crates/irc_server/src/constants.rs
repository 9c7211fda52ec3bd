//! Numeric reply codes used by the core (RFC 1459 / RFC 2812).
//!
//! Only the triggering conditions for these numerics are part of the specified core; the
//! exact wording of each `_STR` constant is a rote transcription of the RFC and is kept here
//! purely so [`crate::reply`] has something reasonable to send.

pub const PING_IDLE_SECONDS_DEFAULT: u64 = 120;
pub const PING_TIMEOUT_SECONDS_DEFAULT: u64 = 60;
pub const MAX_LINE_LEN: usize = 512;
pub const LISTEN_BACKLOG: i32 = 128;

// Connection registration
pub const RPL_WELCOME_NB: u16 = 1;
pub const RPL_WELCOME_STR: &str = "Welcome to the Internet Relay Network";
pub const RPL_YOURHOST_NB: u16 = 2;
pub const RPL_YOURHOST_STR: &str = "Your host is";
pub const RPL_CREATED_NB: u16 = 3;
pub const RPL_CREATED_STR: &str = "This server was created";
pub const RPL_MYINFO_NB: u16 = 4;
pub const RPL_ISUPPORT_NB: u16 = 5;
pub const RPL_ISUPPORT_STR: &str = "are supported by this server";

// Command responses
pub const RPL_UMODEIS_NB: u16 = 221;
pub const RPL_AWAY_NB: u16 = 301;
pub const RPL_AWAY_STR: &str = "";
pub const RPL_USERHOST_NB: u16 = 302;
pub const RPL_ISON_NB: u16 = 303;
pub const RPL_UNAWAY_NB: u16 = 305;
pub const RPL_UNAWAY_STR: &str = "You are no longer marked as being away";
pub const RPL_NOWAWAY_NB: u16 = 306;
pub const RPL_NOWAWAY_STR: &str = "You have been marked as being away";
pub const RPL_WHOISUSER_NB: u16 = 311;
pub const RPL_WHOISSERVER_NB: u16 = 312;
pub const RPL_WHOISOPERATOR_NB: u16 = 313;
pub const RPL_WHOISOPERATOR_STR: &str = "is an IRC operator";
pub const RPL_WHOWASUSER_NB: u16 = 314;
pub const RPL_WHOISIDLE_NB: u16 = 317;
pub const RPL_WHOISIDLE_STR: &str = "seconds idle";
pub const RPL_ENDOFWHOIS_NB: u16 = 318;
pub const RPL_ENDOFWHOIS_STR: &str = "End of /WHOIS list";
pub const RPL_WHOISCHANNELS_NB: u16 = 319;
pub const RPL_LISTSTART_NB: u16 = 321;
pub const RPL_LIST_NB: u16 = 322;
pub const RPL_LISTEND_NB: u16 = 323;
pub const RPL_LISTEND_STR: &str = "End of /LIST";
pub const RPL_CHANNELMODEIS_NB: u16 = 324;
pub const RPL_NOTOPIC_NB: u16 = 331;
pub const RPL_NOTOPIC_STR: &str = "No topic is set";
pub const RPL_TOPIC_NB: u16 = 332;
pub const RPL_INVITING_NB: u16 = 341;
pub const RPL_SUMMONING_NB: u16 = 342;
pub const RPL_INVITELIST_NB: u16 = 346;
pub const RPL_ENDOFINVITELIST_NB: u16 = 347;
pub const RPL_ENDOFINVITELIST_STR: &str = "End of channel invite list";
pub const RPL_EXCEPTLIST_NB: u16 = 348;
pub const RPL_ENDOFEXCEPTLIST_NB: u16 = 349;
pub const RPL_ENDOFEXCEPTLIST_STR: &str = "End of channel exception list";
pub const RPL_WHOREPLY_NB: u16 = 352;
pub const RPL_NAMREPLY_NB: u16 = 353;
pub const RPL_ENDOFWHO_NB: u16 = 315;
pub const RPL_ENDOFWHO_STR: &str = "End of /WHO list";
pub const RPL_ENDOFNAMES_NB: u16 = 366;
pub const RPL_ENDOFNAMES_STR: &str = "End of /NAMES list";
pub const RPL_BANLIST_NB: u16 = 367;
pub const RPL_ENDOFBANLIST_NB: u16 = 368;
pub const RPL_ENDOFBANLIST_STR: &str = "End of channel ban list";
pub const RPL_ENDOFWHOWAS_NB: u16 = 369;
pub const RPL_ENDOFWHOWAS_STR: &str = "End of WHOWAS";
pub const RPL_MOTD_NB: u16 = 372;
pub const RPL_MOTDSTART_NB: u16 = 375;
pub const RPL_ENDOFMOTD_NB: u16 = 376;
pub const RPL_ENDOFMOTD_STR: &str = "End of /MOTD command";
pub const RPL_YOUREOPER_NB: u16 = 381;
pub const RPL_YOUREOPER_STR: &str = "You are now an IRC operator";
pub const RPL_TIME_NB: u16 = 391;
pub const RPL_VERSION_NB: u16 = 351;
pub const RPL_INFO_NB: u16 = 371;
pub const RPL_ENDOFINFO_NB: u16 = 374;
pub const RPL_ENDOFINFO_STR: &str = "End of /INFO list";
pub const RPL_ADMINME_NB: u16 = 256;
pub const RPL_ADMINLOC1_NB: u16 = 257;
pub const RPL_ADMINLOC2_NB: u16 = 258;
pub const RPL_ADMINEMAIL_NB: u16 = 259;

// Errors
pub const ERR_NOSUCHNICK_NB: u16 = 401;
pub const ERR_NOSUCHNICK_STR: &str = "No such nick/channel";
pub const ERR_NOSUCHSERVER_NB: u16 = 402;
pub const ERR_NOSUCHSERVER_STR: &str = "No such server";
pub const ERR_NOSUCHCHANNEL_NB: u16 = 403;
pub const ERR_NOSUCHCHANNEL_STR: &str = "No such channel";
pub const ERR_CANNOTSENDTOCHAN_NB: u16 = 404;
pub const ERR_CANNOTSENDTOCHAN_STR: &str = "Cannot send to channel";
pub const ERR_TOOMANYCHANNELS_NB: u16 = 405;
pub const ERR_TOOMANYCHANNELS_STR: &str = "You have joined too many channels";
pub const ERR_WASNOSUCHNICK_NB: u16 = 406;
pub const ERR_WASNOSUCHNICK_STR: &str = "There was no such nickname";
pub const ERR_TOOMANYTARGETS_NB: u16 = 407;
pub const ERR_TOOMANYTARGETS_STR: &str = "Duplicate recipients. No message delivered";
pub const ERR_NOORIGIN_NB: u16 = 409;
pub const ERR_NORECIPIENT_NB: u16 = 411;
pub const ERR_NORECIPIENT_STR: &str = "No recipient given";
pub const ERR_NOTEXTTOSEND_NB: u16 = 412;
pub const ERR_NOTEXTTOSEND_STR: &str = "No text to send";
pub const ERR_UNKNOWNCOMMAND_NB: u16 = 421;
pub const ERR_UNKNOWNCOMMAND_STR: &str = "Unknown command";
pub const ERR_NOMOTD_NB: u16 = 422;
pub const ERR_NOMOTD_STR: &str = "MOTD File is missing";
pub const ERR_NONICKNAMEGIVEN_NB: u16 = 431;
pub const ERR_NONICKNAMEGIVEN_STR: &str = "No nickname given";
pub const ERR_ERRONEUSNICKNAME_NB: u16 = 432;
pub const ERR_ERRONEUSNICKNAME_STR: &str = "Erroneous nickname";
pub const ERR_NICKNAMEINUSE_NB: u16 = 433;
pub const ERR_NICKNAMEINUSE_STR: &str = "Nickname is already in use";
pub const ERR_USERNOTINCHANNEL_NB: u16 = 441;
pub const ERR_USERNOTINCHANNEL_STR: &str = "They aren't on that channel";
pub const ERR_NOTONCHANNEL_NB: u16 = 442;
pub const ERR_NOTONCHANNEL_STR: &str = "You're not on that channel";
pub const ERR_USERONCHANNEL_NB: u16 = 443;
pub const ERR_USERONCHANNEL_STR: &str = "is already on channel";
pub const ERR_NOTREGISTERED_NB: u16 = 451;
pub const ERR_NOTREGISTERED_STR: &str = "You have not registered";
pub const ERR_NEEDMOREPARAMS_NB: u16 = 461;
pub const ERR_NEEDMOREPARAMS_STR: &str = "Not enough parameters";
pub const ERR_ALREADYREGISTRED_NB: u16 = 462;
pub const ERR_ALREADYREGISTRED_STR: &str = "Unauthorized command (already registered)";
pub const ERR_PASSWDMISMATCH_NB: u16 = 464;
pub const ERR_PASSWDMISMATCH_STR: &str = "Password incorrect";
pub const ERR_UNKNOWNMODE_NB: u16 = 472;
pub const ERR_YOUREBANNEDCREEP_NB: u16 = 465;
pub const ERR_CHANNELISFULL_NB: u16 = 471;
pub const ERR_CHANNELISFULL_STR: &str = "Cannot join channel (+l)";
pub const ERR_UNKNOWNMODE_STR: &str = "is unknown mode char to me";
pub const ERR_INVITEONLYCHAN_NB: u16 = 473;
pub const ERR_INVITEONLYCHAN_STR: &str = "Cannot join channel (+i)";
pub const ERR_BANNEDFROMCHAN_NB: u16 = 474;
pub const ERR_BANNEDFROMCHAN_STR: &str = "Cannot join channel (+b)";
pub const ERR_BADCHANNELKEY_NB: u16 = 475;
pub const ERR_BADCHANNELKEY_STR: &str = "Cannot join channel (+k)";
pub const ERR_BADCHANMASK_NB: u16 = 476;
pub const ERR_BADCHANMASK_STR: &str = "Bad Channel Mask";
pub const ERR_KEYSET_NB: u16 = 467;
pub const ERR_KEYSET_STR: &str = "Channel key already set";
pub const ERR_NOPRIVILEGES_NB: u16 = 481;
pub const ERR_NOPRIVILEGES_STR: &str = "Permission Denied- You're not an IRC operator";
pub const ERR_CHANOPRIVSNEEDED_NB: u16 = 482;
pub const ERR_CHANOPRIVSNEEDED_STR: &str = "You're not channel operator";
pub const ERR_UMODEUNKNOWNFLAG_NB: u16 = 501;
pub const ERR_UMODEUNKNOWNFLAG_STR: &str = "Unknown MODE flag";
pub const ERR_USERSDONTMATCH_NB: u16 = 502;
pub const ERR_USERSDONTMATCH_STR: &str = "Cannot change mode for other users";
