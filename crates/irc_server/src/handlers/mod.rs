pub mod channel;
pub mod messaging;
pub mod query;
pub mod registration;

/// Shared arity check: sends `ERR_NEEDMOREPARAMS` and returns `true` if `params` has fewer
/// than `min` entries. Every handler validates arity before any semantic check.
pub(crate) fn need_more_params(server: &mut crate::server::Server, fd: i32, command: &str, params: &[String], min: usize) -> bool {
    if params.len() < min {
        server.send_numeric(
            fd,
            crate::constants::ERR_NEEDMOREPARAMS_NB,
            &[command],
            crate::constants::ERR_NEEDMOREPARAMS_STR,
        );
        true
    } else {
        false
    }
}
