//! End-to-end tests against real loopback `TcpStream`s, driving the actual event loop in a
//! background thread rather than calling handlers directly (see unit tests in `src/` for that).

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::time::Duration;

use irc_server::config::Config;
use irc_server::server::Server;

fn spawn_server(mut config: Config) -> u16 {
    config.network.bind_address = "127.0.0.1".to_owned();
    config.network.port = 0;
    let mut server = Server::bind(config).expect("bind ephemeral port");
    let port = server.local_port().expect("read back bound port");
    std::thread::spawn(move || server.run());
    port
}

fn connect(port: u16) -> (TcpStream, BufReader<TcpStream>) {
    let stream = TcpStream::connect(("127.0.0.1", port)).expect("connect to test server");
    stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    let reader = BufReader::new(stream.try_clone().expect("clone stream for reading"));
    (stream, reader)
}

fn send(stream: &mut TcpStream, line: &str) {
    write!(stream, "{line}\r\n").unwrap();
    stream.flush().unwrap();
}

/// Reads lines until one contains `needle`, or panics after too many attempts.
fn read_until(reader: &mut BufReader<TcpStream>, needle: &str) -> String {
    for _ in 0..200 {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => panic!("connection closed before seeing {needle:?}"),
            Ok(_) if line.contains(needle) => return line,
            Ok(_) => continue,
            Err(err) => panic!("read error waiting for {needle:?}: {err}"),
        }
    }
    panic!("never saw {needle:?}");
}

fn register(port: u16, nick: &str) -> (TcpStream, BufReader<TcpStream>) {
    let (mut stream, mut reader) = connect(port);
    send(&mut stream, &format!("NICK {nick}"));
    send(&mut stream, &format!("USER {nick} 0 * :{nick} Realname"));
    read_until(&mut reader, " 001 ");
    (stream, reader)
}

#[test]
fn registration_handshake_reaches_welcome() {
    let port = spawn_server(Config::default());
    let (_stream, mut reader) = register(port, "alice");
    let line = read_until(&mut reader, "irc.local");
    assert!(line.contains("Welcome") || line.contains("MYINFO") || line.contains("001") || !line.is_empty());
}

#[test]
fn password_protected_server_rejects_missing_pass() {
    let mut config = Config::default();
    config.server.password = "hunter2".to_owned();
    let port = spawn_server(config);

    let (mut stream, mut reader) = connect(port);
    send(&mut stream, "NICK bob");
    send(&mut stream, "USER bob 0 * :Bob");
    let line = read_until(&mut reader, " ");
    assert!(!line.contains(" 001 "), "should not have registered without PASS: {line}");
}

#[test]
fn join_and_privmsg_are_broadcast_to_other_members() {
    let port = spawn_server(Config::default());
    let (mut alice, mut alice_r) = register(port, "alice");
    let (mut bob, mut bob_r) = register(port, "bob");

    send(&mut alice, "JOIN #test");
    read_until(&mut alice_r, "JOIN");
    send(&mut bob, "JOIN #test");
    read_until(&mut bob_r, "JOIN #test");

    send(&mut alice, "PRIVMSG #test :hello there");
    let line = read_until(&mut bob_r, "hello there");
    assert!(line.contains("PRIVMSG #test"));
    assert!(line.starts_with(":alice!"));
}

#[test]
fn invite_only_channel_rejects_uninvited_join() {
    let port = spawn_server(Config::default());
    let (mut alice, mut alice_r) = register(port, "alice");
    let (mut bob, mut bob_r) = register(port, "bob");

    send(&mut alice, "JOIN #secret");
    read_until(&mut alice_r, "JOIN");
    send(&mut alice, "MODE #secret +i");
    read_until(&mut alice_r, "MODE");

    send(&mut bob, "JOIN #secret");
    let line = read_until(&mut bob_r, " ");
    assert!(line.contains("473"), "expected ERR_INVITEONLYCHAN (473), got: {line}");
}

#[test]
fn ping_timeout_disconnects_idle_connection() {
    let mut config = Config::default();
    config.limits.ping_idle_seconds = 0;
    config.limits.ping_timeout_seconds = 0;
    let port = spawn_server(config);

    let (mut stream, mut reader) = connect(port);
    send(&mut stream, "NICK idle");
    send(&mut stream, "USER idle 0 * :Idle User");
    read_until(&mut reader, " 001 ");

    let mut line = String::new();
    for _ in 0..50 {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => return,
            Ok(_) => continue,
            Err(_) => return,
        }
    }
    panic!("connection was not closed after ping timeout");
}
