use clap::Parser;
use flexi_logger::{Duplicate, Logger};
use irc_server::config::Config;
use irc_server::server::{self, Server};
use log::error;

/// A single-threaded, non-blocking IRC server.
#[derive(Parser, Debug)]
#[command(name = "ircd", version)]
struct Cli {
    /// Listen port; overrides the config file's `network.port`.
    port: Option<u16>,

    /// Connection password clients must PASS; overrides the config file's `server.password`.
    password: Option<String>,

    /// Path to a TOML config file.
    #[arg(short, long, default_value = "ircd.toml")]
    config: String,

    /// Raise the log level to `debug`.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    Logger::try_with_str(log_level)
        .and_then(|logger| logger.log_to_stderr().duplicate_to_stderr(Duplicate::All).start())
        .ok();

    let mut config = Config::load_or_default(&cli.config);
    config.apply_cli_overrides(cli.port, cli.password);

    let mut srv = match Server::bind(config) {
        Ok(srv) => srv,
        Err(err) => {
            error!("failed to bind: {err}");
            std::process::exit(1);
        }
    };

    server::install_signal_handlers();
    srv.run();
}
