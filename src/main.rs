//! termctl - control client for the Terminale server socket.
//!
//! Sends a single command byte to the server and waits for its single-byte
//! acknowledgment. The exit status says whether the whole exchange, cleanup
//! included, went through.

mod config;
mod exchange;
mod message;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::{Config, SocketPath, DEFAULT_SOCKET_PATH, DEFAULT_TIMEOUT_MS};
use message::MessageKind;

#[derive(Parser)]
#[command(name = "termctl")]
#[command(version, disable_version_flag = true)]
#[command(about = "Send a message to the Terminale server socket")]
#[command(long_about = "Send MESSAGE to the Terminale server socket, \
where MESSAGE is one of:\n\
  toggle             toggle window visibility (default)\n\
  quit               shut down the server\n\n\
Any prefix of a message name is accepted.")]
struct Cli {
    /// Message to send: "toggle" (default) or "quit", or any prefix
    #[arg(value_name = "MESSAGE")]
    message: Option<String>,

    /// Send messages to PATH
    #[arg(
        short = 's',
        long = "socket",
        value_name = "PATH",
        default_value = DEFAULT_SOCKET_PATH,
        value_parser = SocketPath::parse
    )]
    socket: SocketPath,

    /// Set socket timeout to MS milliseconds
    #[arg(
        short = 't',
        long = "timeout",
        value_name = "MS",
        default_value = DEFAULT_TIMEOUT_MS,
        value_parser = config::parse_timeout
    )]
    timeout: std::time::Duration,

    /// Print version and exit
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("termctl=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // help and version go to stdout and exit 0; any usage error
            // goes to stderr and exits 1
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let message = match &cli.message {
        None => MessageKind::default(),
        Some(raw) => match MessageKind::resolve(raw) {
            Some(kind) => kind,
            None => {
                eprintln!("invalid message: '{raw}'");
                return ExitCode::FAILURE;
            }
        },
    };

    let config = Config {
        socket_path: cli.socket,
        timeout: cli.timeout,
    };

    match exchange::deliver(&config, message) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parses_short_and_long_forms() {
        let cli =
            Cli::try_parse_from(["termctl", "--socket=/tmp/x.skt", "-t", "250", "qu"]).unwrap();
        assert_eq!(cli.socket.to_string(), "/tmp/x.skt");
        assert_eq!(cli.timeout, Duration::from_millis(250));
        assert_eq!(cli.message.as_deref(), Some("qu"));
    }

    #[test]
    fn defaults_apply_without_flags() {
        let cli = Cli::try_parse_from(["termctl"]).unwrap();
        assert_eq!(cli.socket.to_string(), DEFAULT_SOCKET_PATH);
        assert_eq!(cli.timeout, Duration::from_millis(100));
        assert!(cli.message.is_none());
    }

    #[test]
    fn rejects_surplus_positionals() {
        assert!(Cli::try_parse_from(["termctl", "toggle", "quit"]).is_err());
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["termctl", "--bogus"]).is_err());
    }

    #[test]
    fn rejects_overlong_socket_path() {
        let path = "x".repeat(config::UNIX_PATH_MAX);
        assert!(Cli::try_parse_from(["termctl", "-s", &path]).is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(Cli::try_parse_from(["termctl", "--timeout=0"]).is_err());
    }
}
