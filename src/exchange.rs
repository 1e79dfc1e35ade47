//! The one-byte request/response exchange with the server.
//!
//! The whole conversation is: connect, send one command byte, read one ack
//! byte, shut the socket down. Send and receive each carry the configured
//! timeout; the connect call blocks on the system default. Nothing is
//! retried — any failure ends the invocation.

use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;

use thiserror::Error;
use tracing::debug;

use crate::config::{Config, SocketPath};
use crate::message::MessageKind;

/// The byte the server sends to confirm a command.
pub const ACK_BYTE: u8 = b'a';

/// Everything that can go wrong between option parsing and exit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("error creating new streaming unix-domain socket [{errno}]")]
    SocketCreateFailed { errno: i32 },
    #[error("error connecting to socket '{path}' [{errno}]")]
    ConnectFailed { path: SocketPath, errno: i32 },
    #[error("error setting send-timeout for socket '{path}' [{errno}]")]
    SetSendTimeoutFailed { path: SocketPath, errno: i32 },
    #[error("error sending '{byte}' to socket '{path}' [{errno}]")]
    SendFailed {
        byte: char,
        path: SocketPath,
        errno: i32,
    },
    #[error("error setting recv-timeout for socket '{path}' [{errno}]")]
    SetRecvTimeoutFailed { path: SocketPath, errno: i32 },
    #[error("error receiving ack from socket '{path}' [{errno}]")]
    RecvFailed { path: SocketPath, errno: i32 },
    #[error("received unexpected ack: '{byte}'")]
    UnexpectedAck { byte: char },
    #[error("error shutting down socket '{path}' [{errno}]")]
    ShutdownFailed { path: SocketPath, errno: i32 },
}

fn errno_of(err: &io::Error) -> i32 {
    err.raw_os_error().unwrap_or(0)
}

/// Connect to the server socket.
///
/// `UnixStream::connect` fuses `socket(2)` and `connect(2)`; errnos that can
/// only come from socket allocation are reported as such.
fn connect(path: &SocketPath) -> Result<UnixStream, ExchangeError> {
    UnixStream::connect(path).map_err(|err| {
        let errno = errno_of(&err);
        match errno {
            libc::EMFILE | libc::ENFILE | libc::ENOBUFS | libc::ENOMEM => {
                ExchangeError::SocketCreateFailed { errno }
            }
            _ => ExchangeError::ConnectFailed {
                path: path.clone(),
                errno,
            },
        }
    })
}

/// Send the command byte and read the ack on an already-connected stream.
fn converse(
    stream: &UnixStream,
    config: &Config,
    kind: MessageKind,
) -> Result<(), ExchangeError> {
    let path = &config.socket_path;
    let byte = kind.wire_byte();

    stream
        .set_write_timeout(Some(config.timeout))
        .map_err(|err| ExchangeError::SetSendTimeoutFailed {
            path: path.clone(),
            errno: errno_of(&err),
        })?;

    debug!(message = kind.name(), "sending command byte");
    let send_failed = |errno| ExchangeError::SendFailed {
        byte: char::from(byte),
        path: path.clone(),
        errno,
    };
    let mut writer = stream;
    match writer.write(&[byte]) {
        Ok(1) => {}
        Ok(_) => return Err(send_failed(0)),
        Err(err) => return Err(send_failed(errno_of(&err))),
    }

    stream
        .set_read_timeout(Some(config.timeout))
        .map_err(|err| ExchangeError::SetRecvTimeoutFailed {
            path: path.clone(),
            errno: errno_of(&err),
        })?;

    let recv_failed = |errno| ExchangeError::RecvFailed {
        path: path.clone(),
        errno,
    };
    let mut reader = stream;
    let mut ack = [0u8; 1];
    match reader.read(&mut ack) {
        Ok(1) => {}
        // 0 bytes means the server hung up before acking
        Ok(_) => return Err(recv_failed(0)),
        Err(err) => return Err(recv_failed(errno_of(&err))),
    }

    if ack[0] != ACK_BYTE {
        return Err(ExchangeError::UnexpectedAck {
            byte: char::from(ack[0]),
        });
    }
    debug!("ack received");
    Ok(())
}

/// Deliver `kind` to the server addressed by `config` and wait for the ack.
///
/// Once a stream exists, shutdown of both directions is attempted no matter
/// how the conversation went, and a shutdown failure forces a failed
/// exchange even after a successful conversation. When the conversation and
/// the shutdown both fail, the conversation's diagnostic is printed here and
/// the shutdown error is returned, so both lines reach stderr in order.
pub fn deliver(config: &Config, kind: MessageKind) -> Result<(), ExchangeError> {
    let stream = connect(&config.socket_path)?;
    debug!(path = %config.socket_path, "connected");

    let outcome = converse(&stream, config, kind);
    let cleanup = stream
        .shutdown(Shutdown::Both)
        .map_err(|err| ExchangeError::ShutdownFailed {
            path: config.socket_path.clone(),
            errno: errno_of(&err),
        });

    match (outcome, cleanup) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(step), Ok(())) => Err(step),
        (Ok(()), Err(shutdown)) => Err(shutdown),
        (Err(step), Err(shutdown)) => {
            eprintln!("{step}");
            Err(shutdown)
        }
    }
}
