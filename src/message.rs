//! The messages the Terminale server understands.

/// A control message, one byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    /// Toggle window visibility.
    #[default]
    Toggle,
    /// Shut down the server.
    Quit,
}

impl MessageKind {
    /// Resolution order for prefix matching. First match wins, so this
    /// order is part of the CLI contract.
    pub const ALL: [MessageKind; 2] = [MessageKind::Toggle, MessageKind::Quit];

    /// Canonical lowercase name, as typed on the command line.
    pub fn name(self) -> &'static str {
        match self {
            MessageKind::Toggle => "toggle",
            MessageKind::Quit => "quit",
        }
    }

    /// The single byte sent to the server.
    pub fn wire_byte(self) -> u8 {
        match self {
            MessageKind::Toggle => b't',
            MessageKind::Quit => b'q',
        }
    }

    /// Resolve a user-supplied argument to a message.
    ///
    /// `arg` matches a message when it is a literal prefix of the canonical
    /// name; the empty string is a prefix of everything and so resolves to
    /// the first entry in [`MessageKind::ALL`].
    pub fn resolve(arg: &str) -> Option<MessageKind> {
        MessageKind::ALL
            .into_iter()
            .find(|kind| kind.name().starts_with(arg))
    }
}
