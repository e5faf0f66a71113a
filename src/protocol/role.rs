//! Endpoint role, used to enforce the masking direction of RFC 6455 Section 5.1.

/// Which side of the connection the decoder sits on.
///
/// A server reads frames written by a client, which must be masked; a client
/// reads frames written by a server, which must not be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Decoding frames sent by a server.
    Client,
    /// Decoding frames sent by a client.
    Server,
}

impl Role {
    /// Whether frames arriving at this endpoint must carry a mask key.
    #[inline]
    #[must_use]
    pub const fn expects_masked(self) -> bool {
        matches!(self, Role::Server)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::Client => "client",
            Role::Server => "server",
        })
    }
}
