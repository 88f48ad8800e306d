//! Connection trait - transport capability used by the scheduler
//!
//! The scheduler only dials, sends and closes; framing and handshake details
//! belong to the implementation.

use bytes::Bytes;

use crate::ContractError;

/// Persistent outbound connection
///
/// All implementations must implement this trait.
#[trait_variant::make(Connection: Send)]
pub trait LocalConnection {
    /// Open the connection
    ///
    /// `credential` is passed to the remote side untouched.
    ///
    /// # Errors
    /// Returns `ContractError::Connection` on dial failure
    async fn dial(&mut self, address: &str, credential: Option<&str>)
        -> Result<(), ContractError>;

    /// Send one encoded message
    ///
    /// # Errors
    /// Returns `ContractError::Send` on write failure, `NotConnected` if closed
    async fn send(&mut self, payload: Bytes) -> Result<(), ContractError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), ContractError>;

    /// Whether a live connection is held
    fn is_connected(&self) -> bool;
}
