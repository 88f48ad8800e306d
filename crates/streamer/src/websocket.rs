//! WebSocketConnection - `Connection` over tokio-tungstenite
//!
//! Envelopes go out as text frames. The credential travels in the
//! `X-Auth-Sensor-Token` upgrade header.

use bytes::Bytes;
use contracts::{Connection, ContractError};
use futures_util::SinkExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, instrument, warn};

/// Upgrade header carrying the sensor credential
pub const SENSOR_TOKEN_HEADER: &str = "X-Auth-Sensor-Token";

type Stream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket client connection
#[derive(Default)]
pub struct WebSocketConnection {
    stream: Option<Stream>,
    address: Option<String>,
}

impl WebSocketConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address of the live connection
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn stream(&mut self) -> Result<&mut Stream, ContractError> {
        self.stream.as_mut().ok_or(ContractError::NotConnected)
    }
}

impl std::fmt::Debug for WebSocketConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketConnection")
            .field("address", &self.address)
            .field("connected", &self.stream.is_some())
            .finish()
    }
}

impl Connection for WebSocketConnection {
    #[instrument(name = "websocket_dial", skip(self, credential))]
    async fn dial(&mut self, address: &str, credential: Option<&str>) -> Result<(), ContractError> {
        let mut request = address
            .into_client_request()
            .map_err(|e| ContractError::connection(address, format!("invalid request: {e}")))?;

        if let Some(token) = credential {
            let value = HeaderValue::from_str(token)
                .map_err(|e| ContractError::connection(address, format!("invalid credential: {e}")))?;
            request.headers_mut().insert(SENSOR_TOKEN_HEADER, value);
        }

        match connect_async(request).await {
            Ok((stream, response)) => {
                info!(address, status = %response.status(), "WebSocket connected");
                self.stream = Some(stream);
                self.address = Some(address.to_string());
                Ok(())
            }
            Err(WsError::Http(response)) => {
                let status = response.status();
                error!(address, %status, "WebSocket upgrade rejected");
                Err(ContractError::connection(
                    address,
                    format!("upgrade rejected with HTTP {status}"),
                ))
            }
            Err(e) => {
                error!(address, error = %e, "WebSocket dial failed");
                Err(ContractError::connection(address, e.to_string()))
            }
        }
    }

    async fn send(&mut self, payload: Bytes) -> Result<(), ContractError> {
        let text = String::from_utf8(payload.to_vec())
            .map_err(|e| ContractError::serialization(format!("payload is not UTF-8: {e}")))?;

        self.stream()?
            .send(Message::text(text))
            .await
            .map_err(|e| ContractError::send(e.to_string()))
    }

    #[instrument(name = "websocket_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };
        let address = self.address.take().unwrap_or_default();

        match stream.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => {
                debug!(address, "WebSocket closed");
                Ok(())
            }
            Err(e) => {
                // Stream is dropped either way
                warn!(address, error = %e, "WebSocket close handshake failed");
                Err(ContractError::send(format!("close failed: {e}")))
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_without_dial_is_not_connected() {
        let mut conn = WebSocketConnection::new();
        assert!(!conn.is_connected());

        let err = conn.send(Bytes::from_static(b"{}")).await.unwrap_err();
        assert!(matches!(err, ContractError::NotConnected));
    }

    #[tokio::test]
    async fn test_close_without_dial_is_ok() {
        let mut conn = WebSocketConnection::new();
        assert!(conn.close().await.is_ok());
    }

    #[tokio::test]
    async fn test_dial_invalid_url() {
        let mut conn = WebSocketConnection::new();
        let err = conn.dial("not a url", None).await.unwrap_err();
        assert!(matches!(err, ContractError::Connection { .. }));
        assert!(!conn.is_connected());
    }

    #[tokio::test]
    async fn test_dial_refused() {
        // Bind then drop to get a port with no listener
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let mut conn = WebSocketConnection::new();
        let err = conn
            .dial(&format!("ws://127.0.0.1:{port}/ws"), Some("token"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Connection { .. }));
    }
}
