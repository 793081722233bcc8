//! WebSocket server for live reload.
//!
//! One acceptor thread performs handshakes; one reader thread polls the
//! (non-blocking) sockets and drops closed ones. The last broadcast is
//! replayed to clients that connect later, so a host page opened after a
//! render still mounts it.

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::message::ReloadMessage;
use crate::core::is_shutdown;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Poll interval of the background threads.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Handle to the running live reload server. Cheap to clone.
#[derive(Clone)]
pub struct LiveReload {
    port: u16,
    clients: Clients,
    last: Arc<Mutex<Option<ReloadMessage>>>,
}

impl LiveReload {
    /// Bind on 127.0.0.1 (`base_port` or one of the next ports) and start
    /// accepting clients.
    pub fn start(base_port: u16) -> Result<Self> {
        let (listener, port) = try_bind_port(base_port, MAX_PORT_RETRIES)?;
        listener.set_nonblocking(true)?;

        let server = Self {
            port,
            clients: Arc::default(),
            last: Arc::default(),
        };

        let acceptor = server.clone();
        std::thread::spawn(move || acceptor.accept_loop(listener));
        let clients = Arc::clone(&server.clients);
        std::thread::spawn(move || client_reader_loop(clients));

        crate::debug!("reload"; "listening on 127.0.0.1:{}", port);
        Ok(server)
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Connected client count.
    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Message replayed to new clients.
    pub fn last_message(&self) -> Option<ReloadMessage> {
        self.last.lock().clone()
    }

    /// Send `msg` to every client and remember it for late joiners.
    pub fn broadcast(&self, msg: ReloadMessage) {
        let frame = Message::Text(msg.to_json().into());
        *self.last.lock() = Some(msg);

        let mut clients = self.clients.lock();
        let count = clients.len();
        if count == 0 {
            crate::debug!("reload"; "no clients connected");
            return;
        }

        clients.retain_mut(|ws| match ws.send(frame.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("reload"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("reload"; "broadcast to {} clients", count);
    }

    fn accept_loop(&self, listener: TcpListener) {
        while !is_shutdown() {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);
                    // Blocking for the handshake.
                    let _ = stream.set_nonblocking(false);
                    self.add_client(stream);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(POLL_INTERVAL);
                }
            }
        }
    }

    fn add_client(&self, stream: TcpStream) {
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("reload"; "handshake failed: {}", e);
                return;
            }
        };

        if let Err(e) = ws.send(Message::Text(ReloadMessage::connected().to_json().into())) {
            crate::log!("reload"; "failed to send connected message: {}", e);
            return;
        }
        if let Some(last) = self.last.lock().as_ref()
            && let Err(e) = ws.send(Message::Text(last.to_json().into()))
        {
            crate::log!("reload"; "failed to replay last message: {}", e);
            return;
        }

        let _ = ws.get_ref().set_nonblocking(true);
        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("reload"; "client registered (total: {})", clients.len());
    }
}

impl std::fmt::Debug for LiveReload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveReload")
            .field("port", &self.port)
            .field("clients", &self.client_count())
            .finish()
    }
}

/// Drain incoming frames and drop closed sockets.
fn client_reader_loop(clients: Clients) {
    while !is_shutdown() {
        std::thread::sleep(POLL_INTERVAL);

        clients.lock().retain_mut(|ws| match ws.read() {
            Ok(Message::Close(_)) => false,
            Ok(_) => true,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => true,
            Err(_) => false,
        });
    }
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(format!("127.0.0.1:{}", port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
