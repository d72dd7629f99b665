//! TCP transport with newline-delimited framing.
//!
//! Each message is one line. Reads and writes use separate halves of the
//! socket behind separate locks, so a writer task and a reader loop can
//! share one connection without blocking each other.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Default upper bound on a single line, newline included.
pub const DEFAULT_MAX_LINE: usize = 4096;

/// A TCP [`Transport`] that listens for incoming connections.
pub struct TcpTransport {
    listener: TcpListener,
    max_line: usize,
}

impl TcpTransport {
    /// Binds a new TCP transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self {
            listener,
            max_line: DEFAULT_MAX_LINE,
        })
    }

    /// Sets the maximum accepted line length for new connections.
    pub fn with_max_line(mut self, max_line: usize) -> Self {
        self.max_line = max_line.max(2);
        self
    }

    /// Returns the local address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let conn = TcpConnection::from_stream(stream, addr, self.max_line);
        tracing::debug!(id = %conn.id, %addr, "accepted TCP connection");
        Ok(conn)
    }
}

/// A single line-framed TCP connection.
pub struct TcpConnection {
    id: ConnectionId,
    peer: SocketAddr,
    reader: Mutex<BufReader<OwnedReadHalf>>,
    writer: Mutex<OwnedWriteHalf>,
    max_line: usize,
}

impl TcpConnection {
    /// Connects to a server (client side).
    pub async fn connect(addr: &str) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(TransportError::ConnectFailed)?;
        let peer = stream.peer_addr().map_err(TransportError::ConnectFailed)?;
        Ok(Self::from_stream(stream, peer, DEFAULT_MAX_LINE))
    }

    fn from_stream(stream: TcpStream, peer: SocketAddr, max_line: usize) -> Self {
        let (read, write) = stream.into_split();
        Self {
            id: ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed)),
            peer,
            reader: Mutex::new(BufReader::new(read)),
            writer: Mutex::new(write),
            max_line,
        }
    }

    /// Address of the remote peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Connection for TcpConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .write_all(data)
            .await
            .map_err(TransportError::SendFailed)
    }

    /// Returns one line including its terminator. A final unterminated
    /// line before EOF is still delivered.
    ///
    /// A line longer than `max_line` is skipped up to its newline and
    /// reported as `LineTooLong`; the next call reads the following line.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut reader = self.reader.lock().await;
        let mut line = Vec::new();
        let n = (&mut *reader)
            .take(self.max_line as u64)
            .read_until(b'\n', &mut line)
            .await
            .map_err(TransportError::ReceiveFailed)?;

        if n == 0 {
            return Ok(None);
        }
        if line.last() != Some(&b'\n') && line.len() >= self.max_line {
            discard_line(&mut *reader)
                .await
                .map_err(TransportError::ReceiveFailed)?;
            return Err(TransportError::LineTooLong(self.max_line));
        }
        Ok(Some(line))
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

/// Consumes input up to and including the next newline, or to EOF,
/// without buffering it.
async fn discard_line(reader: &mut BufReader<OwnedReadHalf>) -> std::io::Result<()> {
    loop {
        let (used, done) = {
            let buf = reader.fill_buf().await?;
            match buf.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (buf.len(), buf.is_empty()),
            }
        };
        reader.consume(used);
        if done {
            return Ok(());
        }
    }
}
