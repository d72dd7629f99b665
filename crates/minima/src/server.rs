//! `MinimaServer` builder and server loop.
//!
//! This is the entry point for running a Minima game server. It ties the
//! layers together: transport → protocol → lobby (session + game).

use std::sync::Arc;

use minima_protocol::{Codec, LineCodec};
use minima_transport::{DEFAULT_MAX_LINE, TcpTransport, Transport};
use tokio::sync::Mutex;

use crate::control::GameMaster;
use crate::handler::handle_connection;
use crate::{Lobby, MinimaError};

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: String,
    /// Connections beyond this are told `ERROR server full` and closed.
    pub max_connections: usize,
    /// Makes every game's seeds reproducible. `None` uses OS entropy.
    pub base_seed: Option<u64>,
    /// Longest accepted line, terminator included.
    pub max_line: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            max_connections: 20,
            base_seed: None,
            max_line: DEFAULT_MAX_LINE,
        }
    }
}

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) lobby: Arc<Mutex<Lobby>>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Minima server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), minima::MinimaError> {
/// use minima::MinimaServer;
///
/// let server = MinimaServer::builder()
///     .bind("127.0.0.1:5000")
///     .max_connections(8)
///     .build()
///     .await?;
/// let game_master = server.game_master();
/// tokio::spawn(server.run());
/// # let _ = game_master;
/// # Ok(())
/// # }
/// ```
pub struct MinimaServerBuilder {
    config: ServerConfig,
}

impl MinimaServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn max_connections(mut self, max: usize) -> Self {
        self.config.max_connections = max;
        self
    }

    pub fn base_seed(mut self, seed: u64) -> Self {
        self.config.base_seed = Some(seed);
        self
    }

    pub fn max_line(mut self, bytes: usize) -> Self {
        self.config.max_line = bytes;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and builds the server with [`LineCodec`].
    pub async fn build(self) -> Result<MinimaServer<LineCodec>, MinimaError> {
        self.build_with_codec(LineCodec).await
    }

    /// Binds the listener and builds the server with a custom codec.
    pub async fn build_with_codec<C: Codec>(
        self,
        codec: C,
    ) -> Result<MinimaServer<C>, MinimaError> {
        let transport = TcpTransport::bind(&self.config.bind_addr)
            .await?
            .with_max_line(self.config.max_line);

        let lobby = Lobby::new(self.config.max_connections, self.config.base_seed);
        let state = Arc::new(ServerState {
            lobby: Arc::new(Mutex::new(lobby)),
            codec,
        });

        tracing::info!(
            addr = %self.config.bind_addr,
            max_connections = self.config.max_connections,
            base_seed = ?self.config.base_seed,
            "server configured"
        );
        Ok(MinimaServer { transport, state })
    }
}

impl Default for MinimaServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Minima game server.
///
/// Call [`run()`](Self::run) to start accepting connections, and keep a
/// [`GameMaster`] from [`game_master()`](Self::game_master) to drive games.
pub struct MinimaServer<C: Codec = LineCodec> {
    transport: TcpTransport,
    state: Arc<ServerState<C>>,
}

impl MinimaServer<LineCodec> {
    /// Creates a new builder.
    pub fn builder() -> MinimaServerBuilder {
        MinimaServerBuilder::new()
    }
}

impl<C: Codec> MinimaServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle for operator actions on this server's lobby.
    pub fn game_master(&self) -> GameMaster {
        GameMaster::new(Arc::clone(&self.state.lobby))
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task per connection. A failing connection ends
    /// only its own task. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), MinimaError> {
        tracing::info!("Minima server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
