//! Per-connection handler: admission, command loop, cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler
//! plus a writer task. The flow is:
//!   1. Register the connection in the lobby, or refuse it when full
//!   2. Loop: read a line → decode → apply under the lobby lock
//!   3. On EOF, read error, write error or a full outbox: remove the
//!      player, stop the writer, close

use std::sync::Arc;
use std::time::Duration;

use minima_protocol::{ClientCommand, Codec, PlayerId, ProtocolError, ServerMessage};
use minima_session::{OUTBOX_CAPACITY, Outbox, SessionError};
use minima_transport::{Connection, TcpConnection, TransportError};
use tokio::sync::mpsc;

use crate::MinimaError;
use crate::server::ServerState;

/// How long a departing client gets to receive what is still queued.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: TcpConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), MinimaError> {
    let conn = Arc::new(conn);
    let player_id = PlayerId(conn.id().into_inner());
    let peer = conn.peer_addr();

    let (outbox, inbox) = Outbox::channel(OUTBOX_CAPACITY);
    let overflow = outbox.overflow_signal();
    let admitted = state.lobby.lock().await.connect(player_id, outbox);
    if let Err(e) = admitted {
        if let SessionError::Full(max) = e {
            tracing::warn!(%player_id, %peer, max, "connection refused, server full");
            let refusal = state.codec.encode(&ServerMessage::Error("server full".into()));
            conn.send(&refusal).await?;
        }
        conn.close().await?;
        return Err(e.into());
    }
    tracing::info!(%player_id, %peer, "player connected");

    let mut writer = tokio::spawn(write_loop(Arc::clone(&conn), inbox, Arc::clone(&state)));
    let mut writer_running = true;
    let mut drain = true;

    loop {
        let received = tokio::select! {
            received = conn.recv() => received,
            () = overflow.notified() => {
                tracing::warn!(%player_id, "client not reading, dropping connection");
                drain = false;
                break;
            }
            _ = &mut writer => {
                tracing::debug!(%player_id, "writer stopped, closing connection");
                writer_running = false;
                break;
            }
        };

        let data = match received {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(TransportError::LineTooLong(max)) => {
                tracing::debug!(%player_id, max, "line too long");
                state.lobby.lock().await.reply_error(player_id, "line too long");
                continue;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let command: ClientCommand = match state.codec.decode(&data) {
            Ok(command) => command,
            Err(ProtocolError::Empty) => continue,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode line");
                state.lobby.lock().await.reply_error(player_id, &e.wire_reason());
                continue;
            }
        };

        tracing::debug!(%player_id, %command, "command received");
        state.lobby.lock().await.handle_command(player_id, command);
    }

    // Dropping the session closes the outbox; the writer sends what is
    // left and exits.
    state.lobby.lock().await.disconnect(player_id);
    if writer_running
        && (!drain || tokio::time::timeout(DRAIN_TIMEOUT, &mut writer).await.is_err())
    {
        writer.abort();
    }
    conn.close().await.ok();
    tracing::info!(%player_id, "player disconnected");
    Ok(())
}

/// Drains a player's outbound queue onto the socket, in order.
async fn write_loop<C: Codec>(
    conn: Arc<TcpConnection>,
    mut inbox: mpsc::Receiver<ServerMessage>,
    state: Arc<ServerState<C>>,
) {
    while let Some(message) = inbox.recv().await {
        let bytes = state.codec.encode(&message);
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(id = %conn.id(), error = %e, "send failed, writer stopping");
            break;
        }
    }
}
