use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument};

use crate::commands::executable::Executable;
use crate::commands::Command;
use crate::connection::Connection;
use crate::frame::Frame;
use crate::shutdown::Shutdown;
use crate::store::Store;
use crate::Error;

/// Serve until a SHUTDOWN command has been acknowledged. Each accepted
/// connection gets its own task; the store and the shutdown latch are the
/// only state shared between them.
pub async fn run(port: u16) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    let store = Store::new();
    let shutdown = Shutdown::new();

    info!("Redis-compatible server listening on {}", listener.local_addr()?);

    loop {
        let accepted = tokio::select! {
            _ = shutdown.wait() => {
                // Abrupt stop: in-flight requests on other connections are
                // not drained.
                info!("Received a SHUTDOWN command; shutting down");
                return Ok(());
            }
            accepted = listener.accept() => accepted,
        };

        let (socket, client_address) = accepted?;
        let store = store.clone();
        let shutdown = shutdown.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, store, shutdown).await {
                error!("Connection error: {}", e);
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, store, shutdown),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    store: Store,
    shutdown: Shutdown,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    while let Some(frame) = conn.read_frame().await? {
        debug!("Received frame from client: {:?}", frame);

        // Rejected requests become error replies and the connection stays
        // usable; only I/O faults end the session.
        let (reply, arm_after_reply) = match Command::try_from(frame) {
            Ok(cmd) => {
                let arm_after_reply = cmd.is_shutdown();
                (cmd.exec(store.clone()), arm_after_reply)
            }
            Err(err) => (Frame::Error(err.to_string()), false),
        };

        debug!("Sending reply to client: {:?}", reply);
        conn.write_frame(&reply).await?;

        // The SHUTDOWN acknowledgment must reach the socket before the
        // latch fires.
        if arm_after_reply {
            shutdown.arm();
        }
    }

    info!("Connection closed");
    Ok(())
}
