use crate::{
    error::ClientError,
    session::Event
};
use futures::{
    sink::SinkExt,
    stream::StreamExt
};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
    sync::mpsc
};
use tokio_tungstenite::{
    tungstenite::Message,
    MaybeTlsStream,
    WebSocketStream
};
use tracing::{debug, info, warn};

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub async fn connect(url: &str) -> Result<Socket, ClientError> {
    let (socket, response) = tokio_tungstenite::connect_async(url).await?;
    info!(url, status = %response.status(), "connected");
    Ok(socket)
}

/// Shuttles frames between the socket and the session loop.
///
/// Emits [`Event::Open`] first, then one [`Event::Frame`] per binary message.
/// Returns when the socket closes; dropping `events` then ends the loop.
pub async fn pump<S>(
    socket: WebSocketStream<S>,
    events: mpsc::UnboundedSender<Event>,
    mut outbound: mpsc::UnboundedReceiver<Vec<u8>>
)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static
{
    let (mut socket_sender, mut socket_receiver) = socket.split();
    //Outgoing frames
    let handle = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if socket_sender.send(Message::Binary(frame.into())).await.is_err() {
                break
            }
        }
        let _ = socket_sender.close().await;
    });
    //Incoming frames
    if events.send(Event::Open).is_ok() {
        while let Some(message) = socket_receiver.next().await {
            match message {
                Ok(Message::Binary(data)) => {
                    if events.send(Event::Frame(data.to_vec())).is_err() {
                        break
                    }
                },
                Ok(Message::Text(text)) => warn!(len = text.len(), "ignoring text message"),
                Ok(Message::Close(frame)) => {
                    info!(?frame, "server closed connection");
                    break
                },
                Ok(_) => (),
                Err(e) => {
                    warn!(error = %e, "websocket error");
                    break
                }
            }
        }
    }
    debug!("transport closed");
    handle.abort(); //Stop writer
}
