use go::{
    cli::Cli,
    engine::{self, Autoplay},
    error::ClientError,
    identity::{Bootstrap, FileStore, SessionStore},
    packet::SessionId,
    render::TextRenderer,
    session::{self, ClientSession},
    transport
};
use std::{
    future,
    io,
    process::ExitCode
};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    //Logging, RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry.with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr)).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_writer(io::stderr)).init();
    }
    match play(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "client stopped");
            ExitCode::FAILURE
        }
    }
}

async fn play(cli: Cli) -> Result<(), ClientError> {
    //Identity
    let store = FileStore::new(&cli.session_file);
    let session = store.load()?.merge(
        cli.session_id.as_deref().map(SessionId::from),
        cli.token.clone()
    );
    info!(url = %cli.url, id = ?session.id, auto = cli.auto, "starting client");
    let client = ClientSession::new(Bootstrap::new(session, Box::new(store)));
    let mut renderer = TextRenderer::new(io::stdout())?;
    let socket = transport::connect(&cli.url).await?;
    //Channels
    let (events, receiver) = mpsc::unbounded_channel();
    let (outbound, outbound_receiver) = mpsc::unbounded_channel();
    let (input, autoplay) = if cli.auto {
        (None, Some(Autoplay::new()))
    } else {
        (Some(engine::commands(io::BufReader::new(io::stdin()), events.clone())), None)
    };
    //Closing the transport closes the event channel
    let input_abort = input.as_ref().map(|handle| handle.abort_handle());
    tokio::spawn(async move {
        transport::pump(socket, events, outbound_receiver).await;
        if let Some(abort) = input_abort {
            abort.abort();
        }
    });
    let quit = async move {
        if let Some(handle) = input {
            //Aborted input means the transport closed first
            if handle.await.is_ok() {
                return;
            }
        }
        future::pending::<()>().await
    };
    tokio::select! {
        client = session::run(client, receiver, outbound, &mut renderer, autoplay) => {
            info!(
                black_score = client.score().black,
                white_score = client.score().white,
                "connection closed"
            );
        },
        _ = quit => info!("quit")
    }
    Ok(())
}
