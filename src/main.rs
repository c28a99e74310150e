use anyhow::{Context, Result};
use clap::Parser;
use loqa_voice_chat::config::CaptureSource;
use loqa_voice_chat::playback::PlaybackOutput;
use loqa_voice_chat::{
    create_router, AppState, AssetPlayer, ChatLog, Config, HttpBackend, LineCapture, NatsCapture,
    SpeechCapture, TurnController,
};
use std::sync::Arc;
use tracing::{error, info};

/// Voice conversation client: listen, ask the dialogue backend, speak the reply
#[derive(Debug, Parser)]
#[command(name = "loqa-voice-chat", version)]
struct Cli {
    /// Config file path, without extension
    #[arg(long, default_value = "config/voice-chat")]
    config: String,

    /// Where utterances come from
    #[arg(long, value_enum)]
    input: Option<CaptureSource>,

    /// Where reply audio is played
    #[arg(long, value_enum)]
    output: Option<PlaybackOutput>,

    /// Dialogue backend base URL
    #[arg(long)]
    backend_url: Option<String>,

    /// Keep listening after speech ends without a transcript
    #[arg(long)]
    continuous: bool,

    /// Do not serve the control API
    #[arg(long)]
    no_api: bool,

    /// Wait for a begin-turn request instead of listening right away
    #[arg(long)]
    no_auto_start: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut cfg = Config::load(&cli.config)?;

    if let Some(input) = cli.input {
        cfg.capture.source = input;
    }
    if let Some(output) = cli.output {
        cfg.playback.output = output;
    }
    if let Some(url) = cli.backend_url {
        cfg.backend.base_url = url;
    }
    if cli.continuous {
        cfg.conversation.continuous = true;
    }
    if cli.no_api {
        cfg.service.http.enabled = false;
    }

    info!("Loqa Voice Chat v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!("Dialogue backend: {}", cfg.backend.endpoint());

    let controller_config = cfg.controller_config();
    let session_id = controller_config.session_id.clone();

    let capture: Box<dyn SpeechCapture> = match cfg.capture.source {
        CaptureSource::Stdin => {
            info!("Type an utterance and press enter; an empty line ends speech");
            Box::new(LineCapture::stdin())
        }
        CaptureSource::Nats => Box::new(
            NatsCapture::connect(&cfg.capture.nats_url, session_id.clone(), cfg.capture.lang.clone())
                .await?,
        ),
    };

    let backend = Arc::new(HttpBackend::new(&cfg.backend)?);
    let player = Box::new(AssetPlayer::new(cfg.playback_config()).context("Failed to create audio player")?);
    let chat = ChatLog::new(cfg.conversation.bot_name.clone()).with_echo(cfg.conversation.echo);

    let controller = TurnController::new(controller_config, capture, backend, player, Arc::new(chat.clone()));
    let events = controller.sender();
    let status = controller.subscribe();
    let controller_task = tokio::spawn(controller.run());

    if cfg.service.http.enabled {
        let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind control API to {}", addr))?;
        let app = create_router(AppState::new(events.clone(), status, chat.clone()));

        info!("Control API listening on http://{}", addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Control API failed: {}", e);
            }
        });
    }

    if !cli.no_auto_start {
        events.begin_turn();
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    info!("Shutting down session {}", session_id);
    events.shutdown();
    controller_task.await.context("Turn controller task panicked")?;

    info!("Session {} ended with {} chat messages", session_id, chat.len());
    Ok(())
}
