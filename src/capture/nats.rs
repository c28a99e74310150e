use super::messages::{ControlCommand, ControlMessage, RecognitionMessage};
use super::source::{CaptureEvents, ResultCursor, SpeechCapture};
use crate::error::CaptureErrorKind;
use anyhow::{Context, Result};
use async_nats::Client;
use futures::stream::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Capture source backed by a speech-recognition service on NATS
///
/// Start/stop requests go to `stt.control.<session>`; the service answers on
/// `stt.recognition.<session>` with [`RecognitionMessage`]s.
pub struct NatsCapture {
    client: Client,
    session_id: String,
    lang: String,
    task: Option<JoinHandle<()>>,
}

impl NatsCapture {
    /// Connect to NATS server
    pub async fn connect(url: &str, session_id: String, lang: String) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            session_id,
            lang,
            task: None,
        })
    }

    pub fn recognition_subject(&self) -> String {
        format!("stt.recognition.{}", self.session_id)
    }

    pub fn control_subject(&self) -> String {
        format!("stt.control.{}", self.session_id)
    }

    async fn publish_control(&self, command: ControlCommand) -> Result<()> {
        let message = ControlMessage {
            session_id: self.session_id.clone(),
            command,
            lang: self.lang.clone(),
            interim_results: false,
            max_alternatives: 1,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&message)?;
        let subject = self.control_subject();

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish recognition control")?;

        debug!("Published {:?} to {}", command, subject);
        Ok(())
    }
}

#[async_trait::async_trait]
impl SpeechCapture for NatsCapture {
    async fn start(&mut self, events: CaptureEvents) -> Result<(), CaptureErrorKind> {
        if self.is_capturing() {
            warn!("Recognition already started");
            return Ok(());
        }

        let subject = self.recognition_subject();
        let mut subscriber = self.client.subscribe(subject.clone()).await.map_err(|e| {
            error!("Failed to subscribe to {}: {}", subject, e);
            CaptureErrorKind::Network
        })?;

        if let Err(e) = self.publish_control(ControlCommand::Start).await {
            error!("Failed to start recognition: {}", e);
            return Err(CaptureErrorKind::Network);
        }

        let session_id = self.session_id.clone();

        self.task = Some(tokio::spawn(async move {
            let mut cursor = ResultCursor::new();

            while let Some(msg) = subscriber.next().await {
                let message = match serde_json::from_slice::<RecognitionMessage>(&msg.payload) {
                    Ok(message) => message,
                    Err(e) => {
                        warn!("Failed to parse recognition message: {}", e);
                        continue;
                    }
                };

                if message.session_id() != session_id {
                    continue;
                }

                if dispatch(message, &mut cursor, &events) {
                    return;
                }
            }

            warn!("Recognition subscription closed");
            events.error(CaptureErrorKind::Network);
        }));

        info!("Recognition started on {}", subject);
        Ok(())
    }

    async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        task.abort();

        if let Err(e) = self.publish_control(ControlCommand::Stop).await {
            error!("Failed to stop recognition: {}", e);
        }
    }

    fn is_capturing(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn name(&self) -> &str {
        "nats"
    }
}

/// Forward one recognition message. Returns true once this capture is settled.
fn dispatch(message: RecognitionMessage, cursor: &mut ResultCursor, events: &CaptureEvents) -> bool {
    match message {
        RecognitionMessage::Result {
            result_index,
            results,
            ..
        } => match cursor.next_utterance(result_index, &results) {
            Some(transcript) => {
                events.transcript(transcript);
                true
            }
            None => false,
        },
        RecognitionMessage::Error { error, message, .. } => {
            warn!(
                "Recognition error: {} {}",
                error,
                message.unwrap_or_default()
            );
            events.error(CaptureErrorKind::from_code(&error));
            true
        }
        RecognitionMessage::SpeechEnd { .. } => {
            events.speech_end();
            true
        }
    }
}
