use super::source::{CaptureEvents, SpeechCapture};
use crate::error::CaptureErrorKind;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Capture source reading typed utterances, one per line
///
/// While capturing, the next non-empty line is the finalized utterance and an
/// empty line ends speech without a transcript. Closed input reports an
/// `Aborted` error. Lines typed while not capturing are discarded.
pub struct LineCapture {
    lines: Arc<Mutex<mpsc::Receiver<String>>>,
    reader_task: JoinHandle<()>,
    forward_task: Option<JoinHandle<()>>,
}

impl LineCapture {
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (line_tx, line_rx) = mpsc::channel(32);

        let reader_task = tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line_tx.send(line).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("Line input closed");
                        break;
                    }
                    Err(e) => {
                        warn!("Failed to read line input: {}", e);
                        break;
                    }
                }
            }
        });

        Self {
            lines: Arc::new(Mutex::new(line_rx)),
            reader_task,
            forward_task: None,
        }
    }

    /// Read utterances from the terminal
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl Drop for LineCapture {
    fn drop(&mut self) {
        self.reader_task.abort();
        if let Some(task) = self.forward_task.take() {
            task.abort();
        }
    }
}

#[async_trait::async_trait]
impl SpeechCapture for LineCapture {
    async fn start(&mut self, events: CaptureEvents) -> Result<(), CaptureErrorKind> {
        if self.is_capturing() {
            warn!("Line capture already started");
            return Ok(());
        }

        {
            let mut lines = self.lines.lock().await;
            while let Ok(line) = lines.try_recv() {
                debug!("Discarding line typed while not listening: {:?}", line);
            }
        }

        let lines = Arc::clone(&self.lines);
        self.forward_task = Some(tokio::spawn(async move {
            let mut lines = lines.lock().await;
            match lines.recv().await {
                Some(line) if line.trim().is_empty() => events.speech_end(),
                Some(line) => events.transcript(line.trim()),
                None => events.error(CaptureErrorKind::Aborted),
            };
        }));

        info!("Listening for typed input...");
        Ok(())
    }

    async fn stop(&mut self) {
        if let Some(task) = self.forward_task.take() {
            task.abort();
        }
    }

    fn is_capturing(&self) -> bool {
        self.forward_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn name(&self) -> &str {
        "line"
    }
}
