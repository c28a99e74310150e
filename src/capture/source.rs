use crate::error::CaptureErrorKind;
use crate::turn::{CaptureEpoch, CaptureEvent, EventSender, TurnEvent};
use serde::{Deserialize, Serialize};

/// Speech capture source trait
///
/// Implementations:
/// - Line: typed utterances from a terminal or any async reader
/// - NATS: recognition results from a remote speech-recognition service
#[async_trait::async_trait]
pub trait SpeechCapture: Send {
    /// Start capturing one utterance
    ///
    /// Results are reported through `events`. Starting while already
    /// capturing is a logged no-op.
    async fn start(&mut self, events: CaptureEvents) -> Result<(), CaptureErrorKind>;

    /// Stop capturing and release the input. Safe to call at any time.
    async fn stop(&mut self);

    /// Check if the source is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// Event handle given to a capture source on start
///
/// Every event is stamped with the epoch of the start it belongs to, so the
/// controller can drop events from a capture it already stopped.
#[derive(Debug, Clone)]
pub struct CaptureEvents {
    epoch: CaptureEpoch,
    tx: EventSender,
}

impl CaptureEvents {
    pub fn new(epoch: CaptureEpoch, tx: EventSender) -> Self {
        Self { epoch, tx }
    }

    pub fn epoch(&self) -> CaptureEpoch {
        self.epoch
    }

    pub fn transcript(&self, text: impl Into<String>) -> bool {
        self.emit(CaptureEvent::Transcript(text.into()))
    }

    pub fn error(&self, kind: CaptureErrorKind) -> bool {
        self.emit(CaptureEvent::Error(kind))
    }

    pub fn speech_end(&self) -> bool {
        self.emit(CaptureEvent::SpeechEnd)
    }

    fn emit(&self, event: CaptureEvent) -> bool {
        self.tx.send(TurnEvent::Capture {
            epoch: self.epoch,
            event,
        })
    }
}

/// One entry of a recognizer's accumulated result list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub transcript: String,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Tracks which accumulated recognition results were already emitted
///
/// Recognizers resend the whole result list on every update along with the
/// index of the first changed entry. Only final entries at or past both that
/// index and the cursor are new utterances.
#[derive(Debug, Default)]
pub struct ResultCursor {
    next_index: usize,
}

impl ResultCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget emitted results (new recognition session)
    pub fn reset(&mut self) {
        self.next_index = 0;
    }

    pub fn position(&self) -> usize {
        self.next_index
    }

    /// Newly finalized, non-blank transcripts in `results`
    pub fn advance(&mut self, result_index: usize, results: &[RecognitionResult]) -> Vec<String> {
        let start = result_index.max(self.next_index);
        let mut finalized = Vec::new();

        for (index, result) in results.iter().enumerate().skip(start) {
            if !result.is_final {
                break;
            }
            self.next_index = index + 1;

            let text = result.transcript.trim();
            if !text.is_empty() {
                finalized.push(text.to_string());
            }
        }

        finalized
    }

    /// Newly finalized segments joined into a single utterance
    ///
    /// One capture start yields one utterance, so segments finalized by the
    /// same update are spoken as one.
    pub fn next_utterance(
        &mut self,
        result_index: usize,
        results: &[RecognitionResult],
    ) -> Option<String> {
        let finalized = self.advance(result_index, results);
        if finalized.is_empty() {
            None
        } else {
            Some(finalized.join(" "))
        }
    }
}
