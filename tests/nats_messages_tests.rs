use loqa_voice_chat::capture::messages::{ControlCommand, ControlMessage, RecognitionMessage};
use loqa_voice_chat::capture::ResultCursor;
use loqa_voice_chat::error::CaptureErrorKind;

#[test]
fn test_result_deserialization() {
    let json = r#"{
        "type": "result",
        "session_id": "chat-1",
        "result_index": 0,
        "results": [
            {"transcript": "hello world", "is_final": true, "confidence": 0.95}
        ]
    }"#;

    let msg: RecognitionMessage = serde_json::from_str(json).unwrap();
    assert_eq!(msg.session_id(), "chat-1");

    match msg {
        RecognitionMessage::Result {
            result_index,
            results,
            ..
        } => {
            assert_eq!(result_index, 0);
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].transcript, "hello world");
            assert!(results[0].is_final);
            assert_eq!(results[0].confidence, Some(0.95));
        }
        other => panic!("expected a result, got {:?}", other),
    }
}

#[test]
fn test_interim_result_without_confidence() {
    let json = r#"{
        "type": "result",
        "session_id": "chat-1",
        "result_index": 1,
        "results": [
            {"transcript": "first", "is_final": true},
            {"transcript": "seco"}
        ]
    }"#;

    let msg: RecognitionMessage = serde_json::from_str(json).unwrap();
    let RecognitionMessage::Result {
        result_index,
        results,
        ..
    } = msg
    else {
        panic!("expected a result");
    };

    assert!(!results[1].is_final);
    assert_eq!(results[1].confidence, None);

    // Entry 0 was emitted by an earlier event; entry 1 is still interim
    let mut cursor = ResultCursor::new();
    assert!(cursor.advance(result_index, &results).is_empty());
}

#[test]
fn test_error_and_speech_end_deserialization() {
    let error: RecognitionMessage = serde_json::from_str(
        r#"{"type": "error", "session_id": "chat-1", "error": "not-allowed"}"#,
    )
    .unwrap();
    assert_eq!(
        error,
        RecognitionMessage::Error {
            session_id: "chat-1".to_string(),
            error: "not-allowed".to_string(),
            message: None,
        }
    );

    let end: RecognitionMessage =
        serde_json::from_str(r#"{"type": "speech_end", "session_id": "chat-1"}"#).unwrap();
    assert_eq!(
        end,
        RecognitionMessage::SpeechEnd {
            session_id: "chat-1".to_string()
        }
    );
}

#[test]
fn test_recognizer_error_codes() {
    assert_eq!(CaptureErrorKind::from_code("not-allowed"), CaptureErrorKind::PermissionDenied);
    assert_eq!(
        CaptureErrorKind::from_code("service-not-allowed"),
        CaptureErrorKind::PermissionDenied
    );
    assert_eq!(CaptureErrorKind::from_code("no-speech"), CaptureErrorKind::NoSpeech);
    assert_eq!(CaptureErrorKind::from_code("aborted"), CaptureErrorKind::Aborted);
    assert_eq!(CaptureErrorKind::from_code("network"), CaptureErrorKind::Network);
    assert_eq!(
        CaptureErrorKind::from_code("audio-capture"),
        CaptureErrorKind::Other("audio-capture".to_string())
    );
}

#[test]
fn test_control_serialization() {
    let msg = ControlMessage {
        session_id: "chat-1".to_string(),
        command: ControlCommand::Start,
        lang: "en-US".to_string(),
        interim_results: false,
        max_alternatives: 1,
        timestamp: "2025-10-27T14:30:00Z".to_string(),
    };

    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"command\":\"start\""));
    assert!(json.contains("\"lang\":\"en-US\""));
    assert!(json.contains("\"interim_results\":false"));

    let deserialized: ControlMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.command, ControlCommand::Start);
    assert_eq!(deserialized.max_alternatives, 1);
}
