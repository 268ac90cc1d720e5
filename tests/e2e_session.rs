// ImageQA - tests/e2e_session.rs
//
// End-to-end tests for the upload → ask → export pipeline.
//
// These tests use real encoded images, the real `image` decoder, real files
// on disk and, for the HTTP collaborator, a real loopback socket speaking
// HTTP/1.1. Nothing leaves the machine.

use imageqa::app::ask::{AskManager, AskProgress};
use imageqa::app::http::HttpAnswerer;
use imageqa::app::state::AppState;
use imageqa::core::answer::{AnswerConfig, Answerer, ApiKey};
use imageqa::core::export;
use imageqa::core::model::{ConversationEntry, SessionEvent};
use imageqa::core::session::Session;
use imageqa::core::theme::ThemePreset;
use imageqa::util::error::AnswerError;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::time::Duration;

// =============================================================================
// Helpers
// =============================================================================

fn encoded(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba([200, 40, 90, 255]),
    ));
    let img = match format {
        image::ImageFormat::Jpeg => image::DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    img.write_to(&mut cursor, format).unwrap();
    cursor.into_inner()
}

/// A request captured by the stub server.
struct Captured {
    head: String,
    body: serde_json::Value,
}

/// Serve exactly one HTTP request on a loopback port, replying with
/// `status` and `body`. Returns the endpoint URL and the captured request.
fn stub_server(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/v1/answer", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut head = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            let lower = line.to_ascii_lowercase();
            if let Some(v) = lower.strip_prefix("content-length:") {
                content_length = v.trim().parse().unwrap();
            }
            head.push_str(&line);
        }
        let mut raw = vec![0u8; content_length];
        reader.read_exact(&mut raw).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();

        let _ = tx.send(Captured {
            head,
            body: serde_json::from_slice(&raw).unwrap_or(serde_json::Value::Null),
        });
    });

    (url, rx)
}

fn http_config(endpoint: String) -> AnswerConfig {
    AnswerConfig {
        endpoint,
        api_key: ApiKey::new("sk-test"),
        temperature: 0.3,
        max_tokens: 150,
        timeout: Duration::from_secs(10),
        ..AnswerConfig::default()
    }
}

// =============================================================================
// Session pipeline with the placeholder collaborator
// =============================================================================

/// Upload a JPEG, ask twice, export; the text matches the documented layout.
#[test]
fn e2e_placeholder_conversation_and_export() {
    let mut state = AppState::new(AnswerConfig::default(), ThemePreset::default(), false);
    assert!(state.upload_bytes(
        encoded(120, 80, image::ImageFormat::Jpeg),
        Some("jpg"),
        "photo.jpg"
    ));
    assert_eq!(state.session.image_info().unwrap().dimensions_label(), "120 \u{00d7} 80");

    let mut manager = AskManager::new();
    for question in ["What is shown?", "What colour is it?"] {
        state.question_input = question.to_string();
        let pending = state.begin_submit().expect("submission accepted");
        manager.start(pending, state.answer_config.clamped());
        let Some(AskProgress::Completed {
            epoch,
            question,
            answerer,
            result,
            ..
        }) = manager.wait(Duration::from_secs(5))
        else {
            panic!("no answer delivered");
        };
        assert_eq!(answerer, "placeholder");
        state.apply_answer(epoch, question, answerer, result);
    }

    let expected = "Q: What is shown?\n\
                    A: [Model Response] This is a placeholder response for: 'What is shown?'\n\n\
                    Q: What colour is it?\n\
                    A: [Model Response] This is a placeholder response for: 'What colour is it?'";
    assert_eq!(state.history_report(), expected);

    let dir = tempfile::tempdir().unwrap();
    let txt = dir.path().join("conversation_history.txt");
    let n = export::write_history_text(
        state.session.history(),
        std::fs::File::create(&txt).unwrap(),
        &txt,
    )
    .unwrap();
    assert_eq!(n, 2);
    assert_eq!(std::fs::read_to_string(&txt).unwrap(), expected);

    let json = dir.path().join("history.json");
    assert!(export::wants_json(&json));
    export::write_history_json(
        state.session.history(),
        std::fs::File::create(&json).unwrap(),
        &json,
    )
    .unwrap();
    let parsed: Vec<ConversationEntry> =
        serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(parsed, state.session.history());
}

/// Loading from disk uses the extension as the declared format, but the
/// content wins when they disagree.
#[test]
fn e2e_upload_from_disk_sniffs_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mislabelled.jpg");
    std::fs::write(&path, encoded(33, 44, image::ImageFormat::Png)).unwrap();

    let mut state = AppState::new(AnswerConfig::default(), ThemePreset::OceanBlue, false);
    assert!(state.upload_from_path(&path));
    let info = state.session.image_info().unwrap();
    assert_eq!(info.format.label(), "PNG");
    assert_eq!((info.width, info.height), (33, 44));
    assert_eq!(state.image_name.as_deref(), Some("mislabelled.jpg"));
}

/// Replacing the image while a question is in flight drops the late answer.
#[test]
fn e2e_late_answer_for_replaced_image_is_discarded() {
    let mut state = AppState::new(AnswerConfig::default(), ThemePreset::default(), false);
    state.upload_bytes(encoded(10, 10, image::ImageFormat::Png), None, "a.png");
    state.question_input = "first?".to_string();
    let pending = state.begin_submit().unwrap();

    state.upload_bytes(encoded(20, 20, image::ImageFormat::Bmp), None, "b.bmp");
    state.session.take_events();

    state.apply_answer(pending.epoch, pending.question, "placeholder", Ok("late".into()));
    assert!(state.session.history().is_empty());
    assert!(state.session.take_events().is_empty());
}

/// Events arrive in order and only for observable changes.
#[test]
fn e2e_session_event_stream() {
    let mut session = Session::new();
    session
        .upload_image(encoded(8, 8, image::ImageFormat::Gif), Some("gif"))
        .unwrap();
    session.set_theme("Dark Mode").unwrap();
    session.set_theme("Dark Mode").unwrap();
    assert!(session.set_theme("Neon").is_err());
    session.clear_history();

    assert_eq!(
        session.take_events(),
        vec![SessionEvent::ImageChanged, SessionEvent::ThemeChanged]
    );
}

// =============================================================================
// HTTP collaborator against a loopback server
// =============================================================================

/// A 200 JSON reply becomes the answer; the request carries the question,
/// the base64 image, sampling options and the bearer token.
#[test]
fn e2e_http_answer_success() {
    let (url, captured) = stub_server("200 OK", r#"{"answer":"A pink square."}"#);
    let image = encoded(16, 16, image::ImageFormat::Png);

    let answer = HttpAnswerer::new()
        .answer(&image, "What is this?", &http_config(url))
        .unwrap();
    assert_eq!(answer, "A pink square.");

    let req = captured.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(req.head.starts_with("POST /v1/answer"));
    assert!(req
        .head
        .to_ascii_lowercase()
        .contains("authorization: bearer sk-test"));
    assert_eq!(req.body["question"], "What is this?");
    assert_eq!(req.body["image_format"], "png");
    assert_eq!(req.body["max_tokens"], 150);
    assert!(req.body["image"].as_str().is_some_and(|s| !s.is_empty()));
}

/// 401 maps to Unauthorized and the session stays ready with no new entry.
#[test]
fn e2e_http_unauthorized_leaves_history_unchanged() {
    let (url, _captured) = stub_server("401 Unauthorized", r#"{"error":"bad key"}"#);
    let mut state = AppState::new(http_config(url), ThemePreset::default(), false);
    state.upload_bytes(encoded(16, 16, image::ImageFormat::Png), None, "x.png");
    state.question_input = "Hello?".to_string();

    let mut manager = AskManager::new();
    let pending = state.begin_submit().unwrap();
    manager.start(pending, state.answer_config.clamped());
    let Some(AskProgress::Completed {
        epoch,
        question,
        answerer,
        result,
        ..
    }) = manager.wait(Duration::from_secs(10))
    else {
        panic!("no answer delivered");
    };
    assert_eq!(answerer, "http");
    assert!(matches!(result, Err(AnswerError::Unauthorized { status: 401 })));

    state.apply_answer(epoch, question, answerer, result);
    assert!(state.session.history().is_empty());
    assert!(!state.session.is_awaiting_answer());
    assert_eq!(state.question_input, "Hello?");
}

/// Nothing listening: the failure is a network error, not a panic.
#[test]
fn e2e_http_unreachable_endpoint() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = AnswerConfig {
        timeout: Duration::from_secs(5),
        ..http_config(format!("http://127.0.0.1:{port}/"))
    };
    let err = HttpAnswerer::new()
        .answer(&encoded(4, 4, image::ImageFormat::Png), "q", &config)
        .unwrap_err();
    assert!(matches!(err, AnswerError::Network { .. }), "got {err:?}");
}

// =============================================================================
// Configuration from disk
// =============================================================================

/// A config.toml on disk is loaded; out-of-range values warn and fall back.
#[test]
fn e2e_config_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[model]\nendpoint = \"http://127.0.0.1:9/\"\ntemperature = 3.5\nmax_tokens = 800\n\
         [ui]\ntheme = \"Forest Green\"\n",
    )
    .unwrap();

    let (config, warnings) = imageqa::platform::config::load_config(dir.path());
    assert_eq!(warnings.len(), 1, "warnings: {warnings:?}");
    assert!(warnings[0].contains("temperature"));
    assert_eq!(config.endpoint, "http://127.0.0.1:9/");
    assert_eq!(config.temperature, imageqa::util::constants::DEFAULT_TEMPERATURE);
    assert_eq!(config.max_tokens, 800);
    assert_eq!(
        ThemePreset::from_name(config.theme.as_deref().unwrap()),
        Ok(ThemePreset::ForestGreen)
    );
}
