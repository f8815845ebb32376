//! End-to-end session scenarios through the event loop against a mock API.

use std::sync::Arc;
use std::time::Duration;

use lab_client::{GenerationConfig, GenerationService, RetryConfig};
use lab_core::{Control, CorePreset, PromptSource, StateUpdate, UiEvent};
use lab_export::SessionExporter;
use lab_studio::{run, JobRunner, MemorySink, SessionController, StudioHandle, UiBus};
use serde_json::json;
use tokio::sync::broadcast;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEXT_PATH: &str = "/models/gemini-2.5-flash-preview-09-2025:generateContent";
const IMAGE_PATH: &str = "/models/imagen-4.0-generate-001:predict";
const SPEECH_PATH: &str = "/models/gemini-2.5-flash-preview-tts:generateContent";

/// 1x1 PNG.
const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn text_body(text: &str) -> serde_json::Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

struct Harness {
    bus: UiBus,
    controller: SessionController,
    runner: Arc<JobRunner>,
    sink: Arc<MemorySink>,
}

fn harness(server: &MockServer) -> Harness {
    let config = GenerationConfig::new("test-key")
        .with_api_base(server.uri())
        .with_retry(RetryConfig::new(5, 1));
    let service = GenerationService::new(config).expect("service builds");
    let sink = Arc::new(MemorySink::new());
    let runner = Arc::new(JobRunner::new(
        service,
        SessionExporter::with_defaults(),
        sink.clone(),
    ));
    let bus = UiBus::default();
    Harness {
        controller: SessionController::new(bus.clone()),
        bus,
        runner,
        sink,
    }
}

async fn wait_for(
    rx: &mut broadcast::Receiver<StateUpdate>,
    wanted: impl Fn(&StateUpdate) -> bool,
) -> StateUpdate {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let update = rx.recv().await.expect("bus open");
            if wanted(&update) {
                return update;
            }
        }
    })
    .await
    .expect("update should arrive")
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn generate_manifest_speak_export() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(text_body("Liquid chrome hero section.")),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .and(body_string_contains("Liquid chrome hero section.. Iteration 1."))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [
                { "bytesBase64Encoded": PNG_B64 },
                { "bytesBase64Encoded": PNG_B64 },
                { "bytesBase64Encoded": PNG_B64 },
                { "bytesBase64Encoded": PNG_B64 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SPEECH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "AAAAAAAAAAA=" } }] } }]
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    let mut rx = h.bus.subscribe();
    let (handle, commands) = StudioHandle::channel(16);

    let driver = async move {
        handle
            .send(UiEvent::Generate {
                prompt: PromptSource::Preset(CorePreset::Magic),
            })
            .await
            .expect("sent");
        wait_for(&mut rx, |u| matches!(u, StateUpdate::ActionBar { visible: true })).await;

        handle
            .send(UiEvent::Manifest { count: 4 })
            .await
            .expect("sent");
        wait_for(&mut rx, |u| matches!(u, StateUpdate::ExportControl { visible: true })).await;

        handle
            .send(UiEvent::Speak { text: None })
            .await
            .expect("sent");
        let audio = wait_for(&mut rx, |u| matches!(u, StateUpdate::AudioReady { .. })).await;

        handle.send(UiEvent::Export).await.expect("sent");
        let exported = wait_for(&mut rx, |u| matches!(u, StateUpdate::Exported { .. })).await;

        (handle.snapshot().await.expect("snapshot"), audio, exported)
    };

    let (controller, (snapshot, audio, exported)) =
        tokio::join!(run(h.controller, h.runner, commands), driver);

    assert_eq!(snapshot.concept_text, "Liquid chrome hero section.");
    assert_eq!(snapshot.generation_count, 1);
    assert_eq!(snapshot.view.gallery.len(), 4);
    assert_eq!(snapshot.view.scroll_to, Some(snapshot.view.gallery[0]));
    assert!(snapshot.view.export_visible);
    assert!(snapshot.view.busy.is_empty());
    assert_eq!(controller.gallery().len(), 4);

    assert!(matches!(audio, StateUpdate::AudioReady { .. }));
    match exported {
        StateUpdate::Exported { pages, .. } => assert_eq!(pages, 5),
        other => panic!("unexpected {other:?}"),
    }

    let clips = h.sink.audio().await;
    assert_eq!(clips.len(), 1);
    assert_eq!(clips[0].len(), 44 + 8);
    assert_eq!(&clips[0][0..4], b"RIFF");

    let documents = h.sink.documents().await;
    assert_eq!(documents.len(), 1);
    assert!(documents[0].0.starts_with("Gemini-Design-Project-"));
    assert!(documents[0].1.starts_with(b"%PDF-"));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn failing_endpoint_shows_fixed_error_after_six_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(6)
        .mount(&server)
        .await;

    let h = harness(&server);
    let mut rx = h.bus.subscribe();
    let (handle, commands) = StudioHandle::channel(16);

    let driver = async move {
        handle
            .send(UiEvent::Generate {
                prompt: PromptSource::Custom("Explain X".into()),
            })
            .await
            .expect("sent");
        wait_for(&mut rx, |u| {
            matches!(
                u,
                StateUpdate::ControlBusy {
                    control: Control::Prompt,
                    busy: false
                }
            )
        })
        .await;
        handle.snapshot().await.expect("snapshot")
    };

    let (_, snapshot) = tokio::join!(run(h.controller, h.runner, commands), driver);

    assert_eq!(snapshot.view.console_text, "Error in neural link. Try again.");
    assert!(!snapshot.view.action_bar_visible);
    assert!(snapshot.view.busy.is_empty());
    assert_eq!(snapshot.concept_text, "");

    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 6);
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn slower_older_generation_does_not_overwrite_newer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(body_string_contains("liquid metal"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_body("stale magic"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(body_string_contains("gloss UI design"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body("fresh storm")))
        .mount(&server)
        .await;

    let h = harness(&server);
    let mut rx = h.bus.subscribe();
    let (handle, commands) = StudioHandle::channel(16);

    let driver = async move {
        for preset in [CorePreset::Magic, CorePreset::Storm] {
            handle
                .send(UiEvent::Generate {
                    prompt: PromptSource::Preset(preset),
                })
                .await
                .expect("sent");
        }
        wait_for(&mut rx, |u| {
            matches!(
                u,
                StateUpdate::ControlBusy {
                    control: Control::Magic,
                    busy: false
                }
            )
        })
        .await;
        handle.snapshot().await.expect("snapshot")
    };

    let (_, snapshot) = tokio::join!(run(h.controller, h.runner, commands), driver);

    assert_eq!(snapshot.concept_text, "fresh storm");
    assert_eq!(snapshot.view.console_text, "fresh storm");
    assert!(snapshot.view.busy.is_empty());
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn filtered_batch_reports_manifestation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [{ "raiFilteredReason": "blocked" }]
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    let mut rx = h.bus.subscribe();
    let (handle, commands) = StudioHandle::channel(16);

    let driver = async move {
        handle
            .send(UiEvent::Edit {
                text: "Hand-typed chrome concept".into(),
            })
            .await
            .expect("sent");
        handle
            .send(UiEvent::Manifest { count: 1 })
            .await
            .expect("sent");
        let update = wait_for(&mut rx, |u| {
            matches!(u, StateUpdate::EmptyIndicator { message, .. } if message.contains("Manifestation"))
        })
        .await;
        (update, handle.snapshot().await.expect("snapshot"))
    };

    let (_, (update, snapshot)) = tokio::join!(run(h.controller, h.runner, commands), driver);

    assert_eq!(
        update,
        StateUpdate::EmptyIndicator {
            visible: true,
            message: "Manifestation error. Try again.".into()
        }
    );
    assert!(snapshot.view.gallery.is_empty());
    assert!(!snapshot.view.is_busy(Control::ManifestOne));
    assert!(!snapshot.view.is_busy(Control::ManifestFour));
}
