//! Pipeline integration tests
//!
//! Exercises the voice-message response pipeline with mock collaborators,
//! covering both branches and every terminal notice.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use parakeet::channels::{Attachment, Channel, IncomingMessage, OutgoingMessage};
use parakeet::pipeline::{
    NO_VOICE_CHANNEL_NOTICE, PipelineOutcome, RESPONSE_FAILED_NOTICE, ReplyGenerator, Speaker,
    TRANSCRIPTION_FAILED_NOTICE, Transcriber, VoicePipeline, WeatherProvider,
};
use parakeet::weather::WeatherSnapshot;
use parakeet::{Error, Result};

const GUILD: u64 = 4242;
const VOICE_CHANNEL: u64 = 9000;

/// Mock channel recording every sent message
struct MockChannel {
    sent: Mutex<Vec<OutgoingMessage>>,
}

impl MockChannel {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    async fn sent_messages(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Channel for MockChannel {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }

    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        self.sent.lock().await.push(message);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// Mock transcriber: `None` fails every call
struct MockTranscriber {
    transcript: Option<String>,
    calls: AtomicUsize,
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.transcript
            .clone()
            .ok_or_else(|| Error::Stt("audio fetch failed with status 404".to_string()))
    }
}

/// Mock weather provider: `None` fails every call
struct MockWeather {
    snapshot: Option<WeatherSnapshot>,
    calls: AtomicUsize,
    last_city: Mutex<Option<String>>,
}

#[async_trait]
impl WeatherProvider for MockWeather {
    async fn current(&self, city: &str) -> Result<WeatherSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_city.lock().await = Some(city.to_string());
        self.snapshot
            .clone()
            .ok_or_else(|| Error::Weather("weather API error 500".to_string()))
    }
}

/// Mock reply generator: `None` fails every call
struct MockReplies {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ReplyGenerator for MockReplies {
    async fn reply(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().await.push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| Error::Completion("response contained no choices".to_string()))
    }
}

/// Mock speaker recording playback requests
struct MockSpeaker {
    calls: AtomicUsize,
    last: Mutex<Option<(u64, u64, String)>>,
}

#[async_trait]
impl Speaker for MockSpeaker {
    async fn speak(&self, guild_id: u64, channel_id: u64, text: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().await = Some((guild_id, channel_id, text.to_string()));
        Ok(())
    }
}

struct Harness {
    pipeline: VoicePipeline,
    transcriber: Arc<MockTranscriber>,
    weather: Arc<MockWeather>,
    replies: Arc<MockReplies>,
    speaker: Arc<MockSpeaker>,
    channel: Arc<MockChannel>,
}

fn harness(
    transcript: Option<&str>,
    snapshot: Option<WeatherSnapshot>,
    reply: Option<&str>,
) -> Harness {
    let transcriber = Arc::new(MockTranscriber {
        transcript: transcript.map(String::from),
        calls: AtomicUsize::new(0),
    });
    let weather = Arc::new(MockWeather {
        snapshot,
        calls: AtomicUsize::new(0),
        last_city: Mutex::new(None),
    });
    let replies = Arc::new(MockReplies {
        reply: reply.map(String::from),
        prompts: Mutex::new(Vec::new()),
    });
    let speaker = Arc::new(MockSpeaker {
        calls: AtomicUsize::new(0),
        last: Mutex::new(None),
    });
    let channel = Arc::new(MockChannel::new());

    let pipeline = VoicePipeline::new(
        Arc::clone(&transcriber) as Arc<dyn Transcriber>,
        Arc::clone(&weather) as Arc<dyn WeatherProvider>,
        Arc::clone(&replies) as Arc<dyn ReplyGenerator>,
        Arc::clone(&speaker) as Arc<dyn Speaker>,
        Arc::clone(&channel) as Arc<dyn Channel>,
    );

    Harness {
        pipeline,
        transcriber,
        weather,
        replies,
        speaker,
        channel,
    }
}

fn sunny() -> WeatherSnapshot {
    WeatherSnapshot {
        condition: "Sunny".to_string(),
        temp_c: 20.0,
        feelslike_c: 18.0,
    }
}

fn voice_message(mime: &str, in_voice: bool) -> IncomingMessage {
    IncomingMessage {
        id: "msg-1".to_string(),
        channel_id: "text-1".to_string(),
        sender_id: "user-1".to_string(),
        sender_name: "tester".to_string(),
        content: String::new(),
        guild_id: Some(GUILD),
        voice_channel_id: in_voice.then_some(VOICE_CHANNEL),
        attachments: vec![Attachment::from_url(
            "https://cdn.example/voice-message.ogg".to_string(),
            mime.to_string(),
            Some("voice-message.ogg".to_string()),
        )],
    }
}

#[tokio::test]
async fn transcription_failure_sends_notice_and_stops() {
    let h = harness(None, Some(sunny()), Some("a reply"));

    let outcome = h.pipeline.handle(&voice_message("audio/ogg", true)).await.unwrap();
    assert_eq!(outcome, PipelineOutcome::TranscriptionFailed);

    let sent = h.channel.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].content, TRANSCRIPTION_FAILED_NOTICE);
    assert_eq!(sent[0].channel_id, "text-1");

    // No further outbound calls after the failing stage
    assert_eq!(h.weather.calls.load(Ordering::SeqCst), 0);
    assert!(h.replies.prompts.lock().await.is_empty());
    assert_eq!(h.speaker.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn non_audio_attachment_is_ignored() {
    let h = harness(Some("Tell me a joke"), None, Some("a reply"));

    let outcome = h.pipeline.handle(&voice_message("image/png", true)).await.unwrap();
    assert_eq!(outcome, PipelineOutcome::Ignored);

    assert!(h.channel.sent_messages().await.is_empty());
    assert_eq!(h.transcriber.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn message_without_attachments_is_ignored() {
    let h = harness(Some("Tell me a joke"), None, Some("a reply"));

    let mut message = voice_message("audio/ogg", true);
    message.attachments.clear();

    let outcome = h.pipeline.handle(&message).await.unwrap();
    assert_eq!(outcome, PipelineOutcome::Ignored);
    assert!(h.channel.sent_messages().await.is_empty());
}

#[tokio::test]
async fn direct_branch_builds_assistant_prompt() {
    let h = harness(Some("Tell me a joke"), None, Some("Why did the crab cross the road?"));

    let outcome = h.pipeline.handle(&voice_message("audio/ogg", true)).await.unwrap();
    assert_eq!(outcome, PipelineOutcome::Played);

    let prompts = h.replies.prompts.lock().await.clone();
    assert_eq!(
        prompts,
        vec![
            "Answer with a brief text as a simple voice assistant to this message, try to be concise: Tell me a joke"
                .to_string()
        ]
    );

    // Weather branch never ran
    assert_eq!(h.weather.calls.load(Ordering::SeqCst), 0);

    let spoken = h.speaker.last.lock().await.clone().unwrap();
    assert_eq!(
        spoken,
        (GUILD, VOICE_CHANNEL, "Why did the crab cross the road?".to_string())
    );
    assert!(h.channel.sent_messages().await.is_empty());
}

#[tokio::test]
async fn weather_branch_wraps_formatted_sentence() {
    let h = harness(
        Some("what is the weather like in Berlin"),
        Some(sunny()),
        Some("Berlin is sunny at 20 degrees."),
    );

    let outcome = h.pipeline.handle(&voice_message("audio/ogg", true)).await.unwrap();
    assert_eq!(outcome, PipelineOutcome::Played);

    assert_eq!(h.weather.last_city.lock().await.clone().unwrap(), "Berlin");

    let prompts = h.replies.prompts.lock().await.clone();
    assert_eq!(
        prompts,
        vec![
            "Summarize this weather information for Berlin into one sentence: The current weather is Sunny with a temperature of 20°C, feeling like 18°C."
                .to_string()
        ]
    );

    assert_eq!(h.speaker.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn weather_branch_matches_case_insensitively() {
    let h = harness(
        Some("What IS the Weather like in Tokyo?"),
        Some(sunny()),
        Some("a reply"),
    );

    h.pipeline.handle(&voice_message("audio/ogg", true)).await.unwrap();

    assert_eq!(h.weather.last_city.lock().await.clone().unwrap(), "Tokyo");
}

#[tokio::test]
async fn weather_failure_falls_back_to_apology() {
    let h = harness(
        Some("what is the weather like in Berlin"),
        None,
        Some("a reply"),
    );

    let outcome = h.pipeline.handle(&voice_message("audio/ogg", true)).await.unwrap();
    // A failed lookup is not terminal: the apology goes through the reply stage
    assert_eq!(outcome, PipelineOutcome::Played);

    let prompts = h.replies.prompts.lock().await.clone();
    assert_eq!(
        prompts,
        vec![
            "Summarize this weather information for Berlin into one sentence: I'm sorry, I couldn't retrieve the weather information."
                .to_string()
        ]
    );
}

#[tokio::test]
async fn reply_failure_sends_notice() {
    let h = harness(Some("Tell me a joke"), None, None);

    let outcome = h.pipeline.handle(&voice_message("audio/ogg", true)).await.unwrap();
    assert_eq!(outcome, PipelineOutcome::ResponseFailed);

    let sent = h.channel.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].content, RESPONSE_FAILED_NOTICE);
    assert_eq!(h.speaker.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_reply_sends_notice() {
    let h = harness(Some("Tell me a joke"), None, Some("   "));

    let outcome = h.pipeline.handle(&voice_message("audio/ogg", true)).await.unwrap();
    assert_eq!(outcome, PipelineOutcome::ResponseFailed);

    let sent = h.channel.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].content, RESPONSE_FAILED_NOTICE);
}

#[tokio::test]
async fn sender_outside_voice_channel_gets_notice_without_playback() {
    let h = harness(Some("Tell me a joke"), None, Some("a reply"));

    let outcome = h.pipeline.handle(&voice_message("audio/ogg", false)).await.unwrap();
    assert_eq!(outcome, PipelineOutcome::NoVoiceChannel);

    let sent = h.channel.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].content, NO_VOICE_CHANNEL_NOTICE);
    assert_eq!(h.speaker.calls.load(Ordering::SeqCst), 0);
}
