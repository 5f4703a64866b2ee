//! Voice processing: transcription, speech synthesis, and playback

mod playback;
mod stt;
mod tts;

pub use playback::VoicePlayer;
pub use stt::SpeechToText;
pub use tts::TextToSpeech;
