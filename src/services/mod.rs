pub mod prefs;
pub mod quiz_generator;
pub mod scorer;
pub mod speech;

pub use prefs::{PrefsStore, HIDE_FLOATING_QUIZ_CTA};
pub use quiz_generator::{MiniQuizzes, QuizCache};
pub use scorer::{PassThreshold, QuizScore};
pub use speech::{
    CommandSynthesizer, SpeechController, SpeechEvent, SpeechSettings, SpeechSynthesizer,
    Utterance,
};
