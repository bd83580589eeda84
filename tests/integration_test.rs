use std::future::Future;

use nihongo_ebook::error::SpeechError;
use nihongo_ebook::models::{load_embedded_catalog, AlphabetKind, QuizQuestion};
use nihongo_ebook::services::{PrefsStore, SpeechEvent, SpeechSynthesizer, Utterance};
use nihongo_ebook::services::HIDE_FLOATING_QUIZ_CTA;
use nihongo_ebook::{App, Config, Reply, Route};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

/// 立即播放完成的语音
struct InstantSynthesizer {
    available: bool,
}

impl SpeechSynthesizer for InstantSynthesizer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn speak(&self, _utterance: Utterance) -> impl Future<Output = Result<(), SpeechError>> + Send {
        std::future::ready(Ok(()))
    }
}

fn app_with_speech(available: bool) -> (App<InstantSynthesizer>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let prefs_path = dir.path().join("prefs.json");
    let config = Config {
        prefs_file: prefs_path.display().to_string(),
        ..Config::default()
    };
    let app = App::with_parts(
        config,
        load_embedded_catalog().unwrap(),
        PrefsStore::in_memory(prefs_path),
        InstantSynthesizer { available },
        StdRng::seed_from_u64(7),
    )
    .unwrap();
    (app, dir)
}

fn app() -> (App<InstantSynthesizer>, TempDir) {
    app_with_speech(true)
}

/// 正确选项的编号；没有选项时直接给答案文本
fn correct_input(question: &QuizQuestion) -> String {
    match question
        .options
        .iter()
        .position(|option| *option == question.correct_answer)
    {
        Some(idx) => (idx + 1).to_string(),
        None => question.correct_answer.clone(),
    }
}

fn wrong_input(question: &QuizQuestion) -> String {
    let idx = question
        .options
        .iter()
        .position(|option| *option != question.correct_answer)
        .unwrap();
    (idx + 1).to_string()
}

async fn answer_quiz(app: &mut App<InstantSynthesizer>, lesson_id: u32, correct: usize) {
    let questions = app.catalog().lesson(lesson_id).unwrap().quiz.clone();
    for (idx, question) in questions.iter().enumerate() {
        let input = if idx < correct {
            correct_input(question)
        } else {
            wrong_input(question)
        };
        let reply = app.handle(&format!("answer {} {}", idx + 1, input)).await;
        assert!(matches!(reply, Reply::Screen(_)), "{:?}", reply);
    }
}

#[test]
fn test_embedded_catalog_is_consistent() {
    let catalog = load_embedded_catalog().unwrap();

    let ids: Vec<u32> = catalog.lessons().iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    for lesson in catalog.lessons() {
        assert!(lesson.vocabulary.len() >= 4, "lesson {}", lesson.id);
        for question in &lesson.quiz {
            assert_eq!(question.correct_option_count(), 1);
        }
    }

    for kind in AlphabetKind::ALL {
        for character in &catalog.alphabet(kind).characters {
            assert!(!character.strokes.is_empty(), "{}", character.character);
        }
    }
}

#[tokio::test]
async fn test_perfect_quiz_unlocks_next_lesson() {
    let (mut app, _dir) = app();
    app.handle("/quizzes/1").await;
    answer_quiz(&mut app, 1, 5).await;

    let reply = app.handle("submit").await;
    let text = reply.text();
    assert!(text.contains("Excellent Work!"));
    assert!(text.contains("You got 5 out of 5 correct"));
    assert!(text.contains("100%"));

    let reply = app.handle("continue").await;
    assert_eq!(app.route(), Route::Lesson(2));
    assert!(reply.text().starts_with("Lesson 2: Demonstratives & Objects"));
}

#[tokio::test]
async fn test_failing_quiz_keeps_next_lesson_locked() {
    let (mut app, _dir) = app();
    app.handle("/quizzes/1").await;
    answer_quiz(&mut app, 1, 3).await;

    let text = app.handle("submit").await.text().to_string();
    assert!(text.contains("Keep Practicing!"));
    assert!(text.contains("60%"));
    assert!(text.contains("Correct answer:"));

    let reply = app.handle("continue").await;
    assert_eq!(
        reply,
        Reply::Message("Pass the quiz to unlock the next lesson.".to_string())
    );
    assert_eq!(app.route(), Route::Quiz(1));

    let text = app.handle("retry").await.text().to_string();
    assert!(text.contains("Answered 0 of 5"));
}

#[tokio::test]
async fn test_submit_requires_all_answers() {
    let (mut app, _dir) = app();
    app.handle("/quizzes/2").await;
    app.handle("answer 1 1").await;

    let reply = app.handle("submit").await;
    assert!(matches!(reply, Reply::Message(_)));
    assert!(reply.text().contains("answer all questions (1/5)"));
}

#[tokio::test]
async fn test_last_lesson_has_no_next_lesson() {
    let (mut app, _dir) = app();
    app.handle("/quizzes/4").await;
    answer_quiz(&mut app, 4, 5).await;

    let text = app.handle("submit").await.text().to_string();
    assert!(text.contains("You finished every lesson!"));
    assert!(matches!(app.handle("continue").await, Reply::Message(_)));
}

#[tokio::test]
async fn test_unknown_and_missing_routes() {
    let (mut app, _dir) = app();

    let reply = app.handle("/nowhere").await;
    assert!(reply.text().contains("unknown route: /nowhere"));
    assert_eq!(app.route(), Route::Home);

    let reply = app.handle("/lessons/99").await;
    assert!(reply.text().starts_with("Lesson not found"));
    assert!(!reply.text().contains("Take Quiz"));
    assert!(!reply.text().contains("Practice Quiz"));

    let reply = app.handle("/quizzes/99").await;
    assert!(reply.text().starts_with("Quiz not found"));
}

#[tokio::test]
async fn test_lesson_steps_move_forward_only() {
    let (mut app, _dir) = app();
    let text = app.handle("/lessons/1").await.text().to_string();
    assert!(text.contains("Step 1 of"));

    let reply = app.handle("step 3").await;
    assert!(reply.text().contains("step 3 is locked (current step is 1)"));

    let text = app.handle("next").await.text().to_string();
    assert!(text.contains("Step 2 of"));
    assert!(text.contains("Quick check"));

    let text = app.handle("step 1").await.text().to_string();
    assert!(text.contains("Step 1 of"));
}

#[tokio::test]
async fn test_lesson_step_no_change_only_informs() {
    let (mut app, _dir) = app();
    app.handle("/lessons/1").await;

    assert_eq!(
        app.handle("prev").await,
        Reply::Message("This is the first step.".to_string())
    );
    assert_eq!(
        app.handle("step 1").await,
        Reply::Message("Already on this step.".to_string())
    );

    let last = loop {
        let reply = app.handle("next").await;
        if let Reply::Message(message) = reply {
            break message;
        }
    };
    assert_eq!(last, "This is the last step.");
}

#[tokio::test]
async fn test_floating_quiz_prompt_dismissal_persists() {
    let (mut app, dir) = app();

    assert!(!app.handle("/").await.text().contains("Practice Quiz"));
    assert!(app
        .handle("/lessons/1")
        .await
        .text()
        .contains("[ Take Quiz → /quizzes/1 ]"));
    assert!(app.handle("/alphabet").await.text().contains("Practice Quiz"));

    let text = app.handle("dismiss").await.text().to_string();
    assert!(!text.contains("Practice Quiz"));

    let prefs = PrefsStore::load(dir.path().join("prefs.json")).await.unwrap();
    assert_eq!(prefs.get(HIDE_FLOATING_QUIZ_CTA), Some("1"));

    assert!(!app.handle("/lessons/2").await.text().contains("Take Quiz"));
}

#[tokio::test]
async fn test_pronounce_vocabulary() {
    let (mut app, _dir) = app();
    app.handle("/lessons/1").await;
    app.handle("next").await;

    let text = app.handle("say 1").await.text().to_string();
    assert!(text.contains("🔊 1."));

    let event = app.next_speech_event().await.unwrap();
    assert_eq!(
        event,
        SpeechEvent::Finished {
            key: "vocab-0".to_string()
        }
    );
    assert!(!app.render().contains('🔊'));
}

#[tokio::test]
async fn test_pronounce_without_speech_support() {
    let (mut app, _dir) = app_with_speech(false);
    app.handle("/alphabet").await;

    let reply = app.handle("say").await;
    assert!(matches!(reply, Reply::Message(_)));
    assert!(reply
        .text()
        .contains("Text-to-speech is not supported on this system"));
    assert!(!app.render().contains('🔊'));
}

#[tokio::test]
async fn test_flashcards_wrap_and_switch() {
    let (mut app, _dir) = app();
    app.handle("/alphabet").await;

    let text = app.handle("prev").await.text().to_string();
    assert!(text.contains("Card 46 of 46"));

    let text = app.handle("flip").await.text().to_string();
    assert!(!text.contains("flip to see the reading"));

    let text = app.handle("set katakana").await.text().to_string();
    assert!(text.contains("Card 1 of 46"));
    assert!(text.contains("[ 1 ア]"));

    let reply = app.handle("jump 47").await;
    assert!(reply.text().contains("card 47 does not exist"));
}

#[tokio::test]
async fn test_help_and_unknown_commands() {
    let (mut app, _dir) = app();
    assert!(app.handle("help").await.text().contains("Navigation"));
    assert!(app
        .handle("flip")
        .await
        .text()
        .contains("unknown command: flip"));
    assert_eq!(app.handle("quit").await, Reply::Quit);
}
