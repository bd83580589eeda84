//! 页面渲染
//!
//! 把各页面状态渲染成终端文本，不修改任何状态。

use crate::models::{AlphabetCharacter, AlphabetKind, AlphabetSet, Catalog, Lesson, QuizQuestion};
use crate::orchestrator::quiz_cta::QuizPrompt;
use crate::orchestrator::router::Route;
use crate::services::scorer::PassThreshold;
use crate::workflow::{FlashcardDeck, LessonStep, LessonView, QuizSession};

/// 快速跳转网格每行的假名数
const GRID_COLUMNS: usize = 5;

pub fn vocab_key(index: usize) -> String {
    format!("vocab-{}", index)
}

pub fn line_key(index: usize) -> String {
    format!("line-{}", index)
}

pub fn kana_key(character: &str) -> String {
    format!("kana-{}", character)
}

fn speaker_icon(key: &str, playing: Option<&str>) -> &'static str {
    if playing == Some(key) {
        "🔊"
    } else {
        "🔈"
    }
}

pub fn home(catalog: &Catalog) -> String {
    let mut lines = vec![
        "4B-EBook: Learn Japanese".to_string(),
        String::new(),
        "The fun way of learning Japanese is here!".to_string(),
        String::new(),
        format!("  /lessons    {} lessons", catalog.lessons().len()),
        format!("  /quizzes    {} quiz questions", catalog.question_count()),
        format!("  /alphabet   {} kana flashcards", catalog.character_count()),
        "  /about".to_string(),
    ];
    if let Some(first) = catalog.lessons().first() {
        lines.push(String::new());
        lines.push(format!("Start learning: {}", Route::Lesson(first.id)));
    }
    lines.join("\n")
}

pub fn lesson_list(catalog: &Catalog) -> String {
    let mut lines = vec!["Lessons".to_string(), String::new()];
    for lesson in catalog.lessons() {
        lines.push(format!("  {}  {}", Route::Lesson(lesson.id), lesson.title));
        lines.push(format!("      {}", lesson.description));
        lines.push(format!(
            "      {} words · {} grammar points · {} questions",
            lesson.vocabulary.len(),
            lesson.grammar.len(),
            lesson.quiz.len()
        ));
    }
    lines.join("\n")
}

pub fn quiz_list(catalog: &Catalog) -> String {
    let mut lines = vec!["Quizzes".to_string(), String::new()];
    for lesson in catalog.lessons().iter().filter(|l| !l.quiz.is_empty()) {
        lines.push(format!(
            "  {}  {} ({} questions)",
            Route::Quiz(lesson.id),
            lesson.title,
            lesson.quiz.len()
        ));
    }
    lines.join("\n")
}

pub fn lesson_not_found(id: u32) -> String {
    format!(
        "Lesson not found\n\nThere is no lesson {}.\nBack to lessons: {}",
        id,
        Route::Lessons
    )
}

pub fn quiz_not_found(id: u32) -> String {
    format!(
        "Quiz not found\n\nThere is no quiz for lesson {}.\nBack to quizzes: {}",
        id,
        Route::Quizzes
    )
}

pub fn about() -> String {
    [
        "About 4B-EBook",
        "",
        "A Japanese e-book made by the 4B class.",
        "",
        "  Easy to Learn      Step-by-step lessons",
        "  Practice           Fun quizzes & practice",
        "  Kana               Hiragana and katakana flashcards with stroke order",
        "",
        "Start learning instantly: /lessons",
    ]
    .join("\n")
}

pub fn help() -> String {
    [
        "Navigation: type a path such as /, /lessons, /lessons/1, /quizzes/1, /alphabet, /about",
        "Lesson:     next | prev | step <n> | say <n> | answer <q> <option|text> | check | retry",
        "Quiz:       answer <q> <option|text> | clear <q> | submit | retry | continue",
        "Alphabet:   next | prev | flip | jump <n> | set hiragana|katakana | say",
        "Anywhere:   dismiss (hide the quiz prompt) | help | quit",
    ]
    .join("\n")
}

pub fn quiz_prompt(prompt: &QuizPrompt) -> String {
    format!("[ {} → {} ]  (dismiss to hide)", prompt.label, prompt.target)
}

// ========== 课程页 ==========

pub fn lesson(view: &LessonView, next_lesson: Option<u32>, playing: Option<&str>) -> String {
    let lesson = view.lesson();
    let stepper = view.stepper();
    let (position, total) = stepper.progress();

    let mut lines = vec![
        format!("Lesson {}: {}", lesson.id, lesson.title),
        step_bar(view),
        format!("Step {} of {}: {}", position, total, view.step()),
        String::new(),
    ];

    match view.step() {
        LessonStep::Introduction => {
            lines.push(lesson.description.clone());
            lines.push(String::new());
            lines.push(format!(
                "In this lesson: {} words, {} grammar points, {} conversations.",
                lesson.vocabulary.len(),
                lesson.grammar.len(),
                lesson.conversations.len()
            ));
        }
        LessonStep::Vocabulary => {
            for (idx, item) in lesson.vocabulary.iter().enumerate() {
                let reading = item
                    .reading
                    .as_deref()
                    .map(|r| format!(" ({})", r))
                    .unwrap_or_default();
                lines.push(format!(
                    "  {} {}. {}{}: {}",
                    speaker_icon(&vocab_key(idx), playing),
                    idx + 1,
                    item.word,
                    reading,
                    item.meaning
                ));
            }
        }
        LessonStep::Grammar => {
            for point in &lesson.grammar {
                lines.push(format!("■ {}", point.title));
                lines.push(format!("  {}", point.explanation));
                for example in &point.examples {
                    lines.push(format!("    {}", example.japanese));
                    lines.push(format!("    {}", example.romaji));
                    lines.push(format!("    {}", example.english));
                }
                lines.push(String::new());
            }
        }
        LessonStep::Conversations => {
            let mut number = 0;
            for (dialogue_idx, dialogue) in lesson.conversations.iter().enumerate() {
                lines.push(format!("Conversation {}", dialogue_idx + 1));
                for line in &dialogue.lines {
                    lines.push(format!(
                        "  {} {}. ({}) {}: {}",
                        speaker_icon(&line_key(number), playing),
                        number + 1,
                        line.initial(),
                        line.speaker,
                        line.text
                    ));
                    lines.push(format!("        {}", line.romaji));
                    if let Some(translation) = &line.translation {
                        lines.push(format!("        {}", translation));
                    }
                    number += 1;
                }
                lines.push(String::new());
            }
        }
        LessonStep::CulturalNotes => {
            for note in &lesson.cultural_notes {
                lines.push(format!("  • {}", note));
            }
        }
        LessonStep::Summary => {
            lines.push(format!(
                "You studied {} words and {} grammar points.",
                lesson.vocabulary.len(),
                lesson.grammar.len()
            ));
            lines.push(format!("Take the quiz: {}", Route::Quiz(lesson.id)));
            match next_lesson {
                Some(id) => lines.push(format!("Next lesson: {}", Route::Lesson(id))),
                None => lines.push(format!("All lessons finished! Back to {}", Route::Lessons)),
            }
        }
    }

    if let Some(quiz) = view.mini_quiz(view.step()) {
        lines.push(String::new());
        lines.push("Quick check".to_string());
        lines.extend(questions(quiz));
        if quiz.is_showing_results() {
            let result = quiz.score();
            lines.push(format!("Score: {}/{}", result.correct, result.total));
        }
    }

    lines.join("\n")
}

fn step_bar(view: &LessonView) -> String {
    let current = view.stepper().current_index();
    view.stepper()
        .steps()
        .iter()
        .enumerate()
        .map(|(idx, step)| {
            if idx == current {
                format!("[{} {}]", idx + 1, step)
            } else if idx > current {
                format!("🔒{} {}", idx + 1, step)
            } else {
                format!("{} {}", idx + 1, step)
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// 题目与选项；显示结果时标出对错
fn questions(session: &QuizSession) -> Vec<String> {
    let mut lines = Vec::new();
    for (idx, question) in session.questions().iter().enumerate() {
        let answer = session.answer(idx);
        lines.push(format!("Q{}. {}", idx + 1, question.question));
        lines.extend(options(question, answer, session.is_showing_results()));
        let typed = answer.is_some_and(|a| !question.options.iter().any(|o| o == a));
        if question.options.is_empty() || typed {
            lines.push(format!("   Your answer: {}", answer.unwrap_or("_____")));
        }
    }
    lines
}

fn options(question: &QuizQuestion, answer: Option<&str>, show_results: bool) -> Vec<String> {
    question
        .options
        .iter()
        .enumerate()
        .map(|(idx, option)| {
            let selected = answer == Some(option.as_str());
            let mark = match (show_results, selected, *option == question.correct_answer) {
                (true, _, true) => "✓",
                (true, true, false) => "✗",
                (_, true, _) => "●",
                _ => "○",
            };
            format!("   {} {}) {}", mark, idx + 1, option)
        })
        .collect()
}

// ========== 测验页 ==========

pub fn quiz(
    lesson: &Lesson,
    session: &QuizSession,
    threshold: PassThreshold,
    next_lesson: Option<u32>,
) -> String {
    let mut lines = vec![format!("Quiz: {}", lesson.title)];

    if !session.is_showing_results() {
        lines.push(format!(
            "Answered {} of {}",
            session.answered_count(),
            session.len()
        ));
        lines.push(String::new());
        lines.extend(questions(session));
        lines.push(String::new());
        if session.all_answered() {
            lines.push("All questions answered. Type submit to check your answers.".to_string());
        }
        return lines.join("\n");
    }

    let result = session.score();
    let passed = result.passed(threshold);
    lines.push(String::new());
    lines.push(if passed { "🎉 Excellent Work!" } else { "📚 Keep Practicing!" }.to_string());
    lines.push(format!("You got {} out of {} correct", result.correct, result.total));
    lines.push(format!("{}%", result.percentage));
    lines.push(String::new());
    lines.push("Review:".to_string());

    for (idx, item) in session.review().iter().enumerate() {
        lines.push(format!(
            "{} Q{}. {}",
            if item.correct { "✓" } else { "✗" },
            idx + 1,
            item.question.question
        ));
        lines.push(format!("   Your answer: {}", item.answer.unwrap_or("-")));
        if !item.correct {
            lines.push(format!("   Correct answer: {}", item.correct_answer()));
        }
        if let Some(explanation) = item.explanation() {
            lines.push(format!("   {}", explanation));
        }
    }

    lines.push(String::new());
    match session.unlocked_next_lesson(threshold, next_lesson) {
        Some(id) => lines.push(format!("continue → {} (or retry)", Route::Lesson(id))),
        None if passed => lines.push(format!("You finished every lesson! Back to {}", Route::Lessons)),
        None => lines.push(format!(
            "Score {}% or more to unlock the next lesson. Type retry to try again.",
            threshold.percent()
        )),
    }
    lines.join("\n")
}

// ========== 假名页 ==========

pub fn alphabet(set: &AlphabetSet, deck: &FlashcardDeck, playing: Option<&str>) -> String {
    let tabs = AlphabetKind::ALL
        .iter()
        .map(|kind| {
            if *kind == set.kind {
                format!("[{} {}]", kind.native_name(), kind.name())
            } else {
                format!("{} {}", kind.native_name(), kind.name())
            }
        })
        .collect::<Vec<_>>()
        .join("  ");

    let mut lines = vec![tabs, set.description.clone(), String::new()];

    let (Some(index), Some((position, total))) = (deck.index(), deck.progress()) else {
        lines.push("No characters in this set.".to_string());
        return lines.join("\n");
    };
    let Some(character) = set.characters.get(index) else {
        lines.push("No characters in this set.".to_string());
        return lines.join("\n");
    };

    lines.push(format!("Card {} of {}", position, total));
    lines.extend(card(character, deck.is_flipped(), playing));
    lines.push(String::new());
    lines.extend(stroke_order(character));
    lines.push(String::new());
    lines.extend(grid(set, index));
    lines.join("\n")
}

fn card(character: &AlphabetCharacter, flipped: bool, playing: Option<&str>) -> Vec<String> {
    let icon = speaker_icon(&kana_key(&character.character), playing);
    if !flipped {
        return vec![
            format!("    {}    {}", character.character, icon),
            "    (flip to see the reading)".to_string(),
        ];
    }

    let mut lines = vec![format!(
        "    {}  {}    {}",
        character.character, character.romaji, icon
    )];
    if !character.examples.is_empty() {
        lines.push(format!("    Examples: {}", character.examples.join(", ")));
    }
    lines
}

fn stroke_order(character: &AlphabetCharacter) -> Vec<String> {
    let strokes = character.ordered_strokes();
    if strokes.is_empty() {
        return vec!["Stroke order not available.".to_string()];
    }

    let mut lines = vec![format!("Stroke order ({} strokes)", strokes.len())];
    for stroke in strokes {
        let start = stroke.path.start();
        let end = stroke.path.end();
        lines.push(format!(
            "  {}. ({}, {}) → ({}, {})  {}",
            stroke.order, start.x, start.y, end.x, end.y, stroke.path
        ));
    }
    lines
}

fn grid(set: &AlphabetSet, current: usize) -> Vec<String> {
    set.characters
        .chunks(GRID_COLUMNS)
        .enumerate()
        .map(|(row, chunk)| {
            chunk
                .iter()
                .enumerate()
                .map(|(col, character)| {
                    let idx = row * GRID_COLUMNS + col;
                    if idx == current {
                        format!("[{:>2} {}]", idx + 1, character.character)
                    } else {
                        format!(" {:>2} {} ", idx + 1, character.character)
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::load_embedded_catalog;

    #[test]
    fn test_not_found_views_link_back() {
        assert!(lesson_not_found(42).contains("/lessons"));
        assert!(quiz_not_found(42).starts_with("Quiz not found"));
    }

    #[test]
    fn test_alphabet_shows_progress_and_strokes() {
        let catalog = load_embedded_catalog().unwrap();
        let set = catalog.alphabet(AlphabetKind::Hiragana);
        let deck = FlashcardDeck::new(AlphabetKind::Hiragana, set.characters.len());

        let text = alphabet(set, &deck, None);
        assert!(text.contains("Card 1 of 46"));
        assert!(text.contains("Stroke order"));
        assert!(text.contains("[ 1 あ]"));
    }

    #[test]
    fn test_selected_and_graded_options() {
        let question = QuizQuestion {
            id: 1,
            kind: crate::models::QuestionKind::MultipleChoice,
            question: "?".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            correct_answer: "a".to_string(),
            explanation: None,
        };
        let pending = options(&question, Some("b"), false);
        assert_eq!(pending, vec!["   ○ 1) a", "   ● 2) b"]);

        let graded = options(&question, Some("b"), true);
        assert_eq!(graded, vec!["   ✓ 1) a", "   ✗ 2) b"]);
    }

    #[test]
    fn test_typed_answer_shown_beside_options() {
        let question = QuizQuestion {
            id: 1,
            kind: crate::models::QuestionKind::FillBlank,
            question: "これは本___。".to_string(),
            options: vec!["です".to_string(), "ます".to_string()],
            correct_answer: "です".to_string(),
            explanation: None,
        };
        let mut session = QuizSession::new(vec![question]);
        session.select(0, "desu").unwrap();
        assert!(questions(&session).contains(&"   Your answer: desu".to_string()));

        session.select(0, "です").unwrap();
        assert!(!questions(&session).iter().any(|l| l.contains("Your answer")));
    }
}
