pub mod flashcards;
pub mod lesson_stepper;
pub mod lesson_view;
pub mod quiz_session;

pub use flashcards::FlashcardDeck;
pub use lesson_stepper::{LessonStep, LessonStepper, StepChange};
pub use lesson_view::LessonView;
pub use quiz_session::{QuizSession, ReviewItem};
