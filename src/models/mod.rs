pub mod alphabet;
pub mod catalog;
pub mod lesson;
pub mod loaders;
pub mod stroke_path;

pub use alphabet::{AlphabetCharacter, AlphabetKind, AlphabetSet, Stroke};
pub use catalog::Catalog;
pub use lesson::{
    ConversationLine, Dialogue, GrammarExample, GrammarPoint, Lesson, QuestionKind, QuizQuestion,
    VocabItem,
};
pub use loaders::{load_catalog, load_embedded_catalog};
pub use stroke_path::{PathCommand, Point, StrokePath};
