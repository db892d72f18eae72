mod ids;
mod status;
mod word;

pub use ids::{ExerciseId, IdError, InvalidLanguage, Language, UserId, WordId};
pub use status::{LearnStatus, UnknownStatus};
pub use word::{Exercise, LearningStats, NewWord, User, Word};
