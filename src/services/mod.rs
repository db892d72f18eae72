pub mod users;
pub mod vocabulary;

pub use users::UserService;
pub use vocabulary::{AddWordInput, VocabularyError, VocabularyService, DEFAULT_SENTENCES_COUNT};
