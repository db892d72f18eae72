use thiserror::Error;

use crate::models::{Language, NewWord, UserId, Word};
use crate::sentences::{GenerationError, SentenceGenerator, SentenceRequest};
use crate::store::{StoreError, WordStore};

pub const DEFAULT_SENTENCES_COUNT: usize = 16;

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unable to generate exercises")]
    Generation(#[from] GenerationError),
    #[error("unable to add word")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddWordInput {
    pub user_id: UserId,
    pub spelling: String,
    pub definition: String,
    pub lexical_category: String,
    pub language: Language,
    /// Ready-made exercise sentences; generated when empty.
    pub sentences: Vec<String>,
}

pub struct VocabularyService<S, G> {
    store: S,
    generator: G,
    sentences_count: usize,
}

impl<S: WordStore, G: SentenceGenerator> VocabularyService<S, G> {
    pub fn new(store: S, generator: G, sentences_count: usize) -> Self {
        Self {
            store,
            generator,
            sentences_count: sentences_count.max(1),
        }
    }

    pub async fn add_word(&self, input: AddWordInput) -> Result<Word, VocabularyError> {
        let spelling = input.spelling.trim().to_string();
        let definition = input.definition.trim().to_string();
        let lexical_category = input.lexical_category.trim().to_string();
        if spelling.is_empty() {
            return Err(VocabularyError::Validation("spelling must not be empty".to_string()));
        }
        if definition.is_empty() {
            return Err(VocabularyError::Validation("definition must not be empty".to_string()));
        }

        let sentences = if input.sentences.is_empty() {
            let request = SentenceRequest {
                spelling: &spelling,
                definition: &definition,
                lexical_category: &lexical_category,
            };
            self.generator
                .generate(request, self.sentences_count)
                .await?
                .into_iter()
                .map(|s| s.text)
                .collect()
        } else {
            input.sentences
        };

        let word = NewWord {
            user_id: input.user_id,
            spelling,
            definition,
            lexical_category,
            language: input.language,
        };
        Ok(self.store.add_word(word, &sentences).await?)
    }
}
