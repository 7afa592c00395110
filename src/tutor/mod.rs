//! The tutoring workflow
//!
//! [`Tutor`] drives one learner through configure → story → questions →
//! answers → results. Each model-backed step is split into a synchronous
//! `begin_*` that validates and moves into a generating phase, and a
//! `finish_*` that consumes the gateway reply. The UI runs the gateway call
//! in between on a background task; the `generate_*` helpers do all three in
//! one go.
//!
//! State changes never wait on storage. Story and answer writes are queued
//! after the in-memory update; [`Tutor::flush`] waits for them.

pub mod error;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use error::TutorError;

use crate::llm::{LlmError, ModelGateway};
use crate::quiz::{
    Advance, AnswerRecord, QuestionKind, QuizSession, normalize_questions, parse_story_reply,
};
use crate::store::{CURRENT_STORY_KEY, KeyValueStore, Persisted, StoreWriter, USER_ANSWERS_KEY};
use crate::story::prompt::{questions_prompt, story_prompt};
use crate::story::{CefrLevel, LengthBucket, Story, StorySession};

/// Where the learner is in the workflow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Configuring,
    GeneratingStory,
    StoryReady,
    GeneratingQuestions,
    Answering,
    Feedback,
    Results,
}

impl Phase {
    /// A model request is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::GeneratingStory | Phase::GeneratingQuestions)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Phase::Idle => "idle",
            Phase::Configuring => "configuring",
            Phase::GeneratingStory => "generating a story",
            Phase::StoryReady => "reading the story",
            Phase::GeneratingQuestions => "generating questions",
            Phase::Answering => "answering",
            Phase::Feedback => "reviewing feedback",
            Phase::Results => "viewing results",
        };
        f.write_str(text)
    }
}

/// Current story-generation choices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    pub level: CefrLevel,
    pub theme: String,
    pub length: LengthBucket,
}

/// Fixed settings for a tutor
#[derive(Debug, Clone)]
pub struct TutorOptions {
    /// Language stories are written in
    pub language: String,
    /// Passed to the gateway with every request
    pub model_hint: Option<String>,
    pub level: CefrLevel,
    pub length: LengthBucket,
}

impl Default for TutorOptions {
    fn default() -> Self {
        Self {
            language: "Russian".to_string(),
            model_hint: None,
            level: CefrLevel::default(),
            length: LengthBucket::default(),
        }
    }
}

/// A prompt ready to send through a [`ModelGateway`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model_hint: Option<String>,
    pub structured_output: bool,
}

impl GenerationRequest {
    /// Send this request through `gateway`
    pub async fn send(&self, gateway: &dyn ModelGateway) -> Result<String, LlmError> {
        tracing::debug!(gateway = gateway.name(), chars = self.prompt.len(), "Sending prompt");
        gateway.generate(&self.prompt, self.model_hint.as_deref(), self.structured_output).await
    }
}

/// The workflow state machine
pub struct Tutor {
    phase: Phase,
    options: TutorOptions,
    selections: Selections,
    story: StorySession,
    quiz: QuizSession,
    pending_kind: Option<QuestionKind>,
    /// Question id to submitted answer, mirrored to the store
    answers: HashMap<String, String>,
    writer: StoreWriter,
    stored_story: Persisted<Option<Story>>,
    stored_answers: Persisted<HashMap<String, String>>,
}

impl Tutor {
    /// Build a tutor, restoring the story and answers from `store`
    pub async fn restore(store: Arc<dyn KeyValueStore>, options: TutorOptions) -> Self {
        let writer = StoreWriter::spawn(store);
        let stored_story: Persisted<Option<Story>> = Persisted::new(&writer, CURRENT_STORY_KEY);
        let stored_answers: Persisted<HashMap<String, String>> =
            Persisted::new(&writer, USER_ANSWERS_KEY);

        let story = stored_story.load(None).await;
        let answers = stored_answers.load(HashMap::new()).await;
        let phase = if story.is_some() { Phase::StoryReady } else { Phase::Idle };

        if let Some(story) = &story {
            tracing::info!(title = %story.title, level = %story.level, "Restored story");
        }

        let selections = Selections {
            level: story.as_ref().map(|s| s.level).unwrap_or(options.level),
            theme: story.as_ref().map(|s| s.theme.clone()).unwrap_or_default(),
            length: story.as_ref().map(|s| s.length).unwrap_or(options.length),
        };

        Self {
            phase,
            options,
            selections,
            story: StorySession::new(story),
            quiz: QuizSession::default(),
            pending_kind: None,
            answers,
            writer,
            stored_story,
            stored_answers,
        }
    }

    /// Wait until every queued story and answer write has been attempted
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn story(&self) -> Option<&Story> {
        self.story.current()
    }

    pub fn quiz(&self) -> &QuizSession {
        &self.quiz
    }

    pub fn language(&self) -> &str {
        &self.options.language
    }

    /// Kind of the batch being generated, if any
    pub fn pending_kind(&self) -> Option<QuestionKind> {
        self.pending_kind
    }

    /// Last answer submitted for a question id, including restored ones
    pub fn stored_answer(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    fn refuse(&self, action: &'static str) -> TutorError {
        TutorError::InvalidTransition { action, phase: self.phase }
    }

    fn enter_configuring(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::Configuring;
        }
    }

    pub fn select_level(&mut self, level: CefrLevel) -> Result<(), TutorError> {
        if self.phase.is_busy() {
            return Err(self.refuse("change the level"));
        }
        self.selections.level = level;
        self.enter_configuring();
        Ok(())
    }

    pub fn select_theme(&mut self, theme: impl Into<String>) -> Result<(), TutorError> {
        if self.phase.is_busy() {
            return Err(self.refuse("change the theme"));
        }
        self.selections.theme = theme.into().trim().to_string();
        self.enter_configuring();
        Ok(())
    }

    pub fn select_length(&mut self, length: LengthBucket) -> Result<(), TutorError> {
        if self.phase.is_busy() {
            return Err(self.refuse("change the length"));
        }
        self.selections.length = length;
        self.enter_configuring();
        Ok(())
    }

    /// Validate selections and move to [`Phase::GeneratingStory`]
    pub fn begin_story_generation(&mut self) -> Result<GenerationRequest, TutorError> {
        if !matches!(
            self.phase,
            Phase::Idle | Phase::Configuring | Phase::StoryReady | Phase::Results
        ) {
            return Err(self.refuse("generate a story"));
        }
        if self.selections.theme.is_empty() {
            return Err(TutorError::Validation("Please select a theme".to_string()));
        }

        let Selections { level, theme, length } = &self.selections;
        let prompt = story_prompt(&self.options.language, theme, *level, *length);
        tracing::info!(%level, %theme, %length, "Generating story");

        self.phase = Phase::GeneratingStory;
        Ok(GenerationRequest {
            prompt,
            model_hint: self.options.model_hint.clone(),
            structured_output: true,
        })
    }

    /// Consume the story reply
    ///
    /// On success the story replaces any previous one and all question state
    /// is discarded. On failure the previous story is kept, question state is
    /// cleared and the tutor returns to [`Phase::Configuring`].
    pub fn finish_story_generation(
        &mut self,
        reply: Result<String, LlmError>,
    ) -> Result<&Story, TutorError> {
        if self.phase != Phase::GeneratingStory {
            return Err(self.refuse("accept a story"));
        }

        let draft = reply
            .map_err(|e| e.to_string())
            .and_then(|raw| parse_story_reply(&raw).map_err(|e| e.to_string()));

        let draft = match draft {
            Ok(draft) => draft,
            Err(reason) => {
                tracing::warn!(%reason, "Story generation failed");
                self.quiz.clear();
                self.phase = Phase::Configuring;
                return Err(TutorError::GenerationFailed(reason));
            }
        };

        let Selections { level, theme, length } = &self.selections;
        let story = draft.into_story(*level, theme, *length);
        tracing::info!(title = %story.title, words = story.word_count(), "Story ready");

        self.quiz.clear();
        self.pending_kind = None;
        self.answers.clear();
        self.story.replace(story);
        self.phase = Phase::StoryReady;

        let story = self.story.current().ok_or_else(|| self.refuse("accept a story"))?;
        self.stored_story.save(&Some(story.clone()));
        self.stored_answers.clear();
        Ok(story)
    }

    /// Move to [`Phase::GeneratingQuestions`] for the current story
    ///
    /// Allowed from any settled phase once a story exists, including mid-quiz.
    pub fn begin_question_generation(
        &mut self,
        kind: QuestionKind,
    ) -> Result<GenerationRequest, TutorError> {
        if self.phase.is_busy() {
            return Err(self.refuse("generate questions"));
        }
        let Some(story) = self.story.current() else {
            return Err(TutorError::Validation("Generate a story first".to_string()));
        };

        let prompt = questions_prompt(&self.options.language, story, kind);
        tracing::info!(%kind, "Generating questions");

        self.pending_kind = Some(kind);
        self.phase = Phase::GeneratingQuestions;
        Ok(GenerationRequest {
            prompt,
            model_hint: self.options.model_hint.clone(),
            structured_output: true,
        })
    }

    /// Consume the question reply
    ///
    /// Success installs the new batch with a fresh score. Any failure leaves
    /// no batch installed and returns to [`Phase::StoryReady`].
    pub fn finish_question_generation(
        &mut self,
        reply: Result<String, LlmError>,
    ) -> Result<usize, TutorError> {
        if self.phase != Phase::GeneratingQuestions {
            return Err(self.refuse("accept questions"));
        }
        let kind = self.pending_kind.unwrap_or(QuestionKind::Comprehension);

        let batch = reply
            .map_err(TutorError::from)
            .and_then(|raw| normalize_questions(&raw, kind).map_err(TutorError::from));

        let questions = match batch {
            Ok(questions) => questions,
            Err(e) => {
                tracing::warn!(%kind, "Question generation failed: {}", e);
                self.quiz.clear();
                self.phase = Phase::StoryReady;
                return Err(e);
            }
        };

        let count = questions.len();
        tracing::info!(%kind, count, "Questions ready");

        self.quiz.install(kind, questions);
        self.answers.clear();
        self.phase = Phase::Answering;
        self.stored_answers.save(&self.answers);
        Ok(count)
    }

    /// Choose an option for the current question
    pub fn select_option(&mut self, option: usize) -> Result<(), TutorError> {
        if self.phase != Phase::Answering {
            return Err(self.refuse("select an answer"));
        }
        self.quiz.select(option)?;
        Ok(())
    }

    /// Grade the selected option and move to [`Phase::Feedback`]
    pub fn submit_answer(&mut self) -> Result<AnswerRecord, TutorError> {
        if self.phase != Phase::Answering {
            return Err(self.refuse("submit an answer"));
        }
        let record = self.quiz.submit()?.clone();
        self.answers = self.quiz.answer_map();
        self.phase = Phase::Feedback;

        tracing::debug!(correct = record.is_correct, "Answer submitted");
        self.stored_answers.save(&self.answers);
        Ok(record)
    }

    /// Leave feedback for the next question or the results
    pub fn next_question(&mut self) -> Result<Phase, TutorError> {
        if self.phase != Phase::Feedback {
            return Err(self.refuse("move to the next question"));
        }
        self.phase = match self.quiz.advance()? {
            Advance::Next => Phase::Answering,
            Advance::Finished => {
                let score = self.quiz.score();
                tracing::info!(correct = score.correct, total = score.total, "Quiz completed");
                Phase::Results
            }
        };
        Ok(self.phase)
    }

    /// Generate a fresh batch of the same kind from the results screen
    pub fn try_again(&mut self) -> Result<GenerationRequest, TutorError> {
        if self.phase != Phase::Results {
            return Err(self.refuse("try again"));
        }
        let kind = self.quiz.kind().unwrap_or(QuestionKind::Comprehension);
        self.begin_question_generation(kind)
    }

    /// Drop the batch and return to [`Phase::Configuring`], keeping the story
    pub fn reset(&mut self) -> Result<(), TutorError> {
        if self.phase.is_busy() {
            return Err(self.refuse("reset"));
        }
        self.quiz.clear();
        self.pending_kind = None;
        self.phase = Phase::Configuring;
        Ok(())
    }

    /// Go back to reading the current story from [`Phase::Configuring`]
    pub fn show_story(&mut self) -> Result<(), TutorError> {
        if self.phase != Phase::Configuring {
            return Err(self.refuse("return to the story"));
        }
        if !self.story.has_story() {
            return Err(TutorError::Validation("Generate a story first".to_string()));
        }
        self.phase = Phase::StoryReady;
        Ok(())
    }

    /// Forget the story and answers entirely, here and in the store
    pub fn clear_story(&mut self) -> Result<(), TutorError> {
        if self.phase.is_busy() {
            return Err(self.refuse("clear the story"));
        }
        self.story.clear();
        self.quiz.clear();
        self.pending_kind = None;
        self.answers.clear();
        self.phase = Phase::Idle;
        self.stored_story.clear();
        self.stored_answers.clear();
        Ok(())
    }

    /// Begin, call the gateway and finish a story generation
    pub async fn generate_story(&mut self, gateway: &dyn ModelGateway) -> Result<&Story, TutorError> {
        let request = self.begin_story_generation()?;
        let reply = request.send(gateway).await;
        self.finish_story_generation(reply)
    }

    /// Begin, call the gateway and finish a question generation
    pub async fn generate_questions(
        &mut self,
        kind: QuestionKind,
        gateway: &dyn ModelGateway,
    ) -> Result<usize, TutorError> {
        let request = self.begin_question_generation(kind)?;
        let reply = request.send(gateway).await;
        self.finish_question_generation(reply)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::llm::gateway::testing::ScriptedGateway;
    use crate::quiz::{NormalizeError, QuizScore};
    use crate::store::MemoryStore;
    use crate::store::persisted::testing::StalledStore;

    const STORY_REPLY: &str =
        r#"{"title":"Утро Ивана","content":"Иван проснулся рано.","level":"C2","theme":"Space"}"#;

    fn five_questions() -> String {
        let questions: Vec<_> = (1..=5)
            .map(|i| {
                serde_json::json!({
                    "id": format!("q{}", i),
                    "question": format!("Question {}?", i),
                    "options": ["Иван", "Пётр", "Алексей"],
                    "correctAnswer": "Иван",
                    "explanation": "Иван is the protagonist."
                })
            })
            .collect();
        serde_json::json!({ "questions": questions }).to_string()
    }

    async fn tutor_with(store: Arc<dyn KeyValueStore>) -> Tutor {
        Tutor::restore(store, TutorOptions::default()).await
    }

    async fn tutor() -> Tutor {
        tutor_with(Arc::new(MemoryStore::new())).await
    }

    async fn tutor_answering() -> Tutor {
        let mut tutor = tutor().await;
        let gateway = ScriptedGateway::new().reply(STORY_REPLY).reply(five_questions());
        tutor.select_theme("Daily Life").unwrap();
        tutor.generate_story(&gateway).await.unwrap();
        tutor.generate_questions(QuestionKind::Comprehension, &gateway).await.unwrap();
        tutor
    }

    #[tokio::test]
    async fn starts_idle_and_configures() {
        let mut tutor = tutor().await;
        assert_eq!(tutor.phase(), Phase::Idle);
        tutor.select_level(CefrLevel::A2).unwrap();
        assert_eq!(tutor.phase(), Phase::Configuring);
        assert_eq!(tutor.selections().level, CefrLevel::A2);
    }

    #[tokio::test]
    async fn story_requires_theme_and_makes_no_call() {
        let mut tutor = tutor().await;
        let gateway = ScriptedGateway::new();

        let err = tutor.generate_story(&gateway).await.unwrap_err();
        assert!(matches!(err, TutorError::Validation(_)));
        assert!(gateway.calls().is_empty());
        assert_eq!(tutor.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn story_takes_selections_not_echoed_values() {
        let mut tutor = tutor().await;
        tutor.select_level(CefrLevel::A2).unwrap();
        tutor.select_theme("Daily Life").unwrap();
        tutor.select_length(LengthBucket::Short).unwrap();

        let gateway = ScriptedGateway::new().reply(STORY_REPLY);
        let story = tutor.generate_story(&gateway).await.unwrap().clone();

        assert_eq!(story.title, "Утро Ивана");
        assert_eq!(story.level, CefrLevel::A2);
        assert_eq!(story.theme, "Daily Life");
        assert_eq!(story.length, LengthBucket::Short);
        assert_eq!(tutor.phase(), Phase::StoryReady);

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].structured_output);
        assert!(calls[0].prompt.contains("CEFR Level: A2"));
    }

    #[tokio::test]
    async fn story_failure_keeps_previous_story() {
        let mut tutor = tutor_answering().await;
        let before = tutor.story().cloned();

        let gateway = ScriptedGateway::new()
            .fail(LlmError::RateLimited { retry_after_seconds: Some(5) })
            .reply("not json at all");

        tutor.reset().unwrap();
        let err = tutor.generate_story(&gateway).await.unwrap_err();
        match err {
            TutorError::GenerationFailed(reason) => assert!(reason.contains("Rate limit")),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(tutor.phase(), Phase::Configuring);
        assert_eq!(tutor.story().cloned(), before);
        assert!(!tutor.quiz().is_active());

        let err = tutor.generate_story(&gateway).await.unwrap_err();
        assert!(matches!(err, TutorError::GenerationFailed(_)));
        assert_eq!(tutor.story().cloned(), before);
    }

    #[tokio::test]
    async fn busy_tutor_refuses_second_request() {
        let mut tutor = tutor().await;
        tutor.select_theme("Food").unwrap();
        tutor.begin_story_generation().unwrap();

        assert!(matches!(
            tutor.begin_story_generation(),
            Err(TutorError::InvalidTransition { phase: Phase::GeneratingStory, .. })
        ));
        assert!(tutor.select_theme("Art").is_err());
        assert!(tutor.reset().is_err());
    }

    #[tokio::test]
    async fn questions_require_story() {
        let mut tutor = tutor().await;
        let err = tutor.begin_question_generation(QuestionKind::Grammar).unwrap_err();
        assert!(matches!(err, TutorError::Validation(_)));
    }

    #[tokio::test]
    async fn questions_install_fresh_batch() {
        let tutor = tutor_answering().await;
        assert_eq!(tutor.phase(), Phase::Answering);
        assert_eq!(tutor.quiz().questions().len(), 5);
        assert_eq!(tutor.quiz().index(), 0);
        assert_eq!(tutor.quiz().score(), QuizScore::default());
        assert_eq!(tutor.quiz().kind(), Some(QuestionKind::Comprehension));
    }

    #[tokio::test]
    async fn new_batch_mid_feedback_discards_results() {
        let mut tutor = tutor_answering().await;
        tutor.select_option(0).unwrap();
        tutor.submit_answer().unwrap();
        assert_eq!(tutor.phase(), Phase::Feedback);
        assert_eq!(tutor.quiz().score().total, 1);

        let gateway = ScriptedGateway::new().reply(five_questions());
        tutor.generate_questions(QuestionKind::Grammar, &gateway).await.unwrap();

        assert_eq!(tutor.phase(), Phase::Answering);
        assert_eq!(tutor.quiz().kind(), Some(QuestionKind::Grammar));
        assert!(tutor.quiz().results().is_empty());
        assert_eq!(tutor.quiz().score(), QuizScore::default());
        assert_eq!(tutor.stored_answer("q1"), None);
    }

    #[tokio::test]
    async fn normalizer_failure_returns_to_story_ready() {
        let mut tutor = tutor_answering().await;
        let gateway = ScriptedGateway::new().reply(r#"{"note": "no questions today"}"#);

        let err = tutor.generate_questions(QuestionKind::Grammar, &gateway).await.unwrap_err();
        assert!(matches!(err, TutorError::Normalize(NormalizeError::NoArrayFound)));
        assert_eq!(tutor.phase(), Phase::StoryReady);
        assert!(!tutor.quiz().is_active());
        assert!(tutor.story().is_some());
    }

    #[tokio::test]
    async fn gateway_failure_is_surfaced_verbatim() {
        let mut tutor = tutor_answering().await;
        let gateway = ScriptedGateway::new().fail(LlmError::Auth("bad key".into()));

        let err = tutor.generate_questions(QuestionKind::Grammar, &gateway).await.unwrap_err();
        assert_eq!(err.to_string(), "Authentication failed: bad key");
        assert_eq!(tutor.phase(), Phase::StoryReady);
    }

    #[tokio::test]
    async fn submit_requires_selection_and_next_requires_submit() {
        let mut tutor = tutor_answering().await;
        assert!(matches!(tutor.submit_answer(), Err(TutorError::Validation(_))));
        assert!(matches!(tutor.next_question(), Err(TutorError::InvalidTransition { .. })));
        assert_eq!(tutor.phase(), Phase::Answering);
    }

    #[tokio::test]
    async fn correct_answer_on_third_question() {
        let mut tutor = tutor_answering().await;
        for _ in 0..2 {
            tutor.select_option(1).unwrap();
            tutor.submit_answer().unwrap();
            tutor.next_question().unwrap();
        }
        assert_eq!(tutor.quiz().index(), 2);
        let before = tutor.quiz().score();

        tutor.select_option(0).unwrap();
        let record = tutor.submit_answer().unwrap();

        assert!(record.is_correct);
        assert_eq!(
            tutor.quiz().score(),
            QuizScore { correct: before.correct + 1, total: before.total + 1 }
        );
        assert_eq!(tutor.quiz().index(), 2);
        assert_eq!(tutor.phase(), Phase::Feedback);
    }

    #[tokio::test]
    async fn finishing_the_batch_shows_results() {
        let mut tutor = tutor_answering().await;
        for i in 0..5 {
            tutor.select_option(i % 2).unwrap();
            tutor.submit_answer().unwrap();
            let next = tutor.next_question().unwrap();
            assert_eq!(next, if i < 4 { Phase::Answering } else { Phase::Results });
        }

        assert_eq!(tutor.phase(), Phase::Results);
        assert_eq!(tutor.quiz().results().len(), 5);
        assert_eq!(tutor.quiz().score(), QuizScore { correct: 3, total: 5 });
        assert!(tutor.next_question().is_err());
    }

    #[tokio::test]
    async fn try_again_uses_same_kind() {
        let mut tutor = tutor_answering().await;
        for _ in 0..5 {
            tutor.select_option(0).unwrap();
            tutor.submit_answer().unwrap();
            tutor.next_question().unwrap();
        }

        let request = tutor.try_again().unwrap();
        assert!(request.prompt.contains("comprehension questions"));
        assert_eq!(tutor.phase(), Phase::GeneratingQuestions);
        assert_eq!(tutor.pending_kind(), Some(QuestionKind::Comprehension));

        tutor.finish_question_generation(Ok(five_questions())).unwrap();
        assert_eq!(tutor.phase(), Phase::Answering);
        assert!(tutor.quiz().results().is_empty());
    }

    #[tokio::test]
    async fn reset_keeps_story() {
        let mut tutor = tutor_answering().await;
        tutor.select_option(0).unwrap();
        tutor.submit_answer().unwrap();

        tutor.reset().unwrap();
        assert_eq!(tutor.phase(), Phase::Configuring);
        assert!(!tutor.quiz().is_active());
        assert_eq!(tutor.quiz().score(), QuizScore::default());
        assert!(tutor.story().is_some());

        tutor.begin_question_generation(QuestionKind::Grammar).unwrap();
        assert_eq!(tutor.phase(), Phase::GeneratingQuestions);
    }

    #[tokio::test]
    async fn show_story_needs_a_story() {
        let mut tutor = tutor().await;
        tutor.select_theme("Food").unwrap();
        assert!(matches!(tutor.show_story(), Err(TutorError::Validation(_))));

        let mut tutor = tutor_answering().await;
        assert!(tutor.show_story().is_err());
        tutor.reset().unwrap();
        tutor.show_story().unwrap();
        assert_eq!(tutor.phase(), Phase::StoryReady);
    }

    #[tokio::test]
    async fn story_and_answers_are_restored() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        {
            let mut tutor = tutor_with(Arc::clone(&store)).await;
            let gateway = ScriptedGateway::new().reply(STORY_REPLY).reply(five_questions());
            tutor.select_level(CefrLevel::C1).unwrap();
            tutor.select_theme("History").unwrap();
            tutor.generate_story(&gateway).await.unwrap();
            tutor.generate_questions(QuestionKind::Comprehension, &gateway).await.unwrap();
            tutor.select_option(1).unwrap();
            tutor.submit_answer().unwrap();
            tutor.flush().await;
        }

        let restored = tutor_with(store).await;
        assert_eq!(restored.phase(), Phase::StoryReady);
        let story = restored.story().unwrap();
        assert_eq!(story.level, CefrLevel::C1);
        assert_eq!(story.theme, "History");
        assert_eq!(restored.selections().theme, "History");
        assert_eq!(restored.stored_answer("q1"), Some("Пётр"));
    }

    #[tokio::test]
    async fn clear_story_forgets_everything() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut tutor = tutor_with(Arc::clone(&store)).await;
        let gateway = ScriptedGateway::new().reply(STORY_REPLY);
        tutor.select_theme("Art").unwrap();
        tutor.generate_story(&gateway).await.unwrap();

        tutor.clear_story().unwrap();
        tutor.flush().await;
        assert_eq!(tutor.phase(), Phase::Idle);
        assert!(tutor.story().is_none());
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stalled_store_never_holds_up_the_session() {
        let mut tutor = tutor_with(Arc::new(StalledStore)).await;
        tutor.select_theme("Food").unwrap();
        tutor.begin_story_generation().unwrap();

        let story = tutor.finish_story_generation(Ok(r#"{"title":"T","content":"C"}"#.into()));
        assert_eq!(story.unwrap().title, "T");
        assert_eq!(tutor.phase(), Phase::StoryReady);

        tutor.begin_question_generation(QuestionKind::Grammar).unwrap();
        tutor.finish_question_generation(Ok(five_questions())).unwrap();
        assert_eq!(tutor.phase(), Phase::Answering);

        tutor.select_option(0).unwrap();
        assert!(tutor.submit_answer().unwrap().is_correct);
        assert_eq!(tutor.phase(), Phase::Feedback);
        assert_eq!(tutor.stored_answer("q1"), Some("Иван"));

        tutor.clear_story().unwrap();
        assert_eq!(tutor.phase(), Phase::Idle);

        let flushed = tokio::time::timeout(Duration::from_millis(50), tutor.flush()).await;
        assert!(flushed.is_err());
    }

    #[tokio::test]
    async fn model_hint_is_forwarded() {
        let options = TutorOptions { model_hint: Some("gpt-4o-mini".into()), ..Default::default() };
        let mut tutor = Tutor::restore(Arc::new(MemoryStore::new()), options).await;
        let gateway = ScriptedGateway::new().reply(STORY_REPLY);
        tutor.select_theme("Work").unwrap();
        tutor.generate_story(&gateway).await.unwrap();

        assert_eq!(gateway.calls()[0].model_hint.as_deref(), Some("gpt-4o-mini"));
    }
}
