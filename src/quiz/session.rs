//! Progress through one question batch

use std::collections::HashMap;

use super::model::{AnswerRecord, Question, QuestionKind, QuizScore};

/// Outcome of moving past a question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Another question is now current
    Next,
    /// The batch is exhausted
    Finished,
}

/// Why a quiz step was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// No batch is installed
    NoBatch,
    /// Option index outside the current question's options
    NoSuchOption(usize),
    /// Submit without a selected option
    NothingSelected,
    /// Current question was already answered
    AlreadyAnswered,
    /// Next before the current question was answered
    NotAnswered,
}

/// One installed batch and the learner's progress through it
///
/// `index` always points at a question of the batch; `results` and `score`
/// only ever grow by one entry per submitted question.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    kind: Option<QuestionKind>,
    questions: Vec<Question>,
    index: usize,
    selected: Option<usize>,
    answered: bool,
    results: Vec<AnswerRecord>,
    score: QuizScore,
}

impl QuizSession {
    /// Install a new batch, discarding everything from the previous one
    pub fn install(&mut self, kind: QuestionKind, questions: Vec<Question>) {
        *self = Self { kind: Some(kind), questions, ..Self::default() };
    }

    /// Drop the batch and all progress
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        !self.questions.is_empty()
    }

    pub fn kind(&self) -> Option<QuestionKind> {
        self.kind
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Zero-based index of the current question
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Whether the current question has been submitted
    pub fn answered(&self) -> bool {
        self.answered
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    pub fn results(&self) -> &[AnswerRecord] {
        &self.results
    }

    pub fn score(&self) -> QuizScore {
        self.score
    }

    /// Fraction of the batch reached, counting the current question
    pub fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            0.0
        } else {
            (self.index + 1) as f64 / self.questions.len() as f64
        }
    }

    /// Map of question id to the submitted answer text
    pub fn answer_map(&self) -> HashMap<String, String> {
        self.questions
            .iter()
            .zip(&self.results)
            .map(|(q, r)| (q.id.clone(), r.user_answer.clone()))
            .collect()
    }

    /// Choose an option on the current, unanswered question
    pub fn select(&mut self, option: usize) -> Result<(), StepError> {
        let question = self.current().ok_or(StepError::NoBatch)?;
        if self.answered {
            return Err(StepError::AlreadyAnswered);
        }
        if option >= question.options.len() {
            return Err(StepError::NoSuchOption(option));
        }
        self.selected = Some(option);
        Ok(())
    }

    /// Grade the selected option and record it
    pub fn submit(&mut self) -> Result<&AnswerRecord, StepError> {
        let question = self.questions.get(self.index).ok_or(StepError::NoBatch)?;
        if self.answered {
            return Err(StepError::AlreadyAnswered);
        }
        let selected = self.selected.ok_or(StepError::NothingSelected)?;
        let user_answer = question.options[selected].clone();
        let is_correct = question.accepts(&user_answer);

        self.results.push(AnswerRecord {
            question: question.prompt.clone(),
            user_answer,
            correct_answer: question.correct_answer.clone(),
            is_correct,
            explanation: question.explanation.clone(),
        });
        self.score.record(is_correct);
        self.answered = true;

        Ok(&self.results[self.results.len() - 1])
    }

    /// Move past an answered question
    pub fn advance(&mut self) -> Result<Advance, StepError> {
        if !self.is_active() {
            return Err(StepError::NoBatch);
        }
        if !self.answered {
            return Err(StepError::NotAnswered);
        }
        if self.is_last() {
            return Ok(Advance::Finished);
        }
        self.index += 1;
        self.selected = None;
        self.answered = false;
        Ok(Advance::Next)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn question(id: &str, options: &[&str], correct: &str) -> Question {
        Question {
            id: id.into(),
            kind: QuestionKind::Comprehension,
            prompt: format!("Prompt {}", id),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer: correct.into(),
            explanation: "because".into(),
        }
    }

    fn session() -> QuizSession {
        let mut session = QuizSession::default();
        session.install(
            QuestionKind::Comprehension,
            vec![question("q1", &["Ivan", "Peter"], "Ivan"), question("q2", &["да", "нет"], "нет")],
        );
        session
    }

    #[test]
    fn submit_requires_selection() {
        let mut session = session();
        assert_eq!(session.submit().unwrap_err(), StepError::NothingSelected);
        assert_eq!(session.score(), QuizScore::default());
    }

    #[test]
    fn next_requires_submission() {
        let mut session = session();
        session.select(0).unwrap();
        assert_eq!(session.advance().unwrap_err(), StepError::NotAnswered);
        assert_eq!(session.index(), 0);
    }

    #[test]
    fn correct_answer_scores_and_keeps_index() {
        let mut session = session();
        session.select(0).unwrap();
        let record = session.submit().unwrap().clone();
        assert!(record.is_correct);
        assert_eq!(record.user_answer, "Ivan");
        assert_eq!(session.score(), QuizScore { correct: 1, total: 1 });
        assert_eq!(session.index(), 0);
        assert_eq!(session.submit().unwrap_err(), StepError::AlreadyAnswered);
        assert_eq!(session.select(1).unwrap_err(), StepError::AlreadyAnswered);
    }

    #[test]
    fn walks_to_the_end() {
        let mut session = session();
        session.select(1).unwrap();
        session.submit().unwrap();
        assert_eq!(session.advance().unwrap(), Advance::Next);
        assert_eq!(session.index(), 1);
        assert_eq!(session.selected(), None);

        session.select(1).unwrap();
        assert!(session.submit().unwrap().is_correct);
        assert_eq!(session.advance().unwrap(), Advance::Finished);
        assert_eq!(session.index(), 1);
        assert_eq!(session.results().len(), 2);
        assert_eq!(session.score(), QuizScore { correct: 1, total: 2 });

        let answers = session.answer_map();
        assert_eq!(answers["q1"], "Peter");
        assert_eq!(answers["q2"], "нет");
    }

    #[test]
    fn select_out_of_range() {
        let mut session = session();
        assert_eq!(session.select(5).unwrap_err(), StepError::NoSuchOption(5));
    }

    #[test]
    fn install_discards_previous_progress() {
        let mut session = session();
        session.select(0).unwrap();
        session.submit().unwrap();

        session.install(QuestionKind::Grammar, vec![question("q1", &["a", "b"], "a")]);
        assert_eq!(session.kind(), Some(QuestionKind::Grammar));
        assert!(session.results().is_empty());
        assert_eq!(session.score(), QuizScore::default());
        assert_eq!(session.index(), 0);
        assert!(!session.answered());
    }

    #[test]
    fn empty_session_refuses_steps() {
        let mut session = QuizSession::default();
        assert_eq!(session.select(0).unwrap_err(), StepError::NoBatch);
        assert_eq!(session.submit().unwrap_err(), StepError::NoBatch);
        assert_eq!(session.advance().unwrap_err(), StepError::NoBatch);
        assert_eq!(session.progress(), 0.0);
    }
}
