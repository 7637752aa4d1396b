use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One quiz question: a prompt, a fixed set of answer options and the index
/// of the correct one. `answers` is never reordered after construction, so
/// `correct_answer` stays valid for the lifetime of the question.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub text: String,
    pub answers: Vec<String>,
    pub correct_answer: usize,
    pub was_answered: bool,
    pub was_correct: Option<bool>,
}

impl Question {
    pub fn new(text: impl Into<String>, answers: Vec<String>, correct_answer: usize) -> Self {
        Self {
            text: text.into(),
            answers,
            correct_answer,
            was_answered: false,
            was_correct: None,
        }
    }

    pub fn is_correct_answer(&self, answer: &str) -> bool {
        self.answers
            .get(self.correct_answer)
            .is_some_and(|a| a == answer)
    }

    pub fn is_correct_answer_nr(&self, answer_nr: usize) -> bool {
        self.correct_answer == answer_nr
    }
}

/// Where a category's questions come from: bundled question files or the
/// remote quiz engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySource {
    #[default]
    Internal,
    External,
}

/// A named bank of questions treated as a ring: the front of the deque is the
/// current question, and "next unanswered" is found by rotation.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub name: String,
    pub description: String,
    pub image: String,
    pub source: CategorySource,
    pub questions: VecDeque<Question>,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
        source: CategorySource,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: image.into(),
            source,
            questions: VecDeque::new(),
        }
    }

    /// Appends a question, shuffling the answer order first and re-locating
    /// the originally-correct answer in the shuffled sequence. On duplicate
    /// answer texts the first match wins.
    pub fn add_question(&mut self, text: &str, mut answers: Vec<String>, correct_answer: usize) {
        let Some(correct_text) = answers.get(correct_answer).cloned() else {
            tracing::warn!(
                category = %self.name,
                correct_answer,
                answers.count = answers.len(),
                "Correct answer index out of range, dropping question"
            );
            return;
        };

        answers.shuffle(&mut thread_rng());
        // correct_text came out of the same vec, so position always finds it
        let correct_answer = answers
            .iter()
            .position(|a| *a == correct_text)
            .unwrap_or_default();

        self.questions
            .push_back(Question::new(text, answers, correct_answer));
    }

    /// Rotates the ring until an unanswered question sits at the front and
    /// returns it. Returns `None` once every question has been answered
    /// (vacuously for an empty category). Bounded by the ring length so a
    /// full rotation can never loop.
    pub fn next_question(&mut self) -> Option<&Question> {
        if self.all_questions_answered() {
            return None;
        }
        for _ in 0..self.questions.len() {
            self.questions.rotate_left(1);
            if !self.questions[0].was_answered {
                return self.questions.front();
            }
        }
        None
    }

    /// The front of the ring, without rotating.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.front()
    }

    /// Marks the current question answered and records whether the submitted
    /// index matched its correct answer.
    pub fn submit_answer(&mut self, answer_nr: usize) {
        match self.questions.front_mut() {
            Some(question) => {
                question.was_answered = true;
                question.was_correct = Some(question.is_correct_answer_nr(answer_nr));
            }
            None => {
                tracing::warn!(category = %self.name, "Answer submitted with no current question");
            }
        }
    }

    /// Re-randomizes the ring order.
    pub fn shuffle_questions(&mut self) {
        self.questions
            .make_contiguous()
            .shuffle(&mut thread_rng());
    }

    pub fn all_questions_answered(&self) -> bool {
        self.questions.iter().all(|q| q.was_answered)
    }
}
