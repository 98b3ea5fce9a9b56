//! Cybersecurity awareness quiz
//!
//! Fixed questions, exact-match grading, pass at 2 correct answers.

use serde::Serialize;

/// Minimum score that passes the quiz
pub const PASS_THRESHOLD: usize = 2;

pub const PASS_MESSAGE: &str = "Passed! You are cybersecurity aware.";
pub const FAIL_MESSAGE: &str = "Review the policies and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    pub answer: &'static str,
}

pub static QUESTIONS: [Question; 3] = [
    Question {
        prompt: "Best way to store passwords?",
        options: &["Notebook", "Sticky Notes", "Password Manager", "Same password everywhere"],
        answer: "Password Manager",
    },
    Question {
        prompt: "Sign of phishing email?",
        options: &["Unexpected attachment", "Hi from boss", "Secure domain", "Perfect grammar"],
        answer: "Unexpected attachment",
    },
    Question {
        prompt: "What to do after a breach?",
        options: &["Ignore it", "Fix it alone", "Report to IT", "Log out"],
        answer: "Report to IT",
    },
];

/// Question as shown to the user, without its answer
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub prompt: &'static str,
    pub options: &'static [&'static str],
}

/// Immediate feedback for one answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub correct: bool,
    pub message: String,
    /// Revealed only after a wrong answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub passed: bool,
    pub message: &'static str,
    pub feedback: Vec<Feedback>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("Unknown question {0}")]
    UnknownQuestion(usize),

    #[error("Expected {expected} answers, got {got}")]
    AnswerCount { expected: usize, got: usize },
}

impl Question {
    /// Case-sensitive comparison against the designated answer
    pub fn is_correct(&self, selected: &str) -> bool {
        selected == self.answer
    }

    pub fn feedback(&self, selected: &str) -> Feedback {
        if self.is_correct(selected) {
            Feedback {
                correct: true,
                message: "Correct!".to_string(),
                answer: None,
            }
        } else {
            Feedback {
                correct: false,
                message: format!("Incorrect. Correct: {}", self.answer),
                answer: Some(self.answer),
            }
        }
    }
}

pub fn questions() -> Vec<QuestionView> {
    QUESTIONS
        .iter()
        .enumerate()
        .map(|(index, q)| QuestionView {
            index,
            prompt: q.prompt,
            options: q.options,
        })
        .collect()
}

/// Feedback for a single answer
pub fn check(index: usize, selected: &str) -> Result<Feedback, QuizError> {
    QUESTIONS
        .get(index)
        .map(|q| q.feedback(selected))
        .ok_or(QuizError::UnknownQuestion(index))
}

/// Score a full submission, one answer per question in order
pub fn grade<S: AsRef<str>>(answers: &[S]) -> Result<QuizResult, QuizError> {
    if answers.len() != QUESTIONS.len() {
        return Err(QuizError::AnswerCount {
            expected: QUESTIONS.len(),
            got: answers.len(),
        });
    }

    let feedback: Vec<Feedback> = QUESTIONS
        .iter()
        .zip(answers)
        .map(|(q, a)| q.feedback(a.as_ref()))
        .collect();

    let score = feedback.iter().filter(|f| f.correct).count();
    let passed = score >= PASS_THRESHOLD;

    Ok(QuizResult {
        score,
        total: QUESTIONS.len(),
        passed,
        message: if passed { PASS_MESSAGE } else { FAIL_MESSAGE },
        feedback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrong_answers() -> Vec<&'static str> {
        QUESTIONS
            .iter()
            .map(|q| *q.options.iter().find(|o| **o != q.answer).unwrap())
            .collect()
    }

    #[test]
    fn every_answer_is_one_of_its_options() {
        for q in &QUESTIONS {
            assert!(q.options.contains(&q.answer), "{}", q.prompt);
        }
    }

    #[test]
    fn all_correct_passes() {
        let answers: Vec<&str> = QUESTIONS.iter().map(|q| q.answer).collect();
        let result = grade(&answers).unwrap();

        assert_eq!(result.score, 3);
        assert_eq!(result.total, 3);
        assert!(result.passed);
        assert_eq!(result.message, PASS_MESSAGE);
    }

    #[test]
    fn all_wrong_fails() {
        let result = grade(&wrong_answers()).unwrap();

        assert_eq!(result.score, 0);
        assert!(!result.passed);
        assert_eq!(result.message, FAIL_MESSAGE);
        assert!(result.feedback.iter().all(|f| f.answer.is_some()));
    }

    #[test]
    fn two_of_three_is_the_pass_mark() {
        let mut answers: Vec<&str> = QUESTIONS.iter().map(|q| q.answer).collect();
        answers[0] = wrong_answers()[0];
        let result = grade(&answers).unwrap();
        assert_eq!(result.score, 2);
        assert!(result.passed);

        answers[1] = wrong_answers()[1];
        assert!(!grade(&answers).unwrap().passed);
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let feedback = check(0, "password manager").unwrap();
        assert!(!feedback.correct);
        assert_eq!(feedback.message, "Incorrect. Correct: Password Manager");
        assert!(check(0, "Password Manager").unwrap().correct);
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert_eq!(check(9, "x"), Err(QuizError::UnknownQuestion(9)));
        assert_eq!(
            grade(&["Report to IT"]),
            Err(QuizError::AnswerCount { expected: 3, got: 1 })
        );
    }
}
