//! Procurement training challenges.
//!
//! A challenge is a fixed, linear list of weighted multiple-choice steps.
//! The catalog is compiled in; sessions and scoring are pure and never touch
//! the database.

use std::collections::HashMap;

use crate::{EngineError, ResultEngine};

#[derive(Debug, PartialEq, Eq)]
pub struct ChallengeStep {
    pub id: &'static str,
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    /// Index into `options`.
    pub correct: usize,
    pub weight: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Challenge {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub steps: &'static [ChallengeStep],
}

impl Challenge {
    pub fn step(&self, step_id: &str) -> Option<&ChallengeStep> {
        self.steps.iter().find(|step| step.id == step_id)
    }

    pub fn possible_points(&self) -> u32 {
        self.steps.iter().map(|step| step.weight).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChallengeScore {
    pub earned: u32,
    pub possible: u32,
    /// Floor of `earned * 100 / possible`; 0 when nothing is possible.
    pub percentage: u32,
}

static CATALOG: &[Challenge] = &[
    Challenge {
        id: "rfq-basics",
        title: "Writing a good RFQ",
        description: "Pick the choices that make an RFQ easy to quote against.",
        steps: &[
            ChallengeStep {
                id: "scope",
                prompt: "What belongs in the RFQ description?",
                options: &[
                    "Only the product name",
                    "Specifications, quantity, quality standards and delivery terms",
                    "The budget ceiling and nothing else",
                ],
                correct: 1,
                weight: 3,
            },
            ChallengeStep {
                id: "deadline",
                prompt: "How should the bid deadline be set?",
                options: &[
                    "As short as possible to force quick answers",
                    "Leave it open-ended",
                    "Long enough for suppliers to price accurately",
                ],
                correct: 2,
                weight: 2,
            },
            ChallengeStep {
                id: "budget",
                prompt: "Should the budget be shared with suppliers?",
                options: &[
                    "Optionally, as a ceiling that filters unrealistic bids",
                    "Never",
                    "Always, as the exact target price",
                ],
                correct: 0,
                weight: 1,
            },
        ],
    },
    Challenge {
        id: "bid-evaluation",
        title: "Evaluating bids",
        description: "Choose the winning bid the way a procurement lead would.",
        steps: &[
            ChallengeStep {
                id: "criteria",
                prompt: "Which criteria decide the award?",
                options: &[
                    "Lowest price only",
                    "Price, delivery time, supplier risk and verification",
                    "Whoever answered first",
                ],
                correct: 1,
                weight: 3,
            },
            ChallengeStep {
                id: "risk",
                prompt: "A cheap bid comes from an unverified supplier with a high risk score. What next?",
                options: &[
                    "Accept immediately",
                    "Reject every other bid",
                    "Request verification or references before awarding",
                ],
                correct: 2,
                weight: 2,
            },
            ChallengeStep {
                id: "award",
                prompt: "After accepting one bid, what happens to the others?",
                options: &[
                    "They are rejected and the suppliers informed",
                    "They stay pending indefinitely",
                    "They are accepted as backups",
                ],
                correct: 0,
                weight: 2,
            },
        ],
    },
    Challenge {
        id: "contract-management",
        title: "Managing contracts",
        description: "Move a contract from draft to completion.",
        steps: &[
            ChallengeStep {
                id: "approval",
                prompt: "Who approves a contract sent for approval?",
                options: &["The buyer", "The supplier", "Any platform user"],
                correct: 1,
                weight: 2,
            },
            ChallengeStep {
                id: "payment",
                prompt: "When should the final payment be released?",
                options: &[
                    "Before the contract is drafted",
                    "When the RFQ is opened",
                    "Once delivery is confirmed and the contract completed",
                ],
                correct: 2,
                weight: 3,
            },
        ],
    },
];

pub fn catalog() -> &'static [Challenge] {
    CATALOG
}

pub fn find_challenge(id: &str) -> ResultEngine<&'static Challenge> {
    CATALOG
        .iter()
        .find(|challenge| challenge.id == id)
        .ok_or_else(|| EngineError::KeyNotFound(format!("challenge {id} not exists")))
}

/// Score a full set of answers keyed by step id.
///
/// Unknown step ids or out-of-range options are rejected; missing answers
/// simply earn nothing.
pub fn score_answers(
    challenge: &Challenge,
    answers: &HashMap<String, usize>,
) -> ResultEngine<ChallengeScore> {
    for (step_id, choice) in answers {
        let step = challenge
            .step(step_id)
            .ok_or_else(|| EngineError::InvalidInput(format!("unknown step: {step_id}")))?;
        if *choice >= step.options.len() {
            return Err(EngineError::InvalidInput(format!(
                "option {choice} out of range for step {step_id}"
            )));
        }
    }

    let earned = challenge
        .steps
        .iter()
        .filter(|step| answers.get(step.id) == Some(&step.correct))
        .map(|step| step.weight)
        .sum();
    let possible = challenge.possible_points();
    let percentage = if possible == 0 {
        0
    } else {
        earned * 100 / possible
    };

    Ok(ChallengeScore {
        earned,
        possible,
        percentage,
    })
}

/// Walks one challenge step by step, recording answers.
#[derive(Debug)]
pub struct ChallengeSession {
    challenge: &'static Challenge,
    current: usize,
    answers: HashMap<String, usize>,
}

impl ChallengeSession {
    pub fn new(challenge: &'static Challenge) -> Self {
        Self {
            challenge,
            current: 0,
            answers: HashMap::new(),
        }
    }

    pub fn challenge(&self) -> &'static Challenge {
        self.challenge
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> Option<&'static ChallengeStep> {
        self.challenge.steps.get(self.current)
    }

    /// Advance; stays on the last step.
    pub fn next_step(&mut self) -> Option<&'static ChallengeStep> {
        if self.current + 1 < self.challenge.steps.len() {
            self.current += 1;
        }
        self.current_step()
    }

    /// Go back; stays on the first step.
    pub fn previous_step(&mut self) -> Option<&'static ChallengeStep> {
        self.current = self.current.saturating_sub(1);
        self.current_step()
    }

    pub fn submit_answer(&mut self, step_id: &str, choice: usize) -> ResultEngine<()> {
        let step = self
            .challenge
            .step(step_id)
            .ok_or_else(|| EngineError::InvalidInput(format!("unknown step: {step_id}")))?;
        if choice >= step.options.len() {
            return Err(EngineError::InvalidInput(format!(
                "option {choice} out of range for step {step_id}"
            )));
        }
        self.answers.insert(step.id.to_string(), choice);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.challenge
            .steps
            .iter()
            .all(|step| self.answers.contains_key(step.id))
    }

    pub fn answers(&self) -> &HashMap<String, usize> {
        &self.answers
    }

    pub fn score(&self) -> ResultEngine<ChallengeScore> {
        score_answers(self.challenge, &self.answers)
    }
}
