//! Procurement training challenges. Scores are computed here from the
//! submitted answers; the catalog view never exposes correct options.

use api_types::challenge::{
    ChallengeSummary, ChallengeView, ScoreRequest, ScoreResponse, StepView,
};
use axum::{Extension, Json, extract::Path};
use engine::{Challenge, ChallengeSession, User};

use crate::ServerError;

fn challenge_summary(challenge: &Challenge) -> ChallengeSummary {
    ChallengeSummary {
        id: challenge.id.to_string(),
        title: challenge.title.to_string(),
        description: challenge.description.to_string(),
        steps: challenge.steps.len(),
        possible_points: challenge.possible_points(),
    }
}

pub async fn list(Extension(_user): Extension<User>) -> Json<Vec<ChallengeSummary>> {
    Json(engine::catalog().iter().map(challenge_summary).collect())
}

pub async fn get(
    Extension(_user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<ChallengeView>, ServerError> {
    let challenge = engine::find_challenge(&id)?;
    Ok(Json(ChallengeView {
        id: challenge.id.to_string(),
        title: challenge.title.to_string(),
        description: challenge.description.to_string(),
        steps: challenge
            .steps
            .iter()
            .map(|step| StepView {
                id: step.id.to_string(),
                prompt: step.prompt.to_string(),
                options: step.options.iter().map(|o| (*o).to_string()).collect(),
                weight: step.weight,
            })
            .collect(),
    }))
}

pub async fn score(
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, ServerError> {
    let challenge = engine::find_challenge(&id)?;
    let mut session = ChallengeSession::new(challenge);
    for (step_id, choice) in &payload.answers {
        session.submit_answer(step_id, *choice)?;
    }
    let score = session.score()?;
    tracing::debug!(
        "{} scored {}/{} on {}",
        user.username,
        score.earned,
        score.possible,
        challenge.id
    );
    Ok(Json(ScoreResponse {
        challenge_id: challenge.id.to_string(),
        earned: score.earned,
        possible: score.possible,
        percentage: score.percentage,
        complete: session.is_complete(),
    }))
}
