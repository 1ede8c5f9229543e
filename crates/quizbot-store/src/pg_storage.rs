//! `PostgreSQL` implementation of the storage contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use quizbot_core::error::DomainError;
use quizbot_core::models::{
    Challenge, NewChallenge, Participant, PhaseResult, Pretender, User, UserProfile,
};
use quizbot_core::storage::{ChallengeStorage, ParticipantStorage, ResultStorage, UserStorage};

const CHALLENGE_COLUMNS: &str =
    "id, name, phase_amount, winner_amount, duration_secs, created_at, finished_at";
const PARTICIPANT_COLUMNS: &str = "id, user_id, challenge_id, scores, finished_at";
const RESULT_COLUMNS: &str = "id, participant_id, phase, finished_at";
const USER_COLUMNS: &str =
    "id, external_id, chat_id, chitchat_id, nick_name, first_name, last_name";

/// PostgreSQL-backed storage.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Creates a new `PgStorage`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[allow(clippy::needless_pass_by_value)]
fn infra(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

fn to_u32(value: i32, column: &str) -> Result<u32, DomainError> {
    u32::try_from(value)
        .map_err(|_| DomainError::Infrastructure(format!("negative value in column {column}")))
}

fn to_i32(value: u32) -> Result<i32, DomainError> {
    i32::try_from(value)
        .map_err(|_| DomainError::Validation(format!("value {value} does not fit INTEGER")))
}

fn challenge_from_row(row: &PgRow) -> Result<Challenge, DomainError> {
    Ok(Challenge {
        id: row.try_get("id").map_err(infra)?,
        name: row.try_get("name").map_err(infra)?,
        phase_amount: to_u32(row.try_get("phase_amount").map_err(infra)?, "phase_amount")?,
        winner_amount: to_u32(row.try_get("winner_amount").map_err(infra)?, "winner_amount")?,
        duration_secs: row.try_get("duration_secs").map_err(infra)?,
        created_at: row.try_get("created_at").map_err(infra)?,
        finished_at: row.try_get("finished_at").map_err(infra)?,
    })
}

fn participant_from_row(row: &PgRow) -> Result<Participant, DomainError> {
    Ok(Participant {
        id: row.try_get("id").map_err(infra)?,
        user_id: row.try_get("user_id").map_err(infra)?,
        challenge_id: row.try_get("challenge_id").map_err(infra)?,
        scores: row.try_get("scores").map_err(infra)?,
        finished_at: row.try_get("finished_at").map_err(infra)?,
    })
}

fn result_from_row(row: &PgRow) -> Result<PhaseResult, DomainError> {
    Ok(PhaseResult {
        id: row.try_get("id").map_err(infra)?,
        participant_id: row.try_get("participant_id").map_err(infra)?,
        phase: to_u32(row.try_get("phase").map_err(infra)?, "phase")?,
        finished_at: row.try_get("finished_at").map_err(infra)?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, DomainError> {
    Ok(User {
        id: row.try_get("id").map_err(infra)?,
        external_id: row.try_get("external_id").map_err(infra)?,
        chat_id: row.try_get("chat_id").map_err(infra)?,
        chitchat_id: row.try_get("chitchat_id").map_err(infra)?,
        nick_name: row.try_get("nick_name").map_err(infra)?,
        first_name: row.try_get("first_name").map_err(infra)?,
        last_name: row.try_get("last_name").map_err(infra)?,
    })
}

#[async_trait]
impl ChallengeStorage for PgStorage {
    async fn create_challenge(&self, challenge: NewChallenge) -> Result<Challenge, DomainError> {
        let sql = format!(
            "INSERT INTO challenges (name, phase_amount, winner_amount, duration_secs, created_at) \
             SELECT $1, $2, $3, $4, $5 \
             WHERE NOT EXISTS (SELECT 1 FROM challenges WHERE finished_at IS NULL) \
             RETURNING {CHALLENGE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&challenge.name)
            .bind(to_i32(challenge.phase_amount)?)
            .bind(to_i32(challenge.winner_amount)?)
            .bind(challenge.duration_secs)
            .bind(challenge.created_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?;

        match row {
            Some(row) => challenge_from_row(&row),
            None => {
                let active = self
                    .get_actual_challenge()
                    .await?
                    .map_or(0, |active| active.id);
                Err(DomainError::ChallengeAlreadyActive(active))
            }
        }
    }

    async fn get_actual_challenge(&self) -> Result<Option<Challenge>, DomainError> {
        let sql = format!("SELECT {CHALLENGE_COLUMNS} FROM challenges WHERE finished_at IS NULL");
        sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?
            .as_ref()
            .map(challenge_from_row)
            .transpose()
    }

    async fn get_challenge(&self, challenge_id: i64) -> Result<Option<Challenge>, DomainError> {
        let sql = format!("SELECT {CHALLENGE_COLUMNS} FROM challenges WHERE id = $1");
        sqlx::query(&sql)
            .bind(challenge_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?
            .as_ref()
            .map(challenge_from_row)
            .transpose()
    }

    async fn get_last_challenge(&self) -> Result<Option<Challenge>, DomainError> {
        let sql = format!("SELECT {CHALLENGE_COLUMNS} FROM challenges ORDER BY id DESC LIMIT 1");
        sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?
            .as_ref()
            .map(challenge_from_row)
            .transpose()
    }

    async fn list_challenges(&self) -> Result<Vec<Challenge>, DomainError> {
        let sql = format!("SELECT {CHALLENGE_COLUMNS} FROM challenges ORDER BY id ASC");
        sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?
            .iter()
            .map(challenge_from_row)
            .collect()
    }

    async fn finish_challenge(
        &self,
        challenge_id: i64,
        finished_at: DateTime<Utc>,
    ) -> Result<Option<Challenge>, DomainError> {
        let sql = format!(
            "UPDATE challenges SET finished_at = $2 \
             WHERE id = $1 AND finished_at IS NULL \
             RETURNING {CHALLENGE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(challenge_id)
            .bind(finished_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?;

        if let Some(row) = row {
            tracing::info!(challenge_id, "challenge finished");
            return challenge_from_row(&row).map(Some);
        }
        match self.get_challenge(challenge_id).await? {
            Some(_) => Ok(None),
            None => Err(DomainError::ChallengeNotFound(challenge_id)),
        }
    }

    async fn get_finished_challenge_ids(&self) -> Result<Vec<i64>, DomainError> {
        sqlx::query("SELECT id FROM challenges WHERE finished_at IS NOT NULL ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?
            .iter()
            .map(|row| row.try_get("id").map_err(infra))
            .collect()
    }
}

#[async_trait]
impl ParticipantStorage for PgStorage {
    async fn create_participant(
        &self,
        user_id: i64,
        challenge_id: i64,
    ) -> Result<Participant, DomainError> {
        let sql = format!(
            "INSERT INTO participants (user_id, challenge_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, challenge_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING {PARTICIPANT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(challenge_id)
            .fetch_one(&self.pool)
            .await
            .map_err(infra)?;
        participant_from_row(&row)
    }

    async fn get_participation(
        &self,
        user_id: i64,
        challenge_id: i64,
    ) -> Result<Option<Participant>, DomainError> {
        let sql = format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE user_id = $1 AND challenge_id = $2"
        );
        sqlx::query(&sql)
            .bind(user_id)
            .bind(challenge_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?
            .as_ref()
            .map(participant_from_row)
            .transpose()
    }

    async fn increment_score(&self, participant_id: i64) -> Result<(), DomainError> {
        sqlx::query("UPDATE participants SET scores = scores + 1 WHERE id = $1")
            .bind(participant_id)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(())
    }

    async fn finish_participation(
        &self,
        participant_id: i64,
        finished_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE participants SET finished_at = $2 WHERE id = $1 AND finished_at IS NULL",
        )
        .bind(participant_id)
        .bind(finished_at)
        .execute(&self.pool)
        .await
        .map_err(infra)?;
        Ok(())
    }

    async fn get_pretenders(&self, challenge_id: i64) -> Result<Vec<Pretender>, DomainError> {
        let rows = sqlx::query(
            "SELECT p.id, p.user_id, p.challenge_id, p.scores, p.finished_at, \
                    u.external_id, u.chat_id, u.chitchat_id, u.nick_name, u.first_name, u.last_name \
             FROM participants p JOIN users u ON u.id = p.user_id \
             WHERE p.challenge_id = $1 AND p.finished_at IS NOT NULL \
             ORDER BY p.scores DESC, p.finished_at ASC, p.id ASC",
        )
        .bind(challenge_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;

        rows.iter()
            .map(|row| {
                let participant = participant_from_row(row)?;
                let user = User {
                    id: participant.user_id,
                    external_id: row.try_get("external_id").map_err(infra)?,
                    chat_id: row.try_get("chat_id").map_err(infra)?,
                    chitchat_id: row.try_get("chitchat_id").map_err(infra)?,
                    nick_name: row.try_get("nick_name").map_err(infra)?,
                    first_name: row.try_get("first_name").map_err(infra)?,
                    last_name: row.try_get("last_name").map_err(infra)?,
                };
                Ok(Pretender { participant, user })
            })
            .collect()
    }

    async fn has_all_winners(
        &self,
        challenge_id: i64,
        winner_amount: u32,
    ) -> Result<bool, DomainError> {
        let finished: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM participants WHERE challenge_id = $1 AND finished_at IS NOT NULL",
        )
        .bind(challenge_id)
        .fetch_one(&self.pool)
        .await
        .map_err(infra)?;
        Ok(finished >= i64::from(winner_amount))
    }
}

#[async_trait]
impl ResultStorage for PgStorage {
    async fn create_result(
        &self,
        participant_id: i64,
        phase: u32,
    ) -> Result<PhaseResult, DomainError> {
        let sql = format!(
            "INSERT INTO results (participant_id, phase) VALUES ($1, $2) RETURNING {RESULT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(participant_id)
            .bind(to_i32(phase)?)
            .fetch_one(&self.pool)
            .await
            .map_err(infra)?;
        result_from_row(&row)
    }

    async fn finish_phase(
        &self,
        result_id: i64,
        finished_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        sqlx::query("UPDATE results SET finished_at = $2 WHERE id = $1 AND finished_at IS NULL")
            .bind(result_id)
            .bind(finished_at)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(())
    }

    async fn get_last_result(
        &self,
        participant_id: i64,
    ) -> Result<Option<PhaseResult>, DomainError> {
        let sql = format!(
            "SELECT {RESULT_COLUMNS} FROM results WHERE participant_id = $1 \
             ORDER BY phase DESC LIMIT 1"
        );
        sqlx::query(&sql)
            .bind(participant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?
            .as_ref()
            .map(result_from_row)
            .transpose()
    }
}

#[async_trait]
impl UserStorage for PgStorage {
    async fn get_or_create_user(&self, profile: &UserProfile) -> Result<User, DomainError> {
        let sql = format!(
            "INSERT INTO users (external_id, chat_id, chitchat_id, nick_name, first_name, last_name) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (external_id) DO UPDATE SET chat_id = EXCLUDED.chat_id \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(profile.external_id)
            .bind(profile.chat_id)
            .bind(Uuid::new_v4())
            .bind(&profile.nick_name)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .fetch_one(&self.pool)
            .await
            .map_err(infra)?;
        user_from_row(&row)
    }

    async fn get_user(&self, external_id: i64) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE external_id = $1");
        sqlx::query(&sql)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC");
        sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?
            .iter()
            .map(user_from_row)
            .collect()
    }
}
