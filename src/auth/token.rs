use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

pub const TOKEN_KEY_LEN: usize = 40;

/// Opaque bearer key: 40 alphanumeric characters from the OS RNG. The key
/// carries no structure; identity is resolved by a server-side lookup.
pub fn generate_key() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_KEY_LEN)
        .map(char::from)
        .collect()
}

#[derive(Debug, Clone, FromRow)]
pub struct AuthToken {
    pub key: String,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
}

impl AuthToken {
    /// Return the user's existing token, or mint one. The ON CONFLICT arm
    /// keeps issuance idempotent when two logins race.
    pub async fn get_or_create(db: &PgPool, user_id: Uuid) -> Result<AuthToken, sqlx::Error> {
        if let Some(token) = sqlx::query_as::<_, AuthToken>(
            r#"
            SELECT key, user_id, created_at
            FROM auth_tokens
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        {
            return Ok(token);
        }

        sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (key, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET key = auth_tokens.key
            RETURNING key, user_id, created_at
            "#,
        )
        .bind(generate_key())
        .bind(user_id)
        .fetch_one(db)
        .await
    }

    /// Resolve a bearer key to the id of an active user.
    pub async fn resolve_user(db: &PgPool, key: &str) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT u.id
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.key = $1 AND u.is_active
            "#,
        )
        .bind(key)
        .fetch_optional(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_is_40_alphanumeric_chars() {
        let key = generate_key();
        assert_eq!(key.len(), TOKEN_KEY_LEN);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(generate_key(), generate_key());
    }
}
