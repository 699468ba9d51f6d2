use crate::db::DbPool;
use crate::models::{NewSession, User};
use crate::schema::{sessions, users};
use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel::r2d2;
use thiserror::Error;

use super::crypto::{generate_token, hash_token};

/// Store a new session for the user and return its plaintext bearer token.
pub fn create_session(
    conn: &mut PgConnection,
    user_id: uuid::Uuid,
    ttl_days: i64,
) -> Result<String, diesel::result::Error> {
    let token = generate_token();
    let token_hash = hash_token(&token);
    let expires_at = Utc::now() + Duration::days(ttl_days);

    let new_session = NewSession {
        user_id,
        token_hash: &token_hash,
        expires_at,
    };

    diesel::insert_into(sessions::table)
        .values(&new_session)
        .execute(conn)?;

    Ok(token)
}

#[derive(Error, Debug)]
pub enum SessionLookupError {
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::PoolError),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

/// The owner of an unexpired session with this token, if any.
pub async fn get_user_from_token(
    pool: &DbPool,
    token: &str,
) -> Result<Option<User>, SessionLookupError> {
    let mut conn = pool.get()?;
    let token_hash = hash_token(token);

    let user = sessions::table
        .inner_join(users::table)
        .filter(sessions::token_hash.eq(&token_hash))
        .filter(sessions::expires_at.gt(Utc::now()))
        .select(User::as_select())
        .first(&mut conn)
        .optional()?;

    Ok(user)
}
