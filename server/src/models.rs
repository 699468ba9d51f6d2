use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::sessions)]
pub struct NewSession<'a> {
    pub user_id: Uuid,
    pub token_hash: &'a str,
    pub expires_at: DateTime<Utc>,
}

/// A tag or ingredient row, selected as `(id, name)` from either table.
#[derive(Queryable, Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub id: Uuid,
    pub name: String,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price_cents: i32,
    pub link: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe<'a> {
    pub user_id: Uuid,
    pub title: &'a str,
    pub time_minutes: i32,
    pub price_cents: i32,
    pub link: &'a str,
    pub description: &'a str,
}

/// Scalar recipe columns touched by an update. `None` fields are skipped.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::recipes)]
pub struct RecipeChangeset<'a> {
    pub title: Option<&'a str>,
    pub time_minutes: Option<i32>,
    pub price_cents: Option<i32>,
    pub link: Option<&'a str>,
    pub description: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}
