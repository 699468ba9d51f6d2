//! Tags and ingredients: per-user names attached to recipes.
//!
//! Both tables have the same shape (`id`, `user_id`, `name`) and a link table
//! keyed by `(recipe_id, <label>_id)`, so one set of queries is generated for
//! each.

macro_rules! label_queries {
    ($(#[$doc:meta])* $module:ident, $table:ident, $link:ident, $link_fk:ident, $kind:literal) => {
        $(#[$doc])*
        pub mod $module {
            use crate::models::Label;
            use crate::schema::{$link, $table};
            use crate::store::{dedup_names, StoreError};
            use diesel::prelude::*;
            use diesel::result::{DatabaseErrorKind, Error as DieselError};
            use uuid::Uuid;

            /// The user's rows by name descending. With `assigned_only`, only
            /// rows linked to at least one recipe, each listed once.
            pub fn list(
                conn: &mut PgConnection,
                user_id: Uuid,
                assigned_only: bool,
            ) -> QueryResult<Vec<Label>> {
                let mut query = $table::table
                    .filter($table::user_id.eq(user_id))
                    .select(($table::id, $table::name))
                    .order($table::name.desc())
                    .then_order_by($table::id.asc())
                    .into_boxed();

                if assigned_only {
                    query = query.filter($table::id.eq_any($link::table.select($link::$link_fk)));
                }

                query.load(conn)
            }

            /// Return the user's row with this exact name, inserting it first
            /// if missing. Concurrent callers converge on a single row.
            pub fn get_or_create(
                conn: &mut PgConnection,
                user_id: Uuid,
                name: &str,
            ) -> QueryResult<Label> {
                diesel::insert_into($table::table)
                    .values(($table::user_id.eq(user_id), $table::name.eq(name)))
                    .on_conflict(($table::user_id, $table::name))
                    .do_nothing()
                    .execute(conn)?;

                $table::table
                    .filter($table::user_id.eq(user_id))
                    .filter($table::name.eq(name))
                    .select(($table::id, $table::name))
                    .first(conn)
            }

            /// Resolve every name to a row id; repeated names yield one id.
            pub fn get_or_create_all(
                conn: &mut PgConnection,
                user_id: Uuid,
                names: &[String],
            ) -> QueryResult<Vec<Uuid>> {
                dedup_names(names)
                    .into_iter()
                    .map(|name| get_or_create(conn, user_id, name).map(|label| label.id))
                    .collect()
            }

            pub fn find(conn: &mut PgConnection, user_id: Uuid, id: Uuid) -> Result<Label, StoreError> {
                $table::table
                    .filter($table::id.eq(id))
                    .filter($table::user_id.eq(user_id))
                    .select(($table::id, $table::name))
                    .first(conn)
                    .optional()?
                    .ok_or(StoreError::NotFound)
            }

            pub fn rename(
                conn: &mut PgConnection,
                user_id: Uuid,
                id: Uuid,
                name: &str,
            ) -> Result<Label, StoreError> {
                let result = diesel::update(
                    $table::table
                        .filter($table::id.eq(id))
                        .filter($table::user_id.eq(user_id)),
                )
                .set($table::name.eq(name))
                .returning(($table::id, $table::name))
                .get_result::<Label>(conn)
                .optional();

                match result {
                    Ok(Some(label)) => Ok(label),
                    Ok(None) => Err(StoreError::NotFound),
                    Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                        Err(StoreError::Conflict(
                            concat!($kind, " with that name already exists").to_string(),
                        ))
                    }
                    Err(e) => Err(e.into()),
                }
            }

            /// Delete one of the user's rows; its recipe links go with it.
            pub fn delete(conn: &mut PgConnection, user_id: Uuid, id: Uuid) -> Result<(), StoreError> {
                let deleted = diesel::delete(
                    $table::table
                        .filter($table::id.eq(id))
                        .filter($table::user_id.eq(user_id)),
                )
                .execute(conn)?;

                if deleted == 0 {
                    return Err(StoreError::NotFound);
                }
                Ok(())
            }

            /// Link rows to a recipe. Already-linked rows are skipped.
            pub fn attach(conn: &mut PgConnection, recipe_id: Uuid, ids: &[Uuid]) -> QueryResult<usize> {
                if ids.is_empty() {
                    return Ok(0);
                }

                let rows: Vec<_> = ids
                    .iter()
                    .map(|id| ($link::recipe_id.eq(recipe_id), $link::$link_fk.eq(*id)))
                    .collect();

                diesel::insert_into($link::table)
                    .values(rows)
                    .on_conflict_do_nothing()
                    .execute(conn)
            }

            pub fn detach_all(conn: &mut PgConnection, recipe_id: Uuid) -> QueryResult<usize> {
                diesel::delete($link::table.filter($link::recipe_id.eq(recipe_id))).execute(conn)
            }

            /// `(recipe_id, row)` pairs for the given recipes, by name ascending.
            pub fn for_recipes(
                conn: &mut PgConnection,
                recipe_ids: &[Uuid],
            ) -> QueryResult<Vec<(Uuid, Label)>> {
                $link::table
                    .inner_join($table::table)
                    .filter($link::recipe_id.eq_any(recipe_ids))
                    .select(($link::recipe_id, ($table::id, $table::name)))
                    .order($table::name.asc())
                    .load(conn)
            }
        }
    };
}

label_queries!(
    /// Queries over the `tags` table.
    tags, tags, recipe_tags, tag_id, "Tag"
);

label_queries!(
    /// Queries over the `ingredients` table.
    ingredients, ingredients, recipe_ingredients, ingredient_id, "Ingredient"
);
