use super::labels::{ingredients, tags};
use super::StoreError;
use crate::models::{Label, NewRecipe, Recipe, RecipeChangeset};
use crate::schema::{recipe_ingredients, recipe_tags, recipes};
use crate::types::{FieldUpdate, Price};
use chrono::Utc;
use diesel::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

/// Validated input for a new recipe.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub description: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
}

/// Validated partial update. `None` scalars and `Unset` relations are left alone.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Price>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: FieldUpdate<Vec<String>>,
    pub ingredients: FieldUpdate<Vec<String>>,
}

/// Restricts a recipe listing to recipes carrying any of the given ids.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub tag_ids: Vec<Uuid>,
    pub ingredient_ids: Vec<Uuid>,
}

/// A recipe row together with its attached tags and ingredients.
#[derive(Debug, Clone)]
pub struct RecipeRecord {
    pub recipe: Recipe,
    pub tags: Vec<Label>,
    pub ingredients: Vec<Label>,
}

pub fn create(
    conn: &mut PgConnection,
    user_id: Uuid,
    draft: &RecipeDraft,
) -> Result<RecipeRecord, StoreError> {
    conn.transaction(|conn| {
        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(NewRecipe {
                user_id,
                title: &draft.title,
                time_minutes: draft.time_minutes,
                price_cents: draft.price.cents(),
                link: &draft.link,
                description: &draft.description,
            })
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        let tag_ids = tags::get_or_create_all(conn, user_id, &draft.tags)?;
        tags::attach(conn, recipe.id, &tag_ids)?;

        let ingredient_ids = ingredients::get_or_create_all(conn, user_id, &draft.ingredients)?;
        ingredients::attach(conn, recipe.id, &ingredient_ids)?;

        tracing::debug!(
            recipe_id = %recipe.id,
            tags = tag_ids.len(),
            ingredients = ingredient_ids.len(),
            "created recipe"
        );

        with_labels(conn, recipe)
    })
}

pub fn update(
    conn: &mut PgConnection,
    user_id: Uuid,
    id: Uuid,
    changes: &RecipeChanges,
) -> Result<RecipeRecord, StoreError> {
    conn.transaction(|conn| {
        let changeset = RecipeChangeset {
            title: changes.title.as_deref(),
            time_minutes: changes.time_minutes,
            price_cents: changes.price.map(Price::cents),
            link: changes.link.as_deref(),
            description: changes.description.as_deref(),
            updated_at: Utc::now(),
        };

        let recipe: Recipe = diesel::update(
            recipes::table
                .filter(recipes::id.eq(id))
                .filter(recipes::user_id.eq(user_id)),
        )
        .set(&changeset)
        .returning(Recipe::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or(StoreError::NotFound)?;

        if let FieldUpdate::SetTo(names) = &changes.tags {
            tags::detach_all(conn, recipe.id)?;
            let ids = tags::get_or_create_all(conn, user_id, names)?;
            tags::attach(conn, recipe.id, &ids)?;
        }

        if let FieldUpdate::SetTo(names) = &changes.ingredients {
            ingredients::detach_all(conn, recipe.id)?;
            let ids = ingredients::get_or_create_all(conn, user_id, names)?;
            ingredients::attach(conn, recipe.id, &ids)?;
        }

        with_labels(conn, recipe)
    })
}

pub fn get(conn: &mut PgConnection, user_id: Uuid, id: Uuid) -> Result<RecipeRecord, StoreError> {
    let recipe: Recipe = recipes::table
        .filter(recipes::id.eq(id))
        .filter(recipes::user_id.eq(user_id))
        .select(Recipe::as_select())
        .first(conn)
        .optional()?
        .ok_or(StoreError::NotFound)?;

    with_labels(conn, recipe)
}

/// The user's recipes, newest first.
pub fn list(
    conn: &mut PgConnection,
    user_id: Uuid,
    filter: &RecipeFilter,
) -> Result<Vec<RecipeRecord>, StoreError> {
    let mut query = recipes::table
        .filter(recipes::user_id.eq(user_id))
        .select(Recipe::as_select())
        .order(recipes::created_at.desc())
        .then_order_by(recipes::id.desc())
        .into_boxed();

    if !filter.tag_ids.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .filter(recipe_tags::tag_id.eq_any(filter.tag_ids.clone()))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }

    if !filter.ingredient_ids.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_ingredients::table
                    .filter(recipe_ingredients::ingredient_id.eq_any(filter.ingredient_ids.clone()))
                    .select(recipe_ingredients::recipe_id),
            ),
        );
    }

    let rows: Vec<Recipe> = query.load(conn)?;
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let mut tags_by_recipe = group_by_recipe(tags::for_recipes(conn, &ids)?);
    let mut ingredients_by_recipe = group_by_recipe(ingredients::for_recipes(conn, &ids)?);

    Ok(rows
        .into_iter()
        .map(|recipe| RecipeRecord {
            tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
            ingredients: ingredients_by_recipe.remove(&recipe.id).unwrap_or_default(),
            recipe,
        })
        .collect())
}

/// Delete one of the user's recipes. Tags and ingredients stay behind.
pub fn delete(conn: &mut PgConnection, user_id: Uuid, id: Uuid) -> Result<(), StoreError> {
    let deleted = diesel::delete(
        recipes::table
            .filter(recipes::id.eq(id))
            .filter(recipes::user_id.eq(user_id)),
    )
    .execute(conn)?;

    if deleted == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

fn with_labels(conn: &mut PgConnection, recipe: Recipe) -> Result<RecipeRecord, StoreError> {
    let ids = [recipe.id];
    let tags = tags::for_recipes(conn, &ids)?
        .into_iter()
        .map(|(_, label)| label)
        .collect();
    let ingredients = ingredients::for_recipes(conn, &ids)?
        .into_iter()
        .map(|(_, label)| label)
        .collect();

    Ok(RecipeRecord {
        recipe,
        tags,
        ingredients,
    })
}

fn group_by_recipe(pairs: Vec<(Uuid, Label)>) -> HashMap<Uuid, Vec<Label>> {
    let mut grouped: HashMap<Uuid, Vec<Label>> = HashMap::new();
    for (recipe_id, label) in pairs {
        grouped.entry(recipe_id).or_default().push(label);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(name: &str) -> Label {
        Label {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_group_by_recipe_preserves_order() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let grouped = group_by_recipe(vec![
            (first, label("Apple")),
            (second, label("Butter")),
            (first, label("Cinnamon")),
        ]);

        let names: Vec<&str> = grouped[&first].iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "Cinnamon"]);
        assert_eq!(grouped[&second].len(), 1);
    }

    #[test]
    fn test_recipe_changes_default_touches_nothing() {
        let changes = RecipeChanges::default();
        assert!(changes.title.is_none());
        assert!(!changes.tags.is_set());
        assert!(!changes.ingredients.is_set());
    }
}
