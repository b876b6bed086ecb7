use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    recipe::dto::{
        AttrFilter, CreateAttrRequest, IngredientOut, RecipeDetail, RecipeOut, RecipePatch,
        RecipeWrite, TagOut,
    },
    recipe::repo::{Ingredient, NewRecipe, Recipe, Tag},
    state::AppState,
};

pub fn attr_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
}

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe)
                .put(put_recipe)
                .patch(patch_recipe)
                .delete(delete_recipe),
        )
}

// --- tags & ingredients ---

#[instrument(skip(state))]
pub async fn list_tags(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<AttrFilter>,
) -> Result<Json<Vec<TagOut>>, ApiError> {
    let tags = Tag::list_by_user(&state.db, user_id, filter.assigned_only()).await?;
    Ok(Json(tags.into_iter().map(TagOut::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_tag(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateAttrRequest>,
) -> Result<(StatusCode, Json<TagOut>), ApiError> {
    let name = require_name(&payload.name)?;
    let tag = Tag::create(&state.db, user_id, name).await?;
    info!(user_id = %user_id, tag_id = %tag.id, "tag created");
    Ok((StatusCode::CREATED, Json(tag.into())))
}

#[instrument(skip(state))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<AttrFilter>,
) -> Result<Json<Vec<IngredientOut>>, ApiError> {
    let ingredients = Ingredient::list_by_user(&state.db, user_id, filter.assigned_only()).await?;
    Ok(Json(ingredients.into_iter().map(IngredientOut::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateAttrRequest>,
) -> Result<(StatusCode, Json<IngredientOut>), ApiError> {
    let name = require_name(&payload.name)?;
    let ingredient = Ingredient::create(&state.db, user_id, name).await?;
    info!(user_id = %user_id, ingredient_id = %ingredient.id, "ingredient created");
    Ok((StatusCode::CREATED, Json(ingredient.into())))
}

// --- recipes ---

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<RecipeOut>>, ApiError> {
    let recipes = Recipe::list_by_user(&state.db, user_id).await?;
    let ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();

    let mut tags_by_recipe: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (recipe_id, tag_id) in Recipe::tag_links(&state.db, &ids).await? {
        tags_by_recipe.entry(recipe_id).or_default().push(tag_id);
    }
    let mut ingredients_by_recipe: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (recipe_id, ingredient_id) in Recipe::ingredient_links(&state.db, &ids).await? {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(ingredient_id);
    }

    let items = recipes
        .into_iter()
        .map(|r| {
            let tags = tags_by_recipe.remove(&r.id).unwrap_or_default();
            let ingredients = ingredients_by_recipe.remove(&r.id).unwrap_or_default();
            RecipeOut::from_parts(r, tags, ingredients)
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeDetail>, ApiError> {
    let recipe = Recipe::find(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("recipe not found"))?;
    let tags = Tag::for_recipe(&state.db, recipe.id).await?;
    let ingredients = Ingredient::for_recipe(&state.db, recipe.id).await?;
    Ok(Json(RecipeDetail::from_parts(recipe, tags, ingredients)))
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<RecipeWrite>,
) -> Result<(StatusCode, Json<RecipeOut>), ApiError> {
    let new = validate_write(&state, user_id, payload).await?;
    let recipe = Recipe::create(&state.db, user_id, &new).await?;
    info!(user_id = %user_id, recipe_id = %recipe.id, "recipe created");
    Ok((
        StatusCode::CREATED,
        Json(RecipeOut::from_parts(recipe, new.tags, new.ingredients)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn put_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipeWrite>,
) -> Result<Json<RecipeOut>, ApiError> {
    let new = validate_write(&state, user_id, payload).await?;
    let recipe = Recipe::replace(&state.db, user_id, id, &new)
        .await?
        .ok_or(ApiError::NotFound("recipe not found"))?;
    info!(user_id = %user_id, recipe_id = %recipe.id, "recipe replaced");
    Ok(Json(RecipeOut::from_parts(recipe, new.tags, new.ingredients)))
}

#[instrument(skip(state, payload))]
pub async fn patch_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipePatch>,
) -> Result<Json<RecipeOut>, ApiError> {
    let existing = Recipe::find(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("recipe not found"))?;

    let title = match payload.title {
        Some(t) => require_title(&t)?.to_string(),
        None => existing.title,
    };
    let time_minutes = match payload.time_minutes {
        Some(v) => require_non_negative(v)?,
        None => existing.time_minutes,
    };
    let tags = match payload.tags {
        Some(ids) => owned_tag_ids(&state, user_id, ids).await?,
        None => Recipe::tag_ids(&state.db, id).await?,
    };
    let ingredients = match payload.ingredients {
        Some(ids) => owned_ingredient_ids(&state, user_id, ids).await?,
        None => Recipe::ingredient_ids(&state.db, id).await?,
    };

    let new = NewRecipe {
        title,
        time_minutes,
        price: payload.price.unwrap_or(existing.price),
        link: payload.link.or(existing.link),
        tags,
        ingredients,
    };

    let recipe = Recipe::replace(&state.db, user_id, id, &new)
        .await?
        .ok_or(ApiError::NotFound("recipe not found"))?;
    info!(user_id = %user_id, recipe_id = %recipe.id, "recipe updated");
    Ok(Json(RecipeOut::from_parts(recipe, new.tags, new.ingredients)))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !Recipe::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("recipe not found"));
    }
    info!(user_id = %user_id, recipe_id = %id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

// --- validation ---

fn require_name(name: &str) -> Result<&str, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("name", "this field may not be blank"));
    }
    Ok(name)
}

fn require_title(title: &str) -> Result<&str, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("title", "this field may not be blank"));
    }
    Ok(title)
}

fn require_non_negative(minutes: i32) -> Result<i32, ApiError> {
    if minutes < 0 {
        return Err(ApiError::validation(
            "time_minutes",
            "ensure this value is greater than or equal to 0",
        ));
    }
    Ok(minutes)
}

fn dedup_ids(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    ids.sort();
    ids.dedup();
    ids
}

/// Accept only tag ids that belong to the caller; anything else is a 400.
async fn owned_tag_ids(
    state: &AppState,
    user_id: Uuid,
    ids: Vec<Uuid>,
) -> Result<Vec<Uuid>, ApiError> {
    let ids = dedup_ids(ids);
    if ids.is_empty() {
        return Ok(ids);
    }
    let owned = Tag::ids_owned(&state.db, user_id, &ids).await?;
    if owned.len() != ids.len() {
        return Err(ApiError::validation("tags", "invalid tag id"));
    }
    Ok(ids)
}

async fn owned_ingredient_ids(
    state: &AppState,
    user_id: Uuid,
    ids: Vec<Uuid>,
) -> Result<Vec<Uuid>, ApiError> {
    let ids = dedup_ids(ids);
    if ids.is_empty() {
        return Ok(ids);
    }
    let owned = Ingredient::ids_owned(&state.db, user_id, &ids).await?;
    if owned.len() != ids.len() {
        return Err(ApiError::validation("ingredients", "invalid ingredient id"));
    }
    Ok(ids)
}

async fn validate_write(
    state: &AppState,
    user_id: Uuid,
    payload: RecipeWrite,
) -> Result<NewRecipe, ApiError> {
    let title = require_title(&payload.title)?.to_string();
    let time_minutes = payload
        .time_minutes
        .ok_or_else(|| ApiError::validation("time_minutes", "this field is required"))?;
    let time_minutes = require_non_negative(time_minutes)?;
    let price = payload
        .price
        .ok_or_else(|| ApiError::validation("price", "this field is required"))?;

    let tags = owned_tag_ids(state, user_id, payload.tags).await?;
    let ingredients = owned_ingredient_ids(state, user_id, payload.ingredients).await?;

    Ok(NewRecipe {
        title,
        time_minutes,
        price,
        link: payload.link,
        tags,
        ingredients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected() {
        assert!(require_name("").is_err());
        assert!(require_name("   ").is_err());
        assert_eq!(require_name(" Vegan ").unwrap(), "Vegan");
    }

    #[test]
    fn negative_minutes_are_rejected() {
        assert!(require_non_negative(-1).is_err());
        assert_eq!(require_non_negative(0).unwrap(), 0);
        assert_eq!(require_non_negative(45).unwrap(), 45);
    }

    #[test]
    fn dedup_ids_collapses_duplicates() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let out = dedup_ids(vec![id, other, id]);
        assert_eq!(out.len(), 2);
        assert!(out.contains(&id) && out.contains(&other));
    }
}
