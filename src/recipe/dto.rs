use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recipe::repo::{Ingredient, Recipe, Tag};

#[derive(Debug, Serialize)]
pub struct TagOut {
    pub id: Uuid,
    pub name: String,
}

impl From<Tag> for TagOut {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngredientOut {
    pub id: Uuid,
    pub name: String,
}

impl From<Ingredient> for IngredientOut {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
        }
    }
}

/// Body for creating a tag or an ingredient.
#[derive(Debug, Deserialize)]
pub struct CreateAttrRequest {
    #[serde(default)]
    pub name: String,
}

/// Query string for tag/ingredient listing. `assigned_only=1` restricts the
/// listing to records linked to at least one of the caller's recipes.
#[derive(Debug, Default, Deserialize)]
pub struct AttrFilter {
    #[serde(default)]
    pub assigned_only: Option<u8>,
}

impl AttrFilter {
    pub fn assigned_only(&self) -> bool {
        matches!(self.assigned_only, Some(v) if v != 0)
    }
}

/// List/write representation: tags and ingredients as id arrays.
#[derive(Debug, Serialize)]
pub struct RecipeOut {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub link: Option<String>,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<Uuid>,
}

impl RecipeOut {
    pub fn from_parts(recipe: Recipe, tags: Vec<Uuid>, ingredients: Vec<Uuid>) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags,
            ingredients,
        }
    }
}

/// Detail representation: tags and ingredients nested.
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub link: Option<String>,
    pub tags: Vec<TagOut>,
    pub ingredients: Vec<IngredientOut>,
}

impl RecipeDetail {
    pub fn from_parts(recipe: Recipe, tags: Vec<Tag>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags: tags.into_iter().map(TagOut::from).collect(),
            ingredients: ingredients.into_iter().map(IngredientOut::from).collect(),
        }
    }
}

/// Body for POST and PUT. Required fields are validated in the handler so
/// that a missing field comes back as a 400 with a field message.
#[derive(Debug, Deserialize)]
pub struct RecipeWrite {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub time_minutes: Option<i32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub tags: Vec<Uuid>,
    #[serde(default)]
    pub ingredients: Vec<Uuid>,
}

/// Body for PATCH. Absent fields are left untouched; a provided `tags` or
/// `ingredients` array replaces the link set.
#[derive(Debug, Default, Deserialize)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<f64>,
    pub link: Option<String>,
    pub tags: Option<Vec<Uuid>>,
    pub ingredients: Option<Vec<Uuid>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn recipe() -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Apple crumble".to_string(),
            time_minutes: 10,
            price: 5.0,
            link: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn assigned_only_is_set_only_for_nonzero() {
        assert!(!AttrFilter::default().assigned_only());
        assert!(!AttrFilter {
            assigned_only: Some(0)
        }
        .assigned_only());
        assert!(AttrFilter {
            assigned_only: Some(1)
        }
        .assigned_only());
    }

    #[test]
    fn recipe_out_serializes_link_ids() {
        let tag_id = Uuid::new_v4();
        let out = RecipeOut::from_parts(recipe(), vec![tag_id], vec![]);
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["title"], "Apple crumble");
        assert_eq!(json["tags"][0], tag_id.to_string());
        assert_eq!(json["ingredients"], serde_json::json!([]));
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn recipe_detail_nests_attr_objects() {
        let r = recipe();
        let tag = Tag {
            id: Uuid::new_v4(),
            user_id: r.user_id,
            name: "Dessert".to_string(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let ingredient = Ingredient {
            id: Uuid::new_v4(),
            user_id: r.user_id,
            name: "Apples".to_string(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let detail = RecipeDetail::from_parts(r, vec![tag], vec![ingredient]);
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["tags"][0]["name"], "Dessert");
        assert_eq!(json["ingredients"][0]["name"], "Apples");
    }

    #[test]
    fn patch_body_defaults_to_untouched() {
        let patch: RecipePatch = serde_json::from_str(r#"{"title":"New title"}"#).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New title"));
        assert!(patch.price.is_none());
        assert!(patch.tags.is_none());
    }

    #[test]
    fn write_body_tolerates_missing_fields() {
        let w: RecipeWrite = serde_json::from_str("{}").unwrap();
        assert!(w.title.is_empty());
        assert!(w.time_minutes.is_none());
        assert!(w.tags.is_empty());
    }
}
