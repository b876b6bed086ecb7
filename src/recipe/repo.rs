use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct Ingredient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub link: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Validated recipe payload, used for both create and full replace.
#[derive(Debug)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub link: Option<String>,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<Uuid>,
}

impl Tag {
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        assigned_only: bool,
    ) -> Result<Vec<Tag>, sqlx::Error> {
        if assigned_only {
            sqlx::query_as::<_, Tag>(
                r#"
                SELECT DISTINCT t.id, t.user_id, t.name, t.created_at
                FROM tags t
                JOIN recipe_tags rt ON rt.tag_id = t.id
                JOIN recipes r ON r.id = rt.recipe_id
                WHERE t.user_id = $1 AND r.user_id = $1
                ORDER BY t.name DESC
                "#,
            )
            .bind(user_id)
            .fetch_all(db)
            .await
        } else {
            sqlx::query_as::<_, Tag>(
                r#"
                SELECT id, user_id, name, created_at
                FROM tags
                WHERE user_id = $1
                ORDER BY name DESC
                "#,
            )
            .bind(user_id)
            .fetch_all(db)
            .await
        }
    }

    pub async fn create(db: &PgPool, user_id: Uuid, name: &str) -> Result<Tag, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(db)
        .await
    }

    /// Of `ids`, the ones that exist and belong to `user_id`.
    pub async fn ids_owned(
        db: &PgPool,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM tags WHERE user_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(ids)
        .fetch_all(db)
        .await
    }

    pub async fn for_recipe(db: &PgPool, recipe_id: Uuid) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.user_id, t.name, t.created_at
            FROM tags t
            JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE rt.recipe_id = $1
            ORDER BY t.name DESC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(db)
        .await
    }
}

impl Ingredient {
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        assigned_only: bool,
    ) -> Result<Vec<Ingredient>, sqlx::Error> {
        if assigned_only {
            sqlx::query_as::<_, Ingredient>(
                r#"
                SELECT DISTINCT i.id, i.user_id, i.name, i.created_at
                FROM ingredients i
                JOIN recipe_ingredients ri ON ri.ingredient_id = i.id
                JOIN recipes r ON r.id = ri.recipe_id
                WHERE i.user_id = $1 AND r.user_id = $1
                ORDER BY i.name DESC
                "#,
            )
            .bind(user_id)
            .fetch_all(db)
            .await
        } else {
            sqlx::query_as::<_, Ingredient>(
                r#"
                SELECT id, user_id, name, created_at
                FROM ingredients
                WHERE user_id = $1
                ORDER BY name DESC
                "#,
            )
            .bind(user_id)
            .fetch_all(db)
            .await
        }
    }

    pub async fn create(db: &PgPool, user_id: Uuid, name: &str) -> Result<Ingredient, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(db)
        .await
    }

    pub async fn ids_owned(
        db: &PgPool,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM ingredients WHERE user_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(ids)
        .fetch_all(db)
        .await
    }

    pub async fn for_recipe(db: &PgPool, recipe_id: Uuid) -> Result<Vec<Ingredient>, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT i.id, i.user_id, i.name, i.created_at
            FROM ingredients i
            JOIN recipe_ingredients ri ON ri.ingredient_id = i.id
            WHERE ri.recipe_id = $1
            ORDER BY i.name DESC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(db)
        .await
    }
}

impl Recipe {
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Recipe>, sqlx::Error> {
        sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, user_id, title, time_minutes, price, link, created_at
            FROM recipes
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn find(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<Recipe>, sqlx::Error> {
        sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, user_id, title, time_minutes, price, link, created_at
            FROM recipes
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Insert the recipe and its link rows in one transaction.
    pub async fn create(db: &PgPool, user_id: Uuid, new: &NewRecipe) -> Result<Recipe, sqlx::Error> {
        let mut tx = db.begin().await?;

        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (user_id, title, time_minutes, price, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, time_minutes, price, link, created_at
            "#,
        )
        .bind(user_id)
        .bind(&new.title)
        .bind(new.time_minutes)
        .bind(new.price)
        .bind(&new.link)
        .fetch_one(&mut *tx)
        .await?;

        insert_links(&mut tx, recipe.id, &new.tags, &new.ingredients).await?;

        tx.commit().await?;
        Ok(recipe)
    }

    /// Full replace. Returns None when the recipe does not exist or is owned
    /// by someone else; nothing is written in that case.
    pub async fn replace(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        new: &NewRecipe,
    ) -> Result<Option<Recipe>, sqlx::Error> {
        let mut tx = db.begin().await?;

        let Some(recipe) = sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes
            SET title = $3, time_minutes = $4, price = $5, link = $6
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, time_minutes, price, link, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&new.title)
        .bind(new.time_minutes)
        .bind(new.price)
        .bind(&new.link)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_links(&mut tx, recipe.id, &new.tags, &new.ingredients).await?;

        tx.commit().await?;
        Ok(Some(recipe))
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn tag_ids(db: &PgPool, recipe_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>("SELECT tag_id FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .fetch_all(db)
            .await
    }

    pub async fn ingredient_ids(db: &PgPool, recipe_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT ingredient_id FROM recipe_ingredients WHERE recipe_id = $1",
        )
        .bind(recipe_id)
        .fetch_all(db)
        .await
    }

    /// Link rows for a batch of recipes, for assembling list responses
    /// without a query per recipe.
    pub async fn tag_links(
        db: &PgPool,
        recipe_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error> {
        sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT recipe_id, tag_id FROM recipe_tags WHERE recipe_id = ANY($1)",
        )
        .bind(recipe_ids)
        .fetch_all(db)
        .await
    }

    pub async fn ingredient_links(
        db: &PgPool,
        recipe_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error> {
        sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT recipe_id, ingredient_id FROM recipe_ingredients WHERE recipe_id = ANY($1)",
        )
        .bind(recipe_ids)
        .fetch_all(db)
        .await
    }
}

async fn insert_links(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    recipe_id: Uuid,
    tag_ids: &[Uuid],
    ingredient_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    for tag_id in tag_ids {
        sqlx::query(
            "INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(recipe_id)
        .bind(tag_id)
        .execute(&mut **tx)
        .await?;
    }
    for ingredient_id in ingredient_ids {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(recipe_id)
        .bind(ingredient_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
