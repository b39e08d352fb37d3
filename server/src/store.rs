//! SQLite-backed [`RecipeStore`].

use crate::db::{DbPool, MIGRATIONS};
use crate::models::{NewRecipe, NewUser, RecipeRow};
use crate::schema::{recipes, users};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::MigrationHarness;
use pantry_core::store::suffixed_title;
use pantry_core::{Recipe, RecipeStore, StoreError};
use uuid::Uuid;

/// Upper bound on `T (n)` candidates tried for one insert.
const MAX_TITLE_ATTEMPTS: usize = 1000;

type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Clone)]
pub struct DbRecipeStore {
    pool: DbPool,
}

impl DbRecipeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<Conn, StoreError> {
        self.pool.get().map_err(|e| {
            tracing::error!("Failed to get database connection: {}", e);
            StoreError::Backend(e.to_string())
        })
    }
}

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn is_unique_violation(e: &DieselError) -> bool {
    matches!(
        e,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Errors raised inside the title-suffixing transaction.
enum TxError {
    Db(DieselError),
    Encode(serde_json::Error),
    Exhausted,
}

impl From<DieselError> for TxError {
    fn from(e: DieselError) -> Self {
        TxError::Db(e)
    }
}

impl RecipeStore for DbRecipeStore {
    fn insert(&self, recipe: &Recipe) -> Result<(), StoreError> {
        let row = NewRecipe::from_recipe(recipe, &recipe.title).map_err(backend)?;
        let mut conn = self.conn()?;

        match diesel::insert_into(recipes::table)
            .values(&row)
            .execute(&mut conn)
        {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::TitleTaken {
                owner_id: recipe.owner_id.clone(),
                title: recipe.title.clone(),
            }),
            Err(e) => Err(backend(e)),
        }
    }

    fn insert_with_unique_title(&self, recipe: &Recipe) -> Result<String, StoreError> {
        let mut conn = self.conn()?;

        // BEGIN IMMEDIATE takes the write lock up front, so no other writer
        // can claim a candidate title between our attempts.
        let result = conn.immediate_transaction::<String, TxError, _>(|conn| {
            for attempt in 0..MAX_TITLE_ATTEMPTS {
                let title = suffixed_title(&recipe.title, attempt);
                let row = NewRecipe::from_recipe(recipe, &title).map_err(TxError::Encode)?;

                match diesel::insert_into(recipes::table).values(&row).execute(conn) {
                    Ok(_) => return Ok(title),
                    Err(e) if is_unique_violation(&e) => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            Err(TxError::Exhausted)
        });

        result.map_err(|e| match e {
            TxError::Db(e) => backend(e),
            TxError::Encode(e) => backend(e),
            TxError::Exhausted => StoreError::Backend(format!(
                "No free title for {:?} after {} attempts",
                recipe.title, MAX_TITLE_ATTEMPTS
            )),
        })
    }

    fn list(&self, owner_id: &str) -> Result<Vec<Recipe>, StoreError> {
        let mut conn = self.conn()?;
        let rows: Vec<RecipeRow> = recipes::table
            .filter(recipes::user_id.eq(owner_id))
            .order(recipes::id.asc())
            .select(RecipeRow::as_select())
            .load(&mut conn)
            .map_err(backend)?;

        rows.into_iter()
            .map(|row| row.into_recipe().map_err(backend))
            .collect()
    }

    fn lookup_image(&self, owner_id: &str, title: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn()?;
        let found: Option<Option<String>> = recipes::table
            .filter(recipes::user_id.eq(owner_id))
            .filter(recipes::title.eq(title))
            .select(recipes::image_path)
            .first(&mut conn)
            .optional()
            .map_err(backend)?;
        Ok(found.flatten())
    }

    fn lookup_image_by_title(&self, title: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn()?;
        let found: Option<Option<String>> = recipes::table
            .filter(recipes::title.eq(title))
            .filter(recipes::image_path.is_not_null())
            .order(recipes::id.asc())
            .select(recipes::image_path)
            .first(&mut conn)
            .optional()
            .map_err(backend)?;
        Ok(found.flatten())
    }

    fn titles(&self) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn()?;
        recipes::table
            .order(recipes::id.asc())
            .select(recipes::title)
            .load(&mut conn)
            .map_err(backend)
    }

    fn create_user(&self) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut conn = self.conn()?;
        diesel::insert_into(users::table)
            .values(NewUser { id: &id })
            .execute(&mut conn)
            .map_err(backend)?;
        Ok(id)
    }

    fn ensure_user(&self, user_id: &str) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        diesel::insert_or_ignore_into(users::table)
            .values(NewUser { id: user_id })
            .execute(&mut conn)
            .map_err(backend)?;
        Ok(())
    }

    fn reset(&self) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        conn.revert_all_migrations(MIGRATIONS).map_err(backend)?;
        conn.run_pending_migrations(MIGRATIONS).map_err(backend)?;
        Ok(())
    }
}
