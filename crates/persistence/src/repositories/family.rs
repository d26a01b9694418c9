//! Family repository for database operations.
//!
//! Every mutation that touches both the family record and a user row runs
//! in one transaction, so the registry and the member's own flags can never
//! disagree.

use chrono::Utc;
use domain::models::Family;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::FamilyEntity;

const SELECT_FAMILY: &str = r#"
    SELECT code, name, members, created_by, deputy_id, created_at
    FROM families
    WHERE code = $1
"#;

/// Maximum attempts at generating an unused join code.
const MAX_CODE_ATTEMPTS: usize = 16;

/// Repository for family database operations.
#[derive(Clone)]
pub struct FamilyRepository {
    pool: PgPool,
}

impl FamilyRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a family by its join code.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Family>, sqlx::Error> {
        let entity = sqlx::query_as::<_, FamilyEntity>(SELECT_FAMILY)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entity.map(Into::into))
    }

    /// Generate a join code that is not yet taken, retrying the generator
    /// until one is free.
    pub async fn generate_unique_code<F>(&self, generator: F) -> Result<String, sqlx::Error>
    where
        F: Fn() -> String,
    {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generator();
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM families WHERE code = $1)")
                    .bind(&code)
                    .fetch_one(&self.pool)
                    .await?;
            if !exists {
                return Ok(code);
            }
        }

        // The code space is ~10^9; exhausting the retry budget means
        // something is badly wrong with the generator.
        Err(sqlx::Error::Protocol(
            "Could not generate a unique family code".into(),
        ))
    }

    /// Create a family with the given code and creator, marking the creator
    /// a valid member of it. One transaction.
    pub async fn create(
        &self,
        code: &str,
        name: &str,
        creator: Uuid,
    ) -> Result<Family, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, FamilyEntity>(
            r#"
            INSERT INTO families (code, name, members, created_by)
            VALUES ($1, $2, ARRAY[$3]::uuid[], $3)
            RETURNING code, name, members, created_by, deputy_id, created_at
            "#,
        )
        .bind(code)
        .bind(name)
        .bind(creator)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE users SET family_code = $1, is_valid_member = TRUE, updated_at = $3 WHERE id = $2",
        )
        .bind(code)
        .bind(creator)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(entity.into())
    }

    /// Append a user to the member list and mark them valid. One
    /// transaction; appending is a no-op if they are already a member.
    pub async fn add_member(&self, code: &str, user_id: Uuid) -> Result<Family, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, FamilyEntity>(
            r#"
            UPDATE families
            SET members = CASE
                WHEN members @> ARRAY[$2]::uuid[] THEN members
                ELSE array_append(members, $2)
            END
            WHERE code = $1
            RETURNING code, name, members, created_by, deputy_id, created_at
            "#,
        )
        .bind(code)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE users SET family_code = $1, is_valid_member = TRUE, updated_at = $3 WHERE id = $2",
        )
        .bind(code)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(entity.into())
    }

    /// Remove a member: drop them from the member list (clearing the deputy
    /// slot if it was theirs) and clear their family affiliation. One
    /// transaction, so the removal is atomic from the member's perspective.
    pub async fn remove_member(&self, code: &str, target: Uuid) -> Result<Family, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, FamilyEntity>(
            r#"
            UPDATE families
            SET members = array_remove(members, $2),
                deputy_id = CASE WHEN deputy_id = $2 THEN NULL ELSE deputy_id END
            WHERE code = $1
            RETURNING code, name, members, created_by, deputy_id, created_at
            "#,
        )
        .bind(code)
        .bind(target)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE users SET family_code = NULL, is_valid_member = FALSE, updated_at = $2 WHERE id = $1",
        )
        .bind(target)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(entity.into())
    }

    /// Designate a member as deputy, displacing any previous deputy.
    pub async fn set_deputy(&self, code: &str, member_id: Uuid) -> Result<Family, sqlx::Error> {
        let entity = sqlx::query_as::<_, FamilyEntity>(
            r#"
            UPDATE families
            SET deputy_id = $2
            WHERE code = $1
            RETURNING code, name, members, created_by, deputy_id, created_at
            "#,
        )
        .bind(code)
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Apply a validated leave: optionally install a successor creator
    /// (clearing the deputy), then remove the caller and clear their
    /// affiliation. One transaction, so a failed step leaves the prior
    /// state untouched.
    pub async fn leave(
        &self,
        code: &str,
        caller: Uuid,
        new_creator: Option<Uuid>,
    ) -> Result<Family, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if let Some(successor) = new_creator {
            sqlx::query("UPDATE families SET created_by = $2, deputy_id = NULL WHERE code = $1")
                .bind(code)
                .bind(successor)
                .execute(&mut *tx)
                .await?;
        }

        let entity = sqlx::query_as::<_, FamilyEntity>(
            r#"
            UPDATE families
            SET members = array_remove(members, $2),
                deputy_id = CASE WHEN deputy_id = $2 THEN NULL ELSE deputy_id END
            WHERE code = $1
            RETURNING code, name, members, created_by, deputy_id, created_at
            "#,
        )
        .bind(code)
        .bind(caller)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE users SET family_code = NULL, is_valid_member = FALSE, updated_at = $2 WHERE id = $1",
        )
        .bind(caller)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(entity.into())
    }
}
