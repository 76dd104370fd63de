use rust_decimal::Decimal;
use sqlx::Postgres;

use super::model::User;

#[derive(Clone)]
pub struct UserRepo {
    pub pool: sqlx::Pool<Postgres>,
}

impl UserRepo {
    pub fn new(pool: sqlx::Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        username: &str,
        hash: &str,
        cash: Decimal,
    ) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            r#"
            INSERT INTO users (username, hash, cash)
            VALUES ($1, $2, $3)
            RETURNING id"#,
        )
        .bind(username)
        .bind(hash)
        .bind(cash)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, username, hash, cash FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_cash(&self, username: &str, cash: Decimal) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            r#"
            UPDATE users
            SET cash = $1
            WHERE username = $2
            RETURNING id"#,
        )
        .bind(cash)
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }
}
