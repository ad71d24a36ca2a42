//! PostgreSQL Repository Implementations

use sqlx::PgPool;

use crate::domain::repository::TransactionRepository;
use crate::domain::transaction::TransactionRecord;
use crate::error::PaymentResult;

/// PostgreSQL-backed transaction repository
#[derive(Clone)]
pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TransactionRepository for PgTransactionRepository {
    async fn insert(&self, record: &TransactionRecord) -> PaymentResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_transactions (
                id,
                transaction_id,
                order_id,
                payment_method,
                amount,
                status,
                provider_response,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7::jsonb, $8)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.transaction_id)
        .bind(&record.order_id)
        .bind(record.payment_method.code())
        .bind(record.amount)
        .bind(&record.status)
        .bind(&record.provider_response)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
