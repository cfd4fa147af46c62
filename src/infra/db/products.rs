use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::store::{
    PageRequest, ProductFilter, ProductPage, ProductStore, StoreError,
};
use crate::domain::price::Price;
use crate::domain::product::Product;

use super::{RetryPolicy, map_sqlx_error, with_retry};

const PRODUCT_COLUMNS: &str =
    "id, sku, name, description, price_minor, currency, is_active, created_at, updated_at";

// The active flag never rides along with the editable columns; a full-row
// UPDATE racing a deactivation would write stale `is_active` back.
const UPDATE_PRODUCT_SQL: &str = "UPDATE products SET \
         name = $2, description = $3, price_minor = $4, \
         currency = $5, updated_at = $6 \
     WHERE id = $1";

const DEACTIVATE_PRODUCT_SQL: &str =
    "UPDATE products SET is_active = $2, updated_at = $3 WHERE id = $1";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    sku: String,
    name: String,
    description: Option<String>,
    price_minor: i64,
    currency: String,
    is_active: bool,
    created_at: OffsetDateTime,
    updated_at: Option<OffsetDateTime>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            sku: row.sku,
            name: row.name,
            description: row.description,
            price: Price::from_minor_units(row.price_minor),
            currency: row.currency,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Product store on Postgres. Every operation runs under the store's
/// [`RetryPolicy`], so callers only see failures that survived retrying.
#[derive(Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    fn push_filters<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q ProductFilter) {
        if let Some(is_active) = filter.is_active {
            qb.push(" AND is_active = ");
            qb.push_bind(is_active);
        }
        if let Some(min) = filter.min_price {
            qb.push(" AND price_minor >= ");
            qb.push_bind(min.minor_units());
        }
        if let Some(max) = filter.max_price {
            qb.push(" AND price_minor <= ");
            qb.push_bind(max.minor_units());
        }
        if let Some(query) = filter.normalized_query() {
            let pattern = format!("%{query}%");
            qb.push(" AND (");
            qb.push("name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR COALESCE(description, '') ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR sku ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let pool = self.pool.clone();
        let row = with_retry(self.retry, || {
            let pool = pool.clone();
            async move {
                sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
                ))
                .bind(id)
                .fetch_optional(&pool)
                .await
            }
        })
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Product::from))
    }

    async fn sku_exists(&self, sku: &str) -> Result<bool, StoreError> {
        let pool = self.pool.clone();
        with_retry(self.retry, || {
            let pool = pool.clone();
            async move {
                sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)",
                )
                .bind(sku)
                .fetch_one(&pool)
                .await
            }
        })
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        let pool = self.pool.clone();
        with_retry(self.retry, || {
            let pool = pool.clone();
            async move {
                sqlx::query(
                    "INSERT INTO products (\
                         id, sku, name, description, price_minor, currency, \
                         is_active, created_at, updated_at\
                     ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                )
                .bind(product.id)
                .bind(&product.sku)
                .bind(&product.name)
                .bind(product.description.as_deref())
                .bind(product.price.minor_units())
                .bind(&product.currency)
                .bind(product.is_active)
                .bind(product.created_at)
                .bind(product.updated_at)
                .execute(&pool)
                .await
            }
        })
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), StoreError> {
        let pool = self.pool.clone();
        let result = with_retry(self.retry, || {
            let pool = pool.clone();
            async move {
                sqlx::query(UPDATE_PRODUCT_SQL)
                    .bind(product.id)
                    .bind(&product.name)
                    .bind(product.description.as_deref())
                    .bind(product.price.minor_units())
                    .bind(&product.currency)
                    .bind(product.updated_at)
                    .execute(&pool)
                    .await
            }
        })
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::from_persistence("update affected no rows"));
        }
        Ok(())
    }

    async fn deactivate(&self, product: &Product) -> Result<(), StoreError> {
        let pool = self.pool.clone();
        let result = with_retry(self.retry, || {
            let pool = pool.clone();
            async move {
                sqlx::query(DEACTIVATE_PRODUCT_SQL)
                    .bind(product.id)
                    .bind(product.is_active)
                    .bind(product.updated_at)
                    .execute(&pool)
                    .await
            }
        })
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::from_persistence("deactivate affected no rows"));
        }
        Ok(())
    }

    async fn search(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<ProductPage, StoreError> {
        let pool = self.pool.clone();
        let (rows, total) = with_retry(self.retry, || {
            let pool = pool.clone();
            async move {
                let mut items_qb = QueryBuilder::new(format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products WHERE 1=1"
                ));
                Self::push_filters(&mut items_qb, filter);
                items_qb.push(" ORDER BY name ASC, id ASC LIMIT ");
                items_qb.push_bind(i64::from(page.limit()));
                items_qb.push(" OFFSET ");
                items_qb.push_bind(page.offset() as i64);
                let rows = items_qb
                    .build_query_as::<ProductRow>()
                    .fetch_all(&pool)
                    .await?;

                let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM products WHERE 1=1");
                Self::push_filters(&mut count_qb, filter);
                let total: i64 = count_qb.build_query_scalar().fetch_one(&pool).await?;

                Ok((rows, total))
            }
        })
        .await
        .map_err(map_sqlx_error)?;

        let total_count = u64::try_from(total)
            .map_err(|_| StoreError::from_persistence("count exceeds supported range"))?;

        Ok(ProductPage {
            items: rows.into_iter().map(Product::from).collect(),
            total_count,
        })
    }
}
