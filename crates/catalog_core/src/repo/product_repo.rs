//! Product repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and filter APIs over canonical `products` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Product::validate()` before SQL mutations.
//! - `create` only accepts unpersisted records; `update`/`delete` only
//!   accept persisted ones.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::product::{
    normalize_price, Category, Product, ProductId, ProductValidationError,
};
use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const PRODUCT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    price,
    available,
    category
FROM products";

const PRODUCTS_TABLE: &str = "products";
const REQUIRED_PRODUCT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "description",
    "price",
    "available",
    "category",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for product persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ProductValidationError),
    Db(DbError),
    NotFound(ProductId),
    /// `update`/`delete` called on a record the store never assigned an id.
    MissingId,
    /// `create` called on a record that already has an id.
    AlreadyPersisted(ProductId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "product not found: {id}"),
            Self::MissingId => write!(f, "product has no id; create it before updating or deleting"),
            Self::AlreadyPersisted(id) => write!(f, "product already persisted with id {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted product data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProductValidationError> for RepoError {
    fn from(value: ProductValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter and pagination options for listing products.
///
/// All set filters must match (logical AND). `price` matches after rounding
/// to the persisted scale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductListQuery {
    pub name: Option<String>,
    pub available: Option<bool>,
    pub category: Option<Category>,
    pub price: Option<Decimal>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl ProductListQuery {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn by_availability(available: bool) -> Self {
        Self {
            available: Some(available),
            ..Self::default()
        }
    }

    pub fn by_category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn by_price(price: Decimal) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }
}

/// Repository interface for product CRUD and filter operations.
pub trait ProductRepository {
    /// Inserts an unpersisted product and writes the assigned id back into it.
    fn create_product(&self, product: &mut Product) -> RepoResult<ProductId>;
    /// Overwrites the row for a persisted product and writes the stored
    /// (rounded) price back into it.
    fn update_product(&self, product: &mut Product) -> RepoResult<()>;
    fn delete_product(&self, product: &Product) -> RepoResult<()>;
    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>>;
    fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>>;
    fn count_products(&self, query: &ProductListQuery) -> RepoResult<u64>;
    /// Removes every row; returns the number removed.
    fn delete_all_products(&self) -> RepoResult<usize>;
}

/// Deferred product query.
///
/// Holds a filter only; the store is not touched until `count`, `fetch`,
/// `iter` or `first` runs, and each call re-executes against current rows.
pub struct ProductQuery<'r, R: ProductRepository + ?Sized> {
    repo: &'r R,
    filter: ProductListQuery,
}

impl<'r, R: ProductRepository + ?Sized> ProductQuery<'r, R> {
    pub fn new(repo: &'r R, filter: ProductListQuery) -> Self {
        Self { repo, filter }
    }

    /// Restricts the number of rows returned by `fetch`.
    pub fn limit(mut self, limit: u32) -> Self {
        self.filter.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.filter.offset = offset;
        self
    }

    /// Counts matching rows, ignoring `limit`/`offset`.
    pub fn count(&self) -> RepoResult<u64> {
        self.repo.count_products(&self.filter)
    }

    pub fn fetch(&self) -> RepoResult<Vec<Product>> {
        self.repo.list_products(&self.filter)
    }

    /// Runs the query and iterates over the matching rows.
    pub fn iter(&self) -> RepoResult<std::vec::IntoIter<Product>> {
        Ok(self.fetch()?.into_iter())
    }

    pub fn first(&self) -> RepoResult<Option<Product>> {
        let filter = ProductListQuery {
            limit: Some(1),
            ..self.filter.clone()
        };
        Ok(self.repo.list_products(&filter)?.into_iter().next())
    }
}

/// SQLite-backed product repository.
pub struct SqliteProductRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProductRepository<'conn> {
    /// Wraps a connection after checking that migrations have been applied.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not current.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema was
    ///   created by something other than the embedded migrations.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let columns = table_columns(conn, PRODUCTS_TABLE)?;
        if columns.is_empty() {
            return Err(RepoError::MissingRequiredTable(PRODUCTS_TABLE));
        }
        if let Some(column) = REQUIRED_PRODUCT_COLUMNS
            .iter()
            .copied()
            .find(|required| !columns.iter().any(|name| name == required))
        {
            return Err(RepoError::MissingRequiredColumn {
                table: PRODUCTS_TABLE,
                column,
            });
        }

        Ok(Self { conn })
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn create_product(&self, product: &mut Product) -> RepoResult<ProductId> {
        if let Some(id) = product.id {
            return Err(RepoError::AlreadyPersisted(id));
        }
        product.validate()?;

        let price = normalize_price(product.price);
        self.conn.execute(
            "INSERT INTO products (
                name,
                description,
                price,
                available,
                category
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                product.name.as_str(),
                product.description.as_deref(),
                price.to_string(),
                bool_to_int(product.available),
                product.category.as_str(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        product.id = Some(id);
        product.price = price;
        info!("event=product_create module=repo status=ok id={id}");
        Ok(id)
    }

    fn update_product(&self, product: &mut Product) -> RepoResult<()> {
        let id = product.id.ok_or(RepoError::MissingId)?;
        product.validate()?;

        let price = normalize_price(product.price);

        let changed = self.conn.execute(
            "UPDATE products
             SET
                name = ?1,
                description = ?2,
                price = ?3,
                available = ?4,
                category = ?5
             WHERE id = ?6;",
            params![
                product.name.as_str(),
                product.description.as_deref(),
                price.to_string(),
                bool_to_int(product.available),
                product.category.as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        product.price = price;
        info!("event=product_update module=repo status=ok id={id}");
        Ok(())
    }

    fn delete_product(&self, product: &Product) -> RepoResult<()> {
        let id = product.id.ok_or(RepoError::MissingId)?;
        let changed = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=product_delete module=repo status=ok id={id}");
        Ok(())
    }

    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRODUCT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_product_row(row)?));
        }

        Ok(None)
    }

    fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>> {
        let mut sql = format!("{PRODUCT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values = push_filters(query, &mut sql);

        sql.push_str(" ORDER BY id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut products = Vec::new();

        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }

        debug!(
            "event=product_list module=repo status=ok rows={}",
            products.len()
        );
        Ok(products)
    }

    fn count_products(&self, query: &ProductListQuery) -> RepoResult<u64> {
        let mut sql = "SELECT COUNT(*) FROM products WHERE 1 = 1".to_string();
        let bind_values = push_filters(query, &mut sql);

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }

    fn delete_all_products(&self) -> RepoResult<usize> {
        let removed = self.conn.execute("DELETE FROM products;", [])?;
        info!("event=product_delete_all module=repo status=ok rows={removed}");
        Ok(removed)
    }
}

fn push_filters(query: &ProductListQuery, sql: &mut String) -> Vec<Value> {
    let mut bind_values = Vec::new();

    if let Some(name) = &query.name {
        sql.push_str(" AND name = ?");
        bind_values.push(Value::Text(name.clone()));
    }
    if let Some(available) = query.available {
        sql.push_str(" AND available = ?");
        bind_values.push(Value::Integer(bool_to_int(available)));
    }
    if let Some(category) = query.category {
        sql.push_str(" AND category = ?");
        bind_values.push(Value::Text(category.as_str().to_string()));
    }
    if let Some(price) = query.price {
        sql.push_str(" AND price = ?");
        bind_values.push(Value::Text(normalize_price(price).to_string()));
    }

    bind_values
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let id: ProductId = row.get("id")?;

    let price_text: String = row.get("price")?;
    let price = Decimal::from_str(&price_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid price `{price_text}` in products.price for id {id}"
        ))
    })?;

    let available = match row.get::<_, i64>("available")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid available value `{other}` in products.available for id {id}"
            )));
        }
    };

    let category_text: String = row.get("category")?;
    let category = Category::from_str(&category_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in products.category for id {id}"
        ))
    })?;

    let product = Product {
        id: Some(id),
        name: row.get("name")?,
        description: row.get("description")?,
        price,
        available,
        category,
    };
    product.validate()?;
    Ok(product)
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
