use anyhow::Result;
use sqlx::SqlitePool;

pub mod queries;

/// Schema statements, applied in order on startup. All are idempotent so a
/// restart against an existing database is a no-op.
const MIGRATIONS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS tokens (
        id INTEGER PRIMARY KEY,
        access_token TEXT NOT NULL,
        created_at DATETIME NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS customers (
        id TEXT PRIMARY KEY,
        company_name TEXT NOT NULL,
        created_at DATETIME NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('new', 'active', 'closed')),
        reference TEXT,
        internal_note TEXT,
        phone TEXT,
        tax_number TEXT,
        tax_rate_id TEXT,
        minimum_spend REAL,
        payment_terms_id TEXT,
        customer_group_id TEXT,
        price_list_id TEXT,
        order_interval INTEGER CHECK (order_interval IN (1,2,3,4)),
        email_addresses TEXT NOT NULL, -- JSON object
        buyers TEXT NOT NULL -- JSON array
    )"#,
    r#"CREATE TABLE IF NOT EXISTS addresses (
        id TEXT PRIMARY KEY,
        customer_id TEXT NOT NULL,
        type TEXT NOT NULL CHECK (type IN ('shipping', 'billing')),
        company_name TEXT,
        contact_name TEXT,
        line1 TEXT NOT NULL,
        line2 TEXT,
        city TEXT NOT NULL,
        state TEXT,
        postal_code TEXT NOT NULL,
        country TEXT NOT NULL,
        FOREIGN KEY (customer_id) REFERENCES customers(id) ON DELETE CASCADE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS orders (
        id TEXT PRIMARY KEY,
        number INTEGER NOT NULL UNIQUE,
        created DATETIME NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('new', 'invoiced', 'released', 'part_fulfilled', 'preorder', 'fulfilled', 'standing_order', 'cancelled')),
        customer_id TEXT NOT NULL,
        company_name TEXT NOT NULL,
        phone TEXT,
        email_addresses TEXT NOT NULL, -- JSON object
        created_by TEXT NOT NULL,
        delivery_date DATETIME NOT NULL,
        reference TEXT,
        internal_note TEXT,
        customer_po_number TEXT,
        customer_note TEXT,
        standing_order_id TEXT,
        shipping_type TEXT,
        shipping_address_id TEXT,
        billing_address_id TEXT,
        currency TEXT NOT NULL,
        net_total REAL NOT NULL,
        gross_total REAL NOT NULL,
        FOREIGN KEY (customer_id) REFERENCES customers(id),
        FOREIGN KEY (shipping_address_id) REFERENCES addresses(id),
        FOREIGN KEY (billing_address_id) REFERENCES addresses(id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS order_lines (
        id TEXT PRIMARY KEY,
        order_id TEXT NOT NULL,
        sku TEXT NOT NULL,
        name TEXT NOT NULL,
        options TEXT,
        grouping_category_id TEXT,
        grouping_category_name TEXT,
        shipping BOOLEAN NOT NULL DEFAULT 0,
        quantity INTEGER NOT NULL,
        unit_price REAL NOT NULL,
        sub_total REAL NOT NULL,
        tax_rate_id TEXT NOT NULL,
        tax_name TEXT NOT NULL,
        tax_rate REAL NOT NULL,
        tax_amount REAL NOT NULL,
        preorder_window_id TEXT,
        on_hold BOOLEAN NOT NULL DEFAULT 0,
        invoiced INTEGER NOT NULL DEFAULT 0,
        paid INTEGER NOT NULL DEFAULT 0,
        dispatched INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (order_id) REFERENCES orders(id) ON DELETE CASCADE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS customer_notifications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id TEXT NOT NULL UNIQUE,
        email_notify_days BOOLEAN NOT NULL DEFAULT 1,
        created_at DATETIME NOT NULL,
        updated_at DATETIME NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_customers_status ON customers(status)",
    "CREATE INDEX IF NOT EXISTS idx_orders_customer_id ON orders(customer_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status)",
    "CREATE INDEX IF NOT EXISTS idx_orders_delivery_date ON orders(delivery_date)",
    "CREATE INDEX IF NOT EXISTS idx_order_lines_order_id ON order_lines(order_id)",
    "CREATE INDEX IF NOT EXISTS idx_tokens_created_at ON tokens(created_at)",
];

/// Open the sqlite pool, creating the database file if needed, and bring the
/// schema up to date.
pub async fn connect(database_url: Option<&str>) -> Result<SqlitePool> {
    let raw = database_url.unwrap_or("sqlite://reminders.db");
    let url = normalize_sqlite_url(raw);

    // Ensure the file exists for file-based sqlite (avoids open errors on
    // some setups).
    if let Some(path) = db_file_path(&url) {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }
        if !path.exists() {
            std::fs::File::create(&path).ok();
        }
    }

    let pool = SqlitePool::connect(&url).await?;
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    for sql in MIGRATIONS {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}

/// Accepts `sqlite://path`, `sqlite:path`, `file:path`, or a bare path and
/// returns the canonical `sqlite://` form sqlx expects.
fn normalize_sqlite_url(input: &str) -> String {
    if input.starts_with("sqlite://") || input.starts_with("sqlite::memory:") {
        return input.to_string();
    }
    if let Some(rest) = input.strip_prefix("sqlite:") {
        return format!("sqlite://{}", rest.trim_start_matches('/'));
    }
    if let Some(rest) = input.strip_prefix("file:") {
        return format!("sqlite://{rest}");
    }
    format!("sqlite://{input}")
}

fn db_file_path(url: &str) -> Option<std::path::PathBuf> {
    let rest = url.strip_prefix("sqlite://")?;
    if rest == ":memory:" {
        return None;
    }
    Some(std::path::PathBuf::from(rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_sqlite_url_forms() {
        assert_eq!(normalize_sqlite_url("sqlite://a.db"), "sqlite://a.db");
        assert_eq!(normalize_sqlite_url("sqlite:a.db"), "sqlite://a.db");
        assert_eq!(normalize_sqlite_url("file:a.db"), "sqlite://a.db");
        assert_eq!(normalize_sqlite_url("a.db"), "sqlite://a.db");
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:"),
            "sqlite::memory:"
        );
    }

    #[test]
    fn memory_url_has_no_file_path() {
        assert!(db_file_path("sqlite://:memory:").is_none());
        assert_eq!(
            db_file_path("sqlite://data/reminders.db"),
            Some(std::path::PathBuf::from("data/reminders.db"))
        );
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();
    }
}
