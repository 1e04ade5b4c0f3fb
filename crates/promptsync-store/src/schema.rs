//! Database schema SQL.

/// One table holds both storage areas; `(area, key)` is unique.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    area TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (area, key)
);

CREATE INDEX IF NOT EXISTS idx_kv_area_key ON kv(area, key);
"#;
