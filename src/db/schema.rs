//! Database schema and migrations for NewsPulse.
//!
//! Migrations are applied sequentially when the database is first opened
//! or upgraded; the schema_version table tracks which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Minimal profile table (preferences and push descriptor only)
    r#"
CREATE TABLE users (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    email               TEXT NOT NULL UNIQUE,
    preferences         TEXT NOT NULL DEFAULT '[]',  -- JSON array of categories
    push_subscription   TEXT,                        -- JSON descriptor, NULL when absent
    created_at          TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v2: Cached articles, unique by URL
    r#"
CREATE TABLE articles (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    url             TEXT NOT NULL UNIQUE,
    source_id       TEXT,
    source_name     TEXT,
    author          TEXT,
    title           TEXT,
    description     TEXT,
    url_to_image    TEXT,
    published_at    TEXT,                            -- RFC 3339, UTC
    content         TEXT,
    category        TEXT NOT NULL,
    fetched_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_articles_category ON articles(category);
CREATE INDEX idx_articles_published_at ON articles(published_at DESC);
CREATE INDEX idx_articles_category_published ON articles(category, published_at DESC);
"#,
    // v3: Full-text index over title/description/content
    r#"
CREATE VIRTUAL TABLE articles_fts USING fts5(
    title, description, content,
    content=articles, content_rowid=id
);

CREATE TRIGGER articles_fts_insert AFTER INSERT ON articles BEGIN
    INSERT INTO articles_fts(rowid, title, description, content)
    VALUES (new.id, new.title, new.description, new.content);
END;
"#,
];
