//! Database schema and migrations for the asset manager.
//!
//! Migrations are applied sequentially when the database is first opened
//! or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Folder hierarchy
    r#"
CREATE TABLE folders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT,
    parent_id   INTEGER REFERENCES folders(id) ON DELETE CASCADE,  -- NULL for root folders
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_folders_parent_id ON folders(parent_id);
-- Sibling names are unique, root level included
CREATE UNIQUE INDEX idx_folders_parent_name ON folders(IFNULL(parent_id, 0), name);
"#,
    // v2: Assets
    r#"
CREATE TABLE assets (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    parent_id       INTEGER NOT NULL REFERENCES folders(id) ON DELETE CASCADE,
    file            TEXT,                    -- stored file name, object key is media/<parent_id>/<file>
    file_size       INTEGER,
    filetype        TEXT,                    -- MIME type guessed from the file name
    link            TEXT,
    description     TEXT,
    duration        INTEGER,                 -- seconds
    creation_date   TEXT,                    -- YYYY-MM-DD
    copyright_info  TEXT,
    enabled         INTEGER NOT NULL DEFAULT 1,
    status          TEXT NOT NULL DEFAULT 'draft',
    type_field      TEXT,
    uploaded_at     TEXT NOT NULL DEFAULT (datetime('now')),
    last_edit_at    TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(parent_id, name)
);

CREATE INDEX idx_assets_parent_id ON assets(parent_id);
CREATE UNIQUE INDEX idx_assets_parent_file ON assets(parent_id, file) WHERE file IS NOT NULL;
"#,
    // v3: Taxonomy
    r#"
CREATE TABLE tag_groups (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL UNIQUE
);

CREATE TABLE tags (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    group_id    INTEGER REFERENCES tag_groups(id) ON DELETE SET NULL,
    deprecated  INTEGER NOT NULL DEFAULT 0
);

CREATE UNIQUE INDEX idx_tags_group_name ON tags(IFNULL(group_id, 0), name);

CREATE TABLE collections (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL UNIQUE
);

CREATE TABLE contributors (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL UNIQUE
);

CREATE TABLE country_tags (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL UNIQUE,
    display_name    TEXT NOT NULL,
    code            TEXT NOT NULL UNIQUE
);
"#,
    // v4: Asset relations
    r#"
CREATE TABLE asset_tags (
    asset_id    INTEGER NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
    tag_id      INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (asset_id, tag_id)
);

CREATE TABLE asset_locations (
    asset_id        INTEGER NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
    country_tag_id  INTEGER NOT NULL REFERENCES country_tags(id) ON DELETE CASCADE,
    PRIMARY KEY (asset_id, country_tag_id)
);

CREATE TABLE asset_contributors (
    asset_id        INTEGER NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
    contributor_id  INTEGER NOT NULL REFERENCES contributors(id) ON DELETE CASCADE,
    PRIMARY KEY (asset_id, contributor_id)
);

CREATE TABLE asset_collections (
    asset_id        INTEGER NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
    collection_id   INTEGER NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
    PRIMARY KEY (asset_id, collection_id)
);

CREATE INDEX idx_asset_tags_tag_id ON asset_tags(tag_id);
CREATE INDEX idx_asset_collections_collection_id ON asset_collections(collection_id);
CREATE INDEX idx_asset_contributors_contributor_id ON asset_contributors(contributor_id);
"#,
    // v5: Chapters and learner journeys
    r#"
CREATE TABLE chapters (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    asset_id    INTEGER NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    start_time  INTEGER NOT NULL DEFAULT 0,  -- seconds from the start of the asset
    end_time    INTEGER,
    description TEXT,
    UNIQUE(asset_id, name)
);

CREATE INDEX idx_chapters_asset_id ON chapters(asset_id);

CREATE TABLE learner_journeys (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    description TEXT
);

CREATE TABLE learner_journey_assets (
    journey_id  INTEGER NOT NULL REFERENCES learner_journeys(id) ON DELETE CASCADE,
    asset_id    INTEGER NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
    position    INTEGER NOT NULL,
    PRIMARY KEY (journey_id, asset_id)
);
"#,
];
