//! Canonical SQLite schema for the quire store.
//!
//! Only the columns the ordering core and its access checks read are modelled:
//! - `boards` (continuities) own `posts` and `board_sections` (subcontinuities)
//! - `characters` own `characters_galleries` links to `galleries`
//! - every ordered table carries a nullable `section_order` rank
//! - `store_meta` tracks the schema version alongside `PRAGMA user_version`

/// Migration v1: forum tables needed by ordering and authorization.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE CHECK (length(trim(username)) > 0),
    role TEXT NOT NULL DEFAULT 'regular' CHECK (role IN ('reader', 'regular', 'mod', 'admin')),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS boards (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    creator_id INTEGER NOT NULL REFERENCES users(id),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS board_authors (
    board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    cameo INTEGER NOT NULL DEFAULT 0 CHECK (cameo IN (0, 1)),
    PRIMARY KEY (board_id, user_id)
);

CREATE TABLE IF NOT EXISTS board_sections (
    id INTEGER PRIMARY KEY,
    board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    section_order INTEGER CHECK (section_order IS NULL OR section_order >= 0),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY,
    board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
    section_id INTEGER REFERENCES board_sections(id) ON DELETE SET NULL,
    user_id INTEGER NOT NULL REFERENCES users(id),
    subject TEXT NOT NULL,
    section_order INTEGER CHECK (section_order IS NULL OR section_order >= 0),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS characters (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id),
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS galleries (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id),
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS characters_galleries (
    id INTEGER PRIMARY KEY,
    character_id INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
    gallery_id INTEGER NOT NULL REFERENCES galleries(id) ON DELETE CASCADE,
    section_order INTEGER CHECK (section_order IS NULL OR section_order >= 0),
    UNIQUE (character_id, gallery_id)
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL,
    created_at_us INTEGER NOT NULL DEFAULT 0
);

INSERT OR IGNORE INTO store_meta (id, schema_version, created_at_us) VALUES (1, 1, 0);
";

/// Migration v2: indexes for group scans in position order and access checks.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_posts_group_order
    ON posts(board_id, section_id, section_order, id);

CREATE INDEX IF NOT EXISTS idx_board_sections_board_order
    ON board_sections(board_id, section_order, id);

CREATE INDEX IF NOT EXISTS idx_characters_galleries_character_order
    ON characters_galleries(character_id, section_order, id);

CREATE INDEX IF NOT EXISTS idx_board_authors_user
    ON board_authors(user_id, board_id);
";

/// Indexes the current schema must contain.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_posts_group_order",
    "idx_board_sections_board_order",
    "idx_characters_galleries_character_order",
    "idx_board_authors_user",
];
