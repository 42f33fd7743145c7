use rusqlite::Connection;

/// Schema for the local backend. Mirrors the managed service's tables and
/// uniqueness rules so conflict and quota behavior match in tests.
pub fn run(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS rooms (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            is_public INTEGER NOT NULL DEFAULT 1,
            status TEXT NOT NULL DEFAULT 'pending',
            created_by TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS threads (
            id TEXT PRIMARY KEY,
            room_id TEXT NOT NULL REFERENCES rooms(id),
            created_by TEXT NOT NULL,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_threads_room_recency
            ON threads(room_id, created_at DESC, id DESC);

        CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            thread_id TEXT NOT NULL REFERENCES threads(id),
            created_by TEXT NOT NULL,
            body TEXT NOT NULL,
            parent_comment_id TEXT REFERENCES comments(id),
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_comments_thread_recency
            ON comments(thread_id, created_at DESC, id DESC);

        CREATE TABLE IF NOT EXISTS attachments (
            id TEXT PRIMARY KEY,
            comment_id TEXT NOT NULL REFERENCES comments(id),
            user_id TEXT NOT NULL,
            bucket_id TEXT NOT NULL,
            object_path TEXT NOT NULL,
            mime_type TEXT NOT NULL,
            byte_size INTEGER NOT NULL,
            width INTEGER,
            height INTEGER,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS wave_reactions (
            id TEXT PRIMARY KEY,
            comment_id TEXT NOT NULL REFERENCES comments(id),
            user_id TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('support', 'insight', 'question')),
            created_at TEXT NOT NULL,
            UNIQUE (comment_id, user_id, kind)
        );

        CREATE TABLE IF NOT EXISTS reflections (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            for_date TEXT NOT NULL,
            body TEXT NOT NULL,
            is_public INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, for_date)
        );

        CREATE TABLE IF NOT EXISTS achievements (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            key TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (user_id, key)
        );

        CREATE TABLE IF NOT EXISTS objects (
            bucket TEXT NOT NULL,
            path TEXT NOT NULL,
            mime_type TEXT NOT NULL,
            bytes BLOB NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (bucket, path)
        );

        -- Room proposal policy, matching the managed backend's trigger: at
        -- most 3 proposals per user, at most one per 24 hours. The message
        -- tag is what the client classifies on.
        CREATE TRIGGER IF NOT EXISTS rooms_proposal_quota
        BEFORE INSERT ON rooms
        WHEN (SELECT COUNT(*) FROM rooms WHERE created_by = NEW.created_by) >= 3
          OR EXISTS (
                SELECT 1 FROM rooms
                WHERE created_by = NEW.created_by
                  AND datetime(created_at) > datetime('now', '-1 day')
             )
        BEGIN
            SELECT RAISE(ABORT, 'room_proposal_quota: room proposal limit reached');
        END;
        ",
    )
}
