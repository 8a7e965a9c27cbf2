//! `SQLite` schema definitions for medqr.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the profiles table.
pub const CREATE_PROFILES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    name TEXT NOT NULL,
    blood_group TEXT,
    template TEXT,
    phone TEXT,
    password TEXT,
    emergency_contact TEXT,
    medical_conditions TEXT,
    allergies TEXT,
    medications TEXT
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_PROFILES_TABLE, CREATE_METADATA_TABLE];
