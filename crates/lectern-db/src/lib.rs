//! Lectern Database Library
//!
//! Document-store boundary for persisted study notes: the `VideoRepository` trait,
//! a Postgres implementation and an in-memory implementation for development and tests.

pub mod db;

pub use db::{
    connect_and_migrate, InMemoryVideoRepository, PgVideoRepository, VideoRepository,
};
