//! Storage module for ad images
//!
//! Provides a MinIO/S3-compatible client for uploading and removing
//! publicly readable objects.

mod minio_client;

pub use minio_client::MinIOClient;
