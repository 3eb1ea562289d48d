pub mod connection;
pub mod job_repository;
pub mod memory;
pub mod models;
pub mod mongo;
