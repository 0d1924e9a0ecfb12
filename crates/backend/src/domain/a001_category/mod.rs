pub mod catalog;
pub mod repository;
pub mod service;
