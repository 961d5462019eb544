//! # Record Service Module
//!
//! Stateless request handling between the HTTP surface and the storage
//! engine: input validation, pagination math, and error mapping.

pub mod errors;
pub mod handler;
pub mod pagination;
pub mod response;

pub use errors::{ErrorResponse, ServiceError, ServiceResult};
pub use handler::{RecordService, DEFAULT_STORAGE_TIMEOUT};
pub use pagination::{total_pages, PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use response::{DeleteConfirmation, RecordInput, RecordList};
