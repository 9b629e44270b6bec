//! Registro - typed client for the school grading backend.
//!
//! Covers login (building an explicit [`Session`]) and the average-grade
//! aggregation endpoint used by reporting tools.

pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod types;

pub use client::RegistroClient;
pub use config::{Credentials, ReportAuth, Settings};
pub use error::{ApiError, ApiResult};
pub use session::{Session, SessionState};
pub use types::{FilterBy, GradeAggregate, GradeQuery, LoginResponse, PersonProfile};
