//! Typed query capability set for the chat front end.
//!
//! The chat model can only ask the questions enumerated by
//! [`AssistantQuery`]. Each is answered from a read-only
//! [`StokvelDirectory`]; the withdrawal simulation goes through the same
//! engine as a real withdrawal but never commits.

pub mod answer;
pub mod directory;
pub mod query;
pub mod service;

#[cfg(test)]
mod tests;

pub use answer::AssistantAnswer;
pub use directory::{
    DirectoryError, MemberSummary, PaymentFilter, PaymentRecord, PaymentRow, SearchHit,
    StatisticsReport, StokvelDetail, StokvelDirectory, StokvelSummary, UserStokvel,
};
pub use query::{AssistantQuery, PAYMENT_HISTORY_LIMIT};
pub use service::AssistantService;
