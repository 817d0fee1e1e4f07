//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod directory;
pub mod enrollment;
pub mod payment;
pub mod stokvel;
pub mod user;
pub mod withdrawal;

pub use directory::DirectoryRepository;
pub use enrollment::{EnrollmentError, EnrollmentRepository};
pub use payment::{PaymentError, PaymentRepository};
pub use stokvel::{StokvelRepoError, StokvelRepository};
pub use user::{CreateUserInput, UserError, UserRepository};
pub use withdrawal::PgWithdrawalStore;
