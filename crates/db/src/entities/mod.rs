//! `SeaORM` entity definitions.

pub mod payments;
pub mod stokvel_enrollments;
pub mod stokvels;
pub mod users;
