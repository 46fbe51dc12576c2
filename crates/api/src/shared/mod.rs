pub mod guard;
pub mod usecase;
