// Utility functions
pub mod error;
pub mod hashing;
pub mod jwt;
pub mod otp;
pub mod validation;
