pub mod admins;
pub mod auth;
pub mod contact;
pub mod dashboard;
pub mod graphql;
pub mod health;
pub mod jobs;
pub mod swagger;
pub mod universities;
pub mod users;
