pub mod admin_service;
pub mod auth_service;
pub mod contact_service;
pub mod dashboard_service;
pub mod job_service;
pub mod mail_service;
pub mod university_service;
pub mod user_service;

pub use mail_service::Mailer;
