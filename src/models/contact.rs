use serde::Deserialize;

use crate::utils::{
    error::AppError,
    validation::{require_non_empty, validate_email},
};

/// Website contact form. Delivered by email, never stored.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactFormInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl ContactFormInput {
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty("First name", &self.first_name)?;
        require_non_empty("Last name", &self.last_name)?;
        validate_email(&self.email)?;
        require_non_empty("Phone", &self.phone)?;
        require_non_empty("Subject", &self.subject)?;
        require_non_empty("Message", &self.message)
    }

    pub fn email_subject(&self) -> String {
        format!("New contact enquiry: {}", self.subject.trim())
    }

    pub fn email_body(&self) -> String {
        format!(
            "Name: {} {}\nEmail: {}\nPhone: {}\nSubject: {}\n\n{}\n",
            self.first_name.trim(),
            self.last_name.trim(),
            self.email.trim(),
            self.phone.trim(),
            self.subject.trim(),
            self.message.trim()
        )
    }
}

/// Partnership enquiry from institutions and agents.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerInquiryInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub organization: String,
    pub country: Option<String>,
    pub message: String,
}

impl PartnerInquiryInput {
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty("Name", &self.name)?;
        validate_email(&self.email)?;
        require_non_empty("Phone", &self.phone)?;
        require_non_empty("Organization", &self.organization)?;
        require_non_empty("Message", &self.message)
    }

    pub fn email_subject(&self) -> String {
        format!("New partnership enquiry from {}", self.organization.trim())
    }

    pub fn email_body(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\nPhone: {}\nOrganization: {}\nCountry: {}\n\n{}\n",
            self.name.trim(),
            self.email.trim(),
            self.phone.trim(),
            self.organization.trim(),
            self.country.as_deref().map(str::trim).unwrap_or("-"),
            self.message.trim()
        )
    }
}
