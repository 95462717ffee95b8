use crate::domain::email_address::EmailAddress;
use crate::domain::person_name::PersonName;

/// A validated contact-form submission, before it reaches the store.
#[derive(Debug)]
pub struct NewContact {
    pub name: PersonName,
    pub email: EmailAddress,
    pub message: String,
}
