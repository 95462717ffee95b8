use crate::domain::email_address::EmailAddress;
use crate::domain::person_name::PersonName;

/// A validated subscription request, before it reaches the store.
#[derive(Debug)]
pub struct NewSubscriber {
    pub email: EmailAddress,
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
}
