mod contact;
mod email_address;
mod new_contact;
mod new_subscriber;
mod person_name;
mod subscriber;

pub use contact::Contact;
pub use email_address::EmailAddress;
pub use new_contact::NewContact;
pub use new_subscriber::NewSubscriber;
pub use person_name::PersonName;
pub use subscriber::Subscriber;
