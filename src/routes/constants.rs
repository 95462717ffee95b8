//! Common constants used across route handlers

/// Success message after a contact form submission
pub const MSG_CONTACT_SUCCESS: &str =
    "Your message has been sent successfully! We will get back to you soon.";

/// Fallback error message when a contact submission fails internally
pub const MSG_CONTACT_FAILURE: &str = "Failed to submit your message. Please try again later.";

/// Validation message when a contact field is missing or empty
pub const MSG_CONTACT_FIELDS_REQUIRED: &str = "Please provide name, email, and message";

/// Success message for a brand-new subscription
pub const MSG_SUBSCRIBED: &str = "Successfully subscribed! Check your email for our AI tricks PDF.";

/// Returned when the email already belongs to an active subscriber
pub const MSG_ALREADY_SUBSCRIBED: &str = "You are already subscribed to our newsletter!";

/// Returned when a previously unsubscribed email is reactivated
pub const MSG_RESUBSCRIBED: &str =
    "You have been resubscribed to our newsletter. Check your email for the AI tricks PDF!";

/// Fallback error message when a subscription fails internally
pub const MSG_SUBSCRIBE_FAILURE: &str = "Failed to subscribe. Please try again later.";

/// Validation message when the subscribe email is missing
pub const MSG_EMAIL_REQUIRED: &str = "Please provide an email address";

/// Success message after an unsubscribe
pub const MSG_UNSUBSCRIBED: &str =
    "You have been successfully unsubscribed from our newsletter.";

/// Validation message when unsubscribe parameters are missing
pub const MSG_INVALID_UNSUBSCRIBE_REQUEST: &str = "Invalid unsubscribe request";

/// Returned when no subscriber matches the email/token pair
pub const MSG_INVALID_UNSUBSCRIBE_LINK: &str = "Invalid unsubscribe link";

/// Fallback error message when an unsubscribe fails internally
pub const MSG_UNSUBSCRIBE_FAILURE: &str =
    "Failed to process unsubscribe request. Please try again later.";

/// Validation message when the chat message is missing
pub const MSG_CHAT_MESSAGE_REQUIRED: &str = "Message is required";

/// Returned for any route that does not exist
pub const MSG_RESOURCE_NOT_FOUND: &str = "Resource not found";

/// Returned when the per-client rate limit is exceeded
pub const MSG_RATE_LIMITED: &str = "Too many requests, please try again later.";

/// Builds the unsubscribe URL embedded in welcome email footers
pub fn unsubscribe_url(frontend_base_url: &str, token: &str, email: &str) -> String {
    format!(
        "{}/unsubscribe?token={}&email={}",
        frontend_base_url, token, email
    )
}
