pub(crate) mod auth;
pub(crate) mod badges;
pub(crate) mod books;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod pagination;
pub(crate) mod progress;
pub(crate) mod quiz_attempts;
pub(crate) mod reading_sessions;
pub(crate) mod router;
pub(crate) mod users;
pub(crate) mod validation;
