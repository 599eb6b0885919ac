pub(crate) mod badges;
pub(crate) mod book_badges;
pub(crate) mod books;
pub(crate) mod earned_badges;
pub(crate) mod pages;
pub(crate) mod progress;
pub(crate) mod quiz_attempts;
pub(crate) mod reading_sessions;
pub(crate) mod users;
