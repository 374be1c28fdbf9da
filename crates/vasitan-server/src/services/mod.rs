pub mod categories;
pub mod codes;
pub mod images;
pub mod listings;
pub mod users;
