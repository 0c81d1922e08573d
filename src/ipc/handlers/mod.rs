pub mod backup;
pub mod core;
pub mod lessons;
pub mod mistakes;
pub mod quran;
pub mod sessions;
pub mod setup;
pub mod stats;
pub mod student_portal;
pub mod students;
pub mod teacher;
pub mod users;
