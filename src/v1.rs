pub mod greeting;
pub mod version;
