pub mod list;
pub mod rotate;
pub mod version;
