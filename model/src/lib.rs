pub mod github;
pub mod quality;
