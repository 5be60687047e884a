/// Git branch names
pub mod branch_name;
/// `owner/name` repository identifiers
pub mod repository_slug;
