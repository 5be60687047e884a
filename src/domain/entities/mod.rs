/// Settings, validated configuration and commit identity
pub mod publish_config;
