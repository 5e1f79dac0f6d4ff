pub mod gravatar;
pub mod password;
pub mod policy;
pub mod token;
