pub mod ip;
pub mod password;
pub mod url_validator;
