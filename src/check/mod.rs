pub mod dns;
pub mod tcp;
pub mod url;
