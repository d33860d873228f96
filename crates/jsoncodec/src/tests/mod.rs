mod property_validity;
mod property_whitespace;
pub(crate) mod utils;
