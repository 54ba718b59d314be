mod extract;

pub mod form;
pub mod oauth;
pub mod status;
