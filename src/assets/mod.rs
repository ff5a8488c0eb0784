pub(crate) mod decode;
pub(crate) mod font;
pub(crate) mod pictogram;
pub(crate) mod store;
