pub(crate) mod chroma;
pub(crate) mod probe;
pub(crate) mod trim;
