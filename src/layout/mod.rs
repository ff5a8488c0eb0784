pub(crate) mod engine;
pub(crate) mod fingerprint;
pub(crate) mod justify;
pub(crate) mod metrics;
pub(crate) mod paginate;
pub(crate) mod position;
pub(crate) mod token;
pub(crate) mod visibility;
