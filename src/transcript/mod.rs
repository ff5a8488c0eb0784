pub(crate) mod lrc;
