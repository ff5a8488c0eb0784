pub(crate) mod timecode;
