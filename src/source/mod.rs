pub(crate) mod ffmpeg;
pub(crate) mod state;
pub(crate) mod test_pattern;
