pub(crate) mod cpu;
pub(crate) mod presenter;
pub(crate) mod texture;
