pub(crate) mod yuv422;
