pub(crate) mod echo_session;
