use env_logger::Env;

/// Log filter comes from `HANDCTL_LOG` (e.g. `HANDCTL_LOG=debug` to see every
/// history transition), defaulting to `info`.
pub fn init() {
    let env = Env::default().filter_or("HANDCTL_LOG", "info");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
