fn main() {
    #[cfg(feature = "cli")]
    ictl::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("ictl: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
