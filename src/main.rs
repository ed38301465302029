fn main() {
    #[cfg(feature = "cli")]
    runpack::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("runpack: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
