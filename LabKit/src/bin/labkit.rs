fn main() -> anyhow::Result<()> {
    labkit::cli::run_cli()
}
