fn main() -> anyhow::Result<()> {
    permit_client::cli::main()
}
