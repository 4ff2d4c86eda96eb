fn main() -> anyhow::Result<()> {
    datepicker::Cli::run()
}
