fn main() -> Result<(), ::eyre::Report> {
    let args = beautify::cli::init()?;
    beautify::cli::main(args)
}
