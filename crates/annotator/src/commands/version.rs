pub fn run() -> anyhow::Result<()> {
    println!("annotator {}", env!("CARGO_PKG_VERSION"));
    println!("Human-in-the-loop evaluation and annotation of model responses");
    Ok(())
}
