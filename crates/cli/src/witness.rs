use colored::Colorize;
use dca_sdk::witness;

pub(crate) fn render() -> anyhow::Result<()> {
    let pair = witness::generate()?;
    println!("{:<10}{}", "Witness:", pair.witness);
    println!("{:<10}{}", "Secret:", pair.secret);
    eprintln!("{}", "Keep the secret private, anyone knowing it can execute the order.".yellow());
    Ok(())
}
