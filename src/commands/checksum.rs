use anyhow::Result;
use reglint::address::{checksum, is_native_placeholder};

pub fn checksum_command(address: &str) -> Result<()> {
    let canonical = checksum(address)?;
    println!("{canonical}");

    if canonical.as_str() != address && !is_native_placeholder(address) {
        eprintln!("note: {address} is not in checksum form");
    }
    Ok(())
}
