use anyhow::Result;
use std::path::Path;

use mediascrape_core::transcript;

pub async fn run(input: &Path, output: Option<&Path>) -> Result<()> {
    let conversion = transcript::convert_file(input, output).await?;

    println!(
        "Successfully converted '{}' to '{}'",
        input.display(),
        conversion.output.display()
    );
    println!("Extracted {} lines of text", conversion.lines);

    Ok(())
}
