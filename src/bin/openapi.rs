use anyhow::Result;

// Dump the OpenAPI document, for CI artifacts and client generation
fn main() -> Result<()> {
    println!("{}", asisto::api::openapi().to_pretty_json()?);

    Ok(())
}
