use crate::diff::ResolvedVulnerabilities;
use anyhow::Result;

pub fn print_diff_json(result: &ResolvedVulnerabilities) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{}", json);
    Ok(())
}
