use colored::Colorize;

use crate::error::Result;
use crate::insights::InsightsPayload;

pub fn run(file: &str) -> Result<()> {
    let content = std::fs::read_to_string(file)?;
    let response: serde_json::Value = serde_json::from_str(&content)?;

    match InsightsPayload::from_response(&response) {
        InsightsPayload::Text(text) => println!("{text}"),
        InsightsPayload::Sections(sections) => {
            for section in sections {
                println!("{}", section.title.cyan().bold());
                println!("{}\n", section.body);
            }
        }
        InsightsPayload::Unknown(value) => {
            println!("{}", "Unrecognized insights payload:".yellow());
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
