use crate::backend::SolrBrowseBackend;
use crate::prelude::{println, *};
use crate::service::BrowseService;
use alphabrowse_core::nearby::NearbyOutput;
use colored::Colorize;

#[derive(Debug, clap::Args, Clone)]
pub struct NearbyOptions {
    /// Call number (or other heading) to look around
    #[arg(value_name = "FROM")]
    pub from: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: NearbyOptions, global: crate::Global) -> Result<()> {
    let config = crate::settings::load(&global)?;
    let backend = SolrBrowseBackend::new(&config.backend)?;
    let service = BrowseService::new(config, backend);

    let output = service.nearby(&options.from).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", format_nearby_text(&output));
    }

    Ok(())
}

fn format_nearby_text(output: &NearbyOutput) -> String {
    let mut result = format!(
        "\n{}\n",
        format!("NEARBY ITEMS: {} ({})", output.from, output.source)
            .bright_cyan()
            .bold()
    );

    if output.items.is_empty() {
        result.push_str(&format!("\n{}\n", "Nothing shelved nearby.".yellow()));
    }

    for item in &output.items {
        result.push_str(&format!(
            "\n  {} {}\n",
            item.heading.bright_black(),
            item.title.white().bold()
        ));
        if let Some(id) = &item.id {
            result.push_str(&format!("    {}: {}\n", "ID".green(), id));
        }
    }

    result.push_str(&format!(
        "\n{}: {}\n",
        "Browse the full list".green(),
        output.browse_command.cyan()
    ));

    result
}
