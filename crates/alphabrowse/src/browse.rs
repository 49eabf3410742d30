use crate::backend::SolrBrowseBackend;
use crate::prelude::{println, *};
use crate::service::{BrowseOutput, BrowseService};
use alphabrowse_core::browse::{BrowseItem, FailureKind};
use colored::Colorize;

#[derive(Debug, clap::Args, Clone)]
pub struct BrowseOptions {
    /// Browse index (e.g. topic, author, title, lcc)
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Heading to start browsing from
    #[arg(value_name = "FROM")]
    pub from: Option<String>,

    /// Page relative to the starting heading (negative pages go backwards)
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    pub page: i64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: BrowseOptions, global: crate::Global) -> Result<()> {
    let config = crate::settings::load(&global)?;
    let backend = SolrBrowseBackend::new(&config.backend)?;
    let service = BrowseService::new(config, backend);

    log::info!(
        "Browsing {} from {:?} (page {})",
        options.source,
        options.from,
        options.page
    );

    let output = service
        .browse(&options.source, options.from.clone(), options.page)
        .await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", format_browse_text(&output));
    }

    Ok(())
}

pub async fn run_types(global: crate::Global) -> Result<()> {
    let config = crate::settings::load(&global)?;

    let mut table = new_table();
    table.add_row(prettytable::row!["Source", "Label", "Extras"]);
    for browse_type in &config.alphabrowse.types {
        let extras = config
            .alphabrowse
            .extras
            .get(&browse_type.source)
            .cloned()
            .unwrap_or_default();
        table.add_row(prettytable::row![
            &browse_type.source,
            &browse_type.label,
            extras
        ]);
    }
    table.printstd();

    Ok(())
}

fn format_heading(item: &BrowseItem) -> String {
    let mut heading = item.heading.clone();
    for reference in &item.use_instead {
        heading.push_str(&format!("\n  use instead: {}", reference.heading));
    }
    for reference in &item.see_also {
        heading.push_str(&format!("\n  see also: {}", reference.heading));
    }
    if let Some(note) = &item.note {
        heading.push_str(&format!("\n  note: {note}"));
    }
    heading
}

/// Render a browse output as a table with navigation hints
fn format_browse_text(output: &BrowseOutput) -> String {
    let mut result = String::new();
    let from = output.from.as_deref().unwrap_or_default();

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{}\n",
        format!("BROWSE {} FROM \"{}\"", output.source.to_uppercase(), from)
            .bright_cyan()
            .bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    let view = &output.result;

    if let Some(error) = &view.error {
        let hint = match error.kind {
            FailureKind::IndexMissing => "The browse index has not been built yet.",
            FailureKind::Timeout => "The browse index did not answer in time.",
            FailureKind::Unavailable => "The browse index could not be reached.",
        };
        result.push_str(&format!("\n{}\n{}\n", hint.yellow(), error.message.bright_black()));
        return result;
    }

    let Some(page) = &view.page else {
        result.push_str(&format!(
            "\n{}\n",
            "Give a heading to start browsing from.".yellow()
        ));
        return result;
    };

    if view.is_no_results() || page.rows.is_empty() {
        result.push_str(&format!("\n{}\n", "No headings found.".yellow()));
        return result;
    }

    let mut table = new_table();
    let mut header = vec![prettytable::Cell::new(""), prettytable::Cell::new("Heading")];
    header.extend(output.extras.iter().map(|e| prettytable::Cell::new(e)));
    header.push(prettytable::Cell::new("Results"));
    table.add_row(prettytable::Row::new(header));

    for (idx, item) in page.rows.iter().enumerate() {
        let marker = if view.highlight_row_index == Some(idx) {
            "→"
        } else {
            ""
        };

        let mut cells = vec![
            prettytable::Cell::new(marker),
            prettytable::Cell::new(&format_heading(item)),
        ];
        cells.extend(output.extras.iter().map(|field| {
            let values = item.extras.get(field).cloned().unwrap_or_default();
            prettytable::Cell::new(&values.join("; "))
        }));
        cells.push(prettytable::Cell::new(&item.count.to_string()));
        table.add_row(prettytable::Row::new(cells));
    }

    result.push('\n');
    result.push_str(&table.to_string());

    if view.highlight_at_end {
        result.push_str(&format!(
            "{}\n",
            format!("→ \"{from}\" sorts after the last heading").bright_yellow()
        ));
    }

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_yellow()));
    result.push_str(&format!("{}\n", "NAVIGATION".bright_yellow().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_yellow()));

    result.push_str(&format!(
        "\n{} {} {}\n",
        "Headings in index:".bright_white(),
        page.total_count.to_string().bright_cyan().bold(),
        format!("(match: {})", page.match_type).bright_black()
    ));

    if let Some(prev) = &output.navigation.prev_page_command {
        result.push_str(&format!("  {}: {}\n", "Previous page".green(), prev.cyan()));
    }
    if let Some(next) = &output.navigation.next_page_command {
        result.push_str(&format!("  {}: {}\n", "Next page".green(), next.cyan()));
    }

    result
}
