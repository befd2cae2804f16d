//! Content loading commands.

use console::style;
use metrotube::models::{ContentRecord, Operation};
use metrotube::session::SessionState;
use metrotube_scrape::{ContentPage, ContentService, ExtractionStatus, FeedError};

use crate::cli::icons::{channel, dim_arrow, error, success, warn};

/// Load one operation and print the result.
pub async fn cmd_load(
    service: &ContentService,
    operation: &Operation,
    session: &SessionState,
    json: bool,
) -> anyhow::Result<()> {
    let page = match service.load(operation, session).await {
        Ok(page) => page,
        Err(FeedError::AuthenticationRequired { operation }) => {
            eprintln!(
                "{} {} requires a signed-in session. Pass --session or set METROTUBE_TOKEN.",
                error(),
                operation
            );
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&page_json(&page))?);
    } else {
        print_page(&page);
    }
    Ok(())
}

fn page_json(page: &ContentPage) -> serde_json::Value {
    serde_json::json!({
        "operation": page.operation.name(),
        "request": page.operation,
        "channel": page.channel,
        "status": page.status.label(),
        "fetchedAt": page.fetched_at,
        "records": page.records,
    })
}

fn print_page(page: &ContentPage) {
    let marker = match page.status {
        ExtractionStatus::Complete => success(),
        _ => warn(),
    };
    println!(
        "{} {} via {} channel: {} videos",
        marker,
        style(page.operation.name()).bold(),
        channel(page.channel),
        page.records.len()
    );
    if page.is_placeholder() {
        println!(
            "  {} Showing placeholder items ({})",
            dim_arrow(),
            page.status.label()
        );
    }

    for (index, record) in page.records.iter().enumerate() {
        print_record(index + 1, record);
    }
}

fn print_record(position: usize, record: &ContentRecord) {
    println!();
    println!("{:>3}. {}", position, style(&record.title).bold());

    let details: Vec<&str> = [
        Some(record.author_name.as_str()),
        record.duration_text.as_deref(),
        record.view_count_text.as_deref(),
        record.published_time_text.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    println!("     {}", style(details.join(" · ")).dim());
    println!("     {} {}", dim_arrow(), record.canonical_url);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrotube::session::Channel;

    #[test]
    fn test_page_json_shape() {
        let page = ContentPage {
            operation: Operation::search("lofi mix"),
            channel: Channel::Public,
            records: vec![ContentRecord::new("abcdefghijk")],
            status: ExtractionStatus::Complete,
            fetched_at: chrono::Utc::now(),
        };

        let value = page_json(&page);
        assert_eq!(value["operation"], "search");
        assert_eq!(value["request"]["query"], "lofi mix");
        assert_eq!(value["channel"], "public");
        assert_eq!(value["status"], "complete");
        assert_eq!(value["records"][0]["id"], "abcdefghijk");
        assert_eq!(
            value["records"][0]["canonicalUrl"],
            "https://www.youtube.com/watch?v=abcdefghijk"
        );
    }
}
