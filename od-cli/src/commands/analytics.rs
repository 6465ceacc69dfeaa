//! Analytics overview command.
//!
//! The dashboard's analytics page rendered a fixed sample dataset rather
//! than live metrics; the same dataset is reproduced here.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;

use od_core::error::OdResult;
use crate::OutputFormat;

struct Overview {
    total_visitors: u64,
    page_views: u64,
    bounce_rate: f64,
    avg_session_duration: &'static str,
}

const OVERVIEW: Overview = Overview {
    total_visitors: 12_345,
    page_views: 45_678,
    bounce_rate: 32.5,
    avg_session_duration: "3m 45s",
};

const TRAFFIC_SOURCES: &[(&str, u64, f64)] = &[
    ("Direct", 4500, 36.5),
    ("Organic Search", 3200, 25.9),
    ("Social Media", 2100, 17.0),
    ("Referral", 1800, 14.6),
    ("Email", 745, 6.0),
];

const TOP_PAGES: &[(&str, u64, f64)] = &[
    ("/dashboard", 8500, 18.6),
    ("/", 6200, 13.6),
    ("/dashboard/teams", 4800, 10.5),
    ("/dashboard/analytics", 3900, 8.5),
    ("/dashboard/settings", 2100, 4.6),
];

const DEVICE_TYPES: &[(&str, u64, f64)] = &[
    ("Desktop", 7200, 58.3),
    ("Mobile", 4100, 33.2),
    ("Tablet", 1045, 8.5),
];

const RECENT_ACTIVITY: &[(&str, &str, &str)] = &[
    ("New user registration", "john.doe@example.com", "2 minutes ago"),
    ("Page view", "jane.smith@example.com", "5 minutes ago"),
    ("Form submission", "mike.johnson@example.com", "8 minutes ago"),
    ("User login", "sarah.wilson@example.com", "12 minutes ago"),
    ("File download", "david.brown@example.com", "15 minutes ago"),
];

/// Run the analytics command.
pub async fn run(format: OutputFormat) -> OdResult<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "overview": {
                    "totalVisitors": OVERVIEW.total_visitors,
                    "pageViews": OVERVIEW.page_views,
                    "bounceRate": OVERVIEW.bounce_rate,
                    "avgSessionDuration": OVERVIEW.avg_session_duration,
                },
                "trafficSources": TRAFFIC_SOURCES.iter().map(|(source, visitors, pct)| {
                    serde_json::json!({"source": source, "visitors": visitors, "percentage": pct})
                }).collect::<Vec<_>>(),
                "topPages": TOP_PAGES.iter().map(|(page, views, pct)| {
                    serde_json::json!({"page": page, "views": views, "percentage": pct})
                }).collect::<Vec<_>>(),
                "deviceTypes": DEVICE_TYPES.iter().map(|(device, teams, pct)| {
                    serde_json::json!({"device": device, "teams": teams, "percentage": pct})
                }).collect::<Vec<_>>(),
                "recentActivity": RECENT_ACTIVITY.iter().map(|(action, user, time)| {
                    serde_json::json!({"action": action, "user": user, "time": time})
                }).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputFormat::Text => {
            println!("{}", style("Overview").bold().underlined());
            println!("  Visitors:       {}", OVERVIEW.total_visitors);
            println!("  Page views:     {}", OVERVIEW.page_views);
            println!("  Bounce rate:    {}%", OVERVIEW.bounce_rate);
            println!("  Avg session:    {}", OVERVIEW.avg_session_duration);

            println!();
            println!("{}", style("Traffic Sources").bold().underlined());
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Source", "Visitors", "%"]);
            for (source, visitors, pct) in TRAFFIC_SOURCES {
                table.add_row(vec![source.to_string(), visitors.to_string(), format!("{pct}")]);
            }
            println!("{table}");

            println!();
            println!("{}", style("Top Pages").bold().underlined());
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Page", "Views", "%"]);
            for (page, views, pct) in TOP_PAGES {
                table.add_row(vec![page.to_string(), views.to_string(), format!("{pct}")]);
            }
            println!("{table}");

            println!();
            println!("{}", style("Devices").bold().underlined());
            for (device, teams, pct) in DEVICE_TYPES {
                println!("  {device:<10} {teams:>6} ({pct}%)");
            }

            println!();
            println!("{}", style("Recent Activity").bold().underlined());
            for (action, user, time) in RECENT_ACTIVITY {
                println!("  {action} - {user} ({})", style(time).dim());
            }
        }
    }

    Ok(())
}
