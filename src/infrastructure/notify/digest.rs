//! Deal digest rendering

use chrono::{DateTime, Local};

use crate::shared::types::DealResult;
use crate::shared::utils::format_price;

pub fn digest_subject(deals: &[DealResult]) -> String {
    format!("Price Watcher — {} deal(s) found!", deals.len())
}

/// HTML body listing every deal with its alerts and a link to the product
pub fn digest_body(deals: &[DealResult], checked_at: DateTime<Local>) -> String {
    let mut rows = String::new();
    for deal in deals {
        rows.push_str(&format!("<h2>{}</h2>", escape_html(&deal.name)));
        rows.push_str(&format!(
            "<p><strong>Current price:</strong> ${}</p>",
            format_price(deal.current_price)
        ));
        for alert in &deal.alerts {
            rows.push_str(&format!("<p>{}</p>", escape_html(alert)));
        }
        rows.push_str(&format!("<p><a href=\"{}\">View product</a></p>", escape_html(&deal.url)));
        rows.push_str("<hr>");
    }

    format!(
        "<html><body>\n\
         <h1>Price Watcher — Deal Alert!</h1>\n\
         {}\n\
         <p style=\"color:gray;font-size:12px\">Checked on {}</p>\n\
         </body></html>\n",
        rows,
        checked_at.format("%Y-%m-%d at %H:%M")
    )
}

/// Plain text variant, used by the log notifier
pub fn digest_text(deals: &[DealResult]) -> String {
    let mut out = String::new();
    for deal in deals {
        out.push_str(&format!("{} — ${}\n", deal.name, format_price(deal.current_price)));
        for alert in &deal.alerts {
            out.push_str(&format!("  * {}\n", alert));
        }
        out.push_str(&format!("  {}\n", deal.url));
    }
    out
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
