//! End-of-run report rendering, localized per configured language.

use crate::config::Locale;
use crate::models::{ReconciliationRow, UpdateReport};

/// Render the synchronization report body for the operator mail.
pub fn render(report: &UpdateReport, content_lang: &str) -> String {
    let locale = Locale::from_config(content_lang);
    let not_updated_lines = report
        .not_updated
        .iter()
        .filter_map(ReconciliationRow::summary_line)
        .collect::<Vec<_>>()
        .join("\n");

    match locale {
        Locale::Pl => {
            log::debug!("Using pl mail template");
            format!(
                "Zaktualizowane produkty: {}\n\nPominięte produkty: \n{}\n\n\
                 Niezaktualizowane produkty:\n{}\nRazem: {}",
                report.updated_ids.len(),
                report.skipped,
                not_updated_lines,
                report.not_updated.len()
            )
        }
        Locale::En => {
            log::debug!("Using en mail template");
            format!(
                "Updated products: {}\n\nSkipped products: \n{}\n\n\
                 Not updated products:\n{}\nTotal: {}",
                report.updated_ids.len(),
                report.skipped,
                not_updated_lines,
                report.not_updated.len()
            )
        }
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
