//! Renders one quotation through the Frappe server and writes the PDF next
//! to the binary. Server configured through FRAPPE_SERVER_URL /
//! FRAPPE_AUTH_TOKEN.

use frappe_push::{render_report, EnvConfig, ReportAction, UreqTransport};
use serde_json::json;

struct Order {
    name: &'static str,
    partner: &'static str,
    total: f64,
}

fn main() {
    env_logger::init();
    let report = ReportAction {
        report_name: "sale.report_frappe_quotation".to_string(),
        report_type: "frappe".to_string(),
        doctype: "Sales Order".to_string(),
        print_format: None,
        letterhead: None,
        delete_after_print: true,
    };
    let orders = [Order {
        name: "S00042",
        partner: "Azure Interior",
        total: 1173.5,
    }];
    let result = render_report(&EnvConfig, &UreqTransport::new(), &report, &orders, |o| {
        json!({
            "customer": o.partner,
            "title": o.name,
            "grand_total": o.total,
        })
    });
    match result {
        Ok((pdf, _)) => {
            std::fs::write("quotation.pdf", &pdf).expect("write quotation.pdf");
            println!("wrote quotation.pdf ({} bytes)", pdf.len());
        }
        Err(err) => eprintln!("render failed: {err}"),
    }
}
