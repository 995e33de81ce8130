//! Pushes a couple of partners to the Frappe server configured through
//! FRAPPE_SERVER_URL / FRAPPE_AUTH_TOKEN.

use frappe_push::{push, EnvConfig, UreqTransport};
use serde_json::json;

fn main() {
    env_logger::init();
    let payloads = [
        json!({
            "customer_name": "Azure Interior",
            "customer_type": "Company",
            "custom_odoo_ref": "res.partner,14",
        }),
        json!({
            "customer_name": "Deco Addict",
            "customer_type": "Company",
            "custom_odoo_ref": "res.partner,10",
        }),
    ];
    match push(&EnvConfig, &UreqTransport::new(), "Customer", &payloads) {
        Ok(note) => println!("{}", serde_json::to_string_pretty(&note).unwrap()),
        Err(err) => eprintln!("push failed: {err}"),
    }
}
