// Workflow forwarding: relays screened candidates to the external
// recruitment automation (n8n) webhook.

pub mod forwarder;
pub mod handlers;
