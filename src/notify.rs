//! Slack notification sink
//!
//! Posts the markdown-rendered cost report to a Slack incoming webhook.
//! Delivery failure is the caller's problem to log; it never changes the
//! run's own exit code.

use crate::error::{Result, TerracostError};
use serde_json::json;
use tracing::info;

/// Send a cost report to a Slack webhook as a Block Kit message.
pub async fn send_slack_notification(webhook_url: &str, report: &str) -> Result<()> {
    let payload = json!({
        "text": "Terraform Cost Estimation Report",
        "blocks": [
            {
                "type": "header",
                "text": {
                    "type": "plain_text",
                    "text": "Terraform Cost Estimation Report"
                }
            },
            {
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": report
                }
            }
        ]
    });

    let response = reqwest::Client::new()
        .post(webhook_url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| TerracostError::Notification(e.to_string()))?;

    response
        .error_for_status()
        .map_err(|e| TerracostError::Notification(e.to_string()))?;

    info!("Cost report sent to Slack successfully");
    Ok(())
}
