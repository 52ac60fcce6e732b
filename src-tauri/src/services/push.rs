use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;

use crate::config::settings::get_settings;
use crate::services::get_http_client;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicKeyResponse {
    public_key: String,
}

/// Generate the anonymous user id persisted in the state blob and
/// reused across all push-service calls
pub fn generate_user_id() -> String {
    let mut rng = rand::thread_rng();
    (0..16)
        .map(|_| {
            let idx = rng.gen_range(0..36);
            std::char::from_digit(idx, 36).unwrap_or('0')
        })
        .collect()
}

/// Capability test: push delivery is available only if the backend
/// hands out its VAPID public key
pub async fn get_public_key() -> Result<String> {
    let url = format!("{}/api/push/public-key", get_settings().push_base_url);
    let response = get_http_client()
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Failed to reach push backend at {}", url))?;
    if !response.status().is_success() {
        anyhow::bail!("Push backend refused public key request: {}", response.status());
    }
    let body: PublicKeyResponse = response
        .json()
        .await
        .context("Unexpected public key response")?;
    Ok(body.public_key)
}

/// Register a push subscription together with the reminder time
pub async fn subscribe(
    subscription: &serde_json::Value,
    reminder_time: &str,
    user_id: &str,
) -> Result<()> {
    let url = format!("{}/api/push/subscribe", get_settings().push_base_url);
    let response = get_http_client()
        .post(&url)
        .json(&json!({
            "subscription": subscription,
            "reminderTime": reminder_time,
            "userId": user_id,
        }))
        .send()
        .await
        .with_context(|| format!("Failed to reach push backend at {}", url))?;
    if !response.status().is_success() {
        anyhow::bail!("Push subscription rejected: {}", response.status());
    }
    Ok(())
}

/// Update the reminder time for an existing subscription
pub async fn update_reminder_time(user_id: &str, reminder_time: &str) -> Result<()> {
    let url = format!("{}/api/push/reminder-time", get_settings().push_base_url);
    let response = get_http_client()
        .post(&url)
        .json(&json!({
            "userId": user_id,
            "reminderTime": reminder_time,
        }))
        .send()
        .await
        .with_context(|| format!("Failed to reach push backend at {}", url))?;
    if !response.status().is_success() {
        anyhow::bail!("Reminder time update rejected: {}", response.status());
    }
    Ok(())
}

/// Ask the backend to deliver a test notification
pub async fn send_test(user_id: &str) -> Result<()> {
    let url = format!("{}/api/push/test", get_settings().push_base_url);
    let response = get_http_client()
        .post(&url)
        .json(&json!({ "userId": user_id }))
        .send()
        .await
        .with_context(|| format!("Failed to reach push backend at {}", url))?;
    if !response.status().is_success() {
        anyhow::bail!("Test notification rejected: {}", response.status());
    }
    Ok(())
}
