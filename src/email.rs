/**
 * Outbound Email
 * Best-effort contact notification over an HTTP email-delivery API
 */
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::db::models::Contact;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Delivery settings read per send so operators can rotate keys without a
/// restart. Without CONTACT_NOTIFY_URL the notification is skipped entirely.
struct NotifyConfig {
    url: String,
    api_key: String,
    to: String,
    from: String,
}

fn notify_config() -> Option<NotifyConfig> {
    let url = std::env::var("CONTACT_NOTIFY_URL").ok()?;
    Some(NotifyConfig {
        url,
        api_key: std::env::var("CONTACT_NOTIFY_API_KEY").unwrap_or_default(),
        to: std::env::var("CONTACT_NOTIFY_TO").unwrap_or_else(|_| "hello@ledgerpen.com".to_string()),
        from: std::env::var("CONTACT_NOTIFY_FROM")
            .unwrap_or_else(|_| "no-reply@ledgerpen.com".to_string()),
    })
}

/// JSON message shape the delivery API expects.
#[derive(Debug, Serialize)]
struct NotifyMessage {
    from: String,
    to: String,
    subject: String,
    text: String,
}

fn build_message(contact: &Contact, from: String, to: String) -> NotifyMessage {
    NotifyMessage {
        from,
        to,
        subject: format!(
            "New contact from {} ({})",
            contact.name, contact.service_of_interest
        ),
        text: format!(
            "Name: {}\nEmail: {}\nCompany: {}\nService: {}\n\n{}",
            contact.name,
            contact.email,
            contact.company_name.as_deref().unwrap_or("-"),
            contact.service_of_interest,
            contact.message
        ),
    }
}

/// Send the "new contact submission" email. The contact route spawns this on
/// a detached task; failures are logged and never reach the client, and
/// there is no retry.
pub async fn notify_contact(contact: Contact) {
    let Some(config) = notify_config() else {
        tracing::debug!("CONTACT_NOTIFY_URL not set, skipping contact notification");
        return;
    };

    let message = build_message(&contact, config.from, config.to);

    let result = HTTP_CLIENT
        .post(&config.url)
        .bearer_auth(&config.api_key)
        .json(&message)
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            tracing::info!(contact_id = %contact.id, "contact notification sent");
        }
        Ok(response) => {
            tracing::error!(
                contact_id = %contact.id,
                status = %response.status(),
                "contact notification rejected by delivery API"
            );
        }
        Err(e) => {
            tracing::error!(
                contact_id = %contact.id,
                error = %e,
                "contact notification failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_contact() -> Contact {
        Contact {
            id: Uuid::new_v4(),
            name: "Dana Reyes".to_string(),
            email: "dana@example.com".to_string(),
            company_name: None,
            service_of_interest: "Content Strategy".to_string(),
            message: "We need help with our quarterly reports.".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_message_subject_names_sender_and_service() {
        let message = build_message(
            &sample_contact(),
            "no-reply@ledgerpen.com".to_string(),
            "hello@ledgerpen.com".to_string(),
        );
        assert_eq!(
            message.subject,
            "New contact from Dana Reyes (Content Strategy)"
        );
    }

    #[test]
    fn test_message_body_includes_submission_and_placeholder_company() {
        let message = build_message(
            &sample_contact(),
            "no-reply@ledgerpen.com".to_string(),
            "hello@ledgerpen.com".to_string(),
        );
        assert!(message.text.contains("dana@example.com"));
        assert!(message.text.contains("Company: -"));
        assert!(message.text.contains("quarterly reports"));
    }

    #[test]
    fn test_message_serializes_to_flat_json() {
        let message = build_message(
            &sample_contact(),
            "no-reply@ledgerpen.com".to_string(),
            "hello@ledgerpen.com".to_string(),
        );
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["from"], "no-reply@ledgerpen.com");
        assert_eq!(json["to"], "hello@ledgerpen.com");
        assert!(json["subject"].is_string());
        assert!(json["text"].is_string());
    }
}
