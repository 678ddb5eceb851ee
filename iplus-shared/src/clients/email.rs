use reqwest::Client;
use serde::Serialize;

#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    api_key: String,
    from_email: String,
    from_name: String,
}

#[derive(Debug, Serialize)]
struct ResendRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

impl EmailClient {
    pub fn new(api_key: &str, from_email: &str, from_name: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            from_email: from_email.to_string(),
            from_name: from_name.to_string(),
        }
    }

    pub async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<(), String> {
        let request = ResendRequest {
            from: format!("{} <{}>", self.from_name, self.from_email),
            to: vec![to.to_string()],
            subject: subject.to_string(),
            html: html.to_string(),
        };

        let response = self.client
            .post("https://api.resend.com/emails")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("email send failed: {e}"))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("email API error: {body}"));
        }

        tracing::debug!(to = %to, subject = %subject, "email sent");
        Ok(())
    }

    /// Password-reset OTP mail. The code is valid for 15 minutes.
    pub async fn send_password_reset_otp(&self, to: &str, otp: &str) -> Result<(), String> {
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <h2 style="color: #0ea5e9;">I-Plus - Password Reset</h2>
            <p>Your password reset code is:</p>
            <div style="background: #0f172a; color: #0ea5e9; font-size: 32px; font-weight: bold; text-align: center; padding: 20px; border-radius: 8px; letter-spacing: 8px;">{otp}</div>
            <p style="color: #666; margin-top: 20px;">This code expires in 15 minutes. If you did not request this, please ignore this email.</p>
            </div>"#
        );

        self.send_email(to, "I-Plus - Your password reset code", &html).await
    }

    /// Forward a contact-form submission to the support inbox.
    pub async fn forward_contact_message(
        &self,
        support_inbox: &str,
        name: &str,
        sender_email: &str,
        message: &str,
    ) -> Result<(), String> {
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <h2>Contact form submission</h2>
            <p><b>From:</b> {name} &lt;{sender_email}&gt;</p>
            <p style="white-space: pre-wrap;">{message}</p>
            </div>"#
        );

        self.send_email(support_inbox, &format!("Contact form: {name}"), &html).await
    }
}
