//! Reminder dispatch: fetch the current customer roster, honor per-customer
//! opt-outs, and send through whatever [`Sender`] is wired in.
//!
//! A run is best effort. One customer failing never aborts the run; every
//! outcome lands in the [`DispatchReport`].

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::queries;
use crate::email::{Email, Sender};
use crate::error::{Error, Result};
use crate::models::Customer;
use crate::orderspace::{Client, CustomerListParams};

/// Only customers updated upstream within this window are contacted; dormant
/// accounts age out of the reminder list on their own.
const RECENT_CUSTOMER_DAYS: i64 = 42;

const PAGE_SIZE: u32 = 100;

/// Outcome of one dispatch run. The three counters always sum to the number
/// of customers considered.
#[derive(Debug, Default, Serialize)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
    pub details: Vec<String>,
}

/// Operator-authored broadcast content.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AdHocMessage {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub html_body: Option<String>,
    #[serde(default)]
    pub text_body: Option<String>,
}

impl AdHocMessage {
    fn validate(&self) -> Result<()> {
        if self.subject.trim().is_empty() {
            return Err(Error::Validation("subject is required".into()));
        }
        let has_body = self.html_body.as_deref().map_or(false, |b| !b.is_empty())
            || self.text_body.as_deref().map_or(false, |b| !b.is_empty());
        if !has_body {
            return Err(Error::Validation(
                "either html_body or text_body is required".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct ReminderService {
    pool: SqlitePool,
    client: Client,
    mailer: Arc<dyn Sender>,
    mail_from: String,
    preview_recipient: String,
}

impl ReminderService {
    pub fn new(
        pool: SqlitePool,
        client: Client,
        mailer: Arc<dyn Sender>,
        mail_from: impl Into<String>,
        preview_recipient: impl Into<String>,
    ) -> Self {
        ReminderService {
            pool,
            client,
            mailer,
            mail_from: mail_from.into(),
            preview_recipient: preview_recipient.into(),
        }
    }

    /// Send the canned weekly reminder to every eligible customer.
    pub async fn send_order_reminders(&self) -> Result<DispatchReport> {
        let customers = self.recent_customers().await?;
        tracing::info!(customers = customers.len(), "starting reminder run");
        let report = self.dispatch(&customers, reminder_email).await?;
        tracing::info!(
            sent = report.sent,
            failed = report.failed,
            skipped = report.skipped,
            "reminder run finished"
        );
        Ok(report)
    }

    /// Send operator-authored content to the same roster the weekly reminder
    /// uses. Content is validated before any upstream call is made.
    pub async fn send_ad_hoc(&self, message: &AdHocMessage) -> Result<DispatchReport> {
        message.validate()?;
        let customers = self.recent_customers().await?;
        self.dispatch(&customers, |_| Email {
            subject: Some(message.subject.clone()),
            html_body: message.html_body.clone(),
            text_body: message.text_body.clone(),
            ..Email::default()
        })
        .await
    }

    /// Send a single summary of who the next reminder run would reach,
    /// addressed to the configured preview recipient. A preference lookup
    /// failure here aborts the preview; a wrong preview is worse than none.
    pub async fn preview_order_reminders(&self) -> Result<()> {
        let customers = self.recent_customers().await?;

        let mut lines = Vec::new();
        for customer in &customers {
            if !queries::notify_days(&self.pool, &customer.id).await? {
                continue;
            }
            lines.push(format!(
                "{} ({})",
                customer.company_name, customer.email_addresses.orders
            ));
        }

        let text = format!(
            "The next reminder run will contact {} customer(s):\n\n{}\n",
            lines.len(),
            lines.join("\n")
        );
        let email = Email {
            from: Some(self.mail_from.clone()),
            to: Some(self.preview_recipient.clone()),
            subject: Some(format!("Reminder preview: {} recipient(s)", lines.len())),
            text_body: Some(text),
            html_body: None,
        };
        self.mailer.send_email(&email).await?;
        Ok(())
    }

    /// Customers with recent upstream activity, fully paginated. Recency is
    /// the only filter; the upstream system owns which accounts count.
    async fn recent_customers(&self) -> Result<Vec<Customer>> {
        let updated_since = Utc::now() - Duration::days(RECENT_CUSTOMER_DAYS);
        let mut customers = Vec::new();
        let mut starting_after = None;

        loop {
            let page = self
                .client
                .list_customers(&CustomerListParams {
                    starting_after,
                    limit: Some(PAGE_SIZE),
                    updated_since: Some(updated_since),
                    status: None,
                    created_since: None,
                })
                .await?;

            let last_id = page.customers.last().map(|c| c.id.clone());
            customers.extend(page.customers);
            if !page.has_more {
                break;
            }
            match last_id {
                Some(id) => starting_after = Some(id),
                None => break,
            }
        }
        Ok(customers)
    }

    /// The shared dispatch loop. `build` produces the message for one
    /// customer; every per-customer failure is recorded and the loop moves on.
    async fn dispatch<F>(&self, customers: &[Customer], build: F) -> Result<DispatchReport>
    where
        F: Fn(&Customer) -> Email,
    {
        let mut report = DispatchReport::default();

        for customer in customers {
            match queries::notify_days(&self.pool, &customer.id).await {
                Ok(true) => {}
                Ok(false) => {
                    report.skipped += 1;
                    report.details.push(format!(
                        "SKIPPED: {} (notifications disabled)",
                        customer.company_name
                    ));
                    continue;
                }
                Err(e) => {
                    tracing::warn!(customer_id = %customer.id, error = %e, "preference lookup failed");
                    report.failed += 1;
                    report.details.push(format!(
                        "ERROR: {} (failed to check preferences)",
                        customer.company_name
                    ));
                    continue;
                }
            }

            // Reminders go to the orders address only. A blank address fails
            // transport validation and lands in the report as Failed.
            let to = customer.email_addresses.orders.clone();
            let mut email = build(customer);
            email.from = Some(self.mail_from.clone());
            email.to = Some(to.clone());

            match self.mailer.send_email(&email).await {
                Ok(receipt) => {
                    tracing::debug!(
                        customer_id = %customer.id,
                        message_id = %receipt.message_id,
                        "reminder sent"
                    );
                    report.sent += 1;
                    report
                        .details
                        .push(format!("SUCCESS: {} ({to})", customer.company_name));
                }
                Err(e) => {
                    tracing::warn!(customer_id = %customer.id, error = %e, "send failed");
                    report.failed += 1;
                    report
                        .details
                        .push(format!("ERROR: {} ({})", customer.company_name, e));
                }
            }
        }

        Ok(report)
    }
}

/// The canned weekly reminder. Deterministic for a given customer.
fn reminder_email(customer: &Customer) -> Email {
    let name = &customer.company_name;
    Email {
        subject: Some("Order reminder: the weekly cutoff is coming up".to_string()),
        text_body: Some(format!(
            "Hi {name},\n\n\
             This is your weekly reminder that the order cutoff is approaching. \
             Place your order today to keep your usual delivery slot.\n\n\
             If you have already ordered this week, no action is needed.\n"
        )),
        html_body: Some(format!(
            "<p>Hi {name},</p>\
             <p>This is your weekly reminder that the order cutoff is approaching. \
             Place your order today to keep your usual delivery slot.</p>\
             <p>If you have already ordered this week, no action is needed.</p>"
        )),
        ..Email::default()
    }
}
