//! Message templates for the notifications queued by lifecycle jobs.

use chrono::NaiveDate;

use tally_domain::{Bill, Book, Document, Followup, Notification, NotificationKind};

pub(super) fn overdue_notice(
    book: &Book,
    doc: &Document,
    kind: NotificationKind,
    days_overdue: i64,
) -> Notification {
    let tenant = &book.tenant;
    let number = doc.label();
    let (recipient, client_name) = book
        .client(doc.client_id)
        .map(|c| (c.email.clone(), c.name.clone()))
        .unwrap_or_else(|| (tenant.contact_email.clone(), "customer".into()));
    let balance = format!("{:.2} {}", doc.balance(), doc.currency);
    let (subject, body) = match kind {
        NotificationKind::LateFeeApplied => (
            format!("Invoice {number} is overdue"),
            format!(
                "Dear {client_name}, invoice {number} is {days_overdue} day(s) past due. \
                 A late fee of {:.2} {} has been applied. Outstanding balance: {balance}.",
                doc.late_fee, doc.currency
            ),
        ),
        NotificationKind::PaymentReminder => (
            format!("Reminder: invoice {number} remains unpaid"),
            format!(
                "Dear {client_name}, invoice {number} is now {days_overdue} days past due. \
                 Please settle the outstanding balance of {balance}."
            ),
        ),
        _ => (
            format!("Final notice: invoice {number}"),
            format!(
                "Dear {client_name}, invoice {number} is {days_overdue} days past due. \
                 Unless {balance} is received, {} will suspend services.",
                tenant.name
            ),
        ),
    };
    Notification::new(tenant.slug.clone(), kind, recipient, subject, body).about(doc.id)
}

pub(super) fn bill_notice(
    book: &Book,
    bill: &Bill,
    kind: NotificationKind,
    today: NaiveDate,
) -> Notification {
    let tenant = &book.tenant;
    let amount = format!("{:.2} {}", bill.balance(), tenant.currency);
    let due = bill.due_date.format("%Y-%m-%d");
    let (subject, body) = match kind {
        NotificationKind::BillGenerated => (
            format!("New bill: {}", bill.name),
            format!("A bill of {amount} to {} is due on {due}.", bill.payee),
        ),
        NotificationKind::BillReminder => {
            let days_left = (bill.due_date - today).num_days();
            (
                format!("Bill due in {days_left} day(s): {}", bill.name),
                format!("{amount} to {} is due on {due}.", bill.payee),
            )
        }
        _ => (
            format!("Bill overdue: {}", bill.name),
            format!("{amount} to {} was due on {due} and is unpaid.", bill.payee),
        ),
    };
    Notification::new(
        tenant.slug.clone(),
        kind,
        tenant.contact_email.clone(),
        subject,
        body,
    )
    .about(bill.id)
}

pub(super) fn broken_promise_notice(book: &Book, followup: &Followup) -> Notification {
    let tenant = &book.tenant;
    let number = book
        .document(followup.document_id)
        .map(|d| d.label())
        .unwrap_or_else(|| followup.document_id.to_string());
    let promised = followup
        .promise_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    Notification::new(
        tenant.slug.clone(),
        NotificationKind::PromiseBroken,
        tenant.contact_email.clone(),
        format!("Payment promise broken: {number}"),
        format!("The customer promised to pay {number} by {promised}; no full payment arrived."),
    )
    .about(followup.id)
}

pub(super) fn subscription_notice(book: &Book, kind: NotificationKind) -> Notification {
    let tenant = &book.tenant;
    let (subject, body) = match kind {
        NotificationKind::SubscriptionSuspended => (
            "Your account has been suspended".to_string(),
            format!(
                "The {} subscription for {} is suspended. Renew it to resume billing automation.",
                tenant.subscription.plan, tenant.name
            ),
        ),
        _ => (
            "Your subscription payment is due".to_string(),
            format!(
                "The {} subscription for {} is past due. Renew within the grace period to avoid suspension.",
                tenant.subscription.plan, tenant.name
            ),
        ),
    };
    Notification::new(
        tenant.slug.clone(),
        kind,
        tenant.contact_email.clone(),
        subject,
        body,
    )
    .about(tenant.id)
}
