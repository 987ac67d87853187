//! Subject, plain text and HTML for every message the service sends.

use chrono::NaiveDate;

use crate::contract::model::{
    GuestInvitation, OtpPurpose, PaymentReceived, RsvpReminder, VendorPaymentRecorded,
};
use crate::domain::ports::OutgoingEmail;

const BRAND: &str = "EventHub";

/// Minimal HTML escaping for values that come from users.
fn esc(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn long_date(d: NaiveDate) -> String {
    d.format("%A, %-d %B %Y").to_string()
}

fn money(currency: &str, amount: f64) -> String {
    format!("{currency} {amount:.2}")
}

fn wrap(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><body style=\"font-family: Arial, sans-serif; color: #333;\">\
         <div style=\"max-width: 600px; margin: 0 auto; padding: 20px;\">\
         <h2 style=\"color: #D4AF37;\">{title}</h2>{body}\
         <p style=\"color: #666; font-size: 12px;\">This is an automated message from {BRAND}. Please do not reply.</p>\
         </div></body></html>"
    )
}

pub fn otp(to: &str, name: &str, code: &str, purpose: OtpPurpose) -> OutgoingEmail {
    let (subject, lead) = match purpose {
        OtpPurpose::Registration => (
            format!("Verify your {BRAND} account"),
            "Use this code to verify your new account.",
        ),
        OtpPurpose::Login => (
            format!("Your {BRAND} login code"),
            "Use this code to finish signing in.",
        ),
        OtpPurpose::PasswordReset => (
            format!("{BRAND} password reset code"),
            "Use this code to reset your password. If you did not ask for a reset, ignore this email.",
        ),
    };
    let text = format!("Hello {name},\n\n{lead}\n\nCode: {code}\n\nThe code expires in 10 minutes.");
    let html = wrap(
        &subject,
        &format!(
            "<p>Hello {},</p><p>{lead}</p>\
             <p style=\"font-size: 28px; letter-spacing: 6px; font-weight: bold;\">{}</p>\
             <p>The code expires in 10 minutes.</p>",
            esc(name),
            esc(code)
        ),
    );
    OutgoingEmail {
        to: to.to_string(),
        subject,
        text,
        html,
    }
}

pub fn payment_received(msg: &PaymentReceived) -> OutgoingEmail {
    let amount = money(&msg.currency, msg.amount);
    let date = long_date(msg.service_date);
    let subject = format!("Payment Received - {BRAND}");
    let text = format!(
        "Dear {},\n\nYou have received a payment of {amount} from {} for {} on {date}.\n\
         Booking: {}\n\nPlease confirm the booking and contact the customer to finalize details.",
        msg.vendor_name, msg.user_name, msg.service_type, msg.booking_id
    );
    let html = wrap(
        "Payment Received!",
        &format!(
            "<p>Dear {},</p>\
             <p style=\"font-size: 24px; color: #28a745; font-weight: bold;\">{amount}</p>\
             <table>\
             <tr><td>Customer</td><td>{}</td></tr>\
             <tr><td>Service</td><td>{}</td></tr>\
             <tr><td>Service date</td><td>{date}</td></tr>\
             <tr><td>Booking</td><td>{}</td></tr>\
             </table>\
             <p>Please confirm the booking and contact the customer to finalize details.</p>",
            esc(&msg.vendor_name),
            esc(&msg.user_name),
            esc(&msg.service_type),
            msg.booking_id
        ),
    );
    OutgoingEmail {
        to: msg.vendor_email.clone(),
        subject,
        text,
        html,
    }
}

pub fn vendor_payment_recorded(msg: &VendorPaymentRecorded) -> OutgoingEmail {
    let subject = format!("Payment recorded by {} - {BRAND}", msg.user_name);
    let text = format!(
        "Dear {},\n\n{} recorded a {} payment of {:.2} for booking {}.\nRemaining balance: {:.2}.",
        msg.vendor_name, msg.user_name, msg.payment_type, msg.amount, msg.booking_id, msg.remaining
    );
    let html = wrap(
        "Payment recorded",
        &format!(
            "<p>Dear {},</p><p>{} recorded a <strong>{}</strong> payment of \
             <strong>{:.2}</strong> for booking {}.</p><p>Remaining balance: {:.2}</p>",
            esc(&msg.vendor_name),
            esc(&msg.user_name),
            esc(&msg.payment_type),
            msg.amount,
            msg.booking_id,
            msg.remaining
        ),
    );
    OutgoingEmail {
        to: msg.vendor_email.clone(),
        subject,
        text,
        html,
    }
}

pub fn guest_invitation(msg: &GuestInvitation) -> OutgoingEmail {
    let date = long_date(msg.event_date);
    let subject = format!("You're invited: {}", msg.event_name);
    let note = msg.message.as_deref().unwrap_or_default();
    let text = format!(
        "Hi {},\n\n{} invites you to {} on {date} at {}.\n\n{note}\n\nPlease RSVP from your guest dashboard.",
        msg.guest_name, msg.organizer_name, msg.event_name, msg.event_location
    );
    let html = wrap(
        "You're invited!",
        &format!(
            "<p>Hi {},</p><p><strong>{}</strong> invites you to <strong>{}</strong>.</p>\
             <p><strong>Date:</strong> {date}<br><strong>Location:</strong> {}</p>\
             {}<p>Please RSVP from your guest dashboard.</p>",
            esc(&msg.guest_name),
            esc(&msg.organizer_name),
            esc(&msg.event_name),
            esc(&msg.event_location),
            if note.is_empty() {
                String::new()
            } else {
                format!("<blockquote>{}</blockquote>", esc(note))
            }
        ),
    );
    OutgoingEmail {
        to: msg.guest_email.clone(),
        subject,
        text,
        html,
    }
}

pub fn rsvp_reminder(msg: &RsvpReminder) -> OutgoingEmail {
    let date = long_date(msg.event_date);
    let subject = format!("RSVP Reminder: {}", msg.event_name);
    let when = match msg.days_until_event {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {n} days"),
    };
    let text = format!(
        "Hi {},\n\n{} is {when} ({date}, {}). {} is waiting for your RSVP.",
        msg.guest_name, msg.event_name, msg.event_location, msg.organizer_name
    );
    let html = wrap(
        "RSVP Reminder",
        &format!(
            "<p>Hi {},</p><p><strong>{}</strong> is {when}.</p>\
             <p><strong>Date:</strong> {date}<br><strong>Location:</strong> {}</p>\
             <p>{} is waiting for your RSVP.</p>",
            esc(&msg.guest_name),
            esc(&msg.event_name),
            esc(&msg.event_location),
            esc(&msg.organizer_name)
        ),
    );
    OutgoingEmail {
        to: msg.guest_email.clone(),
        subject,
        text,
        html,
    }
}

pub fn test_message(to: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: format!("Test Email - {BRAND}"),
        text: "Email configuration successful.".to_string(),
        html: wrap(
            "Email Configuration Successful!",
            &format!("<p>Your {BRAND} email service is working correctly.</p>"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn user_values_are_escaped_in_html_only() {
        let mail = otp("a@b.c", "<script>", "123456", OtpPurpose::Login);
        assert!(mail.html.contains("&lt;script&gt;"));
        assert!(!mail.html.contains("<script>"));
        assert!(mail.text.contains("<script>"));
        assert!(mail.text.contains("123456"));
    }

    #[test]
    fn payment_received_goes_to_vendor_with_amount() {
        let id = Uuid::new_v4();
        let mail = payment_received(&PaymentReceived {
            vendor_email: "v@x.io".into(),
            vendor_name: "Vendor".into(),
            user_name: "Asha".into(),
            amount: 11800.0,
            currency: "INR".into(),
            service_date: NaiveDate::from_ymd_opt(2026, 12, 5).unwrap(),
            service_type: "catering".into(),
            booking_id: id,
        });
        assert_eq!(mail.to, "v@x.io");
        assert!(mail.text.contains("INR 11800.00"));
        assert!(mail.text.contains("Saturday, 5 December 2026"));
        assert!(mail.html.contains(&id.to_string()));
    }

    #[test]
    fn reminder_phrases_days() {
        let base = RsvpReminder {
            guest_email: "g@x.io".into(),
            guest_name: "G".into(),
            event_name: "Gala".into(),
            event_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            event_location: "Hall".into(),
            organizer_name: "O".into(),
            days_until_event: 1,
        };
        assert!(rsvp_reminder(&base).text.contains("tomorrow"));
        let later = RsvpReminder {
            days_until_event: 5,
            ..base
        };
        assert!(rsvp_reminder(&later).text.contains("in 5 days"));
        assert_eq!(rsvp_reminder(&later).subject, "RSVP Reminder: Gala");
    }

    #[test]
    fn invitation_note_is_optional() {
        let mut inv = GuestInvitation {
            guest_email: "g@x.io".into(),
            guest_name: "G".into(),
            event_name: "Gala".into(),
            event_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            event_location: "Hall".into(),
            organizer_name: "O".into(),
            message: None,
        };
        assert!(!guest_invitation(&inv).html.contains("blockquote"));
        inv.message = Some("Bring friends".into());
        assert!(guest_invitation(&inv).html.contains("<blockquote>Bring friends</blockquote>"));
    }
}
