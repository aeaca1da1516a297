// Message rendering for the settlement pipelines
//
// Pure functions only: every template takes resolved entities and
// returns a ready-to-send EmailMessage.

use crate::ledger::models::{Auction, PaymentMethods, User};
use crate::notification::email::{EmailBody, EmailMessage};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

const TEAM_SIGNATURE: &str = "PrimeBid Auction Team";
const NOT_AVAILABLE: &str = "Not Available";

fn or_unavailable(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

/// Render the seller's payout coordinates for the winner notice.
///
/// Every method section is always present; missing fields fall back to
/// "Not Available" so the winner sees a complete, predictable list.
pub fn payout_instructions(methods: &PaymentMethods, contact_email: &str) -> String {
    let bank = methods.bank_transfer.as_ref();
    let bank_account_name = bank.map(|b| or_unavailable(&b.bank_account_name)).unwrap_or(NOT_AVAILABLE);
    let bank_account_number = bank.map(|b| or_unavailable(&b.bank_account_number)).unwrap_or(NOT_AVAILABLE);
    let bank_name = bank.map(|b| or_unavailable(&b.bank_name)).unwrap_or(NOT_AVAILABLE);

    let upi_id = methods
        .upi
        .as_ref()
        .map(|u| or_unavailable(&u.upi_id))
        .unwrap_or(NOT_AVAILABLE);

    let paypal_email = methods
        .paypal
        .as_ref()
        .map(|p| or_unavailable(&p.paypal_email))
        .unwrap_or(NOT_AVAILABLE);

    format!(
        "1. Bank Transfer:\n\
         \x20  - Account Name: {bank_account_name}\n\
         \x20  - Account Number: {bank_account_number}\n\
         \x20  - Bank: {bank_name}\n\
         \n\
         2. UPI ID:\n\
         \x20  - {upi_id}\n\
         \n\
         3. PayPal:\n\
         \x20  - {paypal_email}\n\
         \n\
         4. Cash on Delivery (COD):\n\
         \x20  - You must pay 20% of the total amount upfront before delivery.\n\
         \x20  - To pay the 20% upfront, use any of the above methods.\n\
         \x20  - The remaining 80% will be paid upon delivery.\n\
         \x20  - If you want to see the condition of your auction item, send an email to: {contact_email}"
    )
}

/// Unpaid-commission notice to the seller after settlement
pub fn commission_due(
    seller: &User,
    auction: &Auction,
    commission: Decimal,
    support_email: &str,
) -> EmailMessage {
    let body = format!(
        "Dear {user_name},\n\
         \n\
         You have an unpaid commission of ₹{commission} for the auction \"{title}\". \
         Please ensure payment is completed within 24 hours to avoid penalties.\n\
         \n\
         Payment Methods:\n\
         \n\
         1. Bank Transfer:\n\
         \x20  - Account Name: {TEAM_SIGNATURE}\n\
         \x20  - Account Number: XXXX-XXXX-XXXX\n\
         \x20  - Bank: XYZ Bank\n\
         \n\
         2. PayPal:\n\
         \x20  - Send payment to: payments@primebid.example\n\
         \n\
         For any queries, please contact support at {support_email}.\n\
         \n\
         Best regards,\n\
         {TEAM_SIGNATURE}",
        user_name = seller.user_name,
        title = auction.title,
    );

    EmailMessage {
        recipient: seller.email.clone(),
        subject: format!("Unpaid Commission Notice for Auction: {}", auction.title),
        body: EmailBody::Text(body),
    }
}

/// Winner notice with the seller's contact and payout instructions
pub fn auction_won(winner: &User, seller: &User, auction: &Auction) -> EmailMessage {
    let instructions = payout_instructions(&seller.payment_methods, &seller.email);
    let body = format!(
        "Dear {user_name},\n\
         \n\
         Congratulations! You have won the auction for \"{title}\".\n\
         \n\
         Before proceeding with the payment, please contact your auctioneer via email: {seller_email}.\n\
         \n\
         Please complete your payment using one of the following methods:\n\
         \n\
         {instructions}\n\
         \n\
         Please ensure your payment is completed within 24 hours. Once we confirm the payment, \
         the item will be shipped to you.\n\
         \n\
         Thank you for participating!\n\
         \n\
         Best regards,\n\
         {TEAM_SIGNATURE}",
        user_name = winner.user_name,
        title = auction.title,
        seller_email = seller.email,
    );

    EmailMessage {
        recipient: winner.email.clone(),
        subject: format!("Congratulations! You won the auction for {}", auction.title),
        body: EmailBody::Text(body),
    }
}

/// Settlement confirmation to the seller after a proof is reconciled
pub fn payment_settled(
    seller: &User,
    amount: Decimal,
    remaining: Decimal,
    settled_on: DateTime<Utc>,
) -> EmailMessage {
    let settlement_date = settled_on.format("%a %b %d %Y");
    let body = format!(
        "<p>Dear {user_name},</p>\n\
         <p>We are pleased to inform you that your recent commission payment has been \
         <strong>successfully verified</strong> and marked as <strong>settled</strong>.</p>\n\
         <h3>Payment Details:</h3>\n\
         <ul>\n\
         <li><strong>Amount Settled:</strong> ₹{amount}</li>\n\
         <li><strong>Remaining Unpaid Commission:</strong> ₹{remaining}</li>\n\
         <li><strong>Settlement Date:</strong> {settlement_date}</li>\n\
         </ul>\n\
         <p>Thank you for your prompt payment. Your account is now in good standing.</p>\n\
         <p>For any questions, feel free to reach out to our support team.</p>\n\
         <p>Best regards,<br>{TEAM_SIGNATURE}</p>",
        user_name = seller.user_name,
    );

    EmailMessage {
        recipient: seller.email.clone(),
        subject: "Your Payment Has Been Successfully Verified and Settled".to_string(),
        body: EmailBody::Html(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::models::{BankTransferDetails, PaypalDetails, UpiDetails, UserRole};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn user(name: &str, methods: PaymentMethods) -> User {
        User {
            id: Uuid::new_v4(),
            user_name: name.to_string(),
            email: format!("{name}@example.com"),
            role: UserRole::Auctioneer,
            unpaid_commission: Decimal::ZERO,
            auctions_won: 0,
            money_spent: Decimal::ZERO,
            payment_methods: methods,
            created_at: Utc::now(),
        }
    }

    fn auction(title: &str) -> Auction {
        Auction {
            id: Uuid::new_v4(),
            title: title.to_string(),
            end_time: Utc::now(),
            current_bid: dec!(1000),
            commission_calculated: false,
            highest_bidder: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_payout_instructions_fall_back_per_field() {
        let methods = PaymentMethods {
            bank_transfer: Some(BankTransferDetails {
                bank_account_name: Some("Ravi Kumar".to_string()),
                bank_account_number: None,
                bank_name: Some("XYZ Bank".to_string()),
            }),
            upi: None,
            paypal: Some(PaypalDetails { paypal_email: None }),
        };

        let rendered = payout_instructions(&methods, "seller@example.com");
        assert!(rendered.contains("Account Name: Ravi Kumar"));
        assert!(rendered.contains("Account Number: Not Available"));
        assert!(rendered.contains("Bank: XYZ Bank"));
        // Absent methods still render their section with the fallback
        assert!(rendered.contains("2. UPI ID:\n   - Not Available"));
        assert!(rendered.contains("3. PayPal:\n   - Not Available"));
    }

    #[test]
    fn test_payout_instructions_include_cod_terms() {
        let rendered = payout_instructions(&PaymentMethods::default(), "seller@example.com");
        assert!(rendered.contains("pay 20% of the total amount upfront"));
        assert!(rendered.contains("remaining 80% will be paid upon delivery"));
        assert!(rendered.contains("send an email to: seller@example.com"));
    }

    #[test]
    fn test_payout_instructions_render_full_details() {
        let methods = PaymentMethods {
            bank_transfer: Some(BankTransferDetails {
                bank_account_name: Some("Ravi Kumar".to_string()),
                bank_account_number: Some("1234-5678".to_string()),
                bank_name: Some("State Bank".to_string()),
            }),
            upi: Some(UpiDetails {
                upi_id: Some("ravi@upi".to_string()),
            }),
            paypal: Some(PaypalDetails {
                paypal_email: Some("ravi@paypal.example".to_string()),
            }),
        };

        let rendered = payout_instructions(&methods, "seller@example.com");
        assert!(rendered.contains("1234-5678"));
        assert!(rendered.contains("ravi@upi"));
        assert!(rendered.contains("ravi@paypal.example"));
        assert!(!rendered.contains(NOT_AVAILABLE));
    }

    #[test]
    fn test_commission_due_notice() {
        let seller = user("ravi", PaymentMethods::default());
        let auction = auction("Vintage camera");

        let message = commission_due(&seller, &auction, dec!(50.00), "support@primebid.example");
        assert_eq!(message.recipient, "ravi@example.com");
        assert!(message.subject.contains("Vintage camera"));
        let EmailBody::Text(body) = &message.body else {
            panic!("commission notice should be plain text");
        };
        assert!(body.contains("₹50.00"));
        assert!(body.contains("within 24 hours"));
        assert!(body.contains("support@primebid.example"));
    }

    #[test]
    fn test_auction_won_notice_points_at_seller() {
        let winner = user("priya", PaymentMethods::default());
        let seller = user("ravi", PaymentMethods::default());
        let auction = auction("Vintage camera");

        let message = auction_won(&winner, &seller, &auction);
        assert_eq!(message.recipient, "priya@example.com");
        let EmailBody::Text(body) = &message.body else {
            panic!("winner notice should be plain text");
        };
        assert!(body.contains("ravi@example.com"));
        assert!(body.contains("Cash on Delivery"));
    }

    #[test]
    fn test_payment_settled_reports_remaining_balance() {
        let seller = user("ravi", PaymentMethods::default());
        let message = payment_settled(&seller, dec!(200), dec!(300), Utc::now());

        let EmailBody::Html(body) = &message.body else {
            panic!("settlement confirmation should be html");
        };
        assert!(body.contains("₹200"));
        assert!(body.contains("Remaining Unpaid Commission:</strong> ₹300"));
    }
}
