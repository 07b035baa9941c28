pub mod database;
pub mod insight;
pub mod metrics;
pub mod newsletter;
pub mod providers;
pub mod timeline;

pub use database::Database;
pub use insight::{Feedback, InsightService, Newsletter};
pub use metrics::{get_metrics, init_metrics};
pub use providers::{
    gemini::GeminiTextProvider,
    mock::MockTextProvider,
    quotes::{HttpQuoteIndex, MockQuoteIndex},
    smtp::{MockEmailProvider, SmtpProvider},
    EmailMessage, EmailProvider, Quote, QuoteIndex, TextProvider,
};
