//! gigmate-digest: the scheduled weekly summary job.
//!
//! Given the last 14 days of entries, builds one summary per user with
//! activity and hands it to a [`Mailer`]. Each user is handled independently;
//! one failure never stops the batch.

pub mod auth;
pub mod directory;
pub mod error;
pub mod job;
pub mod mailer;
pub mod window;

pub use auth::authorize;
pub use directory::{InMemoryDirectory, UserContact, UserDirectory, UserRecord, load_users};
pub use error::DigestError;
pub use job::{
    DigestReport, NO_ENTRIES_MESSAGE, PROCESSED_MESSAGE, UserDigestResult, run_weekly_digest,
};
pub use mailer::{LogMailer, Mailer, OutgoingEmail, RESEND_ENDPOINT, ResendMailer};
pub use window::{DigestWindow, Period};
